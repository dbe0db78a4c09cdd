use std::any::Any;
use std::fmt;
use std::path::Path;

use crate::DecodeError;

/// A decoded navigation grid.
///
/// The grid format belongs to the decoder, so the index stores whatever the decoder
/// produced and hands it back through [`NavGrid::downcast_ref`].
pub struct NavGrid {
    grid: Box<dyn Any + Send + Sync>,
    size_hint: usize,
}

impl NavGrid {
    /// Wraps a decoded grid. `size_hint` is the approximate number of bytes it keeps in memory.
    pub fn new<G: Any + Send + Sync>(grid: G, size_hint: usize) -> Self {
        Self {
            grid: Box::new(grid),
            size_hint,
        }
    }

    pub fn downcast_ref<G: Any>(&self) -> Option<&G> {
        self.grid.downcast_ref::<G>()
    }

    pub fn size_hint(&self) -> usize {
        self.size_hint
    }
}

impl fmt::Debug for NavGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavGrid")
            .field("size_hint", &self.size_hint)
            .finish_non_exhaustive()
    }
}

/// Turns the bytes of a navigation-grid file into a [`NavGrid`].
pub trait NavGridDecoder: Send + Sync {
    fn decode(&self, path: &Path, bytes: &[u8]) -> Result<NavGrid, DecodeError>;
}

impl<F> NavGridDecoder for F
where
    F: Fn(&Path, &[u8]) -> Result<NavGrid, DecodeError> + Send + Sync,
{
    fn decode(&self, path: &Path, bytes: &[u8]) -> Result<NavGrid, DecodeError> {
        self(path, bytes)
    }
}

/// The undecoded contents of a grid file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNavGrid {
    pub bytes: Vec<u8>,
}

/// Keeps grid files as [`RawNavGrid`] for servers that decode grids themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawNavGridDecoder;

impl NavGridDecoder for RawNavGridDecoder {
    fn decode(&self, _path: &Path, bytes: &[u8]) -> Result<NavGrid, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::new("navigation grid file is empty"));
        }

        Ok(NavGrid::new(
            RawNavGrid {
                bytes: bytes.to_vec(),
            },
            bytes.len(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn raw_decoder_keeps_bytes() {
        let grid = RawNavGridDecoder
            .decode(Path::new("AIPath.aimesh_ngrid"), &[1, 2, 3])
            .unwrap();

        assert_eq!(grid.size_hint(), 3);
        assert_eq!(
            grid.downcast_ref::<RawNavGrid>(),
            Some(&RawNavGrid {
                bytes: vec![1, 2, 3]
            })
        );
        assert!(grid.downcast_ref::<String>().is_none());
    }

    #[test]
    fn raw_decoder_rejects_empty_file() {
        let err = RawNavGridDecoder
            .decode(Path::new("AIPath.aimesh_ngrid"), &[])
            .unwrap_err();
        assert_eq!(err.to_string(), "navigation grid file is empty");
    }

    #[test]
    fn closures_are_decoders() {
        let decoder = |_: &Path, bytes: &[u8]| -> Result<NavGrid, DecodeError> {
            Ok(NavGrid::new(bytes.len() as u32, 4))
        };
        let grid = decoder.decode(Path::new("grid"), &[0; 16]).unwrap();
        assert_eq!(grid.downcast_ref::<u32>(), Some(&16));
    }
}

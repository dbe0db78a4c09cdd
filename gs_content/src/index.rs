use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use gs_parser::ContentFile;
use rayon::prelude::*;
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

use crate::{
    ContentResolver, FileKind, IndexConfig, IndexError, IndexWarning, MappedPath, NavGrid,
    NavGridDecoder, RelativePath, is_valid_package_name, map_content_path,
};

/// A script file found while indexing. Scripts are handed to the script loader as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptReference {
    pub path: PathBuf,
    pub relative: RelativePath,
    /// The content package the script belongs to, if its top directory is a valid package name
    pub package: Option<String>,
}

/// Every structured-text document, navigation grid and script of one game mode.
///
/// Built in one pass by [`ContentIndex::build`] and never modified afterwards.
#[derive(Debug)]
pub struct ContentIndex {
    root: PathBuf,
    game_mode: String,
    entries: HashMap<RelativePath, ContentFile>,
    nav_grids: HashMap<RelativePath, Arc<NavGrid>>,
    scripts: Vec<ScriptReference>,
}

/// A finished index plus the files that had to be left out of it.
#[derive(Debug)]
pub struct IndexBuild {
    pub index: ContentIndex,
    pub warnings: Vec<IndexWarning>,
}

struct DiscoveredFile {
    path: PathBuf,
    mapped: MappedPath,
    kind: FileKind,
}

#[derive(Clone, Copy)]
enum LoadKind {
    StructuredText,
    NavGrid,
}

enum Loaded {
    Entry(ContentFile),
    Grid(NavGrid),
    Failed(IndexWarning),
}

/// A value waiting to go into the index along with where it came from
struct Placed<T> {
    value: T,
    source: PathBuf,
    in_game_mode: bool,
}

impl ContentIndex {
    /// Walks `root` and indexes every recognized file.
    ///
    /// Only a missing or unreadable root (or a path that can't be made relative to it) fails
    /// the build. Files with unrecognized extensions are skipped. Recognized files that can't
    /// be mapped, read, parsed or decoded are reported in [`IndexBuild::warnings`] and are
    /// absent from the index.
    ///
    /// When two files map to the same [`RelativePath`], the one inside the game-mode
    /// directory wins over one outside it. Otherwise the later one in walk order wins.
    /// Either way the loser is reported as [`IndexWarning::DuplicatePath`].
    pub fn build(
        root: &Path,
        game_mode: &str,
        config: &IndexConfig,
        decoder: &dyn NavGridDecoder,
    ) -> Result<IndexBuild, IndexError> {
        let start = Instant::now();
        check_root(root)?;

        let mut warnings = Vec::new();
        let mut scripts = Vec::new();
        let mut to_load = Vec::new();

        for file in discover(root, game_mode, config, &mut warnings)? {
            match file.kind {
                FileKind::Script => {
                    if let Some(script) = script_reference(file, config) {
                        scripts.push(script);
                    }
                }
                FileKind::StructuredText => to_load.push((file, LoadKind::StructuredText)),
                FileKind::NavGrid => to_load.push((file, LoadKind::NavGrid)),
                // dropped during discovery
                FileKind::Other => {}
            }
        }

        let loaded: Vec<(DiscoveredFile, Loaded)> = if config.parallel {
            to_load
                .into_par_iter()
                .map(|(file, kind)| {
                    let loaded = load_file(&file.path, kind, decoder);
                    (file, loaded)
                })
                .collect()
        } else {
            to_load
                .into_iter()
                .map(|(file, kind)| {
                    let loaded = load_file(&file.path, kind, decoder);
                    (file, loaded)
                })
                .collect()
        };

        let mut entries = HashMap::new();
        let mut nav_grids = HashMap::new();

        for (file, loaded) in loaded {
            match loaded {
                Loaded::Entry(content) => {
                    debug!("Mapped content [{}]", file.mapped.relative);
                    place(&mut entries, file, content, &mut warnings);
                }
                Loaded::Grid(grid) => {
                    debug!(
                        "Mapped navigation grid [{}] ({} bytes)",
                        file.mapped.relative,
                        grid.size_hint()
                    );
                    place(&mut nav_grids, file, Arc::new(grid), &mut warnings);
                }
                Loaded::Failed(warning) => warnings.push(warning),
            }
        }

        for warning in &warnings {
            warn!("{}", warning);
        }

        let index = ContentIndex {
            root: root.to_path_buf(),
            game_mode: game_mode.to_string(),
            entries: entries.into_iter().map(|(k, v)| (k, v.value)).collect(),
            nav_grids: nav_grids.into_iter().map(|(k, v)| (k, v.value)).collect(),
            scripts,
        };

        info!(
            root = %root.display(),
            game_mode,
            entries = index.len(),
            nav_grids = index.nav_grid_count(),
            scripts = index.scripts.len(),
            warnings = warnings.len(),
            elapsed = ?start.elapsed(),
            "Indexed content"
        );

        Ok(IndexBuild { index, warnings })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn game_mode(&self) -> &str {
        &self.game_mode
    }

    /// `<root>/<game mode>`
    pub fn mode_dir(&self) -> PathBuf {
        self.root.join(&self.game_mode)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&ContentFile> {
        self.entries.get(path)
    }

    pub fn nav_grid(&self, path: &str) -> Option<&Arc<NavGrid>> {
        self.nav_grids.get(path)
    }

    pub fn has_nav_grid(&self, path: &str) -> bool {
        self.nav_grids.contains_key(path)
    }

    pub fn scripts(&self) -> &[ScriptReference] {
        &self.scripts
    }

    /// Names of the content packages that provide scripts
    pub fn script_packages(&self) -> BTreeSet<&str> {
        self.scripts
            .iter()
            .filter_map(|s| s.package.as_deref())
            .collect()
    }

    /// Sorted keys of every structured-text entry
    pub fn paths(&self) -> Vec<&RelativePath> {
        let mut paths: Vec<_> = self.entries.keys().collect();
        paths.sort();
        paths
    }

    /// Number of structured-text entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn nav_grid_paths(&self) -> Vec<&RelativePath> {
        let mut paths: Vec<_> = self.nav_grids.keys().collect();
        paths.sort();
        paths
    }

    pub fn nav_grid_count(&self) -> usize {
        self.nav_grids.len()
    }

    /// Approximate memory held by decoded grids
    pub fn nav_grid_bytes(&self) -> usize {
        self.nav_grids.values().map(|g| g.size_hint()).sum()
    }

    pub fn resolver(&self) -> ContentResolver<'_> {
        ContentResolver::new(self)
    }
}

fn check_root(root: &Path) -> Result<(), IndexError> {
    let metadata = fs::metadata(root).map_err(|source| match source.kind() {
        ErrorKind::NotFound => IndexError::MissingRoot {
            root: root.to_path_buf(),
        },
        _ => IndexError::Unreadable {
            root: root.to_path_buf(),
            source,
        },
    })?;

    if !metadata.is_dir() {
        return Err(IndexError::NotADirectory {
            root: root.to_path_buf(),
        });
    }

    fs::read_dir(root).map_err(|source| IndexError::Unreadable {
        root: root.to_path_buf(),
        source,
    })?;

    Ok(())
}

fn discover(
    root: &Path,
    game_mode: &str,
    config: &IndexConfig,
    warnings: &mut Vec<IndexWarning>,
) -> Result<Vec<DiscoveredFile>, IndexError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(IndexError::Unreadable {
                    root: root.to_path_buf(),
                    source: e.into(),
                });
            }
            Err(e) => {
                warnings.push(IndexWarning::Walk {
                    path: e.path().map(Path::to_path_buf),
                    source: e,
                });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        let kind = config.classify(&path);
        if kind == FileKind::Other {
            trace!("Skipping {}", path.display());
            continue;
        }

        let mapped = match map_content_path(root, game_mode, &path) {
            Ok(mapped) => mapped,
            Err(IndexError::NonUtf8Path { path }) => {
                warnings.push(IndexWarning::NonUtf8Path { path });
                continue;
            }
            Err(e) => return Err(e),
        };

        files.push(DiscoveredFile { path, mapped, kind });
    }

    Ok(files)
}

fn script_reference(file: DiscoveredFile, config: &IndexConfig) -> Option<ScriptReference> {
    let relative = file.mapped.relative;

    if relative
        .directories()
        .any(|dir| config.is_excluded_script_dir(dir))
    {
        trace!("Skipping build output {}", file.path.display());
        return None;
    }

    let package = relative
        .first_segment()
        .filter(|segment| {
            relative.directories().next().is_some() && is_valid_package_name(segment)
        })
        .map(str::to_string);

    Some(ScriptReference {
        path: file.path,
        relative,
        package,
    })
}

fn load_file(path: &Path, kind: LoadKind, decoder: &dyn NavGridDecoder) -> Loaded {
    match kind {
        LoadKind::StructuredText => match gs_parser::parse_file(path) {
            Ok(content) => Loaded::Entry(content),
            Err(source) => Loaded::Failed(IndexWarning::Parse {
                path: path.to_path_buf(),
                source,
            }),
        },
        LoadKind::NavGrid => {
            let bytes = match fs::read(path) {
                Ok(bytes) => bytes,
                Err(source) => {
                    return Loaded::Failed(IndexWarning::Read {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            };

            match decoder.decode(path, &bytes) {
                Ok(grid) => Loaded::Grid(grid),
                Err(source) => Loaded::Failed(IndexWarning::Decode {
                    path: path.to_path_buf(),
                    source,
                }),
            }
        }
    }
}

fn place<T>(
    map: &mut HashMap<RelativePath, Placed<T>>,
    file: DiscoveredFile,
    value: T,
    warnings: &mut Vec<IndexWarning>,
) {
    let placed = Placed {
        value,
        source: file.path,
        in_game_mode: file.mapped.in_game_mode,
    };

    match map.entry(file.mapped.relative) {
        Entry::Vacant(slot) => {
            slot.insert(placed);
        }
        Entry::Occupied(mut slot) => {
            let existing = slot.get();
            let replace = placed.in_game_mode || !existing.in_game_mode;
            let relative = slot.key().clone();

            let (kept, discarded) = if replace {
                let old = slot.insert(placed);
                (slot.get().source.clone(), old.source)
            } else {
                (existing.source.clone(), placed.source)
            };

            warnings.push(IndexWarning::DuplicatePath {
                relative,
                kept,
                discarded,
            });
        }
    }
}

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{ContentError, map_config_path};

/// The json configuration of one map, read straight from disk on request.
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub map_id: u32,
    pub path: PathBuf,
    values: Map<String, Value>,
}

impl MapConfig {
    pub fn load(root: &Path, game_mode: &str, map_id: u32) -> Result<Self, ContentError> {
        let path = map_config_path(root, game_mode, map_id)?;
        Self::from_file(map_id, path)
    }

    pub fn from_file(map_id: u32, path: PathBuf) -> Result<Self, ContentError> {
        let contents = std::fs::read_to_string(&path).map_err(|source| ContentError::MapConfigRead {
            path: path.clone(),
            source,
        })?;

        let values = serde_json::from_str::<Map<String, Value>>(&contents)
            .map_err(|source| ContentError::MapConfigParse {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            map_id,
            path,
            values,
        })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Reads the whole document into a caller-defined shape.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ContentError> {
        serde_json::from_value::<T>(Value::Object(self.values.clone())).map_err(|source| {
            ContentError::MapConfigParse {
                path: self.path.clone(),
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ContentTree;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Spawn {
        #[serde(rename = "spawnBarracks")]
        spawn_barracks: bool,
        #[serde(rename = "minionSpawnInterval")]
        minion_spawn_interval: f32,
    }

    #[test]
    fn test_load_map_config() {
        let tree = ContentTree::new("Default");
        tree.write_mode(
            "LEVELS/Map1/Map1.json",
            r#"{ "spawnBarracks": true, "minionSpawnInterval": 30.0 }"#,
        );

        let config = MapConfig::load(tree.root(), tree.game_mode(), 1).unwrap();

        assert_eq!(config.map_id, 1);
        assert_eq!(config.get("spawnBarracks"), Some(&Value::Bool(true)));
        assert_eq!(
            config.deserialize::<Spawn>().unwrap(),
            Spawn {
                spawn_barracks: true,
                minion_spawn_interval: 30.0
            }
        );
    }

    #[test]
    fn test_missing_map() {
        let tree = ContentTree::new("Default");
        let err = MapConfig::load(tree.root(), tree.game_mode(), 11).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_invalid_json() {
        let tree = ContentTree::new("Default");
        tree.write_mode("LEVELS/Map1/Map1.json", "[1, 2");

        let err = MapConfig::load(tree.root(), tree.game_mode(), 1).unwrap_err();
        assert!(matches!(err, ContentError::MapConfigParse { .. }));
    }
}

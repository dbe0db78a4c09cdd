use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::{
    CharData, ContentError, ContentIndex, DerivedCache, IndexBuild, IndexConfig, IndexError,
    IndexWarning, MapConfig, NavGrid, NavGridDecoder, RawNavGridDecoder, RelativePath,
    ResolvedSpell, SpellData, SpellKey, map_config_path,
};

/// One index build together with the objects derived from it.
///
/// A generation never changes its index. Derived objects are added on first request and
/// are dropped together with the generation when a reload replaces it.
#[derive(Debug)]
pub struct ContentGeneration {
    number: u64,
    index: ContentIndex,
    warnings: Vec<IndexWarning>,
    spells: DerivedCache<SpellKey, SpellData>,
    characters: DerivedCache<String, CharData>,
}

impl ContentGeneration {
    pub fn new(number: u64, build: IndexBuild) -> Self {
        Self {
            number,
            index: build.index,
            warnings: build.warnings,
            spells: DerivedCache::new(),
            characters: DerivedCache::new(),
        }
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn index(&self) -> &ContentIndex {
        &self.index
    }

    /// Files that were left out when this generation was indexed
    pub fn warnings(&self) -> &[IndexWarning] {
        &self.warnings
    }

    pub fn spell_cache(&self) -> &DerivedCache<SpellKey, SpellData> {
        &self.spells
    }

    pub fn char_cache(&self) -> &DerivedCache<String, CharData> {
        &self.characters
    }

    pub fn resolve_unit_stats_path(&self, model: &str) -> Result<RelativePath, ContentError> {
        self.index.resolver().unit_stats_path(model)
    }

    pub fn resolve_spell_data_path(
        &self,
        model: &str,
        spell: &str,
    ) -> Result<ResolvedSpell, ContentError> {
        self.index.resolver().spell_data_path(model, spell)
    }

    /// The spell `spell` as seen by unit `model`, built once per resolved location.
    pub fn get_spell_data(&self, model: &str, spell: &str) -> Result<Arc<SpellData>, ContentError> {
        let resolved = self.resolve_spell_data_path(model, spell)?;
        let key = SpellKey::new(resolved.scope.clone(), spell);

        self.spells
            .get_or_load(&key, || {
                SpellData::from_resolved(&self.index, resolved, spell)
            })
            .inspect_err(|e| warn!("Failed to load spell {} for {}: {}", spell, model, e))
    }

    /// The stat block of unit `model`, built once.
    pub fn get_char_data(&self, model: &str) -> Result<Arc<CharData>, ContentError> {
        self.characters
            .get_or_load(&model.to_string(), || CharData::load(&self.index, model))
            .inspect_err(|e| warn!("Failed to load character {}: {}", model, e))
    }

    /// Grids are only ever decoded during indexing.
    /// A grid missing here is never loaded on demand.
    pub fn get_nav_grid(&self, path: &str) -> Result<Arc<NavGrid>, ContentError> {
        self.index
            .nav_grid(path)
            .cloned()
            .ok_or_else(|| ContentError::NotLoaded {
                path: RelativePath::new(path),
            })
    }
}

/// Summary of a finished reload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadReport {
    pub generation: u64,
    pub entries: usize,
    pub scripts: usize,
    pub nav_grids: usize,
    pub warnings: usize,
    pub elapsed: Duration,
}

impl fmt::Display for ReloadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generation {}: {} entries, {} scripts, {} navigation grids, {} warnings in {:?}",
            self.generation, self.entries, self.scripts, self.nav_grids, self.warnings, self.elapsed
        )
    }
}

pub struct ContentManagerBuilder {
    root: PathBuf,
    game_mode: String,
    config: IndexConfig,
    decoder: Arc<dyn NavGridDecoder>,
}

impl ContentManagerBuilder {
    pub fn config(mut self, config: IndexConfig) -> Self {
        self.config = config;
        self
    }

    pub fn decoder(mut self, decoder: impl NavGridDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    /// Indexes the game mode. Fails only on structural errors.
    pub fn build(self) -> Result<ContentManager, IndexError> {
        let build = ContentIndex::build(
            &self.root,
            &self.game_mode,
            &self.config,
            self.decoder.as_ref(),
        )?;

        Ok(ContentManager {
            root: self.root,
            game_mode: self.game_mode,
            config: self.config,
            decoder: self.decoder,
            current: RwLock::new(Arc::new(ContentGeneration::new(1, build))),
            rebuild: Mutex::new(()),
        })
    }
}

/// The content of the active game mode.
///
/// Readers take an `Arc` snapshot of the current [`ContentGeneration`] and never hold a
/// lock while using it. [`ContentManager::reload`] builds a whole new generation and swaps
/// it in; requests already running finish against the generation they started with.
/// Concurrent reloads run one after another, each numbered after the one before it.
pub struct ContentManager {
    root: PathBuf,
    game_mode: String,
    config: IndexConfig,
    decoder: Arc<dyn NavGridDecoder>,
    current: RwLock<Arc<ContentGeneration>>,
    /// Held from the start of a build until its generation is swapped in
    rebuild: Mutex<()>,
}

impl ContentManager {
    pub fn builder(
        root: impl Into<PathBuf>,
        game_mode: impl Into<String>,
    ) -> ContentManagerBuilder {
        ContentManagerBuilder {
            root: root.into(),
            game_mode: game_mode.into(),
            config: IndexConfig::default(),
            decoder: Arc::new(RawNavGridDecoder),
        }
    }

    /// Indexes `<root>` for `game_mode` with the default config and raw grid decoding.
    pub fn load_game_mode(
        root: impl Into<PathBuf>,
        game_mode: impl Into<String>,
    ) -> Result<Self, IndexError> {
        Self::builder(root, game_mode).build()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn game_mode(&self) -> &str {
        &self.game_mode
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// The generation currently being served
    pub fn snapshot(&self) -> Arc<ContentGeneration> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    /// Re-indexes the content root and replaces the current generation.
    ///
    /// On a structural error the current generation stays in place. A reload that starts
    /// while another is running waits for it, so the newest build is always the one served.
    pub fn reload(&self) -> Result<ReloadReport, IndexError> {
        let _reloading = self.rebuild.lock().unwrap_or_else(PoisonError::into_inner);

        let start = Instant::now();
        let build = ContentIndex::build(
            &self.root,
            &self.game_mode,
            &self.config,
            self.decoder.as_ref(),
        )
        .inspect_err(|e| warn!("Reload of {} failed: {}", self.game_mode, e))?;

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let generation = ContentGeneration::new(current.number() + 1, build);

        let report = ReloadReport {
            generation: generation.number(),
            entries: generation.index().len(),
            scripts: generation.index().scripts().len(),
            nav_grids: generation.index().nav_grid_count(),
            warnings: generation.warnings().len(),
            elapsed: start.elapsed(),
        };

        *current = Arc::new(generation);
        info!("Reloaded {}: {}", self.game_mode, report);

        Ok(report)
    }

    pub fn resolve_unit_stats_path(&self, model: &str) -> Result<RelativePath, ContentError> {
        self.snapshot().resolve_unit_stats_path(model)
    }

    pub fn resolve_spell_data_path(
        &self,
        model: &str,
        spell: &str,
    ) -> Result<ResolvedSpell, ContentError> {
        self.snapshot().resolve_spell_data_path(model, spell)
    }

    pub fn get_spell_data(&self, model: &str, spell: &str) -> Result<Arc<SpellData>, ContentError> {
        self.snapshot().get_spell_data(model, spell)
    }

    pub fn get_char_data(&self, model: &str) -> Result<Arc<CharData>, ContentError> {
        self.snapshot().get_char_data(model)
    }

    pub fn get_nav_grid(&self, path: &str) -> Result<Arc<NavGrid>, ContentError> {
        self.snapshot().get_nav_grid(path)
    }

    pub fn map_config_path(&self, map_id: u32) -> Result<PathBuf, ContentError> {
        map_config_path(&self.root, &self.game_mode, map_id)
    }

    pub fn load_map_config(&self, map_id: u32) -> Result<MapConfig, ContentError> {
        MapConfig::load(&self.root, &self.game_mode, map_id)
    }
}

impl fmt::Debug for ContentManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentManager")
            .field("root", &self.root)
            .field("game_mode", &self.game_mode)
            .field("generation", &self.snapshot().number())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ContentTree;
    use crate::{DecodeError, SpellScope};
    use pretty_assertions::assert_eq;
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn manager(tree: &ContentTree) -> ContentManager {
        ContentManager::load_game_mode(tree.root(), tree.game_mode()).unwrap()
    }

    #[test]
    fn test_char_data_is_memoized() {
        let tree = ContentTree::new("Default");
        tree.write_mode("DATA/Characters/Annie/Annie.ini", "[Data]\nHP=500\n");
        let manager = manager(&tree);

        let first = manager.get_char_data("Annie").unwrap();
        let second = manager.get_char_data("Annie").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(manager.snapshot().char_cache().load_count(), 1);
    }

    #[test]
    fn test_shared_spell_built_once_for_all_units() {
        let tree = ContentTree::new("Default");
        tree.write_mode(
            "DATA/Shared/Spells/SummonerFlash.ini",
            "[SpellData]\nCastRange=400\n",
        );
        let manager = manager(&tree);

        let annie = manager.get_spell_data("Annie", "SummonerFlash").unwrap();
        let brand = manager.get_spell_data("Brand", "SummonerFlash").unwrap();

        assert!(Arc::ptr_eq(&annie, &brand));
        assert_eq!(annie.resolved.scope, SpellScope::Shared);
        assert_eq!(manager.snapshot().spell_cache().load_count(), 1);
    }

    #[test]
    fn test_character_spells_do_not_collide() {
        let tree = ContentTree::new("Default");
        tree.write_mode(
            "DATA/Characters/Annie/Spells/Passive.ini",
            "[SpellData]\nCooldown=1\n",
        );
        tree.write_mode(
            "DATA/Characters/Brand/Spells/Passive.ini",
            "[SpellData]\nCooldown=2\n",
        );
        let manager = manager(&tree);

        let annie = manager.get_spell_data("Annie", "Passive").unwrap();
        let brand = manager.get_spell_data("Brand", "Passive").unwrap();

        assert_eq!(annie.cooldown[0], 1.0);
        assert_eq!(brand.cooldown[0], 2.0);
        assert_eq!(manager.snapshot().spell_cache().len(), 2);
    }

    #[test]
    fn test_failed_spell_is_retried_after_reload() {
        let tree = ContentTree::new("Default");
        let manager = manager(&tree);

        let err = manager.get_spell_data("Annie", "Disintegrate").unwrap_err();
        assert!(err.is_not_found());

        tree.write_mode(
            "DATA/Characters/Annie/Spells/Disintegrate.ini",
            "[SpellData]\nCastRange=625\n",
        );
        manager.reload().unwrap();

        let spell = manager.get_spell_data("Annie", "Disintegrate").unwrap();
        assert_eq!(spell.cast_range[0], 625.0);
    }

    #[test]
    fn test_invalid_spell_is_not_cached() {
        let tree = ContentTree::new("Default");
        tree.write_mode("DATA/Spells/Recall.ini", "[SpellData]\nCastTime=soon\n");
        let manager = manager(&tree);
        let generation = manager.snapshot();

        assert!(generation.get_spell_data("Annie", "Recall").is_err());
        assert!(generation.get_spell_data("Annie", "Recall").is_err());

        assert_eq!(generation.spell_cache().load_count(), 2);
        assert!(generation.spell_cache().is_empty());
    }

    #[test]
    fn test_nav_grid_not_loaded_on_demand() {
        let tree = ContentTree::new("Default");
        tree.write_mode("LEVELS/Map1/AIPath.aimesh_ngrid", [1u8, 2, 3]);
        let manager = manager(&tree);

        let grid = manager.get_nav_grid("LEVELS/Map1/AIPath").unwrap();
        assert_eq!(grid.size_hint(), 3);

        // written after the build, so it must stay unknown until a reload
        tree.write_mode("LEVELS/Map2/AIPath.aimesh_ngrid", [4u8]);
        let err = manager.get_nav_grid("LEVELS/Map2/AIPath").unwrap_err();
        assert!(matches!(err, ContentError::NotLoaded { .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_custom_decoder_is_used_on_reload() {
        let tree = ContentTree::new("Default");
        tree.write_mode("LEVELS/Map1/AIPath.aimesh_ngrid", [9u8, 9]);

        let decodes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&decodes);
        let manager = ContentManager::builder(tree.root(), tree.game_mode())
            .decoder(move |_: &Path, bytes: &[u8]| -> Result<NavGrid, DecodeError> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(NavGrid::new(bytes.to_vec(), bytes.len()))
            })
            .build()
            .unwrap();

        manager.reload().unwrap();
        assert_eq!(decodes.load(Ordering::SeqCst), 2);
        assert_eq!(
            manager
                .get_nav_grid("LEVELS/Map1/AIPath")
                .unwrap()
                .downcast_ref::<Vec<u8>>(),
            Some(&vec![9u8, 9])
        );
    }

    #[test]
    fn test_reload_swaps_generation_and_keeps_old_snapshot() {
        let tree = ContentTree::new("Default");
        tree.write_mode("DATA/Characters/Annie/Annie.ini", "[Data]\nHP=500\n");
        let manager = manager(&tree);

        let old = manager.snapshot();
        let old_annie = old.get_char_data("Annie").unwrap();

        tree.write_mode("DATA/Characters/Annie/Annie.ini", "[Data]\nHP=575\n");
        let report = manager.reload().unwrap();

        assert_eq!(report.generation, 2);
        assert_eq!(report.entries, 1);
        assert_eq!(manager.snapshot().number(), 2);

        // the old snapshot still answers from the old index
        assert_eq!(old.get_char_data("Annie").unwrap().hp, 500.0);
        assert!(Arc::ptr_eq(&old_annie, &old.get_char_data("Annie").unwrap()));

        let new_annie = manager.get_char_data("Annie").unwrap();
        assert_eq!(new_annie.hp, 575.0);
        assert!(!Arc::ptr_eq(&old_annie, &new_annie));
    }

    #[test]
    fn test_failed_reload_keeps_current_generation() {
        let tree = ContentTree::new("Default");
        let root = tree.root().join("content");
        let annie = root.join("Default/DATA/Characters/Annie");
        std::fs::create_dir_all(&annie).unwrap();
        std::fs::write(annie.join("Annie.ini"), "[Data]\nHP=500\n").unwrap();

        let manager = ContentManager::load_game_mode(&root, "Default").unwrap();
        std::fs::remove_dir_all(&root).unwrap();

        let err = manager.reload().unwrap_err();
        assert!(matches!(err, IndexError::MissingRoot { .. }));
        assert_eq!(manager.snapshot().number(), 1);
        assert_eq!(manager.get_char_data("Annie").unwrap().hp, 500.0);
    }

    #[test]
    fn test_concurrent_reloads_are_serialized() {
        let tree = ContentTree::new("Default");
        tree.write_mode("DATA/Characters/Annie/Annie.ini", "[Data]\nHP=500\n");
        let manager = Arc::new(manager(&tree));
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let manager = Arc::clone(&manager);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    manager.reload().unwrap().generation
                })
            })
            .collect();
        let mut generations: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        generations.sort_unstable();

        // every reload got its own number and the last one swapped in is the one served
        assert_eq!(generations, vec![2, 3, 4, 5]);
        assert_eq!(manager.snapshot().number(), 5);
        assert_eq!(manager.get_char_data("Annie").unwrap().hp, 500.0);
    }

    #[test]
    fn test_concurrent_char_data_access() {
        let tree = ContentTree::new("Default");
        tree.write_mode("DATA/Characters/Annie/Annie.ini", "[Data]\nHP=500\n");
        let manager = Arc::new(manager(&tree));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || manager.get_char_data("Annie").unwrap())
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
        assert_eq!(manager.snapshot().char_cache().load_count(), 1);
    }

    #[test]
    fn test_map_config() {
        let tree = ContentTree::new("Default");
        tree.write_mode("LEVELS/Map1/Map1.json", r#"{ "name": "Summoner's Rift" }"#);
        let manager = manager(&tree);

        let path = manager.map_config_path(1).unwrap();
        assert!(path.ends_with("LEVELS/Map1/Map1.json"));

        let config = manager.load_map_config(1).unwrap();
        assert_eq!(
            config.get("name").and_then(|v| v.as_str()),
            Some("Summoner's Rift")
        );
        assert!(manager.load_map_config(2).unwrap_err().is_not_found());
    }
}

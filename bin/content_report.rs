use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::Parser;
use gamecontent::{ContentManager, IndexConfig, RawNavGrid};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// The content root, containing one directory per game mode
    #[clap(short, long)]
    root: PathBuf,

    /// The game mode to index
    #[clap(short, long, default_value = "Default")]
    mode: String,

    /// An index config json file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Print the stat block of a unit
    #[clap(long = "character", value_name = "MODEL")]
    characters: Vec<String>,

    /// Print a spell as seen by a unit
    #[clap(
        long = "spell",
        value_name = "MODEL:SPELL",
        value_parser = parse_spell_request
    )]
    spells: Vec<(String, String)>,

    /// Print the configuration of a map
    #[clap(long)]
    map: Option<u32>,

    /// Log every mapped file
    #[clap(short, long)]
    verbose: bool,
}

fn parse_spell_request(value: &str) -> Result<(String, String), String> {
    match value.split_once(':') {
        Some((model, spell)) if !model.is_empty() && !spell.is_empty() => {
            Ok((model.to_string(), spell.to_string()))
        }
        _ => Err(format!("expected MODEL:SPELL, got `{value}`")),
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = content_report(cli) {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

fn content_report(cli: Cli) -> Result<(), anyhow::Error> {
    let config = match &cli.config {
        Some(path) => IndexConfig::from_json_file(path)?,
        None => IndexConfig::default(),
    };

    let manager = ContentManager::builder(&cli.root, &cli.mode)
        .config(config)
        .build()
        .map_err(|e| anyhow!("Could not index game mode {}: {}", cli.mode, e))?;

    let generation = manager.snapshot();
    let index = generation.index();

    println!(
        "Game mode {} at {}",
        index.game_mode(),
        index.root().display()
    );
    println!("  {} content files", index.len());
    println!(
        "  {} scripts in {} packages",
        index.scripts().len(),
        index.script_packages().len()
    );
    println!(
        "  {} navigation grids ({} bytes)",
        index.nav_grid_count(),
        index.nav_grid_bytes()
    );

    if !generation.warnings().is_empty() {
        println!("  {} files skipped:", generation.warnings().len());
        for warning in generation.warnings() {
            println!("    {}", warning);
        }
    }

    for model in &cli.characters {
        let character = generation
            .get_char_data(model)
            .with_context(|| format!("Could not load character {}", model))?;

        println!();
        println!("{} ({})", character.name, character.source);
        println!("  hp {} (+{}/level)", character.hp, character.hp_per_level);
        println!(
            "  {} {} (+{}/level)",
            character.par_type, character.mp, character.mp_per_level
        );
        println!(
            "  move speed {}, attack range {}",
            character.move_speed, character.attack_range
        );
        println!(
            "  spells: {}",
            character.spell_names().collect::<Vec<_>>().join(", ")
        );
    }

    for (model, spell) in &cli.spells {
        let spell_data = generation
            .get_spell_data(model, spell)
            .with_context(|| format!("Could not load spell {} for {}", spell, model))?;

        println!();
        println!(
            "{} from {} ({})",
            spell_data.name, spell_data.resolved.scope, spell_data.resolved.path
        );
        println!("  targeting {:?}", spell_data.targeting_type);
        println!("  cast range {:?}", spell_data.cast_range);
        println!("  cooldown {:?}", spell_data.cooldown);
        println!("  mana cost {:?}", spell_data.mana_cost);
    }

    if let Some(map_id) = cli.map {
        let map = manager
            .load_map_config(map_id)
            .with_context(|| format!("Could not load map {}", map_id))?;

        println!();
        println!("Map {} ({})", map.map_id, map.path.display());
        for key in map.keys() {
            println!("  {}", key);
        }

        let prefix = format!("LEVELS/Map{map_id}/");
        for path in index.nav_grid_paths() {
            if !path.as_str().starts_with(&prefix) {
                continue;
            }
            let grid = manager.get_nav_grid(path.as_str())?;
            match grid.downcast_ref::<RawNavGrid>() {
                Some(raw) => println!("  grid {} ({} bytes, undecoded)", path, raw.bytes.len()),
                None => println!("  grid {} ({} bytes)", path, grid.size_hint()),
            }
        }
    }

    Ok(())
}

//! MixConsole - command-line front end
//!
//! Inspects console JSON files and manages the channel strip preset library.

#![deny(warnings)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mixconsole::config::{self, Config};
use mixconsole::presets::ChannelStripPreset;
use mixconsole::{serializer, AudioSync, MixingConsole, PresetCategory, PresetManager};

/// MixConsole - mixing console routing and presets
#[derive(Parser, Debug)]
#[command(name = "mixconsole")]
#[command(about = "Mixing console routing graph and channel strip presets", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/mixconsole/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the channels, buses and routing of a console file
    Inspect {
        /// Console JSON file
        file: PathBuf,
    },
    /// Apply a preset to a channel in a console file (written back in place)
    Apply {
        /// Console JSON file
        file: PathBuf,
        /// Channel id
        channel: String,
        /// Preset id
        preset: String,
    },
    /// Preset library commands
    Presets {
        #[command(subcommand)]
        action: PresetsAction,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
enum PresetsAction {
    /// List presets, optionally filtered by category
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Search presets by name, description or tag
    Search { query: String },
    /// Export the full catalog to a JSON file
    Export { file: PathBuf },
    /// Merge presets from a JSON file into the user library
    Import { file: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load config")?;

    init_logging(&config);

    match cli.command {
        Commands::Inspect { file } => inspect(&file),
        Commands::Apply {
            file,
            channel,
            preset,
        } => apply(&config, &file, &channel, &preset),
        Commands::Presets { action } => presets(&config, action),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "mixconsole",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}

/// Initialize tracing: RUST_LOG wins, then the configured level, then "info"
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.log_level.as_deref().unwrap_or("info"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Where user presets live
fn user_presets_path(config: &Config) -> PathBuf {
    config
        .user_presets
        .clone()
        .unwrap_or_else(|| config::config_dir().join("presets.json"))
}

/// Built-in catalog plus the user's library
fn load_manager(config: &Config) -> Result<PresetManager> {
    let mut manager = PresetManager::new();
    let path = user_presets_path(config);
    if path.exists() {
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        manager
            .import_json(&json)
            .with_context(|| format!("Invalid preset file {}", path.display()))?;
    }
    Ok(manager)
}

fn load_console(file: &Path) -> Result<MixingConsole> {
    let json =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    serializer::from_json_str(&json)
        .with_context(|| format!("Invalid console file {}", file.display()))
}

fn inspect(file: &Path) -> Result<()> {
    let console = load_console(file)?;

    println!("Console {}", console.id());
    println!("Channels ({}):", console.channel_count());
    for channel in console.channels() {
        let flags = match (channel.is_muted, channel.is_solo) {
            (_, true) => " [S]",
            (true, false) => " [M]",
            _ => "",
        };
        println!(
            "  {:<20} vol {:.2} pan {:+.2} -> {}{}",
            channel.name, channel.volume, channel.pan, channel.output_bus, flags
        );
        for insert in &channel.inserts {
            let state = if insert.enabled { "" } else { " (bypassed)" };
            println!(
                "      insert {}{}",
                insert.effect.as_deref().unwrap_or("-"),
                state
            );
        }
    }

    println!("Buses ({}):", console.bus_count());
    for bus in console.buses() {
        println!("  {:<20} [{}]", bus.name, bus.channels.join(", "));
        for send in &bus.sends {
            println!("      send -> {} {:.2}", send.destination_bus, send.amount);
        }
    }

    if console.has_feedback_loop() {
        println!("Warning: bus sends form a feedback loop");
    } else {
        println!("Bus order: {}", console.bus_processing_order().join(" -> "));
    }
    Ok(())
}

fn apply(config: &Config, file: &Path, channel: &str, preset: &str) -> Result<()> {
    let manager = load_manager(config)?;
    let mut console = load_console(file)?;
    let mut sync = AudioSync::new();

    let change = manager.apply_preset(&mut console, channel, preset)?;
    sync.record(&change);

    let json = serializer::to_json_string(&console)?;
    fs::write(file, json).with_context(|| format!("Failed to write {}", file.display()))?;

    if let Some(batch) = sync.take() {
        println!(
            "{}: {} (engine re-patch: {:?})",
            change.description(),
            channel,
            batch.dirty
        );
    }
    Ok(())
}

fn print_presets<'a>(presets: impl IntoIterator<Item = &'a ChannelStripPreset>) {
    for preset in presets {
        println!(
            "{:<24} {:<8} {:<20} {}",
            preset.id,
            preset.category.name(),
            preset.name,
            preset.tags.join(", ")
        );
    }
}

fn presets(config: &Config, action: PresetsAction) -> Result<()> {
    let mut manager = load_manager(config)?;

    match action {
        PresetsAction::List { category } => match category {
            Some(name) => {
                let category = PresetCategory::from_name(&name)
                    .with_context(|| format!("Unknown category: {}", name))?;
                print_presets(manager.get_presets_by_category(category));
            }
            None => print_presets(manager.catalog().iter()),
        },
        PresetsAction::Search { query } => {
            let found = manager.search_presets(&query);
            if found.is_empty() {
                println!("No presets match \"{}\"", query);
            }
            print_presets(found);
        }
        PresetsAction::Export { file } => {
            fs::write(&file, manager.export_json()?)
                .with_context(|| format!("Failed to write {}", file.display()))?;
            println!("Exported {} presets to {}", manager.catalog().len(), file.display());
        }
        PresetsAction::Import { file } => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let added = manager.import_json(&json)?;

            // Persist everything that differs from the factory catalog
            let builtins = mixconsole::presets::built_in_presets();
            let user: Vec<ChannelStripPreset> = manager
                .export_presets()
                .into_iter()
                .filter(|p| !builtins.contains(p))
                .collect();

            let path = user_presets_path(config);
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            fs::write(&path, serde_json::to_string_pretty(&user)?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Imported {} new presets into {}", added, path.display());
        }
    }
    Ok(())
}

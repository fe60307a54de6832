use anyhow::{Context, Result};
use apworlds::multiworld::MultiWorld;
use apworlds::settings::try_upgrade_settings;
use clap::Parser;
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
struct Args {
    #[arg(long)]
    settings: PathBuf,

    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    let settings_str = std::fs::read_to_string(&args.settings)
        .with_context(|| format!("Unable to read settings from {}", args.settings.display()))?;
    let (_, settings) = try_upgrade_settings(settings_str)
        .with_context(|| format!("Invalid settings in {}", args.settings.display()))?;

    let multiworld = MultiWorld::from_settings(&settings)?;
    let generation = multiworld.generate()?;
    for player in &generation.players {
        info!(
            "{} ({}): {} items, {} distinct",
            player.name,
            player.game,
            player.item_pool.len(),
            player.item_counts.len()
        );
    }

    let summary = serde_json::to_string_pretty(&generation)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, summary)
                .with_context(|| format!("Unable to write {}", path.display()))?;
            info!("Wrote summary to {}", path.display());
        }
        None => println!("{summary}"),
    }
    Ok(())
}

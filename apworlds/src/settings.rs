use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::VariantNames;

use crate::mtd::options::MtdOptions;
use crate::witness::options::{PuzzleRandomization, WitnessOptions};

pub const VERSION: u64 = 2;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "game")]
pub enum PlayerSettings {
    #[serde(rename = "20 Minutes Till Dawn")]
    Mtd {
        name: String,
        #[serde(default)]
        options: MtdOptions,
    },
    #[serde(rename = "The Witness")]
    Witness {
        name: String,
        #[serde(default)]
        options: WitnessOptions,
    },
}

impl PlayerSettings {
    pub fn name(&self) -> &str {
        match self {
            PlayerSettings::Mtd { name, .. } | PlayerSettings::Witness { name, .. } => name,
        }
    }

    pub fn game(&self) -> &'static str {
        match self {
            PlayerSettings::Mtd { .. } => crate::mtd::GAME,
            PlayerSettings::Witness { .. } => crate::witness::GAME,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MultiWorldSettings {
    pub version: u64,
    pub players: Vec<PlayerSettings>,
}

pub fn parse_settings(settings_json: &str) -> Result<MultiWorldSettings> {
    let mut des = serde_json::Deserializer::from_str(settings_json);
    let settings = serde_path_to_error::deserialize(&mut des)?;
    Ok(settings)
}

fn rename_key(options: &mut serde_json::Map<String, serde_json::Value>, old: &str, new: &str) {
    if let Some(value) = options.remove(old) {
        if !options.contains_key(new) {
            options.insert(new.to_string(), value);
        }
    }
}

fn upgrade_mtd_options(options: &mut serde_json::Map<String, serde_json::Value>) -> Result<()> {
    rename_key(options, "itemsamount", "items_per_stage");
    rename_key(options, "locationperstage", "items_per_stage");
    Ok(())
}

fn upgrade_witness_options(
    options: &mut serde_json::Map<String, serde_json::Value>,
) -> Result<()> {
    rename_key(options, "shuffle_EPs", "shuffle_eps");

    // Lasers used to be a plain on/off switch.
    if let Some(shuffle_lasers) = options.get("shuffle_lasers").and_then(|v| v.as_bool()) {
        let mode = if shuffle_lasers { "anywhere" } else { "off" };
        options.insert("shuffle_lasers".to_string(), mode.into());
    }

    if let Some(mode) = options.get("puzzle_randomization").and_then(|v| v.as_str()) {
        let mode = match mode {
            "normal" => "sigma_normal",
            "expert" => "sigma_expert",
            "variety" => "umbra_variety",
            other => other,
        }
        .to_string();
        if PuzzleRandomization::from_str(&mode).is_err() {
            bail!(
                "unrecognized puzzle_randomization {mode:?}, expected one of {:?}",
                PuzzleRandomization::VARIANTS
            );
        }
        options.insert("puzzle_randomization".to_string(), mode.into());
    }
    Ok(())
}

fn upgrade_player_settings(player: &mut serde_json::Value) -> Result<()> {
    let game = player["game"]
        .as_str()
        .context("missing game field")?
        .to_string();
    let player = player
        .as_object_mut()
        .context("player settings is not object")?;
    if !player.contains_key("options") {
        player.insert("options".to_string(), serde_json::json!({}));
    }
    let options = player
        .get_mut("options")
        .and_then(|v| v.as_object_mut())
        .context("options is not object")?;
    match game.as_str() {
        crate::mtd::GAME => upgrade_mtd_options(options)?,
        crate::witness::GAME => upgrade_witness_options(options)?,
        _ => {}
    }
    Ok(())
}

/// Brings settings written by older versions up to date and validates them.
/// Returns the normalized settings string along with the parsed settings.
pub fn try_upgrade_settings(settings_str: String) -> Result<(String, MultiWorldSettings)> {
    let mut settings: serde_json::Value = serde_json::from_str(&settings_str)?;

    let players = settings
        .get_mut("players")
        .context("missing players field")?
        .as_array_mut()
        .context("players is not array")?;
    for (i, player) in players.iter_mut().enumerate() {
        upgrade_player_settings(player).with_context(|| format!("players[{i}]"))?;
    }

    settings
        .as_object_mut()
        .context("settings is not object")?
        .insert("version".to_string(), VERSION.into());

    // Validate that the upgraded settings will parse as a MultiWorldSettings struct:
    let settings_str = settings.to_string();
    let settings_out = parse_settings(&settings_str)?;
    let settings_out_str = serde_json::to_string(&settings_out)?;
    Ok((settings_out_str, settings_out))
}

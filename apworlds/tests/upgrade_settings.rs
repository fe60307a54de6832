use anyhow::{bail, Context, Result};
use apworlds::multiworld::MultiWorld;
use apworlds::settings::{parse_settings, try_upgrade_settings};

/// Test that settings files from old versions can be upgraded
/// correctly, and that upgrading a second time has no effect.
#[test]
fn test_upgrade_settings_files() -> Result<()> {
    for entry in std::fs::read_dir("tests/settings")? {
        let entry = entry?;
        println!("Checking settings: {}", entry.path().display());
        let settings0_str = std::fs::read_to_string(entry.path())
            .with_context(|| format!("Unable to load settings at {}", entry.path().display()))?;
        let (settings1_str, settings1) = try_upgrade_settings(settings0_str)
            .with_context(|| format!("Unable to upgrade settings at {}", entry.path().display()))?;
        let (settings2_str, settings2) = try_upgrade_settings(settings1_str.clone())
            .with_context(|| {
                format!(
                    "Unable to double-upgrade settings at {}",
                    entry.path().display()
                )
            })?;
        if settings1 != settings2 || settings1_str != settings2_str {
            bail!(
                "Settings upgrade not idempotent for {}",
                entry.path().display()
            );
        }
    }
    Ok(())
}

/// Test that every upgraded settings file generates a consistent multiworld.
#[test]
fn test_generate_settings_files() -> Result<()> {
    for entry in std::fs::read_dir("tests/settings")? {
        let entry = entry?;
        let settings_str = std::fs::read_to_string(entry.path())?;
        let (_, settings) = try_upgrade_settings(settings_str)?;
        let multiworld = MultiWorld::from_settings(&settings)?;
        let generation = multiworld
            .generate()
            .with_context(|| format!("Unable to generate {}", entry.path().display()))?;
        assert_eq!(generation.players.len(), settings.players.len());
        for (player, player_settings) in generation.players.iter().zip(&settings.players) {
            assert_eq!(player.name, player_settings.name());
            assert_eq!(player.game, player_settings.game());
            assert_eq!(player.item_pool.len(), player.regions.location_count());
        }
    }
    Ok(())
}

#[test]
fn test_legacy_values() -> Result<()> {
    let settings_str = std::fs::read_to_string("tests/settings/legacy_mtd.json")?;
    let (upgraded, _) = try_upgrade_settings(settings_str)?;
    let value: serde_json::Value = serde_json::from_str(&upgraded)?;
    assert_eq!(value["players"][0]["options"]["items_per_stage"], 12);
    assert!(value["players"][0]["options"].get("locationperstage").is_none());

    let settings_str = std::fs::read_to_string("tests/settings/legacy_witness.json")?;
    let (upgraded, _) = try_upgrade_settings(settings_str)?;
    let value: serde_json::Value = serde_json::from_str(&upgraded)?;
    let options = &value["players"][0]["options"];
    assert_eq!(options["shuffle_eps"], "obelisk_sides");
    assert_eq!(options["shuffle_lasers"], "off");
    assert_eq!(options["puzzle_randomization"], "sigma_normal");
    assert_eq!(value["version"], 2);
    Ok(())
}

/// Upgrading must not change what gets generated, including the order of trap weights,
/// which decides ties in the filler split.
#[test]
fn test_upgrade_keeps_generation() -> Result<()> {
    let settings_str = r#"{"version": 2, "players": [
        {"game": "The Witness", "name": "W", "options": {
            "puzzle_skip_amount": 0,
            "trap_percentage": 100,
            "trap_weights": {"Slowness": 1, "Bonk": 1}
        }}
    ]}"#;
    let direct = parse_settings(settings_str)?;
    let (upgraded_str, upgraded) = try_upgrade_settings(settings_str.to_string())?;
    assert!(upgraded_str.contains(r#""trap_weights":{"Slowness":1,"Bonk":1}"#));

    let direct_generation = MultiWorld::from_settings(&direct)?.generate()?;
    let upgraded_generation = MultiWorld::from_settings(&upgraded)?.generate()?;
    let direct_counts: Vec<_> = direct_generation.players[0].item_counts.iter().collect();
    let upgraded_counts: Vec<_> = upgraded_generation.players[0].item_counts.iter().collect();
    assert_eq!(direct_counts, upgraded_counts);
    Ok(())
}

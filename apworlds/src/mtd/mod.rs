//! 20 Minutes Till Dawn: three stages with a configurable number of checks each.

pub mod items;
pub mod locations;
pub mod options;
pub mod regions;

use anyhow::{Context, Result};
use apworlds_game::{IdTable, Item, PlayerId, RegionGraph, World};
use std::str::FromStr;

use items::MtdItem;
use options::MtdOptions;

pub const GAME: &str = "20 Minutes Till Dawn";
pub const START_ID: i64 = 1_200_000; // 20 minutes in milliseconds

pub struct MtdWorld {
    player: PlayerId,
    options: MtdOptions,
    item_name_to_id: IdTable,
    location_name_to_id: IdTable,
}

impl MtdWorld {
    pub fn new(player: PlayerId, options: MtdOptions) -> Result<Self> {
        Ok(MtdWorld {
            player,
            item_name_to_id: items::create_item_table()?,
            location_name_to_id: locations::create_location_table(&options)?,
            options,
        })
    }

    pub fn options(&self) -> &MtdOptions {
        &self.options
    }

    fn make_item(&self, item: MtdItem) -> Item {
        Item {
            name: item.name().to_string(),
            code: Some(item.code()),
            classification: item.classification(),
            player: self.player,
        }
    }
}

impl World for MtdWorld {
    fn game(&self) -> &'static str {
        GAME
    }

    fn player(&self) -> PlayerId {
        self.player
    }

    fn item_name_to_id(&self) -> &IdTable {
        &self.item_name_to_id
    }

    fn location_name_to_id(&self) -> &IdTable {
        &self.location_name_to_id
    }

    fn create_item(&self, name: &str) -> Result<Item> {
        let item =
            MtdItem::from_str(name).with_context(|| format!("unknown {GAME} item {name:?}"))?;
        Ok(self.make_item(item))
    }

    fn create_regions(&self) -> Result<RegionGraph> {
        regions::create_regions(self.player, &self.location_name_to_id)
    }

    fn create_items(&self) -> Result<Vec<Item>> {
        let total = self.options.items_per_stage() * locations::Stage::all()?.len();
        Ok(items::create_item_pool(total)
            .into_iter()
            .map(|item| self.make_item(item))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apworlds_game::ItemClassification;

    #[test]
    fn test_create_item() {
        let world = MtdWorld::new(4, MtdOptions::default()).unwrap();
        let item = world.create_item("Time Trap").unwrap();
        assert_eq!(item.code, Some(1_200_001));
        assert_eq!(item.classification, ItemClassification::TRAP);
        assert_eq!(item.player, 4);
        assert!(world.create_item("Forest: Item 1").is_err());
    }

    #[test]
    fn test_pool_matches_locations() {
        let world = MtdWorld::new(1, MtdOptions::default()).unwrap();
        let pool = world.create_items().unwrap();
        assert_eq!(pool.len(), 60);
        assert_eq!(pool.len(), world.create_regions().unwrap().location_count());
        assert_eq!(pool.iter().filter(|i| i.name == "Experience").count(), 20);
        assert_eq!(pool.iter().filter(|i| i.name == "Time Trap").count(), 10);
        assert_eq!(pool.iter().filter(|i| i.name == "Powerup").count(), 30);
    }
}

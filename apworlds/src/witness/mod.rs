pub mod options;
pub mod player_items;
pub mod player_locations;
pub mod player_logic;
pub mod regions;
pub mod static_items;
pub mod static_locations;

use anyhow::{ensure, Context, Result};
use apworlds_game::{IdTable, Item, PlayerId, RegionGraph, World};
use hashbrown::HashSet;
use log::{info, warn};

use options::WitnessOptions;
use player_items::WitnessPlayerItems;
use player_locations::WitnessPlayerLocations;
use player_logic::{WitnessLogic, WitnessPlayerLogic};
use static_items::StaticItems;
use static_locations::StaticLocations;

pub const GAME: &str = "The Witness";
pub const ID_OFFSET: i64 = 158_000;

/// In-game entity id of a panel, EP or obelisk side.
pub type EntityHex = u32;

pub fn parse_hex(s: &str) -> Result<EntityHex> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    EntityHex::from_str_radix(digits, 16).with_context(|| format!("invalid entity hex {s:?}"))
}

pub struct WitnessWorld {
    player: PlayerId,
    options: WitnessOptions,
    static_locations: StaticLocations,
    logic: WitnessPlayerLogic,
    locations: WitnessPlayerLocations,
    items: WitnessPlayerItems,
}

impl WitnessWorld {
    pub fn new(player: PlayerId, options: WitnessOptions) -> Result<Self> {
        let static_items = StaticItems::load()?;
        let static_locations = StaticLocations::load()?;
        Self::from_tables(player, options, static_items, static_locations)
    }

    pub fn from_tables(
        player: PlayerId,
        options: WitnessOptions,
        static_items: StaticItems,
        static_locations: StaticLocations,
    ) -> Result<Self> {
        let logic = WitnessPlayerLogic::new(&options, &static_items, &static_locations);
        let locations = WitnessPlayerLocations::new(&options, &static_locations, &logic);
        let items = WitnessPlayerItems::new(&options, static_items, &logic, &locations)?;
        Ok(WitnessWorld {
            player,
            options,
            static_locations,
            logic,
            locations,
            items,
        })
    }

    pub fn options(&self) -> &WitnessOptions {
        &self.options
    }

    pub fn player_items(&self) -> &WitnessPlayerItems {
        &self.items
    }

    pub fn player_locations(&self) -> &WitnessPlayerLocations {
        &self.locations
    }

    /// Early items as they appear in this player's pool, with symbols mapped to
    /// their progressive item where one replaces them.
    pub fn early_items_in_pool(&self) -> Vec<String> {
        let mandatory = self.items.get_mandatory_items();
        let mut seen: HashSet<String> = HashSet::new();
        let mut out = vec![];
        for name in self.items.get_early_items() {
            let name = self.items.static_items().get_parent_progressive_item(&name);
            if mandatory.contains_key(&name) && seen.insert(name.clone()) {
                out.push(name);
            }
        }
        out
    }
}

impl World for WitnessWorld {
    fn game(&self) -> &'static str {
        GAME
    }

    fn player(&self) -> PlayerId {
        self.player
    }

    fn item_name_to_id(&self) -> &IdTable {
        &self.items.static_items().item_name_to_id
    }

    fn location_name_to_id(&self) -> &IdTable {
        &self.static_locations.location_name_to_id
    }

    fn create_item(&self, name: &str) -> Result<Item> {
        let data = self
            .items
            .item_data(name)
            .or_else(|| self.items.static_items().item_data.get(name))
            .with_context(|| format!("unknown {GAME} item {name:?}"))?;
        Ok(Item {
            name: name.to_string(),
            code: data.ap_code,
            classification: data.classification,
            player: self.player,
        })
    }

    fn create_regions(&self) -> Result<RegionGraph> {
        regions::create_regions(self.player, &self.static_locations, &self.locations)
    }

    fn create_items(&self) -> Result<Vec<Item>> {
        let mut pool: Vec<Item> = vec![];
        for (name, count) in self.items.get_mandatory_items() {
            for _ in 0..count {
                pool.push(self.create_item(&name)?);
            }
        }

        let location_count = self.locations.check_count();
        ensure!(
            pool.len() <= location_count,
            "player {}: {} mandatory items do not fit in {} locations",
            self.player,
            pool.len(),
            location_count
        );
        let mut remaining = location_count - pool.len();

        let wanted_skips = self.options.puzzle_skip_amount.value() as usize;
        let skips = wanted_skips.min(remaining);
        if skips < wanted_skips {
            warn!(
                "player {}: only room for {skips} of {wanted_skips} puzzle skips",
                self.player
            );
        }
        for _ in 0..skips {
            pool.push(self.create_item("Puzzle Skip")?);
        }
        remaining -= skips;

        for (name, count) in self.items.get_filler_items(remaining)? {
            for _ in 0..count {
                pool.push(self.create_item(&name)?);
            }
        }
        info!(
            "player {}: {} items for {} locations",
            self.player,
            pool.len(),
            location_count
        );
        Ok(pool)
    }

    fn local_items(&self) -> Vec<String> {
        self.items.local_only_items()
    }

    fn event_placements(&self) -> Result<Vec<(String, Item)>> {
        let mut out = vec![];
        for location in &self.locations.event_locations {
            let (item_name, _) = self
                .logic
                .event_item_pairs()
                .get(location)
                .with_context(|| format!("no event item for {location:?}"))?;
            out.push((location.clone(), self.create_item(item_name)?));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::options::{PuzzleRandomization, ShuffleEps};
    use super::*;
    use apworlds_game::ItemClassification;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("0x01A54").unwrap(), 0x01A54);
        assert_eq!(parse_hex("3D9A9").unwrap(), 0x3D9A9);
        assert!(parse_hex("0xZZ").is_err());
    }

    #[test]
    fn test_pool_fills_locations() {
        let world = WitnessWorld::new(1, WitnessOptions::default()).unwrap();
        let pool = world.create_items().unwrap();
        assert_eq!(pool.len(), world.player_locations().check_count());
        assert_eq!(pool.iter().filter(|i| i.name == "Puzzle Skip").count(), 10);
        assert!(pool.iter().all(|i| i.player == 1 && !i.is_event()));
        assert!(pool
            .iter()
            .any(|i| i.classification == ItemClassification::TRAP));
    }

    #[test]
    fn test_unknown_trap_rejected() {
        let mut options = WitnessOptions::default();
        options.trap_weights.insert("Energy Fill".to_string(), 3);
        let err = WitnessWorld::new(1, options).err().unwrap();
        assert!(err.to_string().contains("Energy Fill"));
    }

    #[test]
    fn test_event_placements() {
        let world = WitnessWorld::new(2, WitnessOptions::default()).unwrap();
        let events = world.event_placements().unwrap();
        assert_eq!(events.len(), 12);
        let (location, victory) = events.last().unwrap();
        assert_eq!(location, "Mountain Final Room Elevator Start");
        assert_eq!(victory.name, "Victory");
        assert_eq!(victory.code, None);
        assert_eq!(victory.player, 2);
    }

    #[test]
    fn test_early_items_in_pool() {
        let mut options = WitnessOptions::default();
        options.puzzle_randomization = PuzzleRandomization::SigmaExpert;
        options.shuffle_eps = ShuffleEps::Individual;
        let world = WitnessWorld::new(1, options).unwrap();
        let early = world.early_items_in_pool();
        assert!(early.contains(&"Progressive Dots".to_string()));
        assert!(early.contains(&"Progressive Stars".to_string()));
        assert!(early.contains(&"Triangles".to_string()));
        assert!(!early.contains(&"Dots".to_string()));
    }
}

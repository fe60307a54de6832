use hashbrown::HashSet;
use indexmap::IndexMap;
use log::debug;

use super::options::{ShuffleDoors, ShuffleEps, ShuffleLasers, WitnessOptions};
use super::static_items::{DefinitionKind, DoorGroup, ItemCategory, StaticItems};
use super::static_locations::StaticLocations;
use super::EntityHex;

/// Per-player view of the puzzle logic that the item pool depends on.
pub trait WitnessLogic {
    /// Progression items that can actually show up in this player's game.
    fn progression_items_in_game(&self) -> &HashSet<String>;

    /// Stages of each progressive item, in collection order.
    fn progressive_lists(&self) -> &IndexMap<String, Vec<String>>;

    fn solvability_guaranteed(&self, entity_hex: EntityHex) -> bool;

    /// Event location name -> (event item name, entity that triggers it).
    fn event_item_pairs(&self) -> &IndexMap<String, (String, EntityHex)>;
}

pub struct WitnessPlayerLogic {
    progression_items_in_game: HashSet<String>,
    progressive_lists: IndexMap<String, Vec<String>>,
    unsolvable_entities: HashSet<EntityHex>,
    event_item_pairs: IndexMap<String, (String, EntityHex)>,
}

fn shuffled_door_groups(options: &WitnessOptions) -> Vec<DoorGroup> {
    let mut groups = match options.shuffle_doors {
        ShuffleDoors::Off => vec![],
        ShuffleDoors::Panels => vec![DoorGroup::Panels],
        ShuffleDoors::DoorsSimple => vec![DoorGroup::Regional],
        ShuffleDoors::DoorsComplex => vec![DoorGroup::Doors],
        ShuffleDoors::DoorsMax => vec![DoorGroup::Panels, DoorGroup::Doors],
    };
    if options.shuffle_boat {
        groups.push(DoorGroup::Boat);
    }
    if options.shuffle_lasers != ShuffleLasers::Off {
        groups.push(DoorGroup::Lasers);
    }
    if options.shuffle_eps != ShuffleEps::Off {
        groups.push(DoorGroup::Obelisks);
    }
    groups
}

impl WitnessPlayerLogic {
    pub fn new(
        options: &WitnessOptions,
        static_items: &StaticItems,
        static_locations: &StaticLocations,
    ) -> Self {
        let mut unsolvable_entities: HashSet<EntityHex> = HashSet::new();
        if options.disable_non_randomized_puzzles {
            unsolvable_entities.extend(
                static_locations
                    .locations
                    .iter()
                    .filter(|l| !l.randomized)
                    .map(|l| l.hex),
            );
        }

        let mut progression_items_in_game: HashSet<String> = HashSet::new();
        let mut progressive_lists: IndexMap<String, Vec<String>> = IndexMap::new();

        if options.shuffle_symbols {
            let mode = options.puzzle_randomization;
            let symbols_in_mode: Vec<&str> = static_items
                .items_in_category(ItemCategory::Symbol)
                .filter(|(_, data)| {
                    !matches!(data.definition.kind, DefinitionKind::Progressive { .. })
                        && data.definition.available_in(mode)
                })
                .map(|(name, _)| name)
                .collect();

            let mut replaced: HashSet<&str> = HashSet::new();
            if options.progressive_symbols {
                for (name, data) in static_items.items_in_category(ItemCategory::Symbol) {
                    let DefinitionKind::Progressive { child_item_names } = &data.definition.kind
                    else {
                        continue;
                    };
                    let stages: Vec<String> = child_item_names
                        .iter()
                        .filter(|c| symbols_in_mode.contains(&c.as_str()))
                        .cloned()
                        .collect();
                    if stages.is_empty() {
                        continue;
                    }
                    replaced.extend(child_item_names.iter().map(|c| c.as_str()));
                    progression_items_in_game.insert(name.to_string());
                    progressive_lists.insert(name.to_string(), stages);
                }
            }
            progression_items_in_game.extend(
                symbols_in_mode
                    .iter()
                    .filter(|s| !replaced.contains(*s))
                    .map(|s| s.to_string()),
            );
        }

        let door_groups = shuffled_door_groups(options);
        for (name, data) in &static_items.item_data {
            if let DefinitionKind::Door { group, .. } = data.definition.kind {
                if door_groups.contains(&group) {
                    progression_items_in_game.insert(name.clone());
                }
            }
        }

        let mut event_item_pairs: IndexMap<String, (String, EntityHex)> = IndexMap::new();
        for event in &static_locations.events {
            if unsolvable_entities.contains(&event.hex) {
                debug!("Skipping event {:?}: its panel is disabled", event.name);
                continue;
            }
            event_item_pairs.insert(event.name.clone(), (event.item.clone(), event.hex));
        }

        WitnessPlayerLogic {
            progression_items_in_game,
            progressive_lists,
            unsolvable_entities,
            event_item_pairs,
        }
    }
}

impl WitnessLogic for WitnessPlayerLogic {
    fn progression_items_in_game(&self) -> &HashSet<String> {
        &self.progression_items_in_game
    }

    fn progressive_lists(&self) -> &IndexMap<String, Vec<String>> {
        &self.progressive_lists
    }

    fn solvability_guaranteed(&self, entity_hex: EntityHex) -> bool {
        !self.unsolvable_entities.contains(&entity_hex)
    }

    fn event_item_pairs(&self) -> &IndexMap<String, (String, EntityHex)> {
        &self.event_item_pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::witness::options::PuzzleRandomization;

    fn logic(options: &WitnessOptions) -> WitnessPlayerLogic {
        let items = StaticItems::load().unwrap();
        let locations = StaticLocations::load().unwrap();
        WitnessPlayerLogic::new(options, &items, &locations)
    }

    #[test]
    fn test_progressive_stages_follow_mode() {
        let mut options = WitnessOptions::default();
        options.puzzle_randomization = PuzzleRandomization::SigmaNormal;
        let l = logic(&options);
        assert_eq!(l.progressive_lists()["Progressive Dots"], vec!["Dots"]);
        assert!(l.progression_items_in_game().contains("Progressive Dots"));
        assert!(!l.progression_items_in_game().contains("Dots"));
        assert!(!l.progression_items_in_game().contains("Arrows"));

        options.puzzle_randomization = PuzzleRandomization::SigmaExpert;
        let l = logic(&options);
        assert_eq!(
            l.progressive_lists()["Progressive Dots"],
            vec!["Dots", "Full Dots"]
        );
        assert!(l.progression_items_in_game().contains("Arrows"));
    }

    #[test]
    fn test_no_progressive_symbols() {
        let mut options = WitnessOptions::default();
        options.progressive_symbols = false;
        let l = logic(&options);
        assert!(l.progressive_lists().is_empty());
        assert!(l.progression_items_in_game().contains("Dots"));
        assert!(!l.progression_items_in_game().contains("Progressive Dots"));
    }

    #[test]
    fn test_door_groups() {
        let mut options = WitnessOptions::default();
        options.shuffle_doors = ShuffleDoors::DoorsSimple;
        options.shuffle_boat = false;
        let l = logic(&options);
        assert!(l.progression_items_in_game().contains("Caves Shortcuts"));
        assert!(!l
            .progression_items_in_game()
            .contains("Caves Mountain Shortcut (Door)"));
        assert!(!l.progression_items_in_game().contains("Boat"));
        assert!(!l.progression_items_in_game().contains("Symmetry Laser"));
    }

    #[test]
    fn test_disabled_puzzles() {
        let mut options = WitnessOptions::default();
        assert!(logic(&options).solvability_guaranteed(0x334DB));
        options.disable_non_randomized_puzzles = true;
        let l = logic(&options);
        assert!(!l.solvability_guaranteed(0x334DB));
        assert!(l.solvability_guaranteed(0x01A54));
        assert!(!l.event_item_pairs().contains_key("Shadows Laser Activated"));
        assert!(l.event_item_pairs().contains_key("Desert Laser Activated"));
    }
}

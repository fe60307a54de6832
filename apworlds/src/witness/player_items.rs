//! Progression, filler and event items of a single Witness world.

use anyhow::{ensure, Result};
use apworlds_game::util::build_weighted_int_list;
use apworlds_game::{ItemClassification, ItemId};
use hashbrown::HashSet;
use indexmap::IndexMap;
use log::debug;

use super::options::{PuzzleRandomization, ShuffleEps, ShuffleLasers, WitnessOptions};
use super::player_locations::WitnessPlayerLocations;
use super::player_logic::WitnessLogic;
use super::static_items::{DefinitionKind, ItemCategory, ItemData, ItemDefinition, StaticItems};

pub const NUM_ENERGY_UPGRADES: usize = 4;

pub struct WitnessPlayerItems {
    options: WitnessOptions,
    static_items: StaticItems,
    item_data: IndexMap<String, ItemData>,
    mandatory_items: IndexMap<String, usize>,
    proguseful_items: HashSet<String>,
}

fn proguseful_allow_list(options: &WitnessOptions, static_items: &StaticItems) -> HashSet<String> {
    let mut items: HashSet<&str> = [
        "Dots",
        "Stars",
        "Shapers",
        "Black/White Squares",
        "Caves Shortcuts",
        "Caves Mountain Shortcut (Door)",
        "Caves Swamp Shortcut (Door)",
        "Boat",
    ]
    .into_iter()
    .collect();

    if options.shuffle_eps == ShuffleEps::Individual {
        // Town and Monastery hold the most EP checks.
        items.insert("Town Obelisk Key");
        items.insert("Monastery Obelisk Key");
    }

    if options.shuffle_discarded_panels {
        // Discards are spread out and mostly in sphere 1.
        match options.puzzle_randomization {
            PuzzleRandomization::None | PuzzleRandomization::SigmaNormal => {
                items.insert("Triangles");
            }
            PuzzleRandomization::SigmaExpert => {
                items.insert("Arrows");
            }
            // Variety discards need two symbols, so no single one unlocks them.
            PuzzleRandomization::UmbraVariety => {}
        }
    }
    match options.puzzle_randomization {
        PuzzleRandomization::SigmaExpert => {
            items.insert("Triangles");
            items.insert("Full Dots");
            items.insert("Stars + Same Colored Symbol");
            items.remove("Stars");
        }
        PuzzleRandomization::UmbraVariety => {
            items.insert("Triangles");
        }
        PuzzleRandomization::None | PuzzleRandomization::SigmaNormal => {}
    }

    let mut out: HashSet<String> = items.iter().map(|s| s.to_string()).collect();
    for item in items {
        out.insert(static_items.get_parent_progressive_item(item));
    }
    out
}

impl WitnessPlayerItems {
    pub fn new(
        options: &WitnessOptions,
        static_items: StaticItems,
        logic: &dyn WitnessLogic,
        locations: &WitnessPlayerLocations,
    ) -> Result<Self> {
        for name in options.trap_weights.keys() {
            let category = static_items
                .item_data
                .get(name)
                .map(|data| data.definition.category);
            ensure!(
                category == Some(ItemCategory::Trap),
                "trap_weights: {name:?} is not a trap item"
            );
        }

        // Remove all progression items that aren't actually in the game.
        let mut item_data: IndexMap<String, ItemData> = static_items
            .item_data
            .iter()
            .filter(|(name, data)| {
                !data.classification.is_progression()
                    || logic.progression_items_in_game().contains(name.as_str())
            })
            .map(|(name, data)| (name.clone(), data.clone()))
            .collect();

        for (name, data) in item_data.iter_mut() {
            let DefinitionKind::Door { panel_id_hexes, .. } = &data.definition.kind else {
                continue;
            };
            if panel_id_hexes
                .iter()
                .all(|&hex| !logic.solvability_guaranteed(hex))
            {
                debug!("Downgrading {name:?}: none of its panels can be solved");
                data.classification = ItemClassification::USEFUL;
            }
            if data.definition.category == ItemCategory::Laser
                && options.shuffle_lasers == ShuffleLasers::Local
            {
                data.local_only = true;
            }
        }

        let mut mandatory_items: IndexMap<String, usize> = IndexMap::new();
        for (name, data) in &item_data {
            if !data.classification.is_progression() {
                continue;
            }
            let count = match &data.definition.kind {
                DefinitionKind::Progressive { .. } => logic
                    .progressive_lists()
                    .get(name)
                    .map(|stages| stages.len())
                    .unwrap_or(0),
                _ => 1,
            };
            if count > 0 {
                mandatory_items.insert(name.clone(), count);
            }
        }

        // Option-dependent useful items.
        for (name, data) in &item_data {
            if data.classification != ItemClassification::USEFUL
                || static_items.special_usefuls.contains(name)
            {
                continue;
            }
            let count = if name == "Energy Capacity" {
                NUM_ENERGY_UPGRADES
            } else if let DefinitionKind::Progressive { child_item_names } =
                &data.definition.kind
            {
                child_item_names.len()
            } else {
                1
            };
            mandatory_items.insert(name.clone(), count);
        }

        for event_location in &locations.event_locations {
            if let Some((item_name, _)) = logic.event_item_pairs().get(event_location) {
                item_data.insert(
                    item_name.clone(),
                    ItemData {
                        ap_code: None,
                        definition: ItemDefinition::event(),
                        classification: ItemClassification::PROGRESSION,
                        local_only: false,
                    },
                );
            }
        }

        let proguseful_items = proguseful_allow_list(options, &static_items);
        for (name, data) in item_data.iter_mut() {
            // Items downgraded above stay useful-only.
            if proguseful_items.contains(name) && data.classification.is_progression() {
                data.classification |= ItemClassification::USEFUL;
            }
        }

        Ok(WitnessPlayerItems {
            options: options.clone(),
            static_items,
            item_data,
            mandatory_items,
            proguseful_items,
        })
    }

    /// Items that must be in the pool for the game to successfully generate.
    pub fn get_mandatory_items(&self) -> IndexMap<String, usize> {
        self.mandatory_items.clone()
    }

    /// Filler and trap items for exactly `quantity` slots.
    pub fn get_filler_items(&self, quantity: usize) -> Result<IndexMap<String, usize>> {
        let mut output: IndexMap<String, usize> = IndexMap::new();
        if quantity == 0 {
            return Ok(output);
        }

        for (name, data) in &self.item_data {
            if data.definition.category == ItemCategory::Joke && output.len() < quantity {
                output.insert(name.clone(), 1);
            }
        }
        let remaining_quantity = quantity - output.len();

        // Weights are user-supplied u32s, so their sum may not fit in one.
        let trap_total: f64 = self.options.trap_weights.values().map(|&w| w as f64).sum();
        let trap_weight = if trap_total > 0.0 {
            self.options.trap_percentage.value() as f64 / 100.0
        } else {
            0.0
        };
        let filler_weight = 1.0 - trap_weight;

        let base_filler: Vec<(&str, f64)> = self
            .item_data
            .iter()
            .filter(|(_, data)| data.definition.category == ItemCategory::Filler)
            .map(|(name, data)| {
                let weight = match data.definition.kind {
                    DefinitionKind::Weighted { weight } => weight as f64,
                    _ => 1.0,
                };
                (name.as_str(), weight)
            })
            .collect();
        let filler_total: f64 = base_filler.iter().map(|(_, w)| w).sum();

        let mut weights: IndexMap<&str, f64> = IndexMap::new();
        if filler_total > 0.0 {
            for &(name, w) in &base_filler {
                weights.insert(name, w * filler_weight / filler_total);
            }
        }
        if trap_weight > 0.0 {
            for (name, &w) in &self.options.trap_weights {
                weights.insert(name.as_str(), w as f64 * trap_weight / trap_total);
            }
        }
        weights.retain(|_, w| *w > 0.0);

        ensure!(
            remaining_quantity == 0 || !weights.is_empty(),
            "no filler or trap item has positive weight, cannot fill {remaining_quantity} slots"
        );
        let weight_list: Vec<f64> = weights.values().copied().collect();
        let counts = build_weighted_int_list(&weight_list, remaining_quantity);
        for (&name, count) in weights.keys().zip(counts) {
            if count > 0 {
                *output.entry(name.to_string()).or_insert(0) += count;
            }
        }
        Ok(output)
    }

    /// Items that are ideal for extremely early checks, like the tutorial gate.
    pub fn get_early_items(&self) -> Vec<String> {
        let mut output: HashSet<&str> = HashSet::new();
        if self.options.shuffle_symbols {
            let mode = self.options.puzzle_randomization;
            output.extend(self.static_items.always_good_symbols.iter().map(|s| s.as_str()));
            if let Some(items) = self.static_items.mode_good_items.get(&mode) {
                output.extend(items.iter().map(|s| s.as_str()));
            }
            if self.options.shuffle_discarded_panels {
                if let Some(items) = self.static_items.mode_good_discard_items.get(&mode) {
                    output.extend(items.iter().map(|s| s.as_str()));
                }
            }
        }

        // Anything a plando block may take from the pool is no longer free to place early.
        for block in &self.options.plando_items {
            if block.from_pool {
                for name in block.named_items() {
                    output.remove(name);
                }
            }
        }

        let mut output: Vec<String> = output.into_iter().map(|s| s.to_string()).collect();
        output.sort();
        output
    }

    pub fn get_door_item_ids_in_pool(&self) -> Vec<ItemId> {
        self.item_data
            .values()
            .filter(|data| matches!(data.definition.kind, DefinitionKind::Door { .. }))
            .filter_map(|data| data.ap_code)
            .collect()
    }

    /// Symbol items defined for the game that this player's pool does not contain.
    pub fn get_symbol_ids_not_in_pool(&self) -> Vec<ItemId> {
        self.static_items
            .items_in_category(ItemCategory::Symbol)
            .filter(|(name, _)| !self.item_data.contains_key(*name))
            .filter_map(|(_, data)| data.ap_code)
            .collect()
    }

    pub fn get_progressive_item_ids_in_pool(&self) -> IndexMap<ItemId, Vec<ItemId>> {
        let mut output: IndexMap<ItemId, Vec<ItemId>> = IndexMap::new();
        for name in self.mandatory_items.keys() {
            let Some(data) = self.item_data.get(name) else {
                continue;
            };
            let (Some(code), DefinitionKind::Progressive { child_item_names }) =
                (data.ap_code, &data.definition.kind)
            else {
                continue;
            };
            // Stages were pruned from the player table, so look them up in the static one.
            let children: Vec<ItemId> = child_item_names
                .iter()
                .filter_map(|child| self.static_items.item_name_to_id.get(child))
                .collect();
            output.insert(code, children);
        }
        output
    }

    pub fn item_data(&self, name: &str) -> Option<&ItemData> {
        self.item_data.get(name)
    }

    pub fn static_items(&self) -> &StaticItems {
        &self.static_items
    }

    pub fn local_only_items(&self) -> Vec<String> {
        self.item_data
            .iter()
            .filter(|(_, data)| data.local_only)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn is_proguseful(&self, name: &str) -> bool {
        self.proguseful_items.contains(name)
    }
}

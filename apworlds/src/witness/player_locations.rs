use apworlds_game::LocationId;
use indexmap::IndexMap;

use super::options::{ShuffleEps, WitnessOptions};
use super::player_logic::WitnessLogic;
use super::static_locations::{LocationKind, StaticLocations};

/// Checks and event locations present in one player's world.
#[derive(Clone, Debug)]
pub struct WitnessPlayerLocations {
    pub check_locations: IndexMap<String, LocationId>,
    pub event_locations: Vec<String>,
}

impl WitnessPlayerLocations {
    pub fn new(
        options: &WitnessOptions,
        static_locations: &StaticLocations,
        logic: &dyn WitnessLogic,
    ) -> Self {
        let check_locations = static_locations
            .locations
            .iter()
            .filter(|l| match l.kind {
                LocationKind::Panel => true,
                LocationKind::Discard => options.shuffle_discarded_panels,
                LocationKind::Ep => options.shuffle_eps == ShuffleEps::Individual,
                LocationKind::ObeliskSide => options.shuffle_eps == ShuffleEps::ObeliskSides,
            })
            .filter(|l| logic.solvability_guaranteed(l.hex))
            .map(|l| (l.name.clone(), l.code))
            .collect();
        let event_locations = logic.event_item_pairs().keys().cloned().collect();
        WitnessPlayerLocations {
            check_locations,
            event_locations,
        }
    }

    pub fn check_count(&self) -> usize {
        self.check_locations.len()
    }
}

use apworlds_game::options::{Range, RangeSpec};
use serde::{Deserialize, Serialize};

/// Amount of items to give to each of the maps.
pub struct ItemsPerStage;

impl RangeSpec for ItemsPerStage {
    const DISPLAY_NAME: &'static str = "Item Amount";
    const RANGE_START: i64 = 5;
    const RANGE_END: i64 = 100;
    const DEFAULT: i64 = 20;
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct MtdOptions {
    pub items_per_stage: Range<ItemsPerStage>,
}

impl MtdOptions {
    pub fn items_per_stage(&self) -> usize {
        self.items_per_stage.value() as usize
    }
}

use anyhow::Result;
use apworlds_game::{IdTable, LocationId};
use num_enum::TryFromPrimitive;
use strum::VariantNames;
use strum_macros::{EnumString, IntoStaticStr, VariantNames};

use super::options::MtdOptions;
use super::START_ID;

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    IntoStaticStr,
    VariantNames,
    TryFromPrimitive,
)]
#[repr(usize)]
pub enum Stage {
    Forest,
    Temple,
    #[strum(serialize = "Pumpkin Patch")]
    PumpkinPatch,
}

impl Stage {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn all() -> Result<Vec<Stage>> {
        (0..Stage::VARIANTS.len())
            .map(|i| Ok(Stage::try_from(i)?))
            .collect()
    }

    /// Id of the `local_index`-th location (counting from 0) of this stage.
    pub fn location_id(self, items_per_stage: usize, local_index: usize) -> LocationId {
        START_ID + (self as usize * items_per_stage + local_index) as LocationId
    }
}

/// Builds the location table for one player; ids depend on `items_per_stage`.
pub fn create_location_table(options: &MtdOptions) -> Result<IdTable> {
    let amount = options.items_per_stage();
    let mut table = IdTable::default();
    for stage in Stage::all()? {
        for i in 0..amount {
            table.insert(
                format!("{} {}", stage.name(), i + 1),
                stage.location_id(amount, i),
            )?;
        }
    }
    Ok(table)
}

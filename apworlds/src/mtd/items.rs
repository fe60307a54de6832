use anyhow::Result;
use apworlds_game::{IdTable, ItemClassification, ItemId};
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use strum::VariantNames;
use strum_macros::{EnumString, IntoStaticStr, VariantNames};

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
    Serialize,
    Deserialize,
)]
#[repr(usize)]
// The order sets the item ids.
pub enum MtdItem {
    Experience, // 0
    #[strum(serialize = "Time Trap")]
    #[serde(rename = "Time Trap")]
    TimeTrap, // 1
    Powerup,    // 2
}

impl MtdItem {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn code(self) -> ItemId {
        START_ID + self as ItemId
    }

    pub fn classification(self) -> ItemClassification {
        match self {
            MtdItem::Experience => ItemClassification::PROGRESSION,
            MtdItem::TimeTrap => ItemClassification::TRAP,
            MtdItem::Powerup => ItemClassification::USEFUL,
        }
    }

    /// Item placed in pool slot `i`: the pool repeats a six-slot pattern of
    /// two Experience, one Time Trap and three Powerups.
    pub fn for_slot(i: usize) -> Self {
        match i % 6 {
            0 | 2 => MtdItem::Experience,
            1 => MtdItem::TimeTrap,
            _ => MtdItem::Powerup,
        }
    }
}

pub fn create_item_table() -> Result<IdTable> {
    let mut table = IdTable::default();
    for i in 0..MtdItem::VARIANTS.len() {
        let item = MtdItem::try_from(i)?;
        table.insert(item.name(), item.code())?;
    }
    Ok(table)
}

pub fn create_item_pool(total: usize) -> Vec<MtdItem> {
    (0..total).map(MtdItem::for_slot).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_item_table() {
        let table = create_item_table().unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("Experience"), Some(1_200_000));
        assert_eq!(table.get("Time Trap"), Some(1_200_001));
        assert_eq!(table.get("Powerup"), Some(1_200_002));
        assert_eq!(MtdItem::from_str("Time Trap").unwrap(), MtdItem::TimeTrap);
    }

    #[test]
    fn test_pool_pattern() {
        let pool = create_item_pool(15);
        use MtdItem::*;
        assert_eq!(
            pool,
            vec![
                Experience, TimeTrap, Experience, Powerup, Powerup, Powerup, Experience,
                TimeTrap, Experience, Powerup, Powerup, Powerup, Experience, TimeTrap,
                Experience
            ]
        );
    }
}

use apworlds_game::options::{Range, RangeSpec};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum_macros::{EnumString, IntoStaticStr, VariantNames};

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    IntoStaticStr,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShuffleDoors {
    Off,
    Panels,
    DoorsSimple,
    DoorsComplex,
    DoorsMax,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    IntoStaticStr,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShuffleLasers {
    Off,
    Local,
    Anywhere,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    IntoStaticStr,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShuffleEps {
    Off,
    Individual,
    ObeliskSides,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    IntoStaticStr,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PuzzleRandomization {
    None,
    SigmaNormal,
    SigmaExpert,
    UmbraVariety,
}

impl PuzzleRandomization {
    pub fn current_key(self) -> &'static str {
        self.into()
    }
}

pub struct PuzzleSkipAmount;

impl RangeSpec for PuzzleSkipAmount {
    const DISPLAY_NAME: &'static str = "Puzzle Skips";
    const RANGE_START: i64 = 0;
    const RANGE_END: i64 = 30;
    const DEFAULT: i64 = 10;
}

pub struct TrapPercentage;

impl RangeSpec for TrapPercentage {
    const DISPLAY_NAME: &'static str = "Trap Percentage";
    const RANGE_START: i64 = 0;
    const RANGE_END: i64 = 100;
    const DEFAULT: i64 = 20;
}

/// Item names of a plando block: either a weighted map, or a list of names and weighted maps.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum PlandoItems {
    Weighted(IndexMap<String, u32>),
    List(Vec<PlandoEntry>),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum PlandoEntry {
    Name(String),
    Weighted(IndexMap<String, u32>),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlandoBlock {
    pub items: PlandoItems,
    #[serde(default = "default_from_pool")]
    pub from_pool: bool,
}

fn default_from_pool() -> bool {
    true
}

impl PlandoBlock {
    /// Every item this block may place (entries with zero weight excluded).
    pub fn named_items(&self) -> Vec<&str> {
        fn weighted(map: &IndexMap<String, u32>) -> impl Iterator<Item = &str> {
            map.iter()
                .filter(|(_, w)| **w > 0)
                .map(|(name, _)| name.as_str())
        }
        match &self.items {
            PlandoItems::Weighted(map) => weighted(map).collect(),
            PlandoItems::List(entries) => entries
                .iter()
                .flat_map(|entry| -> Vec<&str> {
                    match entry {
                        PlandoEntry::Name(name) => vec![name.as_str()],
                        PlandoEntry::Weighted(map) => weighted(map).collect(),
                    }
                })
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WitnessOptions {
    pub shuffle_symbols: bool,
    pub progressive_symbols: bool,
    pub shuffle_doors: ShuffleDoors,
    pub shuffle_boat: bool,
    pub shuffle_lasers: ShuffleLasers,
    pub shuffle_eps: ShuffleEps,
    pub shuffle_discarded_panels: bool,
    pub puzzle_randomization: PuzzleRandomization,
    pub disable_non_randomized_puzzles: bool,
    pub puzzle_skip_amount: Range<PuzzleSkipAmount>,
    pub trap_percentage: Range<TrapPercentage>,
    pub trap_weights: IndexMap<String, u32>,
    pub plando_items: Vec<PlandoBlock>,
}

impl Default for WitnessOptions {
    fn default() -> Self {
        WitnessOptions {
            shuffle_symbols: true,
            progressive_symbols: true,
            shuffle_doors: ShuffleDoors::Off,
            shuffle_boat: true,
            shuffle_lasers: ShuffleLasers::Off,
            shuffle_eps: ShuffleEps::Off,
            shuffle_discarded_panels: false,
            puzzle_randomization: PuzzleRandomization::SigmaNormal,
            disable_non_randomized_puzzles: false,
            puzzle_skip_amount: Range::default(),
            trap_percentage: Range::default(),
            trap_weights: [("Slowness", 8), ("Power Surge", 2), ("Bonk", 1)]
                .into_iter()
                .map(|(name, w)| (name.to_string(), w))
                .collect(),
            plando_items: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let options: WitnessOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, WitnessOptions::default());
        assert_eq!(options.trap_percentage.value(), 20);
        assert_eq!(options.puzzle_randomization.current_key(), "sigma_normal");
    }

    #[test]
    fn test_plando_named_items() {
        let json = r#"[
            {"items": {"Dots": 1, "Stars": 0}},
            {"items": ["Shapers", {"Symmetry": 2, "Eraser": 0}], "from_pool": false}
        ]"#;
        let blocks: Vec<PlandoBlock> = serde_json::from_str(json).unwrap();
        assert!(blocks[0].from_pool);
        assert_eq!(blocks[0].named_items(), vec!["Dots"]);
        assert!(!blocks[1].from_pool);
        assert_eq!(blocks[1].named_items(), vec!["Shapers", "Symmetry"]);
    }
}

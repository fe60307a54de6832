use anyhow::{bail, ensure, Context, Result};
use apworlds_game::{IdTable, ItemClassification, ItemId};
use hashbrown::HashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::options::PuzzleRandomization;
use super::{parse_hex, EntityHex, ID_OFFSET};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Symbol,
    Door,
    Laser,
    Useful,
    Filler,
    Trap,
    Joke,
    Event,
}

impl ItemCategory {
    pub fn base_classification(self) -> ItemClassification {
        match self {
            ItemCategory::Symbol
            | ItemCategory::Door
            | ItemCategory::Laser
            | ItemCategory::Event => ItemClassification::PROGRESSION,
            ItemCategory::Useful => ItemClassification::USEFUL,
            ItemCategory::Trap => ItemClassification::TRAP,
            ItemCategory::Filler | ItemCategory::Joke => ItemClassification::FILLER,
        }
    }
}

/// Option groups under which door-like items get shuffled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorGroup {
    Panels,
    Doors,
    Regional,
    Boat,
    Lasers,
    Obelisks,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DefinitionKind {
    Plain,
    Progressive { child_item_names: Vec<String> },
    Door { group: DoorGroup, panel_id_hexes: Vec<EntityHex> },
    Weighted { weight: u32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemDefinition {
    pub local_code: u32,
    pub category: ItemCategory,
    pub kind: DefinitionKind,
    pub modes: Vec<PuzzleRandomization>, // empty: present in every puzzle mode
}

impl ItemDefinition {
    pub fn event() -> Self {
        ItemDefinition {
            local_code: 0,
            category: ItemCategory::Event,
            kind: DefinitionKind::Plain,
            modes: vec![],
        }
    }

    pub fn available_in(&self, mode: PuzzleRandomization) -> bool {
        self.modes.is_empty() || self.modes.contains(&mode)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemData {
    pub ap_code: Option<ItemId>,
    pub definition: ItemDefinition,
    pub classification: ItemClassification,
    pub local_only: bool,
}

#[derive(Deserialize)]
struct RawItem {
    name: String,
    code: u32,
    category: ItemCategory,
    #[serde(default)]
    modes: Vec<PuzzleRandomization>,
    progressive: Option<Vec<String>>,
    door_group: Option<DoorGroup>,
    #[serde(default)]
    panels: Vec<String>,
    weight: Option<u32>,
}

#[derive(Deserialize)]
struct RawStaticItems {
    items: Vec<RawItem>,
    #[serde(default)]
    special_usefuls: Vec<String>,
    #[serde(default)]
    always_good_symbols: Vec<String>,
    #[serde(default)]
    mode_good_items: HashMap<PuzzleRandomization, Vec<String>>,
    #[serde(default)]
    mode_good_discard_items: HashMap<PuzzleRandomization, Vec<String>>,
}

/// The game-wide item table, identical for every player.
#[derive(Clone, Debug)]
pub struct StaticItems {
    pub item_data: IndexMap<String, ItemData>,
    pub item_name_to_id: IdTable,
    pub special_usefuls: Vec<String>,
    pub always_good_symbols: Vec<String>,
    pub mode_good_items: HashMap<PuzzleRandomization, Vec<String>>,
    pub mode_good_discard_items: HashMap<PuzzleRandomization, Vec<String>>,
    parent_by_child: HashMap<String, String>,
}

fn parse_definition(raw: RawItem) -> Result<(String, ItemDefinition)> {
    let kind = match (raw.progressive, raw.door_group, raw.weight) {
        (None, None, None) => DefinitionKind::Plain,
        (Some(child_item_names), None, None) => {
            ensure!(!child_item_names.is_empty(), "progressive item has no stages");
            DefinitionKind::Progressive { child_item_names }
        }
        (None, Some(group), None) => {
            ensure!(!raw.panels.is_empty(), "door item has no panels");
            let panel_id_hexes = raw
                .panels
                .iter()
                .map(|h| parse_hex(h))
                .collect::<Result<Vec<EntityHex>>>()?;
            DefinitionKind::Door {
                group,
                panel_id_hexes,
            }
        }
        (None, None, Some(weight)) => DefinitionKind::Weighted { weight },
        _ => bail!("item has more than one of progressive, door_group, weight"),
    };
    if matches!(kind, DefinitionKind::Door { .. }) {
        ensure!(
            matches!(raw.category, ItemCategory::Door | ItemCategory::Laser),
            "door definition in category {:?}",
            raw.category
        );
    }
    Ok((
        raw.name,
        ItemDefinition {
            local_code: raw.code,
            category: raw.category,
            kind,
            modes: raw.modes,
        },
    ))
}

impl StaticItems {
    pub fn load() -> Result<Self> {
        Self::from_json(include_str!("../../data/witness/items.json"))
            .context("unable to load Witness item data")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut des = serde_json::Deserializer::from_str(json);
        let raw: RawStaticItems = serde_path_to_error::deserialize(&mut des)?;

        let mut item_data: IndexMap<String, ItemData> = IndexMap::new();
        let mut item_name_to_id = IdTable::default();
        for raw_item in raw.items {
            let name = raw_item.name.clone();
            let (name, definition) =
                parse_definition(raw_item).with_context(|| format!("invalid item {name:?}"))?;
            let ap_code = ID_OFFSET + definition.local_code as ItemId;
            item_name_to_id.insert(name.clone(), ap_code)?;
            item_data.insert(
                name,
                ItemData {
                    ap_code: Some(ap_code),
                    classification: definition.category.base_classification(),
                    definition,
                    local_only: false,
                },
            );
        }

        let mut parent_by_child: HashMap<String, String> = HashMap::new();
        for (name, data) in &item_data {
            if let DefinitionKind::Progressive { child_item_names } = &data.definition.kind {
                for child in child_item_names {
                    ensure!(
                        item_data.contains_key(child),
                        "progressive item {name:?} refers to unknown item {child:?}"
                    );
                    if let Some(other) = parent_by_child.insert(child.clone(), name.clone()) {
                        bail!("item {child:?} belongs to both {other:?} and {name:?}");
                    }
                }
            }
        }

        let out = StaticItems {
            item_data,
            item_name_to_id,
            special_usefuls: raw.special_usefuls,
            always_good_symbols: raw.always_good_symbols,
            mode_good_items: raw.mode_good_items,
            mode_good_discard_items: raw.mode_good_discard_items,
            parent_by_child,
        };
        for name in out
            .special_usefuls
            .iter()
            .chain(out.always_good_symbols.iter())
            .chain(out.mode_good_items.values().flatten())
            .chain(out.mode_good_discard_items.values().flatten())
        {
            ensure!(
                out.item_data.contains_key(name),
                "item list refers to unknown item {name:?}"
            );
        }
        Ok(out)
    }

    /// The progressive item that a stage belongs to, or the item itself.
    pub fn get_parent_progressive_item(&self, item_name: &str) -> String {
        self.parent_by_child
            .get(item_name)
            .cloned()
            .unwrap_or_else(|| item_name.to_string())
    }

    pub fn items_in_category(
        &self,
        category: ItemCategory,
    ) -> impl Iterator<Item = (&str, &ItemData)> {
        self.item_data
            .iter()
            .filter(move |(_, data)| data.definition.category == category)
            .map(|(name, data)| (name.as_str(), data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_static_items() {
        let items = StaticItems::load().unwrap();
        let dots = &items.item_data["Dots"];
        assert_eq!(dots.ap_code, Some(158_000));
        assert_eq!(dots.classification, ItemClassification::PROGRESSION);
        assert_eq!(
            items.get_parent_progressive_item("Full Dots"),
            "Progressive Dots"
        );
        assert_eq!(items.get_parent_progressive_item("Eraser"), "Eraser");
        assert_eq!(
            items.item_data["Bonk"].classification,
            ItemClassification::TRAP
        );
        assert!(matches!(
            items.item_data["Symmetry Laser"].definition.kind,
            DefinitionKind::Door {
                group: DoorGroup::Lasers,
                ..
            }
        ));
        assert_eq!(items.items_in_category(ItemCategory::Joke).count(), 1);
    }

    #[test]
    fn test_conflicting_definition_rejected() {
        let json = r#"{"items": [
            {"name": "Odd", "code": 1, "category": "Filler", "weight": 2, "progressive": ["X"]}
        ]}"#;
        let err = StaticItems::from_json(json).unwrap_err();
        assert!(format!("{err:#}").contains("Odd"));
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let json = r#"{"items": [
            {"name": "A", "code": 1, "category": "Filler"},
            {"name": "B", "code": 1, "category": "Filler"}
        ]}"#;
        assert!(StaticItems::from_json(json).is_err());
    }
}

pub mod options;
pub mod util;

use anyhow::{bail, ensure, Result};
use bitflags::bitflags;
use hashbrown::{HashMap, HashSet};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::{self, Display, Formatter};

pub type PlayerId = usize; // Slot number assigned by the host, starting from 1
pub type ItemId = i64; // Stable numeric id of an item, unique within a game
pub type LocationId = i64; // Stable numeric id of a location, unique within a game

pub const MENU_REGION: &str = "Menu";

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ItemClassification: u8 {
        const PROGRESSION = 0b001;
        const USEFUL = 0b010;
        const TRAP = 0b100;
    }
}

impl ItemClassification {
    /// Filler is the absence of every other flag.
    pub const FILLER: Self = Self::empty();

    pub fn is_filler(self) -> bool {
        self.is_empty()
    }

    pub fn is_progression(self) -> bool {
        self.contains(Self::PROGRESSION)
    }
}

impl Default for ItemClassification {
    fn default() -> Self {
        Self::FILLER
    }
}

impl Display for ItemClassification {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_filler() {
            return write!(f, "filler");
        }
        let mut parts: Vec<&str> = vec![];
        if self.contains(Self::PROGRESSION) {
            parts.push("progression");
        }
        if self.contains(Self::USEFUL) {
            parts.push("useful");
        }
        if self.contains(Self::TRAP) {
            parts.push("trap");
        }
        write!(f, "{}", parts.join("+"))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub code: Option<ItemId>, // None for event items
    pub classification: ItemClassification,
    pub player: PlayerId,
}

impl Item {
    pub fn is_event(&self) -> bool {
        self.code.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub code: Option<LocationId>, // None for event locations
    pub player: PlayerId,
}

impl Location {
    pub fn is_event(&self) -> bool {
        self.code.is_none()
    }
}

/// Ordered, injective mapping from names to ids.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IdTable {
    ids_by_name: IndexMap<String, i64>,
    #[serde(skip)]
    names_by_id: HashMap<i64, String>,
}

impl IdTable {
    pub fn insert<S: Into<String>>(&mut self, name: S, id: i64) -> Result<()> {
        let name = name.into();
        ensure!(
            !self.ids_by_name.contains_key(&name),
            "duplicate name {name:?} (id {id})"
        );
        if let Some(other) = self.names_by_id.get(&id) {
            bail!("id {id} assigned to both {other:?} and {name:?}");
        }
        self.names_by_id.insert(id, name.clone());
        self.ids_by_name.insert(name, id);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.ids_by_name.get(name).copied()
    }

    pub fn name_of(&self, id: i64) -> Option<&str> {
        self.names_by_id.get(&id).map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.ids_by_name.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.ids_by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids_by_name.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Region {
    pub name: String,
    pub player: PlayerId,
    pub locations: Vec<Location>,
    pub exits: Vec<String>,
}

/// Regions of one player-world, rooted at the "Menu" region.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegionGraph {
    pub player: PlayerId,
    regions: IndexMap<String, Region>,
}

impl RegionGraph {
    pub fn new(player: PlayerId) -> Self {
        RegionGraph {
            player,
            regions: IndexMap::new(),
        }
    }

    pub fn add_region<S: AsRef<str>>(&mut self, name: &str, exits: &[S]) -> Result<()> {
        ensure!(
            !self.regions.contains_key(name),
            "region {name:?} declared twice"
        );
        self.regions.insert(
            name.to_string(),
            Region {
                name: name.to_string(),
                player: self.player,
                locations: vec![],
                exits: exits.iter().map(|x| x.as_ref().to_string()).collect(),
            },
        );
        Ok(())
    }

    /// Attaches each location to the region whose name, followed by a space, is the
    /// longest prefix of the location name. Locations with no such region are returned.
    pub fn attach_by_prefix<I: IntoIterator<Item = Location>>(
        &mut self,
        locations: I,
    ) -> Vec<Location> {
        let mut unattached = vec![];
        for loc in locations {
            let owner = self
                .regions
                .keys()
                .filter(|r| {
                    loc.name.len() > r.len()
                        && loc.name.starts_with(r.as_str())
                        && loc.name.as_bytes()[r.len()] == b' '
                })
                .max_by_key(|r| r.len())
                .cloned();
            match owner {
                Some(r) => self.regions[&r].locations.push(loc),
                None => unattached.push(loc),
            }
        }
        unattached
    }

    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.get(name)
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.regions.values().flat_map(|r| r.locations.iter())
    }

    /// Number of locations that hold a real item (events excluded).
    pub fn location_count(&self) -> usize {
        self.locations().filter(|l| !l.is_event()).count()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.regions
            .values()
            .flat_map(|r| r.exits.iter().map(move |e| (r.name.as_str(), e.as_str())))
    }

    /// (source, target) pairs whose target region was never declared.
    pub fn unknown_exits(&self) -> Vec<(String, String)> {
        self.edges()
            .filter(|(_, to)| !self.regions.contains_key(*to))
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect()
    }

    /// Regions owning at least one location that cannot be reached from the menu
    /// by following exits.
    pub fn unreachable_regions(&self) -> Vec<String> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        if self.regions.contains_key(MENU_REGION) {
            visited.insert(MENU_REGION);
            queue.push_back(MENU_REGION);
        }
        while let Some(name) = queue.pop_front() {
            let Some(region) = self.regions.get(name) else {
                continue;
            };
            for exit in &region.exits {
                if self.regions.contains_key(exit.as_str()) && visited.insert(exit.as_str()) {
                    queue.push_back(exit.as_str());
                }
            }
        }
        self.regions
            .values()
            .filter(|r| !r.locations.is_empty() && !visited.contains(r.name.as_str()))
            .map(|r| r.name.clone())
            .collect()
    }
}

/// The interface a host uses to pull one player's tables out of a world plugin.
pub trait World {
    fn game(&self) -> &'static str;

    fn player(&self) -> PlayerId;

    fn item_name_to_id(&self) -> &IdTable;

    fn location_name_to_id(&self) -> &IdTable;

    fn create_item(&self, name: &str) -> Result<Item>;

    fn create_regions(&self) -> Result<RegionGraph>;

    fn create_items(&self) -> Result<Vec<Item>>;

    /// Items that must be placed in this player's own world.
    fn local_items(&self) -> Vec<String> {
        vec![]
    }

    /// Event items locked to their event locations, keyed by location name.
    fn event_placements(&self) -> Result<Vec<(String, Item)>> {
        Ok(vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(name: &str, code: i64) -> Location {
        Location {
            name: name.to_string(),
            code: Some(code),
            player: 1,
        }
    }

    #[test]
    fn test_classification_display() {
        let c = ItemClassification::PROGRESSION | ItemClassification::USEFUL;
        assert_eq!(c.to_string(), "progression+useful");
        assert_eq!(ItemClassification::FILLER.to_string(), "filler");
        assert!(ItemClassification::FILLER.is_filler());
        assert!(!ItemClassification::TRAP.is_filler());
        assert!(c.is_progression());
    }

    #[test]
    fn test_classification_serde() {
        let c = ItemClassification::PROGRESSION | ItemClassification::USEFUL;
        let s = serde_json::to_string(&c).unwrap();
        let back: ItemClassification = serde_json::from_str(&s).unwrap();
        assert_eq!(c, back);
    }

    #[test]
    fn test_id_table_rejects_duplicates() {
        let mut t = IdTable::default();
        t.insert("A", 1).unwrap();
        assert!(t.insert("A", 2).is_err());
        assert!(t.insert("B", 1).is_err());
        t.insert("B", 2).unwrap();
        assert_eq!(t.get("B"), Some(2));
        assert_eq!(t.name_of(1), Some("A"));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_attach_by_prefix_prefers_longest() {
        let mut g = RegionGraph::new(1);
        g.add_region("Menu", &["Town"]).unwrap();
        g.add_region("Town", &["Town Church"]).unwrap();
        g.add_region("Town Church", &[] as &[&str]).unwrap();
        let rest = g.attach_by_prefix(vec![
            loc("Town Church Lattice", 1),
            loc("Town Tall Hexagonal", 2),
            loc("Townhouse", 3),
        ]);
        assert_eq!(rest, vec![loc("Townhouse", 3)]);
        assert_eq!(g.region("Town").unwrap().locations.len(), 1);
        assert_eq!(g.region("Town Church").unwrap().locations.len(), 1);
        assert_eq!(g.location_count(), 2);
    }

    #[test]
    fn test_graph_checks() {
        let mut g = RegionGraph::new(1);
        g.add_region("Menu", &["A"]).unwrap();
        g.add_region("A", &["Nowhere"]).unwrap();
        g.add_region("B", &["A"]).unwrap();
        assert!(g.add_region("B", &["A"]).is_err());
        g.attach_by_prefix(vec![loc("A 1", 1), loc("B 1", 2)]);
        assert_eq!(
            g.unknown_exits(),
            vec![("A".to_string(), "Nowhere".to_string())]
        );
        assert_eq!(g.unreachable_regions(), vec!["B".to_string()]);
    }
}

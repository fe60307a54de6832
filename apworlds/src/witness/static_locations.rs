use anyhow::{ensure, Context, Result};
use apworlds_game::{IdTable, LocationId};
use hashbrown::HashMap;
use serde::Deserialize;

use super::{parse_hex, EntityHex, ID_OFFSET};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum LocationKind {
    Panel,
    Discard,
    Ep,
    ObeliskSide,
}

#[derive(Clone, Debug)]
pub struct LocationData {
    pub name: String,
    pub code: LocationId,
    pub hex: EntityHex,
    pub kind: LocationKind,
    pub randomized: bool, // false for puzzles that puzzle randomization leaves untouched
}

#[derive(Clone, Debug)]
pub struct EventData {
    pub name: String,
    pub item: String,
    pub hex: EntityHex,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AreaData {
    pub name: String,
    pub exits: Vec<String>,
}

#[derive(Deserialize)]
struct RawLocation {
    name: String,
    code: u32,
    hex: String,
    kind: LocationKind,
    #[serde(default = "default_randomized")]
    randomized: bool,
}

fn default_randomized() -> bool {
    true
}

#[derive(Deserialize)]
struct RawEvent {
    name: String,
    item: String,
    hex: String,
}

#[derive(Deserialize)]
struct RawStaticLocations {
    areas: Vec<AreaData>,
    locations: Vec<RawLocation>,
    #[serde(default)]
    events: Vec<RawEvent>,
}

/// Areas, checks and events of the game, identical for every player.
#[derive(Clone, Debug)]
pub struct StaticLocations {
    pub areas: Vec<AreaData>,
    pub locations: Vec<LocationData>,
    pub events: Vec<EventData>,
    pub location_name_to_id: IdTable,
    index_by_hex: HashMap<EntityHex, usize>,
}

impl StaticLocations {
    pub fn load() -> Result<Self> {
        Self::from_json(include_str!("../../data/witness/locations.json"))
            .context("unable to load Witness location data")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut des = serde_json::Deserializer::from_str(json);
        let raw: RawStaticLocations = serde_path_to_error::deserialize(&mut des)?;

        let mut locations: Vec<LocationData> = vec![];
        let mut location_name_to_id = IdTable::default();
        let mut index_by_hex: HashMap<EntityHex, usize> = HashMap::new();
        for loc in raw.locations {
            let hex = parse_hex(&loc.hex).with_context(|| format!("location {:?}", loc.name))?;
            let code = ID_OFFSET + loc.code as LocationId;
            location_name_to_id.insert(loc.name.clone(), code)?;
            ensure!(
                index_by_hex.insert(hex, locations.len()).is_none(),
                "entity {hex:#07X} used by more than one location"
            );
            locations.push(LocationData {
                name: loc.name,
                code,
                hex,
                kind: loc.kind,
                randomized: loc.randomized,
            });
        }

        let events = raw
            .events
            .into_iter()
            .map(|e| -> Result<EventData> {
                Ok(EventData {
                    hex: parse_hex(&e.hex).with_context(|| format!("event {:?}", e.name))?,
                    name: e.name,
                    item: e.item,
                })
            })
            .collect::<Result<Vec<EventData>>>()?;

        Ok(StaticLocations {
            areas: raw.areas,
            locations,
            events,
            location_name_to_id,
            index_by_hex,
        })
    }

    pub fn location_by_hex(&self, hex: EntityHex) -> Option<&LocationData> {
        self.index_by_hex.get(&hex).map(|&i| &self.locations[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_static_locations() {
        let locs = StaticLocations::load().unwrap();
        assert_eq!(locs.areas[0].name, "Menu");
        let gate = locs.location_by_hex(0x01A54).unwrap();
        assert_eq!(gate.name, "Glass Factory Entry Panel");
        assert_eq!(gate.kind, LocationKind::Panel);
        assert!(gate.randomized);
        assert!(locs
            .locations
            .iter()
            .any(|l| l.kind == LocationKind::Panel && !l.randomized));
        assert_eq!(
            locs.location_name_to_id.get("Tutorial Front Left"),
            Some(158_000)
        );
        assert!(locs.events.iter().any(|e| e.item == "Victory"));
    }
}

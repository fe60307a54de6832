use anyhow::{bail, ensure, Context, Result};
use apworlds_game::{Item, ItemId, LocationId, PlayerId, RegionGraph, World};
use hashbrown::HashMap;
use indexmap::IndexMap;
use log::info;
use serde_derive::Serialize;

use crate::mtd::MtdWorld;
use crate::settings::{MultiWorldSettings, PlayerSettings};
use crate::witness::WitnessWorld;

struct PlayerSlot {
    name: String,
    world: Box<dyn World>,
}

/// Minimal host: owns one world per player and pulls their tables out in order.
#[derive(Default)]
pub struct MultiWorld {
    slots: Vec<PlayerSlot>,
}

#[derive(Serialize, Debug)]
pub struct PlayerGeneration {
    pub player: PlayerId,
    pub name: String,
    pub game: String,
    pub regions: RegionGraph,
    pub item_pool: Vec<Item>,
    pub item_counts: IndexMap<String, usize>,
    pub event_placements: Vec<(String, Item)>,
    pub local_items: Vec<String>,
}

#[derive(Serialize, Debug)]
pub struct Generation {
    pub players: Vec<PlayerGeneration>,
    #[serde(skip)]
    locations: HashMap<(PlayerId, LocationId), String>,
    #[serde(skip)]
    items: HashMap<(PlayerId, ItemId), String>,
}

impl Generation {
    pub fn location_name(&self, player: PlayerId, id: LocationId) -> Option<&str> {
        self.locations.get(&(player, id)).map(|s| s.as_str())
    }

    pub fn item_name(&self, player: PlayerId, id: ItemId) -> Option<&str> {
        self.items.get(&(player, id)).map(|s| s.as_str())
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }
}

impl MultiWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &MultiWorldSettings) -> Result<Self> {
        let mut multiworld = MultiWorld::new();
        for player in &settings.players {
            multiworld.add_player(player)?;
        }
        Ok(multiworld)
    }

    fn next_player_id(&self) -> PlayerId {
        self.slots.len() + 1
    }

    pub fn add_player(&mut self, settings: &PlayerSettings) -> Result<PlayerId> {
        let player = self.next_player_id();
        let world: Box<dyn World> = match settings {
            PlayerSettings::Mtd { options, .. } => {
                Box::new(MtdWorld::new(player, options.clone())?)
            }
            PlayerSettings::Witness { options, .. } => {
                Box::new(WitnessWorld::new(player, options.clone())?)
            }
        };
        self.add_world(settings.name(), world)
    }

    /// Registers an already constructed world; its player id must be the next free slot.
    pub fn add_world(&mut self, name: &str, world: Box<dyn World>) -> Result<PlayerId> {
        let player = self.next_player_id();
        ensure!(
            world.player() == player,
            "world for {name:?} was built for player {} but the next slot is {player}",
            world.player()
        );
        info!("Player {player}: {name} ({})", world.game());
        self.slots.push(PlayerSlot {
            name: name.to_string(),
            world,
        });
        Ok(player)
    }

    pub fn player_count(&self) -> usize {
        self.slots.len()
    }

    pub fn world(&self, player: PlayerId) -> Option<&dyn World> {
        self.slots
            .get(player.checked_sub(1)?)
            .map(|slot| slot.world.as_ref())
    }

    pub fn generate(&self) -> Result<Generation> {
        let mut generation = Generation {
            players: vec![],
            locations: HashMap::new(),
            items: HashMap::new(),
        };
        for (i, slot) in self.slots.iter().enumerate() {
            let player = i + 1;
            let player_generation = generate_player(player, slot, &mut generation)
                .with_context(|| format!("player {player} ({})", slot.name))?;
            generation.players.push(player_generation);
        }
        info!(
            "Generated {} players with {} locations",
            generation.players.len(),
            generation.location_count()
        );
        Ok(generation)
    }
}

fn generate_player(
    player: PlayerId,
    slot: &PlayerSlot,
    generation: &mut Generation,
) -> Result<PlayerGeneration> {
    let world = slot.world.as_ref();
    let game = world.game();

    let regions = world.create_regions()?;
    let unknown_exits = regions.unknown_exits();
    if !unknown_exits.is_empty() {
        bail!("exits to undeclared regions: {unknown_exits:?}");
    }
    let unreachable = regions.unreachable_regions();
    if !unreachable.is_empty() {
        bail!("regions unreachable from the menu: {unreachable:?}");
    }

    for loc in regions.locations() {
        ensure!(
            loc.player == player,
            "location {:?} has player {}",
            loc.name,
            loc.player
        );
        let Some(code) = loc.code else {
            continue;
        };
        ensure!(
            world.location_name_to_id().get(&loc.name) == Some(code),
            "location {:?} has id {code} outside the {game} location table",
            loc.name
        );
        generation.locations.insert((player, code), loc.name.clone());
    }

    let item_pool = world.create_items()?;
    let location_count = regions.location_count();
    ensure!(
        item_pool.len() == location_count,
        "{} items created for {location_count} locations",
        item_pool.len()
    );
    let mut item_counts: IndexMap<String, usize> = IndexMap::new();
    for item in &item_pool {
        ensure!(
            item.player == player,
            "item {:?} has player {}",
            item.name,
            item.player
        );
        let code = item
            .code
            .with_context(|| format!("event item {:?} in the item pool", item.name))?;
        ensure!(
            world.item_name_to_id().get(&item.name) == Some(code),
            "item {:?} has id {code} outside the {game} item table",
            item.name
        );
        generation.items.insert((player, code), item.name.clone());
        *item_counts.entry(item.name.clone()).or_insert(0) += 1;
    }

    let event_placements = world.event_placements()?;
    for (location, item) in &event_placements {
        let found = regions
            .locations()
            .any(|l| &l.name == location && l.is_event());
        ensure!(
            found,
            "event item {:?} placed at unknown event {location:?}",
            item.name
        );
    }

    info!(
        "Player {player}: {} regions, {location_count} locations, {} events",
        regions.regions().count(),
        event_placements.len()
    );
    Ok(PlayerGeneration {
        player,
        name: slot.name.clone(),
        game: game.to_string(),
        regions,
        item_pool,
        item_counts,
        event_placements,
        local_items: world.local_items(),
    })
}

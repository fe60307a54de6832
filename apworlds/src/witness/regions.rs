use anyhow::{ensure, Result};
use apworlds_game::{Location, PlayerId, RegionGraph};

use super::player_locations::WitnessPlayerLocations;
use super::static_locations::StaticLocations;

pub fn create_regions(
    player: PlayerId,
    static_locations: &StaticLocations,
    player_locations: &WitnessPlayerLocations,
) -> Result<RegionGraph> {
    let mut graph = RegionGraph::new(player);
    for area in &static_locations.areas {
        graph.add_region(&area.name, &area.exits)?;
    }

    let checks = player_locations
        .check_locations
        .iter()
        .map(|(name, &code)| Location {
            name: name.clone(),
            code: Some(code),
            player,
        });
    let events = player_locations.event_locations.iter().map(|name| Location {
        name: name.clone(),
        code: None,
        player,
    });
    let unattached = graph.attach_by_prefix(checks.chain(events));
    ensure!(
        unattached.is_empty(),
        "locations outside every area: {:?}",
        unattached.iter().map(|l| l.name.as_str()).collect::<Vec<_>>()
    );
    Ok(graph)
}

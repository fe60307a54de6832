use anyhow::{ensure, Result};
use apworlds_game::{IdTable, Location, PlayerId, RegionGraph};

const REGION_TABLE: [(&str, &[&str]); 4] = [
    ("Menu", &["Forest"]),
    ("Forest", &["Temple"]),
    ("Temple", &["Pumpkin Patch"]),
    ("Pumpkin Patch", &[]),
];

pub fn create_regions(player: PlayerId, location_table: &IdTable) -> Result<RegionGraph> {
    let mut graph = RegionGraph::new(player);
    for (name, exits) in REGION_TABLE {
        graph.add_region(name, exits)?;
    }
    let locations = location_table.iter().map(|(name, code)| Location {
        name: name.to_string(),
        code: Some(code),
        player,
    });
    let unattached = graph.attach_by_prefix(locations);
    ensure!(
        unattached.is_empty(),
        "{} locations outside every stage",
        unattached.len()
    );
    Ok(graph)
}

//! Extracts a road network from a mask and paves every line.
//!
//! Usage:
//! ```text
//! cargo run --example network
//! RUST_LOG=roadweave=debug cargo run --example network
//! ```

use std::collections::HashMap;

use roadweave::math::{Point3, Voxel};
use roadweave::operations::{
    BuildRoad, ExtractNetwork, ExtractParams, MaterialSlot, RenderOverlay, RoadParams,
    SurfaceStyle, ThicknessMode,
};
use roadweave::raster::Raster;
use roadweave::RoadweaveError;

const MASK: &str = "\
..........###.....................
..........###.....................
..........###.....................
..........###.....................
..........###.....................
##################################
##################################
##################################
..........###..............###....
..........###..............###....
..........###..............###....
..........###..............###....
..........#####################...
..........#####################...
..........#####################...
..........###.....................
..........###.....................
";

/// Terrain height under a planar position.
fn terrain(x: f64, z: f64) -> f64 {
    64.0 + (x / 6.0).floor() + (z / 8.0).floor()
}

fn main() -> Result<(), RoadweaveError> {
    // Default: WARN for everything, INFO for roadweave.
    // Override with RUST_LOG env var (e.g. RUST_LOG=roadweave=trace).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("network=info".parse().unwrap_or_default())
        .add_directive("roadweave=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mask = Raster::from_ascii(MASK)?;
    let extraction = ExtractNetwork::new(&mask, ExtractParams::default()).execute()?;
    let network = &extraction.network;
    println!(
        "{} skeleton pixels, {} lines, {} intersections",
        extraction.skeleton.count(),
        network.line_count(),
        network.intersection_count()
    );

    let params = RoadParams::new(SurfaceStyle::new(3.0, ThicknessMode::Middle)?);
    let mut world: HashMap<Voxel, MaterialSlot> = HashMap::new();
    for (id, line) in network.lines() {
        let waypoints: Vec<Point3> = network
            .waypoints(id)?
            .into_iter()
            .map(|p| Point3::new(p.x, terrain(p.x, p.z), p.z))
            .collect();
        if waypoints.len() < 2 {
            println!("  skipping single-pixel line {id:?}");
            continue;
        }
        let road = BuildRoad::new(waypoints, params).execute()?;
        println!(
            "  line of {:>3} pixels -> {} waypoints, {} corners, {} cells",
            line.len(),
            road.waypoints.len(),
            road.polyline.as_ref().map_or(0, |p| p.corners.len()),
            road.cells.len()
        );
        road.place_into(&mut world);
    }

    let mut by_slot: HashMap<MaterialSlot, usize> = HashMap::new();
    for slot in world.values() {
        *by_slot.entry(*slot).or_default() += 1;
    }
    println!("{} cells placed: {by_slot:?}", world.len());

    let overlay = RenderOverlay::new(&extraction.skeleton, network).execute();
    println!(
        "overlay {}x{} ({} bytes as PPM)",
        overlay.width(),
        overlay.depth(),
        overlay.to_ppm().len()
    );
    Ok(())
}

//! # Blockfield Demo Driver
//!
//! Generates a small Perlin-noise world and logs what came out of it: chunk
//! count, vertex/index totals per render pass, and raster usage. Run with
//! `RUST_LOG=info` (or `debug` for per-chunk timings).

use std::sync::Arc;

use cgmath::Point2;
use log::info;

use blockfield::voxels::block::block_type::RenderPass;
use blockfield::voxels::chunk::generation::{Heightfield, PerlinHeightfield};
use blockfield::voxels::world::World;

fn main() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    let seed = 1;
    let heightfield: Arc<dyn Heightfield> = Arc::new(PerlinHeightfield::new(seed as u32));
    let mut world = World::new(2, seed, heightfield);

    let generated = world.recenter(Point2::new(0, 0));
    info!("generated {} chunks", generated);

    let mut totals = [(0usize, 0usize, 0usize); 2];
    let view = world.view_distance();
    for dx in -view..=view {
        for dz in -view..=view {
            if let Some(chunk) = world.chunk_at(Point2::new(dx, dz)) {
                for pass in RenderPass::all() {
                    let mesh = chunk.mesh(pass);
                    let entry = &mut totals[pass as usize];
                    entry.0 += mesh.vertex_count();
                    entry.1 += mesh.triangle_count();
                    entry.2 += mesh.raster().cells_written();
                }
            }
        }
    }

    for pass in RenderPass::all() {
        let (vertices, triangles, cells) = totals[pass as usize];
        info!(
            "{:?} pass: {} vertices, {} triangles, {} raster cells",
            pass, vertices, triangles, cells
        );
    }
}

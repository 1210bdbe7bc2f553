#![warn(missing_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Blockfield
//!
//! A voxel terrain core: procedural chunk generation into a sparse
//! fill-state structure, and greedy region meshing with a texture-lookup
//! side-channel.
//!
//! ## Key Modules
//!
//! * `voxels` - Block types, the per-chunk occupancy store and fill-state
//!   octrees, terrain generation, and the world-level chunk buffer
//! * `meshing` - The mesh builder, vertex/index buffers, and the
//!   face-texture raster
//! * `task_management` - The worker pool that generates chunks in parallel
//!
//! ## Architecture
//!
//! A [`Chunk`](voxels::chunk::Chunk) is one independently generated
//! 32×32×256 column. Its occupancy lives in a dense voxel array; a
//! fill-state octree per vertical slab (and per render pass) summarizes
//! which regions are fully solid, so both block placement and meshing can
//! short-circuit whole regions instead of touching every voxel. The mesh
//! builder walks those trees and emits one merged cuboid per solid region,
//! writing a per-texel texture-layer raster alongside so a single merged
//! face can span blocks of different types.
//!
//! The [`World`](voxels::world::World) keeps a view-following buffer of
//! chunks and generates missing ones in parallel; each chunk is
//! self-contained, so generation is one task per chunk with a barrier join
//! before anything renders.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use blockfield::voxels::chunk::generation::{Heightfield, PerlinHeightfield};
//! use blockfield::voxels::world::World;
//!
//! let heightfield: Arc<dyn Heightfield> = Arc::new(PerlinHeightfield::new(1));
//! let mut world = World::new(2, 1, heightfield);
//! world.recenter(cgmath::Point2::new(0, 0));
//! ```

pub mod error;
pub mod meshing;
pub mod task_management;
pub mod voxels;

pub use error::TerrainError;

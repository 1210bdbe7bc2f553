//! # Terrain Generation
//!
//! Heightfield-driven chunk generation: a pluggable noise sampler provides a
//! terrain height per column, and this module turns it into stone, soil,
//! grass, water and trees, placing every block through the same
//! `place_block` path interactive edits use, so the occupancy store and the
//! fill-state trees can never diverge during bulk generation.

use cgmath::{Point2, Point3};
use log::debug;
use noise::{NoiseFn, Perlin};
use web_time::Instant;

use crate::voxels::block::block_type::BlockType;

use super::{Chunk, CHUNK_MAX_HEIGHT, CHUNK_SIZE};

/// Terrain below this height is flooded up to it.
pub const WATER_LEVEL: i32 = 64;

/// Fraction of each column's terrain height that is stone (the remainder up
/// to the surface is soil).
const STONE_FRACTION_NUMERATOR: i32 = 3;
const STONE_FRACTION_DENOMINATOR: i32 = 4;

/// Tree placement attempts per chunk.
const TREE_ATTEMPTS: usize = 8;
/// Trees keep this many blocks away from the chunk edge so their leaf
/// spheres stay inside the chunk.
const TREE_MARGIN: i32 = 3;
/// Trunk height range, inclusive.
const TRUNK_MIN_HEIGHT: i32 = 4;
const TRUNK_MAX_HEIGHT: i32 = 6;
/// Radius of the leaf sphere around the trunk top.
const LEAF_RADIUS: i32 = 2;

/// Scaling factor applied to world coordinates when sampling the default
/// Perlin heightfield.
pub const PERLIN_SCALE_FACTOR: f64 = 0.02;

/// A terrain height sampler: a deterministic, pure function of world (x, z)
/// and whatever seed the implementation carries, returning a height in
/// `[0, 255]`.
pub trait Heightfield: Send + Sync {
    /// The terrain height of the column at world coordinates (x, z).
    fn height_at(&self, x: i32, z: i32) -> u8;
}

impl<F> Heightfield for F
where
    F: Fn(i32, i32) -> u8 + Send + Sync,
{
    fn height_at(&self, x: i32, z: i32) -> u8 {
        self(x, z)
    }
}

/// The default heightfield: 2D Perlin noise scaled into a band of terrain
/// heights around a base level.
pub struct PerlinHeightfield {
    perlin: Perlin,
    base: f64,
    amplitude: f64,
}

impl PerlinHeightfield {
    /// Creates the standard rolling-hills heightfield for a world seed.
    pub fn new(seed: u32) -> Self {
        PerlinHeightfield {
            perlin: Perlin::new(seed),
            base: 80.0,
            amplitude: 40.0,
        }
    }

    /// Creates a heightfield with a custom base level and amplitude.
    pub fn with_shape(seed: u32, base: f64, amplitude: f64) -> Self {
        PerlinHeightfield {
            perlin: Perlin::new(seed),
            base,
            amplitude,
        }
    }
}

impl Heightfield for PerlinHeightfield {
    fn height_at(&self, x: i32, z: i32) -> u8 {
        let sample = self.perlin.get([
            x as f64 * PERLIN_SCALE_FACTOR,
            z as f64 * PERLIN_SCALE_FACTOR,
        ]);
        (self.base + self.amplitude * sample).clamp(0.0, 255.0) as u8
    }
}

/// Mixes a chunk coordinate and the world seed into the RNG seed for that
/// chunk's tree scattering, so generation is deterministic per chunk.
fn tree_seed(coord: Point2<i32>, world_seed: u64) -> u64 {
    (coord.x as u64)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add((coord.y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F))
        ^ world_seed
}

impl Chunk {
    /// Generates a chunk's terrain from a heightfield.
    ///
    /// Per column: stone up to a fixed fraction of the terrain height, soil
    /// above it, and grass as the top block, unless the column tops out
    /// below the water level, in which case water (transparent pass) fills
    /// up to the water level and no grass grows. Trees are then scattered
    /// on grass with a seeded RNG: a wood trunk of random height and a leaf
    /// sphere whose cells are kept with probability falling off with
    /// distance from the trunk top.
    ///
    /// The mesh is not built here; call `rebuild_mesh` once after
    /// generation.
    pub fn generate(
        coord: Point2<i32>,
        heightfield: &dyn Heightfield,
        world_seed: u64,
    ) -> Self {
        let start = Instant::now();
        let mut chunk = Chunk::new(coord);
        let base_x = coord.x * CHUNK_SIZE;
        let base_z = coord.y * CHUNK_SIZE;

        for x in 0..CHUNK_SIZE {
            for depth in 0..CHUNK_SIZE {
                let z = -depth;
                let height =
                    (heightfield.height_at(base_x + x, base_z + z) as i32).min(CHUNK_MAX_HEIGHT - 1);
                let stone_top = height * STONE_FRACTION_NUMERATOR / STONE_FRACTION_DENOMINATOR;

                for y in 0..=height {
                    let block_type = if y < stone_top {
                        BlockType::STONE
                    } else if y < height {
                        BlockType::SOIL
                    } else if height < WATER_LEVEL {
                        // Submerged columns keep a soil floor; grass only
                        // grows above the water line.
                        BlockType::SOIL
                    } else {
                        BlockType::GRASS
                    };
                    chunk.place_block(block_type, Point3::new(x, y, z));
                }

                if height < WATER_LEVEL {
                    for y in height + 1..=WATER_LEVEL {
                        chunk.place_block(BlockType::WATER, Point3::new(x, y, z));
                    }
                }
            }
        }

        chunk.scatter_trees(tree_seed(coord, world_seed));

        debug!(
            "generated chunk at ({}, {}) in {:?}",
            coord.x,
            coord.y,
            start.elapsed()
        );
        chunk
    }

    /// Scatters trees on grass columns using a deterministic seeded RNG.
    fn scatter_trees(&mut self, seed: u64) {
        let mut rng = fastrand::Rng::with_seed(seed);

        for _ in 0..TREE_ATTEMPTS {
            let x = rng.i32(TREE_MARGIN..CHUNK_SIZE - TREE_MARGIN);
            let z = -rng.i32(TREE_MARGIN..CHUNK_SIZE - TREE_MARGIN);
            let top = match self.top_surface(x, z) {
                Some(top) => top,
                None => continue,
            };
            if self.voxel_at(top).block_type() != BlockType::GRASS {
                continue;
            }

            let trunk_height = rng.i32(TRUNK_MIN_HEIGHT..=TRUNK_MAX_HEIGHT);
            if top.y + trunk_height + LEAF_RADIUS >= CHUNK_MAX_HEIGHT {
                continue;
            }
            for dy in 1..=trunk_height {
                self.place_block(BlockType::WOOD, Point3::new(x, top.y + dy, z));
            }

            let crown = Point3::new(x, top.y + trunk_height, z);
            for dx in -LEAF_RADIUS..=LEAF_RADIUS {
                for dy in -LEAF_RADIUS..=LEAF_RADIUS {
                    for dz in -LEAF_RADIUS..=LEAF_RADIUS {
                        let distance =
                            ((dx * dx + dy * dy + dz * dz) as f32).sqrt();
                        let probability = 1.0 - distance / (LEAF_RADIUS as f32 + 1.0);
                        if probability <= 0.0 || rng.f32() >= probability {
                            continue;
                        }
                        let position = Point3::new(crown.x + dx, crown.y + dy, crown.z + dz);
                        if !self.voxel_at(position).is_solid() {
                            self.place_block(BlockType::LEAVES, position);
                        }
                    }
                }
            }
        }
    }
}

//! # World Module
//!
//! The world manager: a fixed-size buffer of chunks, reassigned as the view
//! center moves, with generation of missing chunks driven through the
//! worker pool.
//!
//! ## Chunk buffer
//!
//! Chunks live in an LRU cache sized to the view square plus one ring of
//! slack. Recentering promotes every chunk still in view and generates the
//! missing ones, so chunks that fell out of view are the ones evicted when
//! the buffer is full.
//!
//! ## Failure policy
//!
//! Generation errors are local to one chunk: a failed chunk is logged and
//! skipped, and its neighbors are unaffected. A later `recenter` retries it.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;

use cgmath::Point2;
use log::{error, info};
use lru::LruCache;

use crate::task_management::{GenerationPool, GenerationTask};
use crate::voxels::chunk::generation::Heightfield;
use crate::voxels::chunk::Chunk;

/// A voxel world: a view-following buffer of generated chunks.
pub struct World {
    chunks: LruCache<Point2<i32>, Chunk>,
    heightfield: Arc<dyn Heightfield>,
    pool: GenerationPool,
    view_distance: i32,
    seed: u64,
}

impl World {
    /// Creates a world that keeps chunks within `view_distance` of the view
    /// center loaded.
    ///
    /// The generation pool is sized to the machine's available parallelism.
    pub fn new(view_distance: i32, seed: u64, heightfield: Arc<dyn Heightfield>) -> Self {
        let side = (2 * view_distance + 1) as usize;
        let capacity = NonZeroUsize::new(side * side + side).unwrap();
        let workers = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(4);
        World {
            chunks: LruCache::new(capacity),
            heightfield,
            pool: GenerationPool::new(workers),
            view_distance,
            seed,
        }
    }

    /// Moves the view center, generating every missing chunk in the view
    /// square in parallel and waiting for all of them to finish meshing.
    ///
    /// Chunks already loaded are promoted so eviction targets the ones that
    /// left the view. Failed chunks are logged and skipped.
    ///
    /// # Returns
    /// The number of chunks generated by this call.
    pub fn recenter(&mut self, center: Point2<i32>) -> usize {
        let mut missing = Vec::new();
        for dx in -self.view_distance..=self.view_distance {
            for dz in -self.view_distance..=self.view_distance {
                let coord = Point2::new(center.x + dx, center.y + dz);
                if self.chunks.contains(&coord) {
                    self.chunks.promote(&coord);
                } else {
                    missing.push(coord);
                }
            }
        }

        for &coord in &missing {
            self.pool.dispatch(GenerationTask {
                coord,
                heightfield: self.heightfield.clone(),
                world_seed: self.seed,
            });
        }

        let mut generated = 0;
        for outcome in self.pool.join() {
            match outcome.result {
                Ok(chunk) => {
                    self.chunks.put(outcome.coord, chunk);
                    generated += 1;
                }
                Err(e) => {
                    error!(
                        "skipping chunk at ({}, {}): {}",
                        outcome.coord.x, outcome.coord.y, e
                    );
                }
            }
        }

        if generated > 0 {
            info!(
                "recentered on ({}, {}): {} chunks generated, {} loaded",
                center.x,
                center.y,
                generated,
                self.chunks.len()
            );
        }
        generated
    }

    /// The chunk at a grid coordinate, if loaded. Does not touch LRU order.
    pub fn chunk_at(&self, coord: Point2<i32>) -> Option<&Chunk> {
        self.chunks.peek(&coord)
    }

    /// Mutable access to a loaded chunk (for edits), refreshing its LRU
    /// position.
    pub fn chunk_at_mut(&mut self, coord: Point2<i32>) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord)
    }

    /// Number of chunks currently loaded.
    pub fn loaded_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// The world's view distance in chunks.
    pub fn view_distance(&self) -> i32 {
        self.view_distance
    }
}

//! # Chunk Module
//!
//! This module provides the `Chunk` struct: one independently generated,
//! meshed and rendered 32×32×256 column of voxels. A chunk owns its dense
//! occupancy store, one fill-state tree per render pass (opaque geometry and
//! water/leaves are tracked separately so the transparent pass can render
//! without face culling against opaque neighbors), and one mesh buffer per
//! pass.
//!
//! ## The single mutation path
//!
//! `place_block` and `remove_block` are the only ways occupancy changes
//! (bulk terrain generation and interactive edits go through the same calls)
//! and they always update the occupancy store and the fill-state trees
//! together. Meshes are rebuilt explicitly and in batch via `rebuild_mesh`,
//! never implicitly per edit.

use cgmath::{Matrix4, Point2, Point3, Vector3};

use crate::error::TerrainError;
use crate::meshing::mesh_buffer::MeshBuffer;
use crate::meshing::mesher::MeshBuildContext;

use super::block::block_type::{BlockType, RenderPass, NUM_RENDER_PASSES};
use fill_tree::FillTree;
use occupancy::{OccupancyStore, Voxel};

pub mod fill_tree;
pub mod generation;
pub mod occupancy;

/// The width and depth of a chunk, in blocks.
pub const CHUNK_SIZE: i32 = 32;
/// The height of a chunk, in blocks.
pub const CHUNK_MAX_HEIGHT: i32 = 256;
/// The number of blocks in one horizontal plane of a chunk.
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_SIZE * CHUNK_SIZE;
/// The total number of blocks in a chunk.
pub const CHUNK_VOLUME: usize = (CHUNK_PLANE_SIZE * CHUNK_MAX_HEIGHT) as usize;

/// One 32×32×256 column of voxels with its occupancy summary and meshes.
pub struct Chunk {
    /// The position of this chunk in chunk-grid coordinates (x, z).
    pub coord: Point2<i32>,
    occupancy: OccupancyStore,
    trees: [FillTree; NUM_RENDER_PASSES],
    meshes: [MeshBuffer; NUM_RENDER_PASSES],
}

impl Chunk {
    /// Creates an empty chunk at the given grid coordinate.
    pub fn new(coord: Point2<i32>) -> Self {
        Chunk {
            coord,
            occupancy: OccupancyStore::new(),
            trees: [FillTree::new(), FillTree::new()],
            meshes: [MeshBuffer::new(), MeshBuffer::new()],
        }
    }

    /// The world-space origin of this chunk.
    pub fn position(&self) -> Point3<f32> {
        Point3::new(
            (self.coord.x * CHUNK_SIZE) as f32,
            0.0,
            (self.coord.y * CHUNK_SIZE) as f32,
        )
    }

    /// The model transform placing this chunk's mesh in the world.
    pub fn transform(&self) -> Matrix4<f32> {
        let position = self.position();
        Matrix4::from_translation(Vector3::new(position.x, position.y, position.z))
    }

    /// Places a block, keeping occupancy store and fill-state trees
    /// consistent together.
    ///
    /// Replacing a block that renders in a different pass first clears it
    /// from the old pass's tree. Placing `EMPTY` is equivalent to
    /// [`remove_block`](Self::remove_block).
    ///
    /// # Returns
    /// `false` when `position` is outside the chunk; nothing changes.
    pub fn place_block(&mut self, block_type: BlockType, position: Point3<i32>) -> bool {
        if block_type == BlockType::EMPTY {
            return self.remove_block(position);
        }
        let old = match self.occupancy.get_mut(position) {
            Some(voxel) => voxel.block_type(),
            None => return false,
        };
        if old.is_solid() && old.render_pass() != block_type.render_pass() {
            self.trees[old.render_pass() as usize].clear(position);
        }
        self.occupancy.set_type(position, block_type);
        self.trees[block_type.render_pass() as usize].fill(position);
        true
    }

    /// Removes the block at `position`, un-marking it in its pass's tree.
    ///
    /// # Returns
    /// `false` when the position is out of range or held no block, so a
    /// no-op removal is distinguishable from a successful one.
    pub fn remove_block(&mut self, position: Point3<i32>) -> bool {
        let old = match self.occupancy.get_mut(position) {
            Some(voxel) => voxel.block_type(),
            None => return false,
        };
        if !old.is_solid() {
            return false;
        }
        self.occupancy.set_type(position, BlockType::EMPTY);
        self.trees[old.render_pass() as usize].clear(position);
        true
    }

    /// Rebuilds every render pass's mesh from the fill-state trees.
    ///
    /// Must be called after a batch of edits and before the meshes are
    /// rendered; per-voxel mesh bookkeeping is only valid afterwards.
    ///
    /// # Errors
    /// `TerrainError::OutOfMemory` aborts the rebuild of this chunk; other
    /// chunks are unaffected.
    pub fn rebuild_mesh(&mut self) -> Result<(), TerrainError> {
        for pass in RenderPass::all() {
            let index = pass as usize;
            MeshBuildContext::new(
                &mut self.occupancy,
                &self.trees[index],
                &mut self.meshes[index],
            )
            .rebuild()?;
        }
        Ok(())
    }

    /// Finds the highest occupied voxel in the column at (x, z).
    ///
    /// A linear top-down scan; only used at generation and placement time,
    /// never per frame.
    pub fn top_surface(&self, x: i32, z: i32) -> Option<Point3<i32>> {
        for y in (0..CHUNK_MAX_HEIGHT).rev() {
            let position = Point3::new(x, y, z);
            if self.occupancy.get(position).is_solid() {
                return Some(position);
            }
        }
        None
    }

    /// The voxel at `position` (the empty sentinel when out of range).
    pub fn voxel_at(&self, position: Point3<i32>) -> &Voxel {
        self.occupancy.get(position)
    }

    /// The mesh for one render pass.
    pub fn mesh(&self, pass: RenderPass) -> &MeshBuffer {
        &self.meshes[pass as usize]
    }

    /// Mutable mesh access, for the upload surface to mark realization.
    pub fn mesh_mut(&mut self, pass: RenderPass) -> &mut MeshBuffer {
        &mut self.meshes[pass as usize]
    }

    /// The fill-state tree for one render pass.
    pub fn tree(&self, pass: RenderPass) -> &FillTree {
        &self.trees[pass as usize]
    }
}

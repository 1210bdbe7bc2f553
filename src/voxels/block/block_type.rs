//! # Block Type Module
//!
//! This module defines the block types of the terrain, their conversion from
//! the compact integer storage format, and their render-pass classification.

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all block types the terrain generator can place.
///
/// The discriminants are the on-disk/in-store values: `EMPTY` is zero so a
/// zeroed occupancy store reads as all air. `FromPrimitive` allows conversion
/// back from the compact `BlockTypeSize` storage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// No block; the sentinel state of every voxel.
    EMPTY,

    /// Plain soil, the bulk of the terrain surface layer.
    SOIL,

    /// Soil with grass on top; sides show grass creeping over soil.
    GRASS,

    /// Loose gravel.
    GRAVEL,

    /// Sand, found near the water line.
    SAND,

    /// Stone, the bulk of the terrain below the soil layer.
    STONE,

    /// Water; rendered in the transparent pass without face culling
    /// against opaque neighbors.
    WATER,

    /// Tree trunk wood.
    WOOD,

    /// Tree leaves; rendered in the transparent pass.
    LEAVES,
}

/// The number of block types, including `EMPTY`.
pub const NUM_BLOCK_TYPES: usize = 9;

/// Which rendering pass a block's faces belong to.
///
/// Each pass owns its own fill-state tree and mesh inside a chunk, so adding
/// a pass here (e.g. cutout alpha) extends the per-pass arrays without
/// touching the mesher.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderPass {
    /// Fully opaque geometry, rendered first with depth writes.
    OPAQUE = 0,
    /// Water, leaves and other see-through geometry, rendered after the
    /// opaque pass.
    TRANSPARENT = 1,
}

/// The number of render passes a chunk maintains trees and meshes for.
pub const NUM_RENDER_PASSES: usize = 2;

impl RenderPass {
    /// Returns all passes in pass-index order.
    pub fn all() -> [RenderPass; NUM_RENDER_PASSES] {
        [RenderPass::OPAQUE, RenderPass::TRANSPARENT]
    }
}

impl BlockType {
    /// Converts a `BlockTypeSize` back to a `BlockType`.
    ///
    /// # Panics
    /// Panics if the value is not a valid block type; the occupancy store
    /// only ever holds values written from `BlockType`, so a failure here is
    /// an internal invariant violation.
    pub fn from_int(btype: BlockTypeSize) -> Self {
        let btype_option = num::FromPrimitive::from_u8(btype);
        btype_option.unwrap()
    }

    /// The pass whose fill-state tree and mesh track this block type.
    pub fn render_pass(self) -> RenderPass {
        match self {
            BlockType::WATER | BlockType::LEAVES => RenderPass::TRANSPARENT,
            _ => RenderPass::OPAQUE,
        }
    }

    /// Whether this type occupies its voxel (everything except `EMPTY`).
    pub fn is_solid(self) -> bool {
        self != BlockType::EMPTY
    }
}

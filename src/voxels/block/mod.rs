//! # Block Module
//!
//! Block type definitions, the per-face texture-layer registry, and the face
//! and octant enums whose ordinals the mesher's data tables are built
//! around.

use block_side::BlockSide;
use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to store block types in the occupancy
/// store.
pub type BlockTypeSize = u8;

/// The texture layer showing grass creeping over soil, used on the side
/// faces of GRASS blocks.
///
/// Flat per-type layers occupy `0..NUM_BLOCK_TYPES − 1`; face-specific
/// layers such as this one are appended after them in the texture array.
pub const SOIL_WITH_GRASS_TEXTURE_LAYER: u32 = 8;

/// Per-face texture-layer overrides, indexed by `BlockType` ordinal.
///
/// Each inner array holds 6 layer indices in [`BlockSide`] order
/// [Front, Back, Left, Right, Top, Bottom]. `None` means the block uses the
/// same layer on every face, derived as `type − 1` (layer 0 belongs to the
/// first non-empty type).
///
/// GRASS is the one block with distinct faces: grass-over-soil on the sides,
/// full grass on top, plain soil underneath.
pub static BLOCK_FACE_TEXTURE_LAYERS: [Option<[u32; 6]>; block_type::NUM_BLOCK_TYPES] = [
    None,                         // EMPTY (never sampled)
    None,                         // SOIL
    Some([8, 8, 8, 8, 1, 0]),     // GRASS (sides: grass-over-soil, top: grass, bottom: soil)
    None,                         // GRAVEL
    None,                         // SAND
    None,                         // STONE
    None,                         // WATER
    None,                         // WOOD
    None,                         // LEAVES
];

/// Resolves the texture layer a face of the given block type samples.
///
/// Looks up the per-face override table first, falling back to the flat
/// `type − 1` layer for blocks that look the same from every side.
///
/// # Arguments
/// * `btype` - The block type as stored in the occupancy store; must not be
///   `EMPTY` (empty voxels emit no faces, so they are never sampled)
/// * `side` - Which face is being textured
pub fn texture_layer(btype: BlockTypeSize, side: BlockSide) -> u32 {
    debug_assert_ne!(btype, BlockType::EMPTY as BlockTypeSize);
    match BLOCK_FACE_TEXTURE_LAYERS[btype as usize] {
        Some(layers) => layers[side as usize],
        None => btype as u32 - 1,
    }
}

//! # Occupancy Store
//!
//! The dense per-voxel storage for one chunk: a flat array of [`Voxel`]
//! values addressed by integer coordinate, plus the shared sentinel that
//! stands in for every out-of-range read.
//!
//! ## Axis convention
//!
//! The store is `CHUNK_SIZE × CHUNK_SIZE × CHUNK_MAX_HEIGHT` (width × depth
//! × height). Depth grows in the *negative* z direction: valid z coordinates
//! lie in `(-CHUNK_SIZE, 0]` and are stored by absolute value, so the
//! row-major index is `x + |z|·CHUNK_SIZE + y·CHUNK_SIZE²`. A positive z is
//! out of range by definition.
//!
//! ## Bounds policy
//!
//! `get` never fails: any coordinate outside the valid range resolves to a
//! shared, immutable sentinel voxel whose type is `EMPTY`. Face-visibility
//! tests against neighbors can therefore read unconditionally. Mutation goes
//! through `get_mut`, which returns `None` out of range so the sentinel can
//! never be written.

use cgmath::Point3;

use crate::voxels::block::{block_type::BlockType, BlockTypeSize};

use super::{CHUNK_MAX_HEIGHT, CHUNK_PLANE_SIZE, CHUNK_SIZE, CHUNK_VOLUME};

/// One voxel cell: its block type plus bookkeeping describing where the
/// voxel's current faces live in the owning chunk's mesh buffers.
///
/// The bookkeeping fields are only meaningful while the chunk's mesh is up
/// to date; every full mesh rebuild rewrites them wholesale. Voxels are
/// overwritten in place on block change and never individually freed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Voxel {
    /// The block type occupying this cell; `0` (`EMPTY`) means air.
    pub block_type: BlockTypeSize,
    /// Offset of this voxel's first vertex in the chunk's vertex buffer.
    pub vertex_offset: u32,
    /// Offset of this voxel's first index in the chunk's index buffer.
    pub index_offset: u32,
    /// Number of indices emitted for this voxel's faces.
    pub index_count: u32,
}

impl Voxel {
    /// An air voxel with no mesh presence.
    pub const EMPTY: Voxel = Voxel {
        block_type: BlockType::EMPTY as BlockTypeSize,
        vertex_offset: 0,
        index_offset: 0,
        index_count: 0,
    };

    /// The block type as an enum.
    pub fn block_type(&self) -> BlockType {
        BlockType::from_int(self.block_type)
    }

    /// Whether this voxel holds a block.
    pub fn is_solid(&self) -> bool {
        self.block_type != BlockType::EMPTY as BlockTypeSize
    }
}

/// The shared read-only voxel returned for every out-of-range access.
static SENTINEL: Voxel = Voxel::EMPTY;

/// Dense voxel storage for one chunk.
pub struct OccupancyStore {
    voxels: Vec<Voxel>,
}

impl OccupancyStore {
    /// Creates a store with every voxel empty.
    pub fn new() -> Self {
        OccupancyStore {
            voxels: vec![Voxel::EMPTY; CHUNK_VOLUME],
        }
    }

    /// Computes the row-major index of an in-range coordinate, or `None` if
    /// the coordinate is outside the chunk (including the wrong sign on z).
    fn index_of(coord: Point3<i32>) -> Option<usize> {
        if coord.x < 0
            || coord.y < 0
            || coord.x >= CHUNK_SIZE
            || coord.y >= CHUNK_MAX_HEIGHT
            || coord.z > 0
            || coord.z.abs() >= CHUNK_SIZE
        {
            return None;
        }
        Some((coord.x + coord.z.abs() * CHUNK_SIZE + coord.y * CHUNK_PLANE_SIZE) as usize)
    }

    /// Returns the voxel at `coord`, or the shared empty sentinel when the
    /// coordinate is out of range. Never fails, never allocates.
    pub fn get(&self, coord: Point3<i32>) -> &Voxel {
        match Self::index_of(coord) {
            Some(index) => &self.voxels[index],
            None => &SENTINEL,
        }
    }

    /// Returns a mutable reference to the voxel at `coord`, or `None` when
    /// out of range. The sentinel is never handed out mutably.
    pub fn get_mut(&mut self, coord: Point3<i32>) -> Option<&mut Voxel> {
        Self::index_of(coord).map(|index| &mut self.voxels[index])
    }

    /// Directly sets the block type at `coord`, returning whether the
    /// coordinate was in range.
    ///
    /// This alone does not maintain the fill-state trees; callers that need
    /// store and trees consistent go through `Chunk::place_block`.
    pub fn set_type(&mut self, coord: Point3<i32>, block_type: BlockType) -> bool {
        match self.get_mut(coord) {
            Some(voxel) => {
                voxel.block_type = block_type as BlockTypeSize;
                true
            }
            None => false,
        }
    }
}

impl Default for OccupancyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_reads_resolve_to_empty_sentinel() {
        let store = OccupancyStore::new();
        // One sample a unit outside each of the six boundary faces.
        let outside = [
            Point3::new(-1, 0, 0),
            Point3::new(CHUNK_SIZE, 0, 0),
            Point3::new(0, -1, 0),
            Point3::new(0, CHUNK_MAX_HEIGHT, 0),
            Point3::new(0, 0, 1),
            Point3::new(0, 0, -CHUNK_SIZE),
        ];
        for coord in outside {
            let voxel = store.get(coord);
            assert_eq!(voxel.block_type(), BlockType::EMPTY, "at {:?}", coord);
        }
    }

    #[test]
    fn test_sentinel_is_never_writable() {
        let mut store = OccupancyStore::new();
        assert!(store.get_mut(Point3::new(0, 0, 1)).is_none());
        assert!(!store.set_type(Point3::new(CHUNK_SIZE, 0, 0), BlockType::SOIL));
        // The sentinel stayed empty.
        assert_eq!(store.get(Point3::new(0, 0, 1)).block_type(), BlockType::EMPTY);
    }

    #[test]
    fn test_set_and_get_round_trip_at_corners_and_interior() {
        let mut store = OccupancyStore::new();
        let probes = [
            Point3::new(0, 0, 0),
            Point3::new(31, 0, 0),
            Point3::new(0, 255, 0),
            Point3::new(0, 0, -31),
            Point3::new(16, 128, -16),
        ];
        for coord in probes {
            assert!(store.set_type(coord, BlockType::SOIL));
            assert_eq!(store.get(coord).block_type(), BlockType::SOIL, "at {:?}", coord);
        }
    }

    #[test]
    fn test_distinct_coordinates_map_to_distinct_cells() {
        let mut store = OccupancyStore::new();
        store.set_type(Point3::new(1, 0, 0), BlockType::SOIL);
        store.set_type(Point3::new(0, 0, -1), BlockType::STONE);
        store.set_type(Point3::new(0, 1, 0), BlockType::SAND);
        assert_eq!(store.get(Point3::new(1, 0, 0)).block_type(), BlockType::SOIL);
        assert_eq!(store.get(Point3::new(0, 0, -1)).block_type(), BlockType::STONE);
        assert_eq!(store.get(Point3::new(0, 1, 0)).block_type(), BlockType::SAND);
        assert_eq!(store.get(Point3::new(0, 0, 0)).block_type(), BlockType::EMPTY);
    }
}

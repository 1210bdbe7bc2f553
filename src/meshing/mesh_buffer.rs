//! # Mesh Buffer
//!
//! The growable vertex/index storage for one render pass of a chunk, plus
//! the face-texture raster that travels with it.
//!
//! ## Growth policy
//!
//! Capacity is checked preemptively, before each cuboid emission, against a
//! fixed slack (the worst case of one all-faces cuboid) rather than after
//! the fact. Vertices grow by doubling and indices by quadrupling: every
//! quad emits 6 indices for 4 unique vertices, and the index demand per fill
//! event spikes faster than the vertex demand. Growth goes through
//! `try_reserve`, so running out of memory surfaces as a recoverable
//! [`TerrainError::OutOfMemory`] instead of aborting the process.

use crate::error::TerrainError;

use super::raster::FaceTextureRaster;
use super::vertex::BlockVertex;

/// Number of blocks' worth of mesh space a fresh buffer reserves. Raising
/// this trades memory for fewer growth steps during generation.
pub const INITIAL_ALLOC_BLOCKS: usize = 256;

/// Initial vertex capacity (8 corner vertices per block's cuboid).
const INITIAL_VERTEX_CAPACITY: usize = INITIAL_ALLOC_BLOCKS * 8;
/// Initial index capacity (36 indices per all-faces cuboid).
const INITIAL_INDEX_CAPACITY: usize = INITIAL_ALLOC_BLOCKS * 36;

/// Worst-case vertices one cuboid emission appends (6 faces × 4 vertices).
const CUBOID_VERTEX_SLACK: usize = 24;
/// Worst-case indices one cuboid emission appends (6 faces × 6 indices).
const CUBOID_INDEX_SLACK: usize = 36;

/// Vertex and index storage for one render pass of a chunk's mesh.
pub struct MeshBuffer {
    vertices: Vec<BlockVertex>,
    indices: Vec<u32>,
    raster: FaceTextureRaster,
    /// Whether GPU-side buffers currently exist for this mesh. Cleared on
    /// rebuild; the upload surface sets it after (re)creating its buffers.
    realized: bool,
}

impl MeshBuffer {
    /// Creates an empty buffer with the standard initial capacities.
    pub fn new() -> Self {
        MeshBuffer {
            vertices: Vec::with_capacity(INITIAL_VERTEX_CAPACITY),
            indices: Vec::with_capacity(INITIAL_INDEX_CAPACITY),
            raster: FaceTextureRaster::new(),
            realized: false,
        }
    }

    /// Clears accumulated geometry and the raster cursor for a rebuild,
    /// keeping allocations. Any GPU-side buffers are stale afterwards.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.raster.clear();
        self.realized = false;
    }

    /// Makes room for one worst-case cuboid emission, growing the backing
    /// storage if the fixed slack no longer fits.
    ///
    /// # Errors
    /// `TerrainError::OutOfMemory` when the allocator refuses the larger
    /// buffer; the mesh is left valid but unchanged.
    pub fn ensure_cuboid_capacity(&mut self) -> Result<(), TerrainError> {
        if self.vertices.len() + CUBOID_VERTEX_SLACK > self.vertices.capacity() {
            let additional = self.vertices.capacity().max(INITIAL_VERTEX_CAPACITY);
            self.vertices
                .try_reserve_exact(additional)
                .map_err(|source| TerrainError::OutOfMemory {
                    what: "vertex",
                    source,
                })?;
        }
        if self.indices.len() + CUBOID_INDEX_SLACK > self.indices.capacity() {
            let additional = (self.indices.capacity() * 3).max(INITIAL_INDEX_CAPACITY);
            self.indices
                .try_reserve_exact(additional)
                .map_err(|source| TerrainError::OutOfMemory {
                    what: "index",
                    source,
                })?;
        }
        Ok(())
    }

    /// Appends a vertex, returning its index in the buffer.
    pub fn push_vertex(&mut self, vertex: BlockVertex) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    /// Appends one triangle-list index.
    pub fn push_index(&mut self, index: u32) {
        self.indices.push(index);
    }

    /// Number of vertices currently in the buffer.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of indices currently in the buffer.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of triangles currently in the buffer.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// The vertex data, ready for upload.
    pub fn vertices(&self) -> &[BlockVertex] {
        &self.vertices
    }

    /// The index data, ready for upload.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// The face-texture raster paired with this mesh.
    pub fn raster(&self) -> &FaceTextureRaster {
        &self.raster
    }

    /// Mutable access to the raster, used during emission.
    pub fn raster_mut(&mut self) -> &mut FaceTextureRaster {
        &mut self.raster
    }

    /// Marks GPU-side buffers as existing for this mesh.
    pub fn mark_realized(&mut self) {
        self.realized = true;
    }

    /// Whether GPU-side buffers currently exist for this mesh.
    pub fn is_realized(&self) -> bool {
        self.realized
    }
}

impl Default for MeshBuffer {
    fn default() -> Self {
        Self::new()
    }
}

//! # Mesh Builder
//!
//! Converts a chunk's fill-state tree into a minimal textured triangle mesh.
//! The tree walk emits one merged cuboid per FULL region (an entire 32³
//! slab becomes a handful of quads instead of thousands of per-voxel faces)
//! while the face-texture raster records, per unit texel of every emitted
//! face, which texture layer that surface point samples. The raster is what
//! lets one merged face span blocks of different types.
//!
//! ## Face contract
//!
//! Faces are emitted in the fixed order FRONT, BACK, LEFT, RIGHT, TOP,
//! BOTTOM, the [`BlockSide`] ordinal order, which is also the face-mask bit
//! order. The per-face index templates below define the triangle windings;
//! back-face culling depends on them exactly as written, so the tables are
//! the contract, not a derivation.

use cgmath::{Point3, Vector3};
use log::debug;
use web_time::Instant;

use crate::error::TerrainError;
use crate::voxels::block::block_side::{BlockSide, FaceSet};
use crate::voxels::block::texture_layer;
use crate::voxels::chunk::fill_tree::{FillState, FillTree, NodeIndex, NUM_SLABS};
use crate::voxels::chunk::occupancy::OccupancyStore;
use crate::voxels::chunk::CHUNK_SIZE;

use super::mesh_buffer::MeshBuffer;
use super::vertex::BlockVertex;

/// The eight corners of a unit cuboid, front four (z = 0) then back four
/// (z = −1), scaled by the cuboid's extent at emission time.
static CUBE_CORNER_POSITIONS: [Vector3<f32>; 8] = [
    Vector3::new(0.0, 0.0, 0.0),
    Vector3::new(0.0, 1.0, 0.0),
    Vector3::new(1.0, 0.0, 0.0),
    Vector3::new(1.0, 1.0, 0.0),
    Vector3::new(0.0, 0.0, -1.0),
    Vector3::new(0.0, 1.0, -1.0),
    Vector3::new(1.0, 0.0, -1.0),
    Vector3::new(1.0, 1.0, -1.0),
];

/// The four in-quad texture coordinates a face's corners choose from.
static CORNER_TEXCOORDS: [[f32; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];

/// Per-face triangle index templates into the corner table, in `BlockSide`
/// ordinal order. Each face is two triangles over four unique corners; the
/// windings define the front side of every face.
static FACE_INDEX_TEMPLATES: [[usize; 6]; 6] = [
    [0, 1, 2, 2, 1, 3], // FRONT
    [4, 6, 5, 5, 6, 7], // BACK
    [4, 5, 0, 0, 5, 1], // LEFT
    [2, 3, 6, 6, 3, 7], // RIGHT
    [1, 5, 3, 3, 5, 7], // TOP
    [0, 2, 6, 6, 4, 0], // BOTTOM
];

/// For each face, which of the four texcoords each cube corner uses.
/// Entries for corners a face does not touch are never read.
static FACE_TEXCOORD_INDICES: [[usize; 8]; 6] = [
    [0, 1, 2, 3, 0, 0, 0, 0], // FRONT
    [0, 0, 0, 0, 2, 3, 0, 1], // BACK
    [2, 3, 0, 0, 0, 1, 0, 0], // LEFT
    [0, 0, 0, 1, 0, 0, 2, 3], // RIGHT
    [0, 0, 0, 2, 0, 1, 0, 3], // TOP
    [2, 0, 3, 0, 0, 0, 1, 0], // BOTTOM
];

/// The 2D texel extent of a face of a `size`-dimensioned cuboid.
fn face_extent(side: BlockSide, size: Vector3<i32>) -> (i32, i32) {
    match side {
        BlockSide::FRONT | BlockSide::BACK => (size.x, size.y),
        BlockSide::LEFT | BlockSide::RIGHT => (size.z, size.y),
        BlockSide::TOP | BlockSide::BOTTOM => (size.x, size.z),
    }
}

/// Everything one mesh rebuild works against, bundled so every operation
/// receives its chunk state explicitly.
///
/// The occupancy store is mutable because cuboid emission records each
/// anchor voxel's position in the freshly built buffers.
pub struct MeshBuildContext<'a> {
    occupancy: &'a mut OccupancyStore,
    tree: &'a FillTree,
    mesh: &'a mut MeshBuffer,
}

impl<'a> MeshBuildContext<'a> {
    /// Bundles the borrows for one rebuild.
    pub fn new(
        occupancy: &'a mut OccupancyStore,
        tree: &'a FillTree,
        mesh: &'a mut MeshBuffer,
    ) -> Self {
        MeshBuildContext {
            occupancy,
            tree,
            mesh,
        }
    }

    /// Rebuilds the mesh from scratch by walking every slab of the
    /// fill-state tree.
    ///
    /// EMPTY slabs cost nothing. A FULL slab root emits a single slab-sized
    /// cuboid with the bottom face omitted (chunks are never viewed from
    /// underneath). A PARTIAL root is traversed with an explicit stack;
    /// every FULL node found emits one all-faces cuboid sized to the node.
    /// Faces between adjacent separately-tracked FULL siblings are emitted
    /// even though they are mutually occluded: the tree guarantees merged
    /// regions only at octree granularity, and that overdraw is accepted.
    ///
    /// # Errors
    /// `TerrainError::OutOfMemory` if a buffer cannot grow; the mesh is left
    /// cleared but structurally valid.
    pub fn rebuild(mut self) -> Result<(), TerrainError> {
        let start = Instant::now();
        self.mesh.clear();

        for slab in 0..NUM_SLABS {
            let root = *self.tree.slab_root(slab);
            match root.state {
                FillState::EMPTY => continue,
                FillState::FULL => {
                    self.emit_cuboid(
                        root.origin,
                        Vector3::new(CHUNK_SIZE, CHUNK_SIZE, CHUNK_SIZE),
                        FaceSet::ALL.without(BlockSide::BOTTOM),
                    )?;
                }
                FillState::PARTIAL => {
                    let mut stack: Vec<NodeIndex> =
                        root.children.into_iter().flatten().collect();
                    while let Some(index) = stack.pop() {
                        let node = *self.tree.node(index);
                        match node.state {
                            FillState::FULL => {
                                self.emit_cuboid(
                                    node.origin,
                                    Vector3::new(node.size, node.size, node.size),
                                    FaceSet::ALL,
                                )?;
                            }
                            FillState::PARTIAL => {
                                stack.extend(node.children.into_iter().flatten());
                            }
                            FillState::EMPTY => {
                                debug_assert!(
                                    false,
                                    "EMPTY node reachable from PARTIAL parent at {:?}",
                                    node.origin
                                );
                            }
                        }
                    }
                }
            }
        }

        debug!(
            "rebuilt mesh: {} vertices, {} indices, {} raster cells in {:?}",
            self.mesh.vertex_count(),
            self.mesh.index_count(),
            self.mesh.raster().cells_written(),
            start.elapsed()
        );
        Ok(())
    }

    /// Emits the selected faces of one axis-aligned cuboid.
    ///
    /// For each face in emission order: four vertices (deduplicated within
    /// the face through a corner remap table) and six indices from the
    /// face's triangle template, with in-quad UVs scaled by the face's 2D
    /// extent; then one raster cell per unit face area, each resolving the
    /// block type actually present at that texel. The voxel at `origin`
    /// (the cuboid's anchor) records where its geometry landed.
    pub fn emit_cuboid(
        &mut self,
        origin: Point3<i32>,
        size: Vector3<i32>,
        faces: FaceSet,
    ) -> Result<(), TerrainError> {
        self.mesh.ensure_cuboid_capacity()?;

        let vertex_offset = self.mesh.vertex_count() as u32;
        let index_offset = self.mesh.index_count() as u32;

        for side in BlockSide::all() {
            if !faces.contains(side) {
                continue;
            }

            let (width, height) = face_extent(side, size);
            let cell_origin = self
                .mesh
                .raster_mut()
                .begin_face(width as u32, height as u32)?;

            let mut corner_remap = [u32::MAX; 8];
            for &corner in &FACE_INDEX_TEMPLATES[side as usize] {
                if corner_remap[corner] == u32::MAX {
                    let vertex = Self::face_vertex(corner, side, origin, size, cell_origin);
                    corner_remap[corner] = self.mesh.push_vertex(vertex);
                }
                self.mesh.push_index(corner_remap[corner]);
            }

            self.write_face_cells(side, origin, size, cell_origin);
        }

        if let Some(anchor) = self.occupancy.get_mut(origin) {
            anchor.vertex_offset = vertex_offset;
            anchor.index_offset = index_offset;
            anchor.index_count = self.mesh.index_count() as u32 - index_offset;
        }

        Ok(())
    }

    /// Builds one corner vertex of a face, scaled and positioned to the
    /// cuboid.
    fn face_vertex(
        corner: usize,
        side: BlockSide,
        origin: Point3<i32>,
        size: Vector3<i32>,
        cell_origin: (u32, u32),
    ) -> BlockVertex {
        let corner_position = CUBE_CORNER_POSITIONS[corner];
        let position = Point3::new(
            origin.x as f32 + corner_position.x * size.x as f32,
            origin.y as f32 + corner_position.y * size.y as f32,
            origin.z as f32 + corner_position.z * size.z as f32,
        );

        let (u_scale, v_scale) = face_extent(side, size);
        let texcoord = CORNER_TEXCOORDS[FACE_TEXCOORD_INDICES[side as usize][corner]];
        let uv = [texcoord[0] * u_scale as f32, texcoord[1] * v_scale as f32];

        BlockVertex::new(position, uv, [cell_origin.0 as f32, cell_origin.1 as f32])
    }

    /// Writes the raster cells for one face: one texel per unit area, each
    /// sampling the occupancy store at the texel's position on the face
    /// surface and resolving that block's texture layer for this side.
    fn write_face_cells(
        &mut self,
        side: BlockSide,
        origin: Point3<i32>,
        size: Vector3<i32>,
        cell_origin: (u32, u32),
    ) {
        let (width, height) = face_extent(side, size);
        for row in 0..height {
            for col in 0..width {
                let sample = match side {
                    // Front surface lies on the near z plane, back on the
                    // far one.
                    BlockSide::FRONT => Point3::new(origin.x + col, origin.y + row, origin.z),
                    BlockSide::BACK => Point3::new(
                        origin.x + col,
                        origin.y + row,
                        origin.z - size.z + 1,
                    ),
                    BlockSide::LEFT => Point3::new(origin.x, origin.y + row, origin.z - col),
                    BlockSide::RIGHT => Point3::new(
                        origin.x + size.x - 1,
                        origin.y + row,
                        origin.z - col,
                    ),
                    BlockSide::TOP => Point3::new(
                        origin.x + col,
                        origin.y + size.y - 1,
                        origin.z - row,
                    ),
                    BlockSide::BOTTOM => Point3::new(origin.x + col, origin.y, origin.z - row),
                };

                let layer = texture_layer(self.occupancy.get(sample).block_type, side);
                self.mesh
                    .raster_mut()
                    .write_cell(cell_origin.0 + col as u32, cell_origin.1 + row as u32, layer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxels::block::block_type::BlockType;
    use crate::voxels::block::SOIL_WITH_GRASS_TEXTURE_LAYER;

    fn filled_state(coords: &[Point3<i32>], btype: BlockType) -> (OccupancyStore, FillTree) {
        let mut occupancy = OccupancyStore::new();
        let mut tree = FillTree::new();
        for &coord in coords {
            occupancy.set_type(coord, btype);
            tree.fill(coord);
        }
        (occupancy, tree)
    }

    #[test]
    fn test_single_voxel_emits_six_faces() {
        let (mut occupancy, tree) = filled_state(&[Point3::new(3, 40, -5)], BlockType::STONE);
        let mut mesh = MeshBuffer::new();
        MeshBuildContext::new(&mut occupancy, &tree, &mut mesh)
            .rebuild()
            .unwrap();

        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);
        assert_eq!(mesh.triangle_count(), 12);
        // One raster cell per unit face.
        assert_eq!(mesh.raster().cells_written(), 6);
        // Anchor bookkeeping points at the emitted range.
        let anchor = occupancy.get(Point3::new(3, 40, -5));
        assert_eq!(anchor.vertex_offset, 0);
        assert_eq!(anchor.index_offset, 0);
        assert_eq!(anchor.index_count, 36);
    }

    #[test]
    fn test_full_slab_emits_five_merged_faces() {
        let mut coords = Vec::new();
        for x in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for z in 0..CHUNK_SIZE {
                    coords.push(Point3::new(x, y, -z));
                }
            }
        }
        let (mut occupancy, tree) = filled_state(&coords, BlockType::SOIL);
        assert_eq!(tree.slab_root(0).state, FillState::FULL);

        let mut mesh = MeshBuffer::new();
        MeshBuildContext::new(&mut occupancy, &tree, &mut mesh)
            .rebuild()
            .unwrap();

        // One slab-sized cuboid, bottom omitted: 5 faces, 2 triangles each.
        assert_eq!(mesh.vertex_count(), 20);
        assert_eq!(mesh.index_count(), 30);
        assert_eq!(mesh.triangle_count(), 10);
        // Each of the 5 faces covers slab_size² texels.
        assert_eq!(
            mesh.raster().cells_written(),
            5 * (CHUNK_SIZE * CHUNK_SIZE) as usize
        );
    }

    #[test]
    fn test_front_face_winding_matches_template() {
        let (mut occupancy, tree) = filled_state(&[Point3::new(0, 0, 0)], BlockType::SOIL);
        let mut mesh = MeshBuffer::new();
        MeshBuildContext::new(&mut occupancy, &tree, &mut mesh)
            .rebuild()
            .unwrap();

        // FRONT is emitted first; its corners 0,1,2,3 land at buffer indices
        // 0,1,2,3 and the triangles keep the template winding.
        assert_eq!(&mesh.indices()[0..6], &[0, 1, 2, 2, 1, 3]);
        let v = mesh.vertices();
        assert_eq!(v[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(v[1].position, [0.0, 1.0, 0.0]);
        assert_eq!(v[2].position, [1.0, 0.0, 0.0]);
        assert_eq!(v[3].position, [1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_uvs_scale_with_merged_face_extent() {
        // A full slab's front face must tile its texture 32×32 times.
        let mut coords = Vec::new();
        for x in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for z in 0..CHUNK_SIZE {
                    coords.push(Point3::new(x, y, -z));
                }
            }
        }
        let (mut occupancy, tree) = filled_state(&coords, BlockType::SOIL);
        let mut mesh = MeshBuffer::new();
        MeshBuildContext::new(&mut occupancy, &tree, &mut mesh)
            .rebuild()
            .unwrap();

        let max_u = mesh
            .vertices()
            .iter()
            .map(|v| v.uv[0])
            .fold(0.0f32, f32::max);
        let max_v = mesh
            .vertices()
            .iter()
            .map(|v| v.uv[1])
            .fold(0.0f32, f32::max);
        assert_eq!(max_u, CHUNK_SIZE as f32);
        assert_eq!(max_v, CHUNK_SIZE as f32);
    }

    #[test]
    fn test_raster_resolves_block_type_per_texel() {
        // A 2×2×2 FULL group with grass over soil: the merged faces span
        // both types, and the raster texels must each resolve their own.
        let mut occupancy = OccupancyStore::new();
        let mut tree = FillTree::new();
        for x in 0..2 {
            for y in 0..2 {
                for z in 0..2 {
                    let btype = if y == 1 { BlockType::GRASS } else { BlockType::SOIL };
                    occupancy.set_type(Point3::new(x, y, -z), btype);
                    tree.fill(Point3::new(x, y, -z));
                }
            }
        }

        let mut mesh = MeshBuffer::new();
        MeshBuildContext::new(&mut occupancy, &tree, &mut mesh)
            .rebuild()
            .unwrap();

        // One 2³ cuboid: 6 faces of 4 texels each.
        assert_eq!(mesh.raster().cells_written(), 24);

        // FRONT face is the first 2×2 cell block: bottom row soil (layer 0),
        // top row grass sides.
        let raster = mesh.raster();
        assert_eq!(raster.cell(0, 0), 0);
        assert_eq!(raster.cell(1, 0), 0);
        assert_eq!(raster.cell(0, 1), SOIL_WITH_GRASS_TEXTURE_LAYER);
        assert_eq!(raster.cell(1, 1), SOIL_WITH_GRASS_TEXTURE_LAYER);
    }
}

//! End-to-end scenarios: building a chunk through the public edit path and
//! meshing it, generating flooded terrain, and driving a parallel world off
//! a noise heightfield.

use std::sync::Arc;

use cgmath::{Point2, Point3};

use blockfield::voxels::block::block_type::{BlockType, RenderPass};
use blockfield::voxels::chunk::fill_tree::FillState;
use blockfield::voxels::chunk::generation::{Heightfield, PerlinHeightfield, WATER_LEVEL};
use blockfield::voxels::chunk::{Chunk, CHUNK_SIZE};
use blockfield::voxels::world::World;

/// Fills three exact slabs of terrain through `place_block` (soil with a
/// grass top) and checks that meshing produces only the merged slab cuboids,
/// with no per-voxel faces anywhere inside the solid volume, and that the
/// raster resolves each texel's block type across the merged faces.
#[test]
fn test_flat_terrain_meshes_to_merged_slab_cuboids() {
    let mut chunk = Chunk::new(Point2::new(0, 0));
    let surface = 95;
    for x in 0..CHUNK_SIZE {
        for z in 0..CHUNK_SIZE {
            for y in 0..surface {
                assert!(chunk.place_block(BlockType::SOIL, Point3::new(x, y, -z)));
            }
            assert!(chunk.place_block(BlockType::GRASS, Point3::new(x, surface, -z)));
        }
    }

    // 96 filled rows = exactly three full slabs.
    for slab in 0..3 {
        assert_eq!(
            chunk.tree(RenderPass::OPAQUE).slab_root(slab).state,
            FillState::FULL
        );
    }

    chunk.rebuild_mesh().unwrap();
    let mesh = chunk.mesh(RenderPass::OPAQUE);

    // Three slab cuboids, five faces each (bottom omitted): every face is a
    // single quad, so adjacent soil voxels never contribute interior
    // geometry.
    assert_eq!(mesh.vertex_count(), 60);
    assert_eq!(mesh.index_count(), 90);
    assert_eq!(mesh.triangle_count(), 30);

    // One raster cell per unit face area.
    let face_area = (CHUNK_SIZE * CHUNK_SIZE) as usize;
    assert_eq!(mesh.raster().cells_written(), 15 * face_area);

    // Faces pack left to right, 32 texels wide each, in emission order
    // (front, back, left, right, top per slab). The third slab's top face is
    // the 15th block of cells: all grass.
    let raster = mesh.raster();
    let top_face_x = 14 * CHUNK_SIZE as u32;
    for col in [0, 17, 31] {
        assert_eq!(raster.cell(top_face_x + col, 0), 1);
        assert_eq!(raster.cell(top_face_x + col, 31), 1);
    }
    // The third slab's front face: soil texels below, grass-over-soil on the
    // surface row.
    let front_face_x = 10 * CHUNK_SIZE as u32;
    assert_eq!(raster.cell(front_face_x, 0), 0);
    assert_eq!(raster.cell(front_face_x, 31), 8);
    // The first slab's front face is soil throughout.
    assert_eq!(raster.cell(0, 0), 0);
    assert_eq!(raster.cell(0, 31), 0);

    // The transparent pass stayed empty.
    assert_eq!(chunk.mesh(RenderPass::TRANSPARENT).vertex_count(), 0);
}

/// A generated chunk below the water level: soil floor, water column up to
/// the water line, no grass anywhere, and both passes meshed far below the
/// per-voxel face count.
#[test]
fn test_generated_underwater_terrain_floods_and_meshes() {
    let flat = |_: i32, _: i32| 40u8;
    let mut chunk = Chunk::generate(Point2::new(0, 0), &flat, 99);
    chunk.rebuild_mesh().unwrap();

    for x in 0..CHUNK_SIZE {
        for z in 0..CHUNK_SIZE {
            let column = |y| chunk.voxel_at(Point3::new(x, y, -z)).block_type();
            assert_eq!(column(40), BlockType::SOIL);
            assert_eq!(column(41), BlockType::WATER);
            assert_eq!(column(WATER_LEVEL), BlockType::WATER);
            assert_eq!(column(WATER_LEVEL + 1), BlockType::EMPTY);
            assert_ne!(column(0), BlockType::EMPTY);
            for y in 0..=WATER_LEVEL {
                assert_ne!(column(y), BlockType::GRASS);
            }
        }
    }

    let opaque = chunk.mesh(RenderPass::OPAQUE);
    let transparent = chunk.mesh(RenderPass::TRANSPARENT);
    assert!(opaque.vertex_count() > 0);
    assert!(transparent.vertex_count() > 0);

    // 41 solid rows of 1024 voxels would be ~1M vertices per-voxel; region
    // merging has to land far below that.
    let naive_vertices = 41 * 1024 * 24;
    assert!(opaque.vertex_count() < naive_vertices / 5);
}

/// The full pipeline: a Perlin-driven world generated across the worker
/// pool, deterministic per seed.
#[test]
fn test_parallel_world_generation_is_deterministic() {
    let seed = 7;
    let build = || {
        let heightfield: Arc<dyn Heightfield> = Arc::new(PerlinHeightfield::new(seed as u32));
        let mut world = World::new(1, seed, heightfield);
        world.recenter(Point2::new(0, 0));
        world
    };

    let first = build();
    let second = build();
    assert_eq!(first.loaded_chunks(), 9);

    let mut any_nonuniform = false;
    for dx in -1..=1 {
        for dz in -1..=1 {
            let coord = Point2::new(dx, dz);
            let a = first.chunk_at(coord).expect("chunk loaded");
            let b = second.chunk_at(coord).expect("chunk loaded");
            for pass in RenderPass::all() {
                assert_eq!(
                    a.mesh(pass).vertex_count(),
                    b.mesh(pass).vertex_count(),
                    "pass {:?} at ({}, {})",
                    pass,
                    dx,
                    dz
                );
                assert_eq!(a.mesh(pass).indices(), b.mesh(pass).indices());
            }
            assert!(a.mesh(RenderPass::OPAQUE).vertex_count() > 0);
            if a.mesh(RenderPass::OPAQUE).vertex_count()
                != first
                    .chunk_at(Point2::new(0, 0))
                    .expect("center loaded")
                    .mesh(RenderPass::OPAQUE)
                    .vertex_count()
            {
                any_nonuniform = true;
            }
        }
    }
    // The heightfield actually varies across chunks.
    assert!(any_nonuniform);
}

/// Editing a generated world through the public surface: carve a block out,
/// rebuild, and watch both the occupancy and the mesh respond.
#[test]
fn test_world_edits_round_trip_through_remesh() {
    let heightfield: Arc<dyn Heightfield> = Arc::new(|_: i32, _: i32| 80u8);
    let mut world = World::new(0, 3, heightfield);
    world.recenter(Point2::new(0, 0));

    let chunk = world.chunk_at_mut(Point2::new(0, 0)).expect("chunk loaded");
    // Pick a column whose surface is bare grass (no tree trunk or overhang).
    let top = (0..CHUNK_SIZE)
        .flat_map(|x| (0..CHUNK_SIZE).map(move |z| (x, -z)))
        .filter_map(|(x, z)| chunk.top_surface(x, z))
        .find(|&top| chunk.voxel_at(top).block_type() == BlockType::GRASS)
        .expect("some column is bare grass");

    let before = chunk.mesh(RenderPass::OPAQUE).vertex_count();
    assert!(chunk.remove_block(top));
    chunk.rebuild_mesh().unwrap();

    assert_eq!(chunk.voxel_at(top).block_type(), BlockType::EMPTY);
    assert_eq!(
        chunk.top_surface(top.x, top.z),
        Some(Point3::new(top.x, top.y - 1, top.z))
    );
    assert_ne!(chunk.mesh(RenderPass::OPAQUE).vertex_count(), before);
}

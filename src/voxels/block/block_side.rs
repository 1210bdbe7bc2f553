//! # Block Side Module
//!
//! This module defines the six faces of a voxel block, the face-mask set used
//! to select which faces of a cuboid get emitted, and the eight octants a
//! cuboid region splits into.
//!
//! The ordinal values here are a contract: face-mask bits, the mesher's
//! per-face vertex/texcoord tables and the emission order all share the
//! `BlockSide` ordinals, and octant ordinals are the 3-bit child codes of the
//! fill-state tree. Reordering any variant breaks that alignment.

use cgmath::Vector3;

/// The six faces of a voxel block.
///
/// The ordinal order is [FRONT, BACK, LEFT, RIGHT, TOP, BOTTOM] and doubles
/// as the bit position inside a [`FaceSet`]: `FaceSet` bit `1 << ordinal`
/// selects the face, and cuboid emission iterates faces in exactly this
/// order.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z; the near side under the negated-z
    /// depth convention)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The left face (facing negative X)
    LEFT = 2,

    /// The right face (facing positive X)
    RIGHT = 3,

    /// The top face (facing positive Y)
    TOP = 4,

    /// The bottom face (facing negative Y)
    BOTTOM = 5,
}

impl BlockSide {
    /// Returns all six faces in ordinal (emission) order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::LEFT,
            BlockSide::RIGHT,
            BlockSide::TOP,
            BlockSide::BOTTOM,
        ]
    }
}

/// A set of block faces, stored as one bit per [`BlockSide`] ordinal.
///
/// This replaces a hand-maintained bitmask enum: the named faces carry the
/// bit positions, so a mask can never drift out of order with the per-face
/// data tables.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct FaceSet(u8);

impl FaceSet {
    /// The empty set.
    pub const NONE: FaceSet = FaceSet(0);
    /// All six faces.
    pub const ALL: FaceSet = FaceSet(0b0011_1111);

    /// Builds a set containing the given faces.
    pub fn of(sides: &[BlockSide]) -> Self {
        let mut mask = 0;
        for side in sides {
            mask |= 1 << *side as u8;
        }
        FaceSet(mask)
    }

    /// Returns whether `side` is in the set.
    pub fn contains(self, side: BlockSide) -> bool {
        self.0 & (1 << side as u8) != 0
    }

    /// Returns this set with `side` removed.
    pub fn without(self, side: BlockSide) -> Self {
        FaceSet(self.0 & !(1 << side as u8))
    }

    /// Number of faces in the set.
    pub fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns whether the set is empty.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// The eight octants of a cuboid region in the fill-state tree.
///
/// The ordinal is the 3-bit child code: bit 2 is the upper y half, bit 1 is
/// the far z half (z grows in the negative direction, so "far" means more
/// negative), bit 0 is the right x half. `NEAR`/`FAR` refer to the depth
/// axis, `LEFT`/`RIGHT` to x, `BOTTOM`/`TOP` to y.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[allow(non_camel_case_types)]
pub enum Octant {
    /// Lower y, near z, left x (code 0b000)
    BOTTOM_NEAR_LEFT = 0,
    /// Lower y, near z, right x (code 0b001)
    BOTTOM_NEAR_RIGHT = 1,
    /// Lower y, far z, left x (code 0b010)
    BOTTOM_FAR_LEFT = 2,
    /// Lower y, far z, right x (code 0b011)
    BOTTOM_FAR_RIGHT = 3,
    /// Upper y, near z, left x (code 0b100)
    TOP_NEAR_LEFT = 4,
    /// Upper y, near z, right x (code 0b101)
    TOP_NEAR_RIGHT = 5,
    /// Upper y, far z, left x (code 0b110)
    TOP_FAR_LEFT = 6,
    /// Upper y, far z, right x (code 0b111)
    TOP_FAR_RIGHT = 7,
}

/// Unit corner offsets for each octant, in child-code order.
///
/// Scaling an entry by a node's half-extent gives the child node's origin
/// relative to the parent's. The z component is negated because depth grows
/// in the negative-z direction.
pub static OCTANT_CORNER_OFFSETS: [Vector3<i32>; 8] = [
    Vector3::new(0, 0, 0),
    Vector3::new(1, 0, 0),
    Vector3::new(0, 0, -1),
    Vector3::new(1, 0, -1),
    Vector3::new(0, 1, 0),
    Vector3::new(1, 1, 0),
    Vector3::new(0, 1, -1),
    Vector3::new(1, 1, -1),
];

impl Octant {
    /// Computes which octant of the region at `origin` with edge length
    /// `size` contains `point`.
    ///
    /// The comparisons operate on the negated/absolute z used by the depth
    /// convention: a point is in the far half when `|z|` is at least the
    /// region's `|origin.z|` plus the half-extent.
    pub fn containing(origin: cgmath::Point3<i32>, size: i32, point: cgmath::Point3<i32>) -> Self {
        let half = size / 2;
        let mut code = 0u8;
        if point.x >= origin.x + half {
            code |= 0b001;
        }
        if point.z.abs() >= origin.z.abs() + half {
            code |= 0b010;
        }
        if point.y >= origin.y + half {
            code |= 0b100;
        }
        Octant::from_code(code)
    }

    /// Converts a 3-bit child code back to its octant.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Octant::BOTTOM_NEAR_LEFT,
            1 => Octant::BOTTOM_NEAR_RIGHT,
            2 => Octant::BOTTOM_FAR_LEFT,
            3 => Octant::BOTTOM_FAR_RIGHT,
            4 => Octant::TOP_NEAR_LEFT,
            5 => Octant::TOP_NEAR_RIGHT,
            6 => Octant::TOP_FAR_LEFT,
            7 => Octant::TOP_FAR_RIGHT,
            _ => unreachable!("octant codes are 3 bits"),
        }
    }

    /// The origin of this octant's child region, given the parent's origin
    /// and edge length.
    pub fn child_origin(self, origin: cgmath::Point3<i32>, size: i32) -> cgmath::Point3<i32> {
        origin + OCTANT_CORNER_OFFSETS[self as usize] * (size / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    #[test]
    fn test_face_set_bits_follow_side_ordinals() {
        for side in BlockSide::all() {
            let set = FaceSet::of(&[side]);
            assert!(set.contains(side));
            assert_eq!(set.len(), 1);
            for other in BlockSide::all() {
                if other != side {
                    assert!(!set.contains(other));
                }
            }
        }
        assert_eq!(FaceSet::ALL.len(), 6);
        assert_eq!(FaceSet::ALL.without(BlockSide::BOTTOM).len(), 5);
        assert!(!FaceSet::ALL.without(BlockSide::BOTTOM).contains(BlockSide::BOTTOM));
    }

    #[test]
    fn test_octant_containing_splits_on_half_extent() {
        let origin = Point3::new(0, 64, 0);
        // Near-bottom-left corner of a 32-wide region.
        assert_eq!(
            Octant::containing(origin, 32, Point3::new(0, 64, 0)),
            Octant::BOTTOM_NEAR_LEFT
        );
        // Far-top-right corner.
        assert_eq!(
            Octant::containing(origin, 32, Point3::new(31, 95, -31)),
            Octant::TOP_FAR_RIGHT
        );
        // Just across the x and z half boundaries.
        assert_eq!(
            Octant::containing(origin, 32, Point3::new(16, 64, -15)),
            Octant::BOTTOM_NEAR_RIGHT
        );
        assert_eq!(
            Octant::containing(origin, 32, Point3::new(15, 64, -16)),
            Octant::BOTTOM_FAR_LEFT
        );
    }

    #[test]
    fn test_child_origin_matches_octant_code() {
        let origin = Point3::new(0, 0, 0);
        assert_eq!(
            Octant::TOP_FAR_RIGHT.child_origin(origin, 32),
            Point3::new(16, 16, -16)
        );
        assert_eq!(
            Octant::BOTTOM_NEAR_LEFT.child_origin(origin, 32),
            Point3::new(0, 0, 0)
        );
        // Octant round trip: the child computed for a point contains it.
        for code in 0..8u8 {
            let octant = Octant::from_code(code);
            assert_eq!(octant as u8, code);
        }
    }
}

//! Octagonal bounding volumes.
//!
//! An entity's footprint is an interval along each of five axes: the two
//! horizontal axes, the two 45° diagonals, and the vertical axis. The two
//! extra diagonal intervals cut the corners off a plain box, which matters a
//! lot when round-ish characters squeeze past each other in corridors.
//!
//! Note that the up direction is Z+.

use std::ops::{Index, IndexMut};

use enum_iterator::{all, Sequence};
use serde::{Deserialize, Serialize};

/// The axes of an octagonal bounding volume.
///
/// `Xy` is the diagonal that grows with `x + y` and `Yx` the one that grows
/// with `-x + y`. Diagonal coordinates are *not* scaled by `1/√2` here, so a
/// unit of distance along a diagonal axis is `√2` world units; the sweep
/// tests compensate for that where it matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Sequence, Serialize, Deserialize)]
pub enum Axis {
	X,
	Y,
	Xy,
	Yx,
	Z,
}

/// Number of spatial axes, which is also the fixed bound of every per-axis loop.
pub const AXIS_COUNT: usize = 5;

impl Axis {
	pub fn index(self) -> usize {
		match self {
			Axis::X => 0,
			Axis::Y => 1,
			Axis::Xy => 2,
			Axis::Yx => 3,
			Axis::Z => 4,
		}
	}

	pub fn is_diagonal(self) -> bool {
		matches!(self, Axis::Xy | Axis::Yx)
	}
}

/// A "vector" that measures distances along the axes of an octagonal
/// bounding volume (so five scalars, the diagonal ones being redundant
/// with the horizontal ones but precomputed once).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OctVec([f32; AXIS_COUNT]);

impl OctVec {
	pub fn zero() -> OctVec {
		OctVec([0.0; AXIS_COUNT])
	}

	pub fn from_vec3(v: cgmath::Vector3<f32>) -> OctVec {
		OctVec([v.x, v.y, v.x + v.y, -v.x + v.y, v.z])
	}

	pub fn from_point3(p: cgmath::Point3<f32>) -> OctVec {
		OctVec([p.x, p.y, p.x + p.y, -p.x + p.y, p.z])
	}
}

impl Index<Axis> for OctVec {
	type Output = f32;
	fn index(&self, axis: Axis) -> &f32 {
		&self.0[axis.index()]
	}
}
impl IndexMut<Axis> for OctVec {
	fn index_mut(&mut self, axis: Axis) -> &mut f32 {
		&mut self.0[axis.index()]
	}
}

/// The level-0 collision shape of an entity: a radius for the horizontal
/// axes, a (usually larger) radius for the diagonal axes, and a height.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bumper {
	pub size: f32,
	pub size_big: f32,
	pub height: f32,
}

impl Bumper {
	/// The octagonal volume of this shape, centered on the origin.
	pub fn to_oct_bb(self) -> OctBb {
		let mut bb = OctBb { mins: OctVec::zero(), maxs: OctVec::zero() };
		bb.mins[Axis::X] = -self.size;
		bb.maxs[Axis::X] = self.size;
		bb.mins[Axis::Y] = -self.size;
		bb.maxs[Axis::Y] = self.size;
		bb.mins[Axis::Xy] = -self.size_big;
		bb.maxs[Axis::Xy] = self.size_big;
		bb.mins[Axis::Yx] = -self.size_big;
		bb.maxs[Axis::Yx] = self.size_big;
		bb.mins[Axis::Z] = -self.height;
		bb.maxs[Axis::Z] = self.height;
		bb
	}
}

/// An octagonal bounding volume: one `[min, max]` interval per axis.
///
/// A volume whose interval is inverted (or flat) on any axis is degenerate;
/// `intersection` can produce such a volume and callers are expected to
/// check `is_empty` before trusting it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OctBb {
	pub mins: OctVec,
	pub maxs: OctVec,
}

impl OctBb {
	/// The smallest volume containing both `a` and `b`.
	pub fn union(a: &OctBb, b: &OctBb) -> OctBb {
		let mut dst = *a;
		for axis in all::<Axis>() {
			dst.mins[axis] = a.mins[axis].min(b.mins[axis]);
			dst.maxs[axis] = a.maxs[axis].max(b.maxs[axis]);
		}
		dst
	}

	/// The common part of `a` and `b`, possibly empty (see `is_empty`).
	pub fn intersection(a: &OctBb, b: &OctBb) -> OctBb {
		let mut dst = *a;
		for axis in all::<Axis>() {
			dst.mins[axis] = a.mins[axis].max(b.mins[axis]);
			dst.maxs[axis] = a.maxs[axis].min(b.maxs[axis]);
		}
		dst
	}

	/// The same volume shifted by a world-space vector.
	pub fn translated(&self, offset: cgmath::Vector3<f32>) -> OctBb {
		let offset = OctVec::from_vec3(offset);
		let mut dst = *self;
		for axis in all::<Axis>() {
			dst.mins[axis] = self.mins[axis] + offset[axis];
			dst.maxs[axis] = self.maxs[axis] + offset[axis];
		}
		dst
	}

	pub fn is_empty(&self) -> bool {
		all::<Axis>().any(|axis| self.mins[axis] >= self.maxs[axis])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn unit_cube() -> OctBb {
		Bumper { size: 1.0, size_big: 2.0, height: 1.0 }.to_oct_bb()
	}

	#[test]
	fn oct_vec_diagonals() {
		let v = OctVec::from_vec3(cgmath::vec3(2.0, 3.0, 5.0));
		assert_eq!(v[Axis::X], 2.0);
		assert_eq!(v[Axis::Y], 3.0);
		assert_eq!(v[Axis::Xy], 5.0);
		assert_eq!(v[Axis::Yx], 1.0);
		assert_eq!(v[Axis::Z], 5.0);
	}

	#[test]
	fn bumper_shape() {
		let bb = unit_cube();
		assert_eq!(bb.mins[Axis::X], -1.0);
		assert_eq!(bb.maxs[Axis::Xy], 2.0);
		assert_eq!(bb.mins[Axis::Z], -1.0);
		assert!(!bb.is_empty());
	}

	#[test]
	fn union_and_intersection() {
		let a = unit_cube();
		let b = unit_cube().translated(cgmath::vec3(1.0, 0.0, 0.0));
		let u = OctBb::union(&a, &b);
		assert_eq!(u.mins[Axis::X], -1.0);
		assert_eq!(u.maxs[Axis::X], 2.0);
		let i = OctBb::intersection(&a, &b);
		assert_eq!(i.mins[Axis::X], 0.0);
		assert_eq!(i.maxs[Axis::X], 1.0);
		assert!(!i.is_empty());
	}

	#[test]
	fn disjoint_intersection_is_empty() {
		let a = unit_cube();
		let b = unit_cube().translated(cgmath::vec3(10.0, 0.0, 0.0));
		assert!(OctBb::intersection(&a, &b).is_empty());
	}

	#[test]
	fn translation_moves_diagonals_too() {
		let bb = unit_cube().translated(cgmath::vec3(1.0, 2.0, 3.0));
		assert_eq!(bb.mins[Axis::Xy], -2.0 + 3.0);
		assert_eq!(bb.mins[Axis::Yx], -2.0 + 1.0);
		assert_eq!(bb.maxs[Axis::Z], 1.0 + 3.0);
	}
}

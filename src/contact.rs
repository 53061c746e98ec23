//! Contact normal estimation for overlapping character pairs.

use cgmath::InnerSpace;

use crate::volume::{Axis, OctVec};

/// Estimates the direction along which entity `a` should be pushed to get it
/// out of entity `b`, from the per-axis penetration depths of the pair.
///
/// Each axis with positive depth contributes `1 / (depth / tolerance)^exponent`
/// towards the side of `a`, so the shallowest penetration dominates; the
/// diagonal axes feed both horizontal components (the `-x + y` diagonal with
/// opposite signs), and the vertical axis has its depth additionally scaled
/// by the exponent. This is an empirical weighting tuned for how it feels in
/// play, not an exact closest-point normal.
///
/// Non-positive depths mean no penetration on that axis and contribute
/// nothing. Returns `None` when nothing penetrates at all (the degenerate
/// zero vector cannot be normalized). `tolerance` is the platform tolerance
/// from the physics configuration.
pub fn estimate_push_normal(
	opos_a: &OctVec,
	opos_b: &OctVec,
	depths: &OctVec,
	exponent: f32,
	tolerance: f32,
) -> Option<cgmath::Vector3<f32>> {
	let mut normal = cgmath::vec3(0.0_f32, 0.0, 0.0);

	// Towards a: -1 when b is ahead of a on the axis, else +1.
	let side = |axis: Axis| if opos_b[axis] - opos_a[axis] > 0.0 { -1.0_f32 } else { 1.0 };

	if depths[Axis::X] > 0.0 {
		normal.x += side(Axis::X) / (depths[Axis::X] / tolerance).powf(exponent);
	}
	if depths[Axis::Y] > 0.0 {
		normal.y += side(Axis::Y) / (depths[Axis::Y] / tolerance).powf(exponent);
	}
	if depths[Axis::Xy] > 0.0 {
		let contribution = side(Axis::Xy) / (depths[Axis::Xy] / tolerance).powf(exponent);
		normal.x += contribution;
		normal.y += contribution;
	}
	if depths[Axis::Yx] > 0.0 {
		let contribution = side(Axis::Yx) / (depths[Axis::Yx] / tolerance).powf(exponent);
		normal.x -= contribution;
		normal.y += contribution;
	}
	if depths[Axis::Z] > 0.0 {
		normal.z += side(Axis::Z) / (exponent * depths[Axis::Z] / tolerance).powf(exponent);
	}

	(normal.magnitude2() > 0.0).then(|| normal.normalize())
}

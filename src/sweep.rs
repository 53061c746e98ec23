//! Swept-volume interaction windows.
//!
//! Every simulation tick, for every interacting pair of moving entities, the
//! movement step asks: over what sub-interval of this step do these two
//! volumes actually overlap? A start/end position check would let a fast
//! projectile tunnel straight through a character, so the test is done on
//! the continuous, time-parameterized motion instead: each axis yields a
//! window of fractional-step times during which the two projections overlap,
//! and the pair's window is the intersection of all of them.

use cgmath::{EuclideanSpace, Zero};
use enum_iterator::all;

use crate::volume::{Axis, OctBb, OctVec};

/// A sub-interval of the current simulation step, in fractional-step time:
/// `0.0` is the start of the step and `1.0` its end. The window may reach
/// outside the step before clipping (a negative `start` means the overlap
/// began on an earlier tick).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
	pub start: f32,
	pub end: f32,
}

impl TimeWindow {
	pub const WHOLE_STEP: TimeWindow = TimeWindow { start: 0.0, end: 1.0 };

	/// An inverted window means no overlap at all.
	pub fn is_empty(self) -> bool {
		self.end < self.start
	}

	pub fn intersection(self, other: TimeWindow) -> TimeWindow {
		TimeWindow { start: self.start.max(other.start), end: self.end.min(other.end) }
	}

	pub fn clamped_to_step(self) -> TimeWindow {
		TimeWindow { start: self.start.clamp(0.0, 1.0), end: self.end.clamp(0.0, 1.0) }
	}
}

/// An entity's motion over one simulation step: its centered bounding
/// volume, where it is, and how fast it moves. Built per call, not stored.
#[derive(Debug, Clone, Copy)]
pub struct SweptBody {
	/// The entity's octagonal volume, centered on the origin.
	pub volume: OctBb,
	pub pos: cgmath::Point3<f32>,
	pub vel: cgmath::Vector3<f32>,
}

/// Which per-axis test `sweep_intersect` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tolerance {
	/// Edge-to-edge projections; the test for ordinary entity pairs.
	Strict,
	/// Center-to-edge projections on the horizontal and diagonal axes,
	/// giving a looser window suited to "is this entity on that platform"
	/// containment checks.
	Close,
}

/// Outcome of sweeping one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum AxisSweep {
	/// Zero relative velocity on this axis: the projections overlap either
	/// for the whole step or never, and a single axis cannot tell which.
	NoRelativeMotion,
	/// The projections never overlap, no matter the time.
	NoOverlap,
	/// The projections overlap during this window.
	Window(TimeWindow),
}

fn normalized_for_axis(axis: Axis, start: f32, end: f32) -> AxisSweep {
	// A unit of distance along a diagonal axis is √2 world units,
	// so the boundary times get scaled back accordingly.
	let (start, end) = if axis.is_diagonal() {
		(
			start * std::f32::consts::FRAC_1_SQRT_2,
			end * std::f32::consts::FRAC_1_SQRT_2,
		)
	} else {
		(start, end)
	};
	let window = TimeWindow { start, end };
	if window.is_empty() {
		AxisSweep::NoOverlap
	} else {
		AxisSweep::Window(window)
	}
}

/// The window of times during which the projections of the two moving
/// volumes onto `axis` overlap, edge to edge.
pub(crate) fn axis_window(
	axis: Axis,
	a: &OctBb,
	a_pos: &OctVec,
	a_vel: &OctVec,
	b: &OctBb,
	b_pos: &OctVec,
	b_vel: &OctVec,
) -> AxisSweep {
	let diff = b_vel[axis] - a_vel[axis];
	if diff == 0.0 {
		return AxisSweep::NoRelativeMotion;
	}

	// Times at which each pair of (min, max) boundaries coincide.
	let times = [
		((a.mins[axis] + a_pos[axis]) - (b.mins[axis] + b_pos[axis])) / diff,
		((a.mins[axis] + a_pos[axis]) - (b.maxs[axis] + b_pos[axis])) / diff,
		((a.maxs[axis] + a_pos[axis]) - (b.mins[axis] + b_pos[axis])) / diff,
		((a.maxs[axis] + a_pos[axis]) - (b.maxs[axis] + b_pos[axis])) / diff,
	];
	let start = times.iter().copied().fold(f32::INFINITY, f32::min);
	let end = times.iter().copied().fold(f32::NEG_INFINITY, f32::max);

	normalized_for_axis(axis, start, end)
}

/// Close-tolerance variant of `axis_window`: on the horizontal and diagonal
/// axes the distance that matters is between one volume's *center* and the
/// other volume's edges (both ways, union of the two windows), not edge to
/// edge. The vertical axis keeps the strict test.
pub(crate) fn axis_window_close(
	axis: Axis,
	a: &OctBb,
	a_pos: &OctVec,
	a_vel: &OctVec,
	b: &OctBb,
	b_pos: &OctVec,
	b_vel: &OctVec,
) -> AxisSweep {
	if axis == Axis::Z {
		// No special treatment vertically.
		return axis_window(axis, a, a_pos, a_vel, b, b_pos, b_vel);
	}

	let diff = b_vel[axis] - a_vel[axis];
	if diff == 0.0 {
		return AxisSweep::NoRelativeMotion;
	}

	// a's center crossing b's edges, and a's edges crossing b's center.
	let times = [
		(a_pos[axis] - (b.mins[axis] + b_pos[axis])) / diff,
		(a_pos[axis] - (b.maxs[axis] + b_pos[axis])) / diff,
		((a.mins[axis] + a_pos[axis]) - b_pos[axis]) / diff,
		((a.maxs[axis] + a_pos[axis]) - b_pos[axis]) / diff,
	];
	// Union of the two candidate windows.
	let start = times.iter().copied().fold(f32::INFINITY, f32::min);
	let end = times.iter().copied().fold(f32::NEG_INFINITY, f32::max);

	normalized_for_axis(axis, start, end)
}

/// What `sweep_intersect` reports when the pair does interact.
#[derive(Debug, Clone, Copy)]
pub struct Interaction {
	/// When the two swept volumes overlap, clipped to the current step
	/// (`start` may stay negative down to the start of the session when the
	/// overlap began on an earlier tick).
	pub window: TimeWindow,
	/// The spatial intersection of the two swept volumes over the clipped
	/// window; only computed when asked for.
	pub region: Option<OctBb>,
}

/// Whether, and when, two moving volumes interact during the current step.
///
/// Returns `None` when the swept volumes never overlap within the step; that
/// is an expected outcome, not an error. `elapsed_ticks` is how many ticks
/// the session has been running, used only to bound how far into the past
/// the window start may be extrapolated.
pub fn sweep_intersect(
	a: &SweptBody,
	b: &SweptBody,
	tolerance: Tolerance,
	elapsed_ticks: u64,
	want_region: bool,
) -> Option<Interaction> {
	if a.vel == b.vel {
		// No relative motion at all: the per-axis algebra cannot say
		// anything, but a static overlap check settles it for the whole step.
		return whole_step_interaction(a, b, want_region);
	}

	let a_pos = OctVec::from_point3(a.pos);
	let a_vel = OctVec::from_vec3(a.vel);
	let b_pos = OctVec::from_point3(b.pos);
	let b_vel = OctVec::from_vec3(b.vel);

	let mut combined: Option<TimeWindow> = None;
	for axis in all::<Axis>() {
		let swept = match tolerance {
			Tolerance::Strict => axis_window(axis, &a.volume, &a_pos, &a_vel, &b.volume, &b_pos, &b_vel),
			Tolerance::Close => {
				axis_window_close(axis, &a.volume, &a_pos, &a_vel, &b.volume, &b_pos, &b_vel)
			},
		};
		match swept {
			AxisSweep::NoRelativeMotion => {},
			AxisSweep::NoOverlap => return None,
			AxisSweep::Window(window) => {
				let tightened = match combined {
					None => window,
					Some(so_far) => so_far.intersection(window),
				};
				if tightened.is_empty() {
					return None;
				}
				combined = Some(tightened);
			},
		}
	}

	let Some(mut window) = combined else {
		// Every single axis reported zero relative velocity. The top-level
		// shortcut should already have caught this, but it is kept as its
		// own path with the same whole-step meaning.
		return whole_step_interaction(a, b, want_region);
	};

	// Entirely before or entirely after the current step.
	if window.start > 1.0 || window.end < 0.0 {
		return None;
	}

	// Clip to the step, letting `start` reach back at most to the start of
	// the session (which bounds runaway negative extrapolation).
	window.start = window.start.max(-(elapsed_ticks as f32));
	window.end = window.end.min(1.0);

	let region = if want_region {
		let step_window = window.clamped_to_step();
		let at_a = a.volume.translated(a.pos.to_vec());
		let at_b = b.volume.translated(b.pos.to_vec());
		let swept_a = expand_swept(&at_a, a.vel, step_window);
		let swept_b = expand_swept(&at_b, b.vel, step_window);
		let region = OctBb::intersection(&swept_a, &swept_b);
		if region.is_empty() {
			return None;
		}
		Some(region)
	} else {
		None
	};

	Some(Interaction { window, region })
}

/// The degenerate case where the two bodies do not move relative to each
/// other: they either overlap for the whole step or never.
fn whole_step_interaction(a: &SweptBody, b: &SweptBody, want_region: bool) -> Option<Interaction> {
	let at_a = a.volume.translated(a.pos.to_vec());
	let at_b = b.volume.translated(b.pos.to_vec());
	let overlap = OctBb::intersection(&at_a, &at_b);
	if overlap.is_empty() {
		return None;
	}
	Some(Interaction {
		window: TimeWindow::WHOLE_STEP,
		region: want_region.then_some(overlap),
	})
}

/// The territory a moving volume covers between `window.start` and
/// `window.end` of the current step: the union of the volume at both ends.
pub fn expand_swept(
	volume_at_pos: &OctBb,
	vel: cgmath::Vector3<f32>,
	window: TimeWindow,
) -> OctBb {
	if vel.is_zero() {
		return *volume_at_pos;
	}
	let at_start = if window.start == 0.0 {
		*volume_at_pos
	} else {
		volume_at_pos.translated(vel * window.start)
	};
	let at_end = if window.end == 0.0 {
		*volume_at_pos
	} else {
		volume_at_pos.translated(vel * window.end)
	};
	OctBb::union(&at_start, &at_end)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::volume::Bumper;
	use rand::{rngs::SmallRng, Rng, SeedableRng};

	fn body(
		size: f32,
		size_big: f32,
		height: f32,
		pos: (f32, f32, f32),
		vel: (f32, f32, f32),
	) -> SweptBody {
		SweptBody {
			volume: Bumper { size, size_big, height }.to_oct_bb(),
			pos: cgmath::point3(pos.0, pos.1, pos.2),
			vel: cgmath::vec3(vel.0, vel.1, vel.2),
		}
	}

	/// Volumes `[-1, 1]` on every horizontal and diagonal axis.
	fn square_body(pos: (f32, f32, f32), vel: (f32, f32, f32)) -> SweptBody {
		body(1.0, 1.0, 1.0, pos, vel)
	}

	#[test]
	fn approaching_pair_window() {
		// A gap of 1 between the facing edges, closed at speed 3: overlap
		// starts at t = 1/3 and holds through the end of the step.
		let a = square_body((0.0, 0.0, 0.0), (0.0, 0.0, 0.0));
		let b = square_body((3.0, 0.0, 0.0), (-3.0, 0.0, 0.0));
		let interaction = sweep_intersect(&a, &b, Tolerance::Strict, 100, false).unwrap();
		assert!((interaction.window.start - 1.0 / 3.0).abs() < 1e-5);
		assert!((interaction.window.end - 1.0).abs() < 1e-5);
	}

	#[test]
	fn too_slow_to_close_the_gap() {
		let a = square_body((0.0, 0.0, 0.0), (0.0, 0.0, 0.0));
		let b = square_body((3.0, 0.0, 0.0), (-0.5, 0.0, 0.0));
		assert!(sweep_intersect(&a, &b, Tolerance::Strict, 100, false).is_none());
	}

	#[test]
	fn no_relative_motion_overlapping() {
		let a = square_body((0.0, 0.0, 0.0), (2.0, 1.0, 0.0));
		let b = square_body((1.0, 0.0, 0.0), (2.0, 1.0, 0.0));
		let interaction = sweep_intersect(&a, &b, Tolerance::Strict, 100, true).unwrap();
		assert_eq!(interaction.window, TimeWindow::WHOLE_STEP);
		assert!(interaction.region.is_some_and(|region| !region.is_empty()));
	}

	#[test]
	fn no_relative_motion_separated() {
		// Same velocities and no overlap at any fixed offset: never interact,
		// even though both swept paths cross the same territory.
		let a = square_body((0.0, 0.0, 0.0), (5.0, 0.0, 0.0));
		let b = square_body((3.0, 0.0, 0.0), (5.0, 0.0, 0.0));
		assert!(sweep_intersect(&a, &b, Tolerance::Strict, 100, true).is_none());
	}

	#[test]
	fn combined_window_within_every_axis_window() {
		let a = square_body((0.0, 0.0, 0.0), (0.0, 0.0, 0.0));
		let b = square_body((4.0, 3.0, 1.0), (-3.0, -2.0, -1.0));
		let interaction = sweep_intersect(&a, &b, Tolerance::Strict, 100, false);
		let Some(interaction) = interaction else {
			panic!("expected an interaction");
		};
		let a_pos = OctVec::from_point3(a.pos);
		let a_vel = OctVec::from_vec3(a.vel);
		let b_pos = OctVec::from_point3(b.pos);
		let b_vel = OctVec::from_vec3(b.vel);
		for axis in enum_iterator::all::<Axis>() {
			if let AxisSweep::Window(window) =
				axis_window(axis, &a.volume, &a_pos, &a_vel, &b.volume, &b_pos, &b_vel)
			{
				assert!(interaction.window.start >= window.start - 1e-5);
				assert!(interaction.window.end <= window.end + 1e-5);
			}
		}
	}

	#[test]
	fn clipped_window_with_region_stays_in_step() {
		let a = square_body((0.0, 0.0, 0.0), (0.0, 0.0, 0.0));
		let b = square_body((3.0, 0.0, 0.0), (-3.0, 0.0, 0.0));
		let interaction = sweep_intersect(&a, &b, Tolerance::Strict, 100, true).unwrap();
		assert!(0.0 <= interaction.window.start);
		assert!(interaction.window.start <= interaction.window.end);
		assert!(interaction.window.end <= 1.0);
		assert!(interaction.region.is_some_and(|region| !region.is_empty()));
	}

	#[test]
	fn swap_symmetry() {
		let mut rng = SmallRng::seed_from_u64(0x0c7a90);
		for _ in 0..200 {
			let mut random_body = || {
				let size = rng.gen_range(0.2..2.0);
				body(
					size,
					size * rng.gen_range(1.0..1.5),
					rng.gen_range(0.2..3.0),
					(
						rng.gen_range(-6.0..6.0),
						rng.gen_range(-6.0..6.0),
						rng.gen_range(-3.0..3.0),
					),
					(
						rng.gen_range(-5.0..5.0),
						rng.gen_range(-5.0..5.0),
						rng.gen_range(-5.0..5.0),
					),
				)
			};
			let a = random_body();
			let b = random_body();
			let ab = sweep_intersect(&a, &b, Tolerance::Strict, 50, false);
			let ba = sweep_intersect(&b, &a, Tolerance::Strict, 50, false);
			match (ab, ba) {
				(None, None) => {},
				(Some(ab), Some(ba)) => {
					assert!((ab.window.start - ba.window.start).abs() < 1e-4);
					assert!((ab.window.end - ba.window.end).abs() < 1e-4);
				},
				(ab, ba) => panic!("asymmetric outcome: {ab:?} vs {ba:?}"),
			}
		}
	}

	#[test]
	fn close_test_uses_center_to_edge_distances() {
		// a's center (at 0) crosses b's near edge (at 2) at t = 2/3 and its
		// far edge (at 4) at t = 4/3; a's own edges against b's center give
		// the same bounds from the other side.
		let a = square_body((0.0, 0.0, 0.0), (0.0, 0.0, 0.0));
		let b = square_body((3.0, 0.0, 0.0), (-3.0, 0.0, 0.0));
		let a_pos = OctVec::from_point3(a.pos);
		let a_vel = OctVec::from_vec3(a.vel);
		let b_pos = OctVec::from_point3(b.pos);
		let b_vel = OctVec::from_vec3(b.vel);
		let swept =
			axis_window_close(Axis::X, &a.volume, &a_pos, &a_vel, &b.volume, &b_pos, &b_vel);
		let AxisSweep::Window(window) = swept else {
			panic!("expected a window, got {swept:?}");
		};
		assert!((window.start - 2.0 / 3.0).abs() < 1e-5);
		assert!((window.end - 4.0 / 3.0).abs() < 1e-5);
	}

	#[test]
	fn expand_swept_covers_both_ends() {
		let volume = square_body((0.0, 0.0, 0.0), (0.0, 0.0, 0.0)).volume;
		let swept = expand_swept(&volume, cgmath::vec3(4.0, 0.0, 0.0), TimeWindow::WHOLE_STEP);
		assert_eq!(swept.mins[Axis::X], -1.0);
		assert_eq!(swept.maxs[Axis::X], 5.0);
		let still = expand_swept(&volume, cgmath::vec3(0.0, 0.0, 0.0), TimeWindow::WHOLE_STEP);
		assert_eq!(still, volume);
	}
}

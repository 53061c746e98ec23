//! Per-entity accumulators for the movement step.
//!
//! During one tick every interaction (platform ride, collision pressure,
//! impulses) deposits its adjustment into an accumulator instead of touching
//! the entity's pose directly; the pose is then integrated once, at the end
//! of the step, from the accumulated totals.

use cgmath::{InnerSpace, Zero};
use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;

/// The adjustments gathered for one entity over one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accumulators {
	/// Position shifts from platform interactions (kept apart from the
	/// collision shifts because platforms also suck their riders downwards
	/// when descending, which must not be damped like pressure is).
	pub pos_platform: cgmath::Vector3<f32>,
	/// Position shifts from collision "pressure".
	pub pos_collision: cgmath::Vector3<f32>,
	/// Velocity changes, mostly collision impulses.
	pub vel: cgmath::Vector3<f32>,
}

impl Accumulators {
	pub fn new() -> Accumulators {
		Accumulators {
			pos_platform: cgmath::Vector3::zero(),
			pos_collision: cgmath::Vector3::zero(),
			vel: cgmath::Vector3::zero(),
		}
	}

	pub fn clear(&mut self) {
		*self = Accumulators::new();
	}

	/// Applies the accumulated adjustments to a pose over `dt` of a step
	/// (`dt == 1.0` is a whole step).
	pub fn integrate(
		&self,
		pos: &mut cgmath::Point3<f32>,
		vel: &mut cgmath::Vector3<f32>,
		dt: f32,
	) {
		if dt == 0.0 {
			return;
		}
		let displacement = self.pos_platform + self.pos_collision;
		*pos += *vel * dt + displacement;
		*vel += self.vel * dt;
	}

	/// Damps the accumulated collision adjustments against the surface the
	/// entity stands on, and returns the effective normal acceleration that
	/// was taken out of the velocity accumulator.
	pub fn damp_against_surface(
		&mut self,
		normal: cgmath::Vector3<f32>,
		para_factor: f32,
		perp_factor: f32,
		config: &PhysicsConfig,
	) -> cgmath::Vector3<f32> {
		self.pos_collision =
			apply_normal_acceleration(self.pos_collision, normal, para_factor, perp_factor, config);
		let before = self.vel;
		self.vel = apply_normal_acceleration(self.vel, normal, para_factor, perp_factor, config);
		self.vel - before
	}
}

impl Default for Accumulators {
	fn default() -> Accumulators {
		Accumulators::new()
	}
}

/// Splits `acc` into parts parallel and perpendicular to the surface
/// `normal` and scales them separately, which is how the net effect of a
/// surface's normal force enters the simulation. The perpendicular part is
/// only damped when it pushes into the surface.
///
/// A zero-length normal falls back to flat ground (against gravity).
pub fn apply_normal_acceleration(
	acc: cgmath::Vector3<f32>,
	normal: cgmath::Vector3<f32>,
	para_factor: f32,
	perp_factor: f32,
	config: &PhysicsConfig,
) -> cgmath::Vector3<f32> {
	if acc.is_zero() {
		return acc;
	}
	if para_factor == 1.0 && perp_factor == 1.0 {
		return acc;
	}
	if para_factor == 0.0 && perp_factor == 0.0 {
		return cgmath::Vector3::zero();
	}

	let normal = if normal.is_zero() {
		cgmath::vec3(0.0, 0.0, -config.gravity.signum())
	} else {
		normal
	};

	let dot = acc.dot(normal);
	let perp = normal * dot;
	let para = acc - perp;

	let perp = if dot < 0.0 && perp_factor != 1.0 { perp * perp_factor } else { perp };
	let para = if para_factor != 1.0 { para * para_factor } else { para };

	para + perp
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn integration_applies_displacements_then_impulses() {
		let mut acc = Accumulators::new();
		acc.pos_platform = cgmath::vec3(0.5, 0.0, 0.0);
		acc.pos_collision = cgmath::vec3(0.0, 0.25, 0.0);
		acc.vel = cgmath::vec3(0.0, 0.0, -1.0);
		let mut pos = cgmath::point3(0.0, 0.0, 0.0);
		let mut vel = cgmath::vec3(1.0, 0.0, 0.0);
		acc.integrate(&mut pos, &mut vel, 1.0);
		assert_eq!(pos, cgmath::point3(1.5, 0.25, 0.0));
		assert_eq!(vel, cgmath::vec3(1.0, 0.0, -1.0));
	}

	#[test]
	fn zero_dt_is_a_no_op() {
		let mut acc = Accumulators::new();
		acc.pos_collision = cgmath::vec3(3.0, 0.0, 0.0);
		let mut pos = cgmath::point3(0.0, 0.0, 0.0);
		let mut vel = cgmath::vec3(1.0, 0.0, 0.0);
		acc.integrate(&mut pos, &mut vel, 0.0);
		assert_eq!(pos, cgmath::point3(0.0, 0.0, 0.0));
	}

	#[test]
	fn flat_ground_cancels_gravity() {
		let config = PhysicsConfig::default();
		let falling = cgmath::vec3(0.0, 0.0, -1.0);
		let up = cgmath::vec3(0.0, 0.0, 1.0);
		let damped = apply_normal_acceleration(falling, up, 1.0, 0.0, &config);
		assert_eq!(damped, cgmath::vec3(0.0, 0.0, 0.0));
	}

	#[test]
	fn sliding_keeps_the_parallel_part() {
		let config = PhysicsConfig::default();
		let acc = cgmath::vec3(2.0, 0.0, -1.0);
		let up = cgmath::vec3(0.0, 0.0, 1.0);
		let damped = apply_normal_acceleration(acc, up, 1.0, 0.0, &config);
		assert_eq!(damped, cgmath::vec3(2.0, 0.0, 0.0));
	}

	#[test]
	fn acceleration_away_from_the_surface_is_untouched() {
		let config = PhysicsConfig::default();
		let jumping = cgmath::vec3(0.0, 0.0, 2.0);
		let up = cgmath::vec3(0.0, 0.0, 1.0);
		let damped = apply_normal_acceleration(jumping, up, 1.0, 0.0, &config);
		assert_eq!(damped, jumping);
	}

	#[test]
	fn zero_normal_falls_back_to_flat_ground() {
		let config = PhysicsConfig::default();
		let falling = cgmath::vec3(0.0, 0.0, -1.0);
		let damped =
			apply_normal_acceleration(falling, cgmath::Vector3::zero(), 1.0, 0.0, &config);
		assert_eq!(damped, cgmath::vec3(0.0, 0.0, 0.0));
	}
}

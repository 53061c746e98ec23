//! Physics tuning values.
//!
//! Everything that used to be a tweakable global (gravity, the various
//! frictions, platform behavior) lives in one explicit struct that the
//! movement step passes down to the routines that need it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
	/// Gravitational acceleration; negative pulls downwards.
	pub gravity: f32,
	/// Extra downhill pull on sloped ground.
	pub hill_slide: f32,
	/// Fraction of velocity kept after one step of air drag.
	pub air_friction: f32,
	/// Drag while submerged.
	pub water_friction: f32,
	/// Ground friction on slippery tiles.
	pub slippy_friction: f32,
	/// Ground friction on ordinary tiles.
	pub noslip_friction: f32,
	/// How strongly a character sticks to the platform it stands on.
	pub platform_stick: f32,
	/// Vertical reach of platform containment tests, and the depth scale of
	/// the contact normal estimate.
	pub platform_tolerance: f32,
	/// Ambient wind, dragging airborne entities.
	pub wind_speed: cgmath::Vector3<f32>,
	/// Ambient current, dragging submerged entities.
	pub water_speed: cgmath::Vector3<f32>,
}

impl Default for PhysicsConfig {
	fn default() -> PhysicsConfig {
		PhysicsConfig {
			gravity: -1.0,
			hill_slide: 1.0,
			air_friction: 0.91,
			water_friction: 0.80,
			slippy_friction: 1.0,
			noslip_friction: 0.91,
			platform_stick: 0.5,
			platform_tolerance: 50.0,
			wind_speed: cgmath::vec3(0.0, 0.0, 0.0),
			water_speed: cgmath::vec3(0.0, 0.0, 0.0),
		}
	}
}

//! Last-known-valid position snapshots, a.k.a. breadcrumbs.
//!
//! Collision resolution can shove an entity into terrain it cannot stand in
//! (a closing door, a collapsing bridge, plain pressure from a crowd). Each
//! entity class keeps a short trail of recently-visited valid positions,
//! keyed by terrain grid cell, and a stuck entity gets teleported back onto
//! its trail. The trail has a fixed capacity; when it is full the oldest
//! snapshot gets recycled.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::terrain::{BlockingBits, GridCell, TerrainProbe};

/// How many breadcrumbs an entity class keeps by default.
pub const DEFAULT_CAPACITY: usize = 32;

/// One cached position snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breadcrumb {
	/// Tick at which the snapshot was taken.
	pub time: u64,
	/// Breaks ties between snapshots taken on the same tick; stamped by the
	/// owning list, larger is newer.
	id: u64,
	/// The stored position, snapped horizontally to its grid cell center.
	pub pos: cgmath::Point3<f32>,
	/// The cell the position is in, `None` when off the terrain.
	pub grid: Option<GridCell>,
	/// Blocking mask of the entity at snapshot time.
	pub bits: BlockingBits,
	/// Bounding radius of the entity at snapshot time.
	pub radius: f32,
	/// Still consistent with the current terrain? Cleared by `validate`
	/// when the terrain no longer accepts the position.
	pub valid: bool,
}

impl Breadcrumb {
	/// Snapshots the given pose: the position is snapped to its cell center
	/// and the initial validity comes straight from the terrain query.
	pub fn from_pose(
		terrain: &impl TerrainProbe,
		time: u64,
		pos: cgmath::Point3<f32>,
		radius: f32,
		bits: BlockingBits,
	) -> Breadcrumb {
		let pos = terrain.snap_to_cell_center(pos);
		let grid = terrain.grid_cell_of(pos);
		let valid = !terrain.is_blocked(pos, radius, bits);
		Breadcrumb { time, id: 0, pos, grid, bits, radius, valid }
	}

	pub fn id(&self) -> u64 {
		self.id
	}

	/// Age order is lexicographic on `(time, id)`; larger is newer.
	fn age_key(&self) -> (u64, u64) {
		(self.time, self.id)
	}
}

/// A capacity-bounded trail of breadcrumbs for one entity class.
///
/// Only ever grows up to its capacity; a full list recycles its oldest
/// entry. A disabled list refuses every operation (queries return `None`,
/// mutations do nothing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreadcrumbList {
	enabled: bool,
	capacity: usize,
	next_id: u64,
	entries: SmallVec<[Breadcrumb; DEFAULT_CAPACITY]>,
}

impl BreadcrumbList {
	pub fn new(capacity: usize) -> BreadcrumbList {
		BreadcrumbList {
			enabled: true,
			capacity,
			next_id: 0,
			entries: SmallVec::new(),
		}
	}

	pub fn with_default_capacity() -> BreadcrumbList {
		BreadcrumbList::new(DEFAULT_CAPACITY)
	}

	pub fn set_enabled(&mut self, enabled: bool) {
		self.enabled = enabled;
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn is_full(&self) -> bool {
		self.entries.len() >= self.capacity
	}

	pub fn entries(&self) -> &[Breadcrumb] {
		&self.entries
	}

	/// Records a snapshot. The newest entry already covering the snapshot's
	/// spot is refreshed in place; otherwise the snapshot goes into a free
	/// slot, or recycles the oldest entry (preferring one in the same cell)
	/// when the list is full. Returns `false` when the list is disabled or
	/// has nowhere to put the snapshot.
	pub fn insert(&mut self, snapshot: Breadcrumb, terrain: &impl TerrainProbe) -> bool {
		if !self.enabled {
			return false;
		}

		if let Some(index) = self.newest_index() {
			if Self::same_spot(&self.entries[index], &snapshot, terrain.cell_size()) {
				self.overwrite(index, snapshot);
				return true;
			}
		}

		if self.is_full() {
			self.compact();
		}
		if self.is_full() {
			let recycled = self
				.oldest_index_in_cell(snapshot.grid)
				.or_else(|| self.oldest_index());
			let Some(index) = recycled else {
				return false;
			};
			self.overwrite(index, snapshot);
			true
		} else {
			let id = self.fresh_id();
			let mut snapshot = snapshot;
			snapshot.id = id;
			self.entries.push(snapshot);
			true
		}
	}

	/// Re-checks every entry against the current terrain, drops the ones it
	/// no longer accepts, and sorts the remainder ascending by `(time, id)`.
	pub fn validate(&mut self, terrain: &impl TerrainProbe) {
		if !self.enabled {
			return;
		}

		let mut invalidated = 0_usize;
		for bc in self.entries.iter_mut() {
			if bc.valid && terrain.is_blocked(bc.pos, bc.radius, bc.bits) {
				bc.valid = false;
				invalidated += 1;
			}
		}
		if invalidated > 0 {
			log::debug!("terrain change invalidated {invalidated} breadcrumb(s)");
		}
		if self.entries.iter().any(|bc| !bc.valid) {
			self.compact();
		}

		self.entries.sort_by_key(Breadcrumb::age_key);
	}

	/// Removes all invalid entries, keeping the relative order of the rest.
	pub fn compact(&mut self) {
		if !self.enabled {
			return;
		}
		self.entries.retain(|bc| bc.valid);
	}

	/// The most recent valid breadcrumb.
	pub fn newest(&self) -> Option<&Breadcrumb> {
		if !self.enabled {
			return None;
		}
		self.valid_entries().max_by_key(|bc| bc.age_key())
	}

	/// The most ancient valid breadcrumb.
	pub fn oldest(&self) -> Option<&Breadcrumb> {
		if !self.enabled {
			return None;
		}
		self.valid_entries().min_by_key(|bc| bc.age_key())
	}

	/// The most ancient valid breadcrumb lying in the given cell.
	pub fn oldest_in_cell(&self, cell: Option<GridCell>) -> Option<&Breadcrumb> {
		if !self.enabled {
			return None;
		}
		self
			.valid_entries()
			.filter(|bc| bc.grid == cell)
			.min_by_key(|bc| bc.age_key())
	}

	/// Validates the trail against the current terrain, then hands back its
	/// first remaining entry (the trail is sorted by age at that point).
	/// `None` means the entity has nowhere cached to go back to.
	pub fn last_valid(&mut self, terrain: &impl TerrainProbe) -> Option<&Breadcrumb> {
		if !self.enabled {
			return None;
		}
		self.validate(terrain);
		self.entries.first()
	}

	fn valid_entries(&self) -> impl Iterator<Item = &Breadcrumb> {
		self.entries.iter().filter(|bc| bc.valid)
	}

	fn newest_index(&self) -> Option<usize> {
		self
			.entries
			.iter()
			.enumerate()
			.filter(|(_index, bc)| bc.valid)
			.max_by_key(|(_index, bc)| bc.age_key())
			.map(|(index, _bc)| index)
	}

	fn oldest_index(&self) -> Option<usize> {
		self
			.entries
			.iter()
			.enumerate()
			.filter(|(_index, bc)| bc.valid)
			.min_by_key(|(_index, bc)| bc.age_key())
			.map(|(index, _bc)| index)
	}

	fn oldest_index_in_cell(&self, cell: Option<GridCell>) -> Option<usize> {
		self
			.entries
			.iter()
			.enumerate()
			.filter(|(_index, bc)| bc.valid && bc.grid == cell)
			.min_by_key(|(_index, bc)| bc.age_key())
			.map(|(index, _bc)| index)
	}

	/// Two snapshots cover the same spot when they share a grid cell, or,
	/// both being off the terrain, lie within one cell size of each other.
	fn same_spot(a: &Breadcrumb, b: &Breadcrumb, cell_size: f32) -> bool {
		match (a.grid, b.grid) {
			(Some(cell_a), Some(cell_b)) => cell_a == cell_b,
			(None, None) => {
				(a.pos.x - b.pos.x).abs() < cell_size && (a.pos.y - b.pos.y).abs() < cell_size
			},
			_ => false,
		}
	}

	fn overwrite(&mut self, index: usize, snapshot: Breadcrumb) {
		let id = self.fresh_id();
		let slot = &mut self.entries[index];
		*slot = snapshot;
		slot.id = id;
	}

	fn fresh_id(&mut self) -> u64 {
		let id = self.next_id;
		self.next_id += 1;
		id
	}
}

//! The seam between the collision core and the terrain it runs on.
//!
//! The core never stores terrain; it only asks two questions about it
//! (which grid cell is this position in, and can an entity of a given size
//! stand there) through the `TerrainProbe` trait, so the game's tile mesh
//! and the tests' stub terrain plug in the same way.

/// Coordinates of a terrain grid cell.
pub type GridCell = cgmath::Point2<i32>;

/// Bits describing which kinds of tile a given entity cannot traverse.
pub type BlockingBits = u32;

/// Tiles nothing can walk through.
pub const BLOCK_IMPASSABLE: BlockingBits = 1 << 0;
/// Ordinary walls; some entities (e.g. thrown coins) ignore these.
pub const BLOCK_WALL: BlockingBits = 1 << 1;

/// What the collision core needs to know about the terrain.
pub trait TerrainProbe {
	/// Edge length of a grid cell, in world units.
	fn cell_size(&self) -> f32;

	/// The grid cell containing the given position, `None` when the
	/// position is off the terrain.
	fn grid_cell_of(&self, pos: cgmath::Point3<f32>) -> Option<GridCell>;

	/// Whether an entity of the given radius and blocking mask cannot stand
	/// at `pos`. Must be deterministic for a given terrain state.
	fn is_blocked(&self, pos: cgmath::Point3<f32>, radius: f32, bits: BlockingBits) -> bool;

	/// `pos` moved horizontally to the center of its grid cell; the height
	/// stays as it is.
	fn snap_to_cell_center(&self, pos: cgmath::Point3<f32>) -> cgmath::Point3<f32> {
		let size = self.cell_size();
		cgmath::point3(
			((pos.x / size).floor() + 0.5) * size,
			((pos.y / size).floor() + 0.5) * size,
			pos.z,
		)
	}
}

/// A square terrain of flat walkable cells, some of them blocked.
/// Positions outside the square are off the terrain (but not blocked).
#[cfg(test)]
pub(crate) struct GridStub {
	pub(crate) cell_size: f32,
	pub(crate) edge_cells: i32,
	pub(crate) blocked_cells: Vec<GridCell>,
}

#[cfg(test)]
impl GridStub {
	pub(crate) fn open(cell_size: f32, edge_cells: i32) -> GridStub {
		GridStub { cell_size, edge_cells, blocked_cells: Vec::new() }
	}
}

#[cfg(test)]
impl TerrainProbe for GridStub {
	fn cell_size(&self) -> f32 {
		self.cell_size
	}

	fn grid_cell_of(&self, pos: cgmath::Point3<f32>) -> Option<GridCell> {
		let x = (pos.x / self.cell_size).floor() as i32;
		let y = (pos.y / self.cell_size).floor() as i32;
		(0 <= x && x < self.edge_cells && 0 <= y && y < self.edge_cells)
			.then(|| cgmath::point2(x, y))
	}

	fn is_blocked(&self, pos: cgmath::Point3<f32>, _radius: f32, bits: BlockingBits) -> bool {
		match self.grid_cell_of(pos) {
			None => false,
			Some(cell) => bits != 0 && self.blocked_cells.contains(&cell),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn snapping_keeps_height() {
		let terrain = GridStub::open(128.0, 4);
		let snapped = terrain.snap_to_cell_center(cgmath::point3(130.0, 200.0, 7.0));
		assert_eq!(snapped, cgmath::point3(192.0, 192.0, 7.0));
	}

	#[test]
	fn cells_and_edges() {
		let terrain = GridStub::open(128.0, 4);
		assert_eq!(
			terrain.grid_cell_of(cgmath::point3(130.0, 5.0, 0.0)),
			Some(cgmath::point2(1, 0))
		);
		assert_eq!(terrain.grid_cell_of(cgmath::point3(-1.0, 5.0, 0.0)), None);
		assert_eq!(terrain.grid_cell_of(cgmath::point3(512.0, 5.0, 0.0)), None);
	}

	#[test]
	fn blocking_respects_the_mask() {
		let mut terrain = GridStub::open(128.0, 4);
		terrain.blocked_cells.push(cgmath::point2(1, 1));
		let inside = cgmath::point3(192.0, 192.0, 0.0);
		assert!(terrain.is_blocked(inside, 10.0, BLOCK_IMPASSABLE));
		assert!(!terrain.is_blocked(inside, 10.0, 0));
		assert!(!terrain.is_blocked(cgmath::point3(64.0, 64.0, 0.0), 10.0, BLOCK_IMPASSABLE));
	}
}

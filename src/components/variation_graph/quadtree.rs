//! Barnes-Hut quadtree for the many-body force.
//!
//! Cells far enough away relative to their width act as a single body at
//! their centroid, which brings one charge pass down to `O(n log n)`.

/// Squared opening angle; a cell of width `w` at squared distance `l` is
/// approximated when `w² / THETA2 < l`.
pub const THETA2: f64 = 0.81;

/// Points closer than this in squared distance are clamped.
pub const DISTANCE_MIN2: f64 = 1.0;

/// Beyond this depth points share a leaf even when they differ, which bounds
/// the tree for nearly coincident or non-finite coordinates.
const MAX_DEPTH: usize = 48;

#[derive(Debug)]
enum Contents {
	Leaf(Vec<usize>),
	Branch([Option<usize>; 4]),
}

enum Step {
	Descend(usize),
	Attach,
	Share,
	Split,
}

#[derive(Debug)]
struct Cell {
	x0: f64,
	y0: f64,
	size: f64,
	contents: Contents,
	count: usize,
	cx: f64,
	cy: f64,
}

impl Cell {
	fn new(x0: f64, y0: f64, size: f64, contents: Contents) -> Self {
		Self {
			x0,
			y0,
			size,
			contents,
			count: 0,
			cx: 0.0,
			cy: 0.0,
		}
	}

	fn quadrant(&self, x: f64, y: f64) -> usize {
		let half = self.size / 2.0;
		let right = x >= self.x0 + half;
		let bottom = y >= self.y0 + half;
		usize::from(right) | (usize::from(bottom) << 1)
	}
}

/// Cells live in one arena; children are always stored after their parent.
#[derive(Debug)]
pub struct QuadTree<'a> {
	points: &'a [(f64, f64)],
	cells: Vec<Cell>,
}

impl<'a> QuadTree<'a> {
	pub fn build(points: &'a [(f64, f64)]) -> Self {
		let (x0, y0, x1, y1) = points.iter().fold(
			(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
			|(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
		);
		let mut size = (x1 - x0).max(y1 - y0);
		if !(size > 0.0) {
			size = 1.0;
		}
		let (x0, y0) = if x0.is_finite() && y0.is_finite() {
			(x0, y0)
		} else {
			(0.0, 0.0)
		};

		let mut tree = Self {
			points,
			cells: vec![Cell::new(x0, y0, size, Contents::Leaf(Vec::new()))],
		};
		for i in 0..points.len() {
			tree.insert(i);
		}
		tree.accumulate();
		tree
	}

	fn insert(&mut self, i: usize) {
		let point = self.points[i];
		let mut cell = 0;
		let mut depth = 0;
		loop {
			let quadrant = self.cells[cell].quadrant(point.0, point.1);
			let step = match &self.cells[cell].contents {
				Contents::Branch(children) => match children[quadrant] {
					Some(child) => Step::Descend(child),
					None => Step::Attach,
				},
				Contents::Leaf(bodies) => match bodies.first() {
					Some(&j) if self.points[j] != point && depth < MAX_DEPTH => Step::Split,
					_ => Step::Share,
				},
			};
			match step {
				Step::Descend(child) => {
					cell = child;
					depth += 1;
				}
				Step::Attach => {
					self.attach(cell, quadrant, vec![i]);
					return;
				}
				Step::Share => {
					if let Contents::Leaf(bodies) = &mut self.cells[cell].contents {
						bodies.push(i);
					}
					return;
				}
				// move the resident points one level down and retry here
				Step::Split => {
					let existing = match &mut self.cells[cell].contents {
						Contents::Leaf(bodies) => std::mem::take(bodies),
						Contents::Branch(_) => Vec::new(),
					};
					self.cells[cell].contents = Contents::Branch([None; 4]);
					let Some(&first) = existing.first() else {
						continue;
					};
					let (ex, ey) = self.points[first];
					let quadrant = self.cells[cell].quadrant(ex, ey);
					self.attach(cell, quadrant, existing);
				}
			}
		}
	}

	fn attach(&mut self, parent: usize, quadrant: usize, bodies: Vec<usize>) {
		let child = self.push_child(parent, quadrant, bodies);
		if let Contents::Branch(children) = &mut self.cells[parent].contents {
			children[quadrant] = Some(child);
		}
	}

	fn push_child(&mut self, parent: usize, quadrant: usize, bodies: Vec<usize>) -> usize {
		let p = &self.cells[parent];
		let half = p.size / 2.0;
		let x0 = if quadrant & 1 == 1 { p.x0 + half } else { p.x0 };
		let y0 = if quadrant & 2 == 2 { p.y0 + half } else { p.y0 };
		self.cells.push(Cell::new(x0, y0, half, Contents::Leaf(bodies)));
		self.cells.len() - 1
	}

	/// Fill in body counts and centroids bottom-up.
	fn accumulate(&mut self) {
		for c in (0..self.cells.len()).rev() {
			let (count, sx, sy) = match &self.cells[c].contents {
				Contents::Leaf(bodies) => bodies.iter().fold((0, 0.0, 0.0), |(n, sx, sy), &j| {
					let (x, y) = self.points[j];
					(n + 1, sx + x, sy + y)
				}),
				Contents::Branch(children) => children.iter().flatten().fold(
					(0, 0.0, 0.0),
					|(n, sx, sy), &child| {
						let ch = &self.cells[child];
						let w = ch.count as f64;
						(n + ch.count, sx + ch.cx * w, sy + ch.cy * w)
					},
				),
			};
			let cell = &mut self.cells[c];
			cell.count = count;
			if count > 0 {
				cell.cx = sx / count as f64;
				cell.cy = sy / count as f64;
			}
		}
	}

	/// Velocity change on point `i` from every other point carrying
	/// `strength`; `jiggle` separates points sitting on the same axis.
	pub fn force_on(
		&self,
		i: usize,
		strength: f64,
		jiggle: &mut impl FnMut() -> f64,
	) -> (f64, f64) {
		let (xi, yi) = self.points[i];
		let (mut ax, mut ay) = (0.0, 0.0);
		let mut stack = vec![0];
		while let Some(c) = stack.pop() {
			let cell = &self.cells[c];
			if cell.count == 0 {
				continue;
			}
			let mut dx = cell.cx - xi;
			let mut dy = cell.cy - yi;
			let mut l = dx * dx + dy * dy;

			let far = cell.size * cell.size / THETA2 < l;
			let others = match &cell.contents {
				Contents::Branch(children) if !far => {
					stack.extend(children.iter().rev().flatten());
					continue;
				}
				Contents::Leaf(bodies) if !far => {
					let others = bodies.iter().filter(|&&j| j != i).count();
					if others == 0 {
						continue;
					}
					others
				}
				_ => cell.count,
			};

			if dx == 0.0 {
				dx = jiggle();
				l += dx * dx;
			}
			if dy == 0.0 {
				dy = jiggle();
				l += dy * dy;
			}
			if l < DISTANCE_MIN2 {
				l = (DISTANCE_MIN2 * l).sqrt();
			}
			let w = strength * others as f64 / l;
			ax += dx * w;
			ay += dy * w;
		}
		(ax, ay)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn no_jiggle() -> f64 {
		panic!("no coincident points expected")
	}

	fn exact(points: &[(f64, f64)], i: usize, strength: f64) -> (f64, f64) {
		let (xi, yi) = points[i];
		points
			.iter()
			.enumerate()
			.filter(|&(j, _)| j != i)
			.fold((0.0, 0.0), |(ax, ay), (_, &(x, y))| {
				let (dx, dy) = (x - xi, y - yi);
				let mut l = dx * dx + dy * dy;
				if l < DISTANCE_MIN2 {
					l = l.sqrt();
				}
				(ax + dx * strength / l, ay + dy * strength / l)
			})
	}

	#[test]
	fn test_counts_every_point() {
		let points: Vec<(f64, f64)> = (0..50)
			.map(|i| ((i * 37 % 101) as f64, (i * 53 % 97) as f64))
			.collect();
		let tree = QuadTree::build(&points);
		assert_eq!(tree.cells[0].count, 50);
		let mean_x = points.iter().map(|p| p.0).sum::<f64>() / 50.0;
		assert!((tree.cells[0].cx - mean_x).abs() < 1e-9);
	}

	#[test]
	fn test_two_points_match_exact() {
		let points = [(0.0, 0.0), (10.0, 5.0)];
		let tree = QuadTree::build(&points);
		let (ax, ay) = tree.force_on(0, -100.0, &mut no_jiggle);
		let (ex, ey) = exact(&points, 0, -100.0);
		assert!((ax - ex).abs() < 1e-12 && (ay - ey).abs() < 1e-12);
		assert!(ax < 0.0 && ay < 0.0);
	}

	#[test]
	fn test_distant_cluster_close_to_exact() {
		let mut points = vec![(0.0, 0.0)];
		points.extend((0..40).map(|i| (1000.0 + (i % 7) as f64, 1000.0 + (i / 7) as f64)));
		let tree = QuadTree::build(&points);
		let (ax, ay) = tree.force_on(0, -100.0, &mut no_jiggle);
		let (ex, ey) = exact(&points, 0, -100.0);
		// the whole tree collapses into one body here, so only roughly equal
		assert!((ax - ex).abs() < 0.1 * ex.abs());
		assert!((ay - ey).abs() < 0.1 * ey.abs());
	}

	#[test]
	fn test_coincident_points_share_leaf() {
		let points = [(3.0, 3.0), (3.0, 3.0), (3.0, 3.0)];
		let tree = QuadTree::build(&points);
		assert_eq!(tree.cells.len(), 1);
		let mut calls = 0;
		let (ax, ay) = tree.force_on(0, -1.0, &mut || {
			calls += 1;
			1e-7
		});
		assert_eq!(calls, 2);
		assert!(ax.is_finite() && ay.is_finite());
	}

	#[test]
	fn test_non_finite_points_terminate() {
		let points = [(f64::NAN, 0.0), (f64::INFINITY, 1.0), (0.0, 0.0)];
		let tree = QuadTree::build(&points);
		assert_eq!(tree.cells[0].count, 3);
	}
}

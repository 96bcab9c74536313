use std::collections::HashMap;
use std::f64::consts::PI;

use log::debug;

use super::error::GraphError;
use super::quadtree::QuadTree;
use super::types::{AssembledGraph, LinkKind};

pub const DEFAULT_WIDTH: f64 = 1000.0;
pub const DEFAULT_HEIGHT: f64 = 1000.0;
pub const DEFAULT_STEPS: usize = 2000;
pub const DEFAULT_CHARGE_STRENGTH: f64 = -100.0;

const INITIAL_RADIUS: f64 = 10.0;
/// Number of ticks over which alpha decays from 1 to `alpha_min`.
const ALPHA_DECAY_TICKS: f64 = 300.0;

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
	pub width: f64,
	pub height: f64,
	pub steps: usize,
	/// Many-body strength; negative values repel.
	pub charge_strength: f64,
	/// Rest length of links inside one sequence.
	pub backbone_distance: f64,
	/// Rest length of links between sequences.
	pub adjacency_distance: f64,
	/// Fraction of velocity lost every tick.
	pub velocity_decay: f64,
	pub alpha_min: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			width: DEFAULT_WIDTH,
			height: DEFAULT_HEIGHT,
			steps: DEFAULT_STEPS,
			charge_strength: DEFAULT_CHARGE_STRENGTH,
			backbone_distance: 1.0,
			adjacency_distance: 10.0,
			velocity_decay: 0.4,
			alpha_min: 0.001,
		}
	}
}

impl LayoutConfig {
	pub fn validate(&self) -> Result<(), GraphError> {
		if !(self.width.is_finite() && self.width > 0.0)
			|| !(self.height.is_finite() && self.height > 0.0)
		{
			return Err(GraphError::Config(format!(
				"canvas must have a positive size, got {}x{}",
				self.width, self.height
			)));
		}
		for (name, value) in [
			("charge strength", self.charge_strength),
			("backbone distance", self.backbone_distance),
			("adjacency distance", self.adjacency_distance),
		] {
			if !value.is_finite() {
				return Err(GraphError::Config(format!("{name} must be finite")));
			}
		}
		if self.backbone_distance < 0.0 || self.adjacency_distance < 0.0 {
			return Err(GraphError::Config("link distances must not be negative".into()));
		}
		if !(0.0..=1.0).contains(&self.velocity_decay) {
			return Err(GraphError::Config("velocity decay must lie in [0, 1]".into()));
		}
		if !(self.alpha_min > 0.0 && self.alpha_min < 1.0) {
			return Err(GraphError::Config("alpha min must lie in (0, 1)".into()));
		}
		Ok(())
	}
}

/// Simulated position of one segment.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutNode {
	pub id: String,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
}

/// A link of the assembled graph with its endpoints resolved to coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutLink {
	/// Index into [`AssembledGraph::links`].
	pub link: usize,
	pub source: usize,
	pub target: usize,
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
	pub nodes: Vec<LayoutNode>,
	pub links: Vec<LayoutLink>,
}

#[derive(Clone, Copy, Debug, Default)]
struct Body {
	x: f64,
	y: f64,
	vx: f64,
	vy: f64,
}

#[derive(Clone, Copy, Debug)]
struct Spring {
	source: usize,
	target: usize,
	distance: f64,
	strength: f64,
	bias: f64,
}

/// Linear congruential generator, only used to separate coincident points.
#[derive(Clone, Debug)]
struct Lcg(u64);

impl Lcg {
	const A: u64 = 1_664_525;
	const C: u64 = 1_013_904_223;
	const M: u64 = 1 << 32;

	fn new() -> Self {
		Self(1)
	}

	fn next_f64(&mut self) -> f64 {
		self.0 = (Self::A * self.0 + Self::C) % Self::M;
		self.0 as f64 / Self::M as f64
	}

	fn jiggle(&mut self) -> f64 {
		(self.next_f64() - 0.5) * 1e-6
	}
}

/// A force simulation over one assembled graph.
///
/// Every tick applies, in order, link springs, Barnes-Hut charge and the
/// centering translation, then integrates velocities. Ticks depend on the
/// full state of the previous one.
pub struct Simulation {
	ids: Vec<String>,
	bodies: Vec<Body>,
	springs: Vec<Spring>,
	/// Endpoint body indices of every assembled link, self-loops included.
	link_ends: Vec<(usize, usize)>,
	config: LayoutConfig,
	alpha: f64,
	alpha_decay: f64,
	random: Lcg,
}

impl Simulation {
	pub fn new(graph: &AssembledGraph, config: &LayoutConfig) -> Result<Self, GraphError> {
		config.validate()?;

		let index: HashMap<&str, usize> = graph
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.as_str(), i))
			.collect();

		let initial_angle = PI * (3.0 - 5f64.sqrt());
		let bodies = (0..graph.nodes.len())
			.map(|i| {
				let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
				let angle = i as f64 * initial_angle;
				Body {
					x: radius * angle.cos(),
					y: radius * angle.sin(),
					..Body::default()
				}
			})
			.collect();

		let mut link_ends = Vec::with_capacity(graph.links.len());
		let mut degree = vec![0usize; graph.nodes.len()];
		for link in &graph.links {
			let lookup = |id: &str| {
				index.get(id).copied().ok_or_else(|| {
					GraphError::shape(format!("link endpoint {id:?} is not a segment"))
				})
			};
			let ends = (lookup(&link.source)?, lookup(&link.target)?);
			degree[ends.0] += 1;
			degree[ends.1] += 1;
			link_ends.push(ends);
		}

		let springs = graph
			.links
			.iter()
			.zip(&link_ends)
			.filter(|(_, (source, target))| source != target)
			.map(|(link, &(source, target))| {
				let (ds, dt) = (degree[source] as f64, degree[target] as f64);
				Spring {
					source,
					target,
					distance: match link.kind {
						LinkKind::Backbone(_) => config.backbone_distance,
						LinkKind::Adjacency => config.adjacency_distance,
					},
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		Ok(Self {
			ids: graph.nodes.iter().map(|n| n.id.clone()).collect(),
			bodies,
			springs,
			link_ends,
			config: config.clone(),
			alpha: 1.0,
			alpha_decay: 1.0 - config.alpha_min.powf(1.0 / ALPHA_DECAY_TICKS),
			random: Lcg::new(),
		})
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn positions(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
		self.bodies.iter().map(|b| (b.x, b.y))
	}

	pub fn tick(&mut self) {
		self.alpha += (0.0 - self.alpha) * self.alpha_decay;
		let alpha = self.alpha;

		self.apply_springs(alpha);
		self.apply_charge(alpha);
		self.apply_center();

		let keep = 1.0 - self.config.velocity_decay;
		for body in &mut self.bodies {
			body.vx *= keep;
			body.vy *= keep;
			body.x += body.vx;
			body.y += body.vy;
		}
	}

	fn apply_springs(&mut self, alpha: f64) {
		for spring in &self.springs {
			let (s, t) = (self.bodies[spring.source], self.bodies[spring.target]);
			let mut dx = t.x + t.vx - s.x - s.vx;
			let mut dy = t.y + t.vy - s.y - s.vy;
			if dx == 0.0 {
				dx = self.random.jiggle();
			}
			if dy == 0.0 {
				dy = self.random.jiggle();
			}
			let l = (dx * dx + dy * dy).sqrt();
			let k = (l - spring.distance) / l * alpha * spring.strength;
			dx *= k;
			dy *= k;

			let target = &mut self.bodies[spring.target];
			target.vx -= dx * spring.bias;
			target.vy -= dy * spring.bias;
			let source = &mut self.bodies[spring.source];
			source.vx += dx * (1.0 - spring.bias);
			source.vy += dy * (1.0 - spring.bias);
		}
	}

	fn apply_charge(&mut self, alpha: f64) {
		let strength = self.config.charge_strength * alpha;
		let points: Vec<(f64, f64)> = self.bodies.iter().map(|b| (b.x, b.y)).collect();
		let tree = QuadTree::build(&points);
		let random = &mut self.random;
		let mut jiggle = || random.jiggle();
		for (i, body) in self.bodies.iter_mut().enumerate() {
			let (ax, ay) = tree.force_on(i, strength, &mut jiggle);
			body.vx += ax;
			body.vy += ay;
		}
	}

	fn apply_center(&mut self) {
		if self.bodies.is_empty() {
			return;
		}
		let n = self.bodies.len() as f64;
		let (sx, sy) = self
			.bodies
			.iter()
			.fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
		let dx = sx / n - self.config.width / 2.0;
		let dy = sy / n - self.config.height / 2.0;
		for body in &mut self.bodies {
			body.x -= dx;
			body.y -= dy;
		}
	}

	/// Freeze the current state into a [`Layout`].
	pub fn finish(self) -> Result<Layout, GraphError> {
		if self.bodies.is_empty() {
			return Err(GraphError::LayoutDivergence("graph has no nodes to lay out".into()));
		}
		if let Some((i, _)) = self
			.bodies
			.iter()
			.enumerate()
			.find(|(_, b)| !(b.x.is_finite() && b.y.is_finite()))
		{
			return Err(GraphError::LayoutDivergence(format!(
				"segment {:?} has a non-finite position",
				self.ids[i]
			)));
		}

		let nodes = self
			.ids
			.into_iter()
			.zip(&self.bodies)
			.map(|(id, b)| LayoutNode {
				id,
				x: b.x,
				y: b.y,
				vx: b.vx,
				vy: b.vy,
			})
			.collect();
		let links = self
			.link_ends
			.iter()
			.enumerate()
			.map(|(link, &(source, target))| {
				let (s, t) = (self.bodies[source], self.bodies[target]);
				LayoutLink {
					link,
					source,
					target,
					x1: s.x,
					y1: s.y,
					x2: t.x,
					y2: t.y,
				}
			})
			.collect();
		Ok(Layout { nodes, links })
	}
}

/// Run a full batch layout: `config.steps` ticks, then read positions.
pub fn layout(graph: &AssembledGraph, config: &LayoutConfig) -> Result<Layout, GraphError> {
	if graph.nodes.is_empty() {
		return Err(GraphError::LayoutDivergence("graph has no nodes to lay out".into()));
	}
	let mut simulation = Simulation::new(graph, config)?;
	for _ in 0..config.steps {
		simulation.tick();
	}
	debug!(
		"laid out {} segments / {} links in {} ticks (alpha {:.2e})",
		graph.nodes.len(),
		graph.links.len(),
		config.steps,
		simulation.alpha()
	);
	simulation.finish()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::variation_graph::assemble::assemble;
	use crate::components::variation_graph::types::{
		SourceGraph, SourceLink, SourceNode, Strand,
	};

	fn pair_graph() -> AssembledGraph {
		let graph = SourceGraph {
			nodes: vec![SourceNode::new("a", "ACGT"), SourceNode::new("b", "TTGA")],
			links: vec![SourceLink::new("a", "b", Strand::Forward, Strand::Forward)],
		};
		assemble(&graph, 500).unwrap()
	}

	fn dist(a: &LayoutNode, b: &LayoutNode) -> f64 {
		((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
	}

	#[test]
	fn test_pair_spreads_around_center() {
		let graph = pair_graph();
		let config = LayoutConfig {
			steps: 1000,
			..LayoutConfig::default()
		};
		let out = layout(&graph, &config).unwrap();
		assert_eq!(out.nodes.len(), 4);
		let (cx, cy) = (config.width / 2.0, config.height / 2.0);
		for (i, a) in out.nodes.iter().enumerate() {
			assert!(((a.x - cx).powi(2) + (a.y - cy).powi(2)).sqrt() < 200.0, "{a:?}");
			for b in &out.nodes[i + 1..] {
				assert!(dist(a, b) > 1e-3, "{} and {} collapsed", a.id, b.id);
			}
		}
		let n = out.nodes.len() as f64;
		let mx = out.nodes.iter().map(|p| p.x).sum::<f64>() / n;
		let my = out.nodes.iter().map(|p| p.y).sum::<f64>() / n;
		assert!((mx - cx).abs() < 1.0 && (my - cy).abs() < 1.0);
	}

	#[test]
	fn test_link_endpoints_follow_nodes() {
		let graph = pair_graph();
		let out = layout(&graph, &LayoutConfig::default()).unwrap();
		assert_eq!(out.links.len(), graph.links.len());
		for link in &out.links {
			let source = &out.nodes[link.source];
			let target = &out.nodes[link.target];
			assert_eq!(source.id, graph.links[link.link].source);
			assert_eq!(target.id, graph.links[link.link].target);
			assert_eq!((link.x1, link.y1), (source.x, source.y));
			assert_eq!((link.x2, link.y2), (target.x, target.y));
		}
	}

	#[test]
	fn test_layout_deterministic() {
		let graph = pair_graph();
		let config = LayoutConfig {
			steps: 300,
			..LayoutConfig::default()
		};
		assert_eq!(layout(&graph, &config).unwrap(), layout(&graph, &config).unwrap());
	}

	#[test]
	fn test_backbone_tighter_than_repulsion() {
		let graph = SourceGraph {
			nodes: vec![SourceNode::new("long", "A".repeat(5000))],
			links: Vec::new(),
		};
		let graph = assemble(&graph, 500).unwrap();
		let out = layout(&graph, &LayoutConfig::default()).unwrap();
		// neighbours along the chain sit closer than the chain's two ends
		let first = dist(&out.nodes[0], &out.nodes[1]);
		let ends = dist(&out.nodes[0], out.nodes.last().unwrap());
		assert!(first < ends);
		assert!(out.nodes.iter().all(|n| n.x.is_finite() && n.y.is_finite()));
	}

	#[test]
	fn test_self_loop_is_harmless() {
		let graph = SourceGraph {
			nodes: vec![SourceNode::new("a", "ACGT")],
			links: vec![SourceLink::new("a", "a", Strand::Forward, Strand::Reverse)],
		};
		let graph = assemble(&graph, 500).unwrap();
		let out = layout(&graph, &LayoutConfig::default()).unwrap();
		let self_loop = out.links.last().unwrap();
		assert_eq!(self_loop.source, self_loop.target);
		assert!(out.nodes.iter().all(|n| n.x.is_finite()));
	}

	#[test]
	fn test_zero_steps_keeps_spiral() {
		let graph = pair_graph();
		let config = LayoutConfig {
			steps: 0,
			..LayoutConfig::default()
		};
		let out = layout(&graph, &config).unwrap();
		assert!((out.nodes[0].x - 10.0 * 0.5f64.sqrt()).abs() < 1e-9);
		assert_eq!(out.nodes[0].y, 0.0);
	}

	#[test]
	fn test_alpha_decays() {
		let graph = pair_graph();
		let mut sim = Simulation::new(&graph, &LayoutConfig::default()).unwrap();
		for _ in 0..300 {
			sim.tick();
		}
		assert!((sim.alpha() - 0.001).abs() < 1e-6);
		assert_eq!(sim.positions().count(), 4);
	}

	#[test]
	fn test_degenerate_inputs() {
		let empty = AssembledGraph::default();
		assert!(matches!(
			layout(&empty, &LayoutConfig::default()),
			Err(GraphError::LayoutDivergence(_))
		));

		let graph = pair_graph();
		for config in [
			LayoutConfig {
				width: 0.0,
				..LayoutConfig::default()
			},
			LayoutConfig {
				height: f64::NAN,
				..LayoutConfig::default()
			},
			LayoutConfig {
				charge_strength: f64::INFINITY,
				..LayoutConfig::default()
			},
			LayoutConfig {
				adjacency_distance: -1.0,
				..LayoutConfig::default()
			},
		] {
			assert!(matches!(layout(&graph, &config), Err(GraphError::Config(_))));
		}
	}

	#[test]
	fn test_runaway_charge_reports_divergence() {
		let graph = SourceGraph {
			nodes: vec![SourceNode::new("a", "A".repeat(5000))],
			links: Vec::new(),
		};
		let graph = assemble(&graph, 500).unwrap();
		assert_eq!(graph.nodes.len(), 10);
		let config = LayoutConfig {
			charge_strength: -f64::MAX,
			steps: 50,
			..LayoutConfig::default()
		};
		assert!(matches!(
			layout(&graph, &config),
			Err(GraphError::LayoutDivergence(_))
		));
	}

	#[test]
	fn test_long_chain_settles() {
		let graph = SourceGraph {
			nodes: vec![SourceNode::new("chr", "A".repeat(500 * 1000))],
			links: Vec::new(),
		};
		let graph = assemble(&graph, 500).unwrap();
		assert_eq!(graph.nodes.len(), 1000);
		let config = LayoutConfig {
			steps: 20,
			..LayoutConfig::default()
		};
		let out = layout(&graph, &config).unwrap();
		assert!(out.nodes.iter().all(|n| n.x.is_finite() && n.y.is_finite()));
	}

	#[test]
	fn test_dangling_link_rejected() {
		let mut graph = pair_graph();
		graph.links[0].target = "ghost".into();
		assert!(matches!(
			Simulation::new(&graph, &LayoutConfig::default()),
			Err(GraphError::InputShape(_))
		));
	}
}

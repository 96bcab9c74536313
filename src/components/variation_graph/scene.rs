use std::sync::Arc;

use super::error::GraphError;
use super::layout::Layout;
use super::scale::ColorScheme;
use super::types::{AssembledGraph, GraphLink};

pub const DEFAULT_THICKNESS: f64 = 10.0;
pub const ADJACENCY_WIDTH: f64 = 3.0;
pub const ADJACENCY_COLOR: &str = "grey";

/// Presentation-only settings; changing them never re-runs the layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderStyle {
	pub thickness: f64,
	pub color_scheme: ColorScheme,
}

impl Default for RenderStyle {
	fn default() -> Self {
		Self {
			thickness: DEFAULT_THICKNESS,
			color_scheme: ColorScheme::default(),
		}
	}
}

impl RenderStyle {
	pub fn validate(&self) -> Result<(), GraphError> {
		if !(self.thickness.is_finite() && self.thickness > 0.0) {
			return Err(GraphError::Config(format!(
				"thickness must be positive, got {}",
				self.thickness
			)));
		}
		Ok(())
	}

	pub fn stroke_width(&self, link: &GraphLink) -> f64 {
		if link.is_backbone() {
			self.thickness * 1.5
		} else {
			ADJACENCY_WIDTH
		}
	}

	/// Sequences take their palette colour by position, darkened one step.
	pub fn stroke_color(&self, link: &GraphLink, source_node_count: usize) -> String {
		match link.payload() {
			Some(payload) => {
				let t = payload.link_num as f64 / source_node_count.max(1) as f64;
				self.color_scheme.interpolate(t).darker(1.0).to_css()
			}
			None => ADJACENCY_COLOR.to_string(),
		}
	}
}

/// One line segment ready to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct StyledLink {
	/// Index into [`AssembledGraph::links`].
	pub link: usize,
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
	pub width: f64,
	pub color: String,
}

impl StyledLink {
	/// Distance from a point to this segment.
	pub fn distance_to(&self, x: f64, y: f64) -> f64 {
		let (dx, dy) = (self.x2 - self.x1, self.y2 - self.y1);
		let len2 = dx * dx + dy * dy;
		let t = if len2 == 0.0 {
			0.0
		} else {
			(((x - self.x1) * dx + (y - self.y1) * dy) / len2).clamp(0.0, 1.0)
		};
		let (px, py) = (self.x1 + t * dx, self.y1 + t * dy);
		((x - px).powi(2) + (y - py).powi(2)).sqrt()
	}
}

/// A laid-out graph with presentation applied, in draw order.
#[derive(Clone, Debug, Default)]
pub struct Scene {
	pub graph: Arc<AssembledGraph>,
	pub lines: Vec<StyledLink>,
}

impl Scene {
	pub fn build(graph: Arc<AssembledGraph>, layout: &Layout, style: &RenderStyle) -> Self {
		let lines = layout
			.links
			.iter()
			.map(|placed| {
				let link = &graph.links[placed.link];
				StyledLink {
					link: placed.link,
					x1: placed.x1,
					y1: placed.y1,
					x2: placed.x2,
					y2: placed.y2,
					width: style.stroke_width(link),
					color: style.stroke_color(link, graph.source_node_count),
				}
			})
			.collect();
		Self { graph, lines }
	}

	pub fn link(&self, index: usize) -> Option<&GraphLink> {
		self.graph.links.get(index)
	}
}

use super::scene::Scene;
use super::segment::{END_SUFFIX, START_SUFFIX};
use super::types::GraphLink;

/// Extra pick tolerance around a stroke, in screen pixels.
pub const HIT_SLOP: f64 = 2.0;
/// Pointer travel below which a press/release counts as a click.
pub const CLICK_TOLERANCE: f64 = 3.0;
/// Vertical offset of the hover label above the pointer.
pub const LABEL_OFFSET_Y: f64 = 28.0;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

/// Allowed range of the zoom factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomExtent {
	pub min: f64,
	pub max: f64,
}

impl Default for ZoomExtent {
	fn default() -> Self {
		Self { min: 0.1, max: 8.0 }
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	/// Longest distance from the press point seen during this gesture.
	pub travel: f64,
}

/// Floating label shown while the pointer is over a link.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverLabel {
	pub link: usize,
	pub text: String,
	pub left: f64,
	pub top: f64,
}

/// What the rendering layer should react to after feeding a pointer event.
#[derive(Clone, Debug, PartialEq)]
pub enum InteractionEvent {
	Hover(HoverLabel),
	HoverEnd,
	/// A link was clicked; the index points into the scene's graph.
	Click(usize),
}

/// Tooltip text: the link id, or its endpoints without position suffixes.
pub fn link_label(link: &GraphLink) -> String {
	match link.id() {
		Some(id) => id.to_string(),
		None => format!(
			"{}-{}",
			strip_position(&link.source),
			strip_position(&link.target)
		),
	}
}

fn strip_position(id: &str) -> &str {
	id.strip_suffix(START_SUFFIX)
		.or_else(|| id.strip_suffix(END_SUFFIX))
		.unwrap_or(id)
}

/// View and pointer state of one drawn graph. Pointer coordinates are in
/// canvas pixels; the scene lives in layout space.
pub struct GraphViewState {
	pub scene: Scene,
	pub transform: ViewTransform,
	pub zoom: ZoomExtent,
	pub pan: PanState,
	pub hover: Option<usize>,
	pub width: f64,
	pub height: f64,
}

impl GraphViewState {
	pub fn new(scene: Scene, width: f64, height: f64) -> Self {
		Self {
			scene,
			transform: ViewTransform::default(),
			zoom: ZoomExtent::default(),
			pan: PanState::default(),
			hover: None,
			width,
			height,
		}
	}

	/// Swap in a restyled or relaid scene while keeping pan/zoom.
	pub fn set_scene(&mut self, scene: Scene) {
		if self.hover.is_some_and(|i| i >= scene.graph.links.len()) {
			self.hover = None;
		}
		self.scene = scene;
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost link under the pointer.
	pub fn link_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let slop = HIT_SLOP / self.transform.k;
		self.scene
			.lines
			.iter()
			.rev()
			.find(|line| line.distance_to(gx, gy) <= line.width / 2.0 + slop)
			.map(|line| line.link)
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
			travel: 0.0,
		};
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) -> Vec<InteractionEvent> {
		if self.pan.active {
			let (dx, dy) = (sx - self.pan.start_x, sy - self.pan.start_y);
			self.pan.travel = self.pan.travel.max((dx * dx + dy * dy).sqrt());
			self.transform.x = self.pan.transform_start_x + dx;
			self.transform.y = self.pan.transform_start_y + dy;
			if self.pan.travel < CLICK_TOLERANCE {
				return Vec::new();
			}
			// no label while panning
			return self.update_hover(None, sx, sy);
		}
		self.update_hover(self.link_at_position(sx, sy), sx, sy)
	}

	pub fn pointer_up(&mut self, sx: f64, sy: f64) -> Vec<InteractionEvent> {
		let was_click = self.pan.active && self.pan.travel < CLICK_TOLERANCE;
		self.pan.active = false;
		if !was_click {
			return Vec::new();
		}
		let Some(link) = self.link_at_position(sx, sy) else {
			return Vec::new();
		};
		let mut events = Vec::with_capacity(2);
		if self.hover.take().is_some() {
			events.push(InteractionEvent::HoverEnd);
		}
		events.push(InteractionEvent::Click(link));
		events
	}

	pub fn pointer_leave(&mut self) -> Vec<InteractionEvent> {
		self.pan.active = false;
		self.update_hover(None, 0.0, 0.0)
	}

	/// Scale around the pointer, `factor > 1` zooms in.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(self.zoom.min, self.zoom.max);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	fn update_hover(&mut self, link: Option<usize>, sx: f64, sy: f64) -> Vec<InteractionEvent> {
		if self.hover == link {
			return Vec::new();
		}
		let mut events = Vec::with_capacity(2);
		if self.hover.is_some() {
			events.push(InteractionEvent::HoverEnd);
		}
		self.hover = link;
		if let Some(index) = link {
			if let Some(record) = self.scene.link(index) {
				events.push(InteractionEvent::Hover(HoverLabel {
					link: index,
					text: link_label(record),
					left: sx,
					top: sy - LABEL_OFFSET_Y,
				}));
			}
		}
		events
	}
}

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::cache::LayoutCache;
use super::config::GraphConfig;
use super::layout::{DEFAULT_HEIGHT, DEFAULT_STEPS, DEFAULT_WIDTH};
use super::render;
use super::scale::ColorScheme;
use super::scene::{DEFAULT_THICKNESS, Scene};
use super::segment::DEFAULT_BLOCK_SIZE;
use super::state::{GraphViewState, HoverLabel, InteractionEvent};
use super::types::{GraphLink, SourceGraph};

/// Shared handles the DOM event handlers feed pointer input through.
#[derive(Clone)]
struct Interaction {
	state: Rc<RefCell<Option<GraphViewState>>>,
	ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>>,
	hover_label: RwSignal<Option<HoverLabel>>,
	on_feature_click: Option<Callback<GraphLink>>,
}

impl Interaction {
	fn redraw(&self) {
		if let (Some(s), Some(ctx)) = (self.state.borrow().as_ref(), self.ctx.borrow().as_ref()) {
			render::render(s, ctx);
		}
	}

	fn apply(&self, update: impl FnOnce(&mut GraphViewState) -> Vec<InteractionEvent>) {
		let clicked = {
			let mut guard = self.state.borrow_mut();
			let Some(s) = guard.as_mut() else {
				return;
			};
			let mut clicked = Vec::new();
			for event in update(s) {
				match event {
					InteractionEvent::Hover(label) => self.hover_label.set(Some(label)),
					InteractionEvent::HoverEnd => self.hover_label.set(None),
					InteractionEvent::Click(index) => clicked.extend(s.scene.link(index).cloned()),
				}
			}
			clicked
		};
		self.redraw();
		if let Some(callback) = &self.on_feature_click {
			for link in clicked {
				callback.run(link);
			}
		}
	}
}

fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

#[component]
pub fn VariationGraphCanvas(
	#[prop(into)] graph: Signal<Arc<SourceGraph>>,
	#[prop(into, optional)] block_size: MaybeProp<usize>,
	#[prop(into, optional)] thickness: MaybeProp<f64>,
	#[prop(into, optional)] color_scheme: MaybeProp<ColorScheme>,
	#[prop(default = DEFAULT_WIDTH)] width: f64,
	#[prop(default = DEFAULT_HEIGHT)] height: f64,
	#[prop(default = DEFAULT_STEPS)] steps: usize,
	#[prop(optional)] on_feature_click: Option<Callback<GraphLink>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let hover_label = RwSignal::new(None::<HoverLabel>);
	let error = RwSignal::new(None::<String>);
	let interaction = Interaction {
		state: Rc::new(RefCell::new(None)),
		ctx: Rc::new(RefCell::new(None)),
		hover_label,
		on_feature_click,
	};
	let cache = Rc::new(RefCell::new(LayoutCache::new()));

	let fx = interaction.clone();
	Effect::new(move |_| {
		let config = GraphConfig {
			block_size: block_size.get().unwrap_or(DEFAULT_BLOCK_SIZE),
			thickness: thickness.get().unwrap_or(DEFAULT_THICKNESS),
			color_scheme: color_scheme.get().unwrap_or_default(),
			width,
			height,
			steps,
		};
		let graph = graph.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};

		if fx.ctx.borrow().is_none() {
			let canvas: HtmlCanvasElement = canvas.into();
			canvas.set_width(width as u32);
			canvas.set_height(height as u32);
			let Some(ctx) = canvas
				.get_context("2d")
				.ok()
				.flatten()
				.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
			else {
				warn!("canvas has no 2d context");
				return;
			};
			*fx.ctx.borrow_mut() = Some(ctx);
		}

		// Palette and thickness changes hit the cache and only restyle.
		let scene = config.validate().and_then(|()| {
			let (assembled, placed) =
				cache
					.borrow_mut()
					.compute(&graph, config.block_size, &config.layout_config())?;
			Ok(Scene::build(assembled, &placed, &config.render_style()))
		});
		let scene = match scene {
			Ok(scene) => {
				error.set(None);
				scene
			}
			Err(e) => {
				warn!("cannot draw variation graph: {e}");
				error.set(Some(e.to_string()));
				Scene::default()
			}
		};

		{
			let mut slot = fx.state.borrow_mut();
			if let Some(s) = slot.as_mut() {
				s.set_scene(scene);
			} else {
				*slot = Some(GraphViewState::new(scene, width, height));
			}
		}
		fx.hover_label.set(None);
		fx.redraw();
	});

	let md = interaction.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			md.apply(|s| {
				s.pointer_down(x, y);
				Vec::new()
			});
		}
	};

	let mm = interaction.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			mm.apply(|s| s.pointer_move(x, y));
		}
	};

	let mu = interaction.clone();
	let on_mouseup = move |ev: MouseEvent| {
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			mu.apply(|s| s.pointer_up(x, y));
		}
	};

	let ml = interaction.clone();
	let on_mouseleave = move |_: MouseEvent| {
		ml.apply(|s| s.pointer_leave());
	};

	let wh = interaction;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			wh.apply(|s| {
				s.zoom_at(x, y, factor);
				Vec::new()
			});
		}
	};

	view! {
		<div
			class="variation-graph"
			style=format!("position: relative; width: {width}px; height: {height}px;")
		>
			<canvas
				node_ref=canvas_ref
				class="variation-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			{move || {
				hover_label
					.get()
					.map(|label| {
						view! {
							<div
								class="tooltip"
								style=format!(
									"position: absolute; left: {}px; top: {}px; pointer-events: none;",
									label.left,
									label.top,
								)
							>
								{label.text}
							</div>
						}
					})
			}}
			{move || error.get().map(|message| view! { <p class="graph-error">{message}</p> })}
		</div>
	}
}

use std::sync::Arc;

use leptos::prelude::*;
use log::{info, warn};

use crate::components::variation_graph::scale::ColorScheme;
use crate::components::variation_graph::{
	GraphLink, SourceGraph, SourceLink, SourceNode, Strand, VariationGraphCanvas,
};

const BASES: [char; 4] = ['A', 'C', 'G', 'T'];

/// Generate a sample variation graph: a chain of sequences with a few bubbles.
fn generate_sample_graph(n: usize) -> SourceGraph {
	let nodes: Vec<SourceNode> = (0..n)
		.map(|i| {
			let len = 100 + (rand_simple(i) * 3000.0) as usize;
			let sequence: String = (0..len).map(|j| BASES[(j * 7 + i) % 4]).collect();
			SourceNode::new(format!("s{i}"), sequence).with_attr("name", format!("segment {i}"))
		})
		.collect();

	let strand = |seed: usize| {
		if rand_simple(seed) < 0.8 {
			Strand::Forward
		} else {
			Strand::Reverse
		}
	};
	let mut links: Vec<SourceLink> = (1..n)
		.map(|i| {
			SourceLink::new(
				format!("s{}", i - 1),
				format!("s{i}"),
				strand(i * 3),
				strand(i * 5),
			)
		})
		.collect();
	links.extend((2..n).step_by(4).map(|i| {
		SourceLink::new(
			format!("s{}", i - 2),
			format!("s{i}"),
			Strand::Forward,
			Strand::Forward,
		)
		.with_attr("id", format!("bubble {}", i / 4))
	}));

	SourceGraph { nodes, links }
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let sample = Arc::new(generate_sample_graph(24));
	info!(
		"sample graph: {} sequences, {} adjacencies",
		sample.nodes.len(),
		sample.links.len()
	);
	let graph = Signal::derive(move || Arc::clone(&sample));
	let color_scheme = RwSignal::new(ColorScheme::default());
	let block_size = RwSignal::new(500usize);
	let selected = RwSignal::new(None::<String>);

	let on_feature_click = Callback::new(move |link: GraphLink| {
		match serde_json::to_string_pretty(&link.record()) {
			Ok(text) => selected.set(Some(text)),
			Err(e) => warn!("cannot show link {:?}: {e}", link.id()),
		}
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="flexcontainer">
				<div class="sidebar">
					<div class="graph-controls">
						<label>
							"Colour scheme "
							<select on:change=move |ev| {
								match event_target_value(&ev).parse::<ColorScheme>() {
									Ok(scheme) => color_scheme.set(scheme),
									Err(e) => warn!("{e}"),
								}
							}>
								{ColorScheme::ALL
									.into_iter()
									.map(|scheme| {
										view! {
											<option
												value=scheme.name()
												selected=move || color_scheme.get() == scheme
											>
												{scheme.name()}
											</option>
										}
									})
									.collect_view()}
							</select>
						</label>
						<label>
							"Block size "
							<input
								type="number"
								min="1"
								prop:value=move || block_size.get().to_string()
								on:change=move |ev| {
									match event_target_value(&ev).parse::<usize>() {
										Ok(n) if n > 0 => block_size.set(n),
										_ => warn!("ignoring invalid block size"),
									}
								}
							/>
						</label>
					</div>
					<VariationGraphCanvas
						graph=graph
						block_size=Signal::derive(move || Some(block_size.get()))
						color_scheme=Signal::derive(move || Some(color_scheme.get()))
						on_feature_click=on_feature_click
					/>
				</div>
				<div class="body">
					{move || {
						selected
							.get()
							.map(|record| {
								view! {
									<div class="feature-panel">
										<button on:click=move |_| selected.set(None)>"Close"</button>
										<pre>{record}</pre>
									</div>
								}
							})
					}}
				</div>
			</div>
		</ErrorBoundary>
	}
}

mod adjacency;
mod assemble;
mod cache;
mod component;
mod config;
mod error;
mod input;
mod layout;
mod quadtree;
mod render;
pub mod scale;
mod scene;
mod segment;
mod state;
mod types;

pub use adjacency::{endpoints, resolve};
pub use assemble::assemble;
pub use cache::LayoutCache;
pub use component::VariationGraphCanvas;
pub use config::GraphConfig;
pub use error::GraphError;
pub use layout::{Layout, LayoutConfig, LayoutLink, LayoutNode, Simulation, layout};
pub use scene::{RenderStyle, Scene, StyledLink};
pub use segment::{backbone, split};
pub use state::{
	GraphViewState, HoverLabel, InteractionEvent, ViewTransform, ZoomExtent, link_label,
};
pub use types::{
	AssembledGraph, Attrs, GraphLink, LinkKind, SegmentNode, SequencePayload, SourceGraph,
	SourceLink, SourceNode, Strand,
};

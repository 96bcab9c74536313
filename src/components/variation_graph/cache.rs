use std::sync::Arc;

use log::debug;

use super::assemble::assemble;
use super::error::GraphError;
use super::layout::{Layout, LayoutConfig, layout};
use super::types::{AssembledGraph, SourceGraph};

struct AssemblyEntry {
	graph: Arc<SourceGraph>,
	block_size: usize,
	assembled: Arc<AssembledGraph>,
}

struct LayoutEntry {
	assembled: Arc<AssembledGraph>,
	config: LayoutConfig,
	layout: Arc<Layout>,
}

/// Keeps the last assembly and layout so presentational changes don't
/// re-run the simulation. Graphs are compared by identity, not content.
#[derive(Default)]
pub struct LayoutCache {
	assembly: Option<AssemblyEntry>,
	layout: Option<LayoutEntry>,
	assemblies: usize,
	layouts: usize,
}

impl LayoutCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn compute(
		&mut self,
		graph: &Arc<SourceGraph>,
		block_size: usize,
		config: &LayoutConfig,
	) -> Result<(Arc<AssembledGraph>, Arc<Layout>), GraphError> {
		let assembled = match &self.assembly {
			Some(entry) if Arc::ptr_eq(&entry.graph, graph) && entry.block_size == block_size => {
				Arc::clone(&entry.assembled)
			}
			_ => {
				let assembled = Arc::new(assemble(graph, block_size)?);
				self.assemblies += 1;
				self.assembly = Some(AssemblyEntry {
					graph: Arc::clone(graph),
					block_size,
					assembled: Arc::clone(&assembled),
				});
				assembled
			}
		};

		let placed = match &self.layout {
			Some(entry) if Arc::ptr_eq(&entry.assembled, &assembled) && entry.config == *config => {
				debug!("layout cache hit");
				Arc::clone(&entry.layout)
			}
			_ => {
				let placed = Arc::new(layout(&assembled, config)?);
				self.layouts += 1;
				self.layout = Some(LayoutEntry {
					assembled: Arc::clone(&assembled),
					config: config.clone(),
					layout: Arc::clone(&placed),
				});
				placed
			}
		};
		Ok((assembled, placed))
	}

	/// How many times assembly and layout actually ran.
	pub fn runs(&self) -> (usize, usize) {
		(self.assemblies, self.layouts)
	}

	pub fn clear(&mut self) {
		self.assembly = None;
		self.layout = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::variation_graph::types::{SourceLink, SourceNode, Strand};

	fn graph() -> Arc<SourceGraph> {
		Arc::new(SourceGraph {
			nodes: vec![
				SourceNode::new("a", "A".repeat(700)),
				SourceNode::new("b", "C".repeat(90)),
			],
			links: vec![SourceLink::new("a", "b", Strand::Reverse, Strand::Forward)],
		})
	}

	fn quick() -> LayoutConfig {
		LayoutConfig {
			steps: 20,
			..LayoutConfig::default()
		}
	}

	#[test]
	fn test_reuses_results() {
		let mut cache = LayoutCache::new();
		let g = graph();
		let (a1, l1) = cache.compute(&g, 500, &quick()).unwrap();
		let (a2, l2) = cache.compute(&g, 500, &quick()).unwrap();
		assert!(Arc::ptr_eq(&a1, &a2));
		assert!(Arc::ptr_eq(&l1, &l2));
		assert_eq!(cache.runs(), (1, 1));
	}

	#[test]
	fn test_structural_changes_recompute() {
		let mut cache = LayoutCache::new();
		let g = graph();
		cache.compute(&g, 500, &quick()).unwrap();

		cache.compute(&g, 100, &quick()).unwrap();
		assert_eq!(cache.runs(), (2, 2));

		let steps = LayoutConfig {
			steps: 30,
			..quick()
		};
		cache.compute(&g, 100, &steps).unwrap();
		assert_eq!(cache.runs(), (2, 3));

		// same content, different identity
		let copy = Arc::new((*g).clone());
		cache.compute(&copy, 100, &steps).unwrap();
		assert_eq!(cache.runs(), (3, 4));

		cache.clear();
		cache.compute(&copy, 100, &steps).unwrap();
		assert_eq!(cache.runs(), (4, 5));
	}

	#[test]
	fn test_errors_are_not_cached() {
		let mut cache = LayoutCache::new();
		let g = graph();
		assert!(cache.compute(&g, 0, &quick()).is_err());
		assert!(cache.compute(&g, 500, &quick()).is_ok());
		assert_eq!(cache.runs(), (1, 1));
	}
}

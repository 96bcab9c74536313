use log::debug;

use super::adjacency;
use super::error::GraphError;
use super::segment::{self, segment_count};
use super::types::{AssembledGraph, SourceGraph};

/// Turn a source graph into the segmented layout graph.
///
/// Segments and backbone links come first in node order, adjacency links
/// follow in link order. The result only depends on the inputs.
pub fn assemble(graph: &SourceGraph, block_size: usize) -> Result<AssembledGraph, GraphError> {
	if block_size == 0 {
		return Err(GraphError::Config("block size must be positive".into()));
	}
	graph.validate()?;

	let segment_total: usize = graph
		.nodes
		.iter()
		.map(|n| segment_count(n.sequence.len(), block_size))
		.sum();
	let mut nodes = Vec::with_capacity(segment_total);
	let mut links = Vec::with_capacity(segment_total - graph.nodes.len() + graph.links.len());

	for (link_num, node) in graph.nodes.iter().enumerate() {
		let segments = segment::split(node, block_size)?;
		links.extend(segment::backbone(node, link_num, &segments));
		nodes.extend(segments);
	}

	links.extend(graph.links.iter().map(adjacency::resolve));

	debug!(
		"assembled {} sequences into {} segments and {} links (block size {block_size})",
		graph.nodes.len(),
		nodes.len(),
		links.len()
	);
	Ok(AssembledGraph {
		nodes,
		links,
		source_node_count: graph.nodes.len(),
	})
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;
	use crate::components::variation_graph::types::{
		LinkKind, SourceLink, SourceNode, Strand,
	};

	fn sample() -> SourceGraph {
		SourceGraph {
			nodes: vec![
				SourceNode::new("n1", "A".repeat(1200)),
				SourceNode::new("n2", "C".repeat(300)),
				SourceNode::new("n3", "G".repeat(2000)),
			],
			links: vec![
				SourceLink::new("n1", "n2", Strand::Forward, Strand::Forward),
				SourceLink::new("n2", "n3", Strand::Reverse, Strand::Reverse),
				SourceLink::new("n2", "n3", Strand::Reverse, Strand::Reverse),
			],
		}
	}

	#[test]
	fn test_assemble_order() {
		let out = assemble(&sample(), 500).unwrap();
		let ids: Vec<&str> = out.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(
			ids,
			vec![
				"n1-start", "n1-500", "n1-end", "n2-start", "n2-end", "n3-start", "n3-500",
				"n3-1000", "n3-end"
			]
		);
		assert_eq!(out.source_node_count, 3);

		let backbone = out.links.iter().filter(|l| l.is_backbone()).count();
		assert_eq!(backbone, 2 + 1 + 3);
		// adjacencies follow the backbone and duplicates are kept
		let adjacency: Vec<_> = out.links[backbone..]
			.iter()
			.map(|l| (l.source.as_str(), l.target.as_str(), &l.kind))
			.collect();
		assert_eq!(
			adjacency,
			vec![
				("n1-end", "n2-start", &LinkKind::Adjacency),
				("n2-start", "n3-end", &LinkKind::Adjacency),
				("n2-start", "n3-end", &LinkKind::Adjacency),
			]
		);

		let link_nums: Vec<usize> = out
			.links
			.iter()
			.filter_map(|l| l.payload().map(|p| p.link_num))
			.collect();
		assert_eq!(link_nums, vec![0, 0, 1, 2, 2, 2]);
	}

	#[test]
	fn test_no_dangling_endpoints() {
		let out = assemble(&sample(), 100).unwrap();
		let ids: HashSet<&str> = out.nodes.iter().map(|n| n.id.as_str()).collect();
		for link in &out.links {
			assert!(ids.contains(link.source.as_str()), "{}", link.source);
			assert!(ids.contains(link.target.as_str()), "{}", link.target);
		}
	}

	#[test]
	fn test_assemble_idempotent() {
		let graph = sample();
		assert_eq!(assemble(&graph, 500).unwrap(), assemble(&graph, 500).unwrap());
	}

	#[test]
	fn test_segment_ids_unique() {
		// ids that look like other nodes' segments still assemble apart
		let graph = SourceGraph {
			nodes: vec![
				SourceNode::new("a", "A".repeat(1200)),
				SourceNode::new("a-500", "C"),
				SourceNode::new("a-end", "C"),
				SourceNode::new("a-500-start", "G".repeat(40)),
			],
			links: Vec::new(),
		};
		let out = assemble(&graph, 10).unwrap();
		let ids: HashSet<&str> = out.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids.len(), out.nodes.len());
	}

	#[test]
	fn test_assemble_rejects_bad_input() {
		let mut graph = sample();
		graph.nodes[1].sequence.clear();
		assert!(matches!(assemble(&graph, 500), Err(GraphError::InputShape(_))));
		assert!(matches!(assemble(&sample(), 0), Err(GraphError::Config(_))));
	}

	#[test]
	fn test_empty_graph() {
		let out = assemble(&SourceGraph::default(), 500).unwrap();
		assert!(out.nodes.is_empty() && out.links.is_empty());
	}
}

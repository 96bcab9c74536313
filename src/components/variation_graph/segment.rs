use std::sync::Arc;

use super::error::GraphError;
use super::types::{GraphLink, LinkKind, SegmentNode, SequencePayload, SourceNode};

/// Default block size in bases.
pub const DEFAULT_BLOCK_SIZE: usize = 500;

pub const START_SUFFIX: &str = "-start";
pub const END_SUFFIX: &str = "-end";

pub fn start_id(node_id: &str) -> String {
	format!("{node_id}{START_SUFFIX}")
}

pub fn end_id(node_id: &str) -> String {
	format!("{node_id}{END_SUFFIX}")
}

/// Number of segments `split` emits for a sequence of `len` bases.
pub fn segment_count(len: usize, block_size: usize) -> usize {
	if len <= block_size {
		2
	} else {
		(len - block_size).div_ceil(block_size) + 1
	}
}

/// Break a sequence into positional blocks of `block_size` bases.
///
/// The chain always starts with `{id}-start` at offset 0 and ends with
/// `{id}-end` at the offset where the walk stopped, so a short sequence
/// yields two segments at the same position.
pub fn split(node: &SourceNode, block_size: usize) -> Result<Vec<SegmentNode>, GraphError> {
	if block_size == 0 {
		return Err(GraphError::Config("block size must be positive".into()));
	}
	if node.sequence.is_empty() {
		return Err(GraphError::shape(format!(
			"node {:?} has an empty sequence",
			node.id
		)));
	}

	let len = node.sequence.len();
	let mut segments = Vec::with_capacity(segment_count(len, block_size));
	let mut pos = 0;
	while pos + block_size < len {
		let id = if pos == 0 {
			start_id(&node.id)
		} else {
			format!("{}-{pos}", node.id)
		};
		segments.push(SegmentNode {
			id,
			pos,
			attrs: node.attrs.clone(),
		});
		pos += block_size;
	}
	segments.push(SegmentNode {
		id: end_id(&node.id),
		pos,
		attrs: node.attrs.clone(),
	});

	// Short sequences never enter the loop; give them their start anyway.
	if segments.len() == 1 {
		segments.insert(
			0,
			SegmentNode {
				id: start_id(&node.id),
				pos: 0,
				attrs: node.attrs.clone(),
			},
		);
	}
	Ok(segments)
}

/// Links joining consecutive segments of one sequence.
pub fn backbone(node: &SourceNode, link_num: usize, segments: &[SegmentNode]) -> Vec<GraphLink> {
	let sequence: Arc<str> = Arc::from(node.sequence.as_str());
	segments
		.windows(2)
		.map(|pair| GraphLink {
			source: pair[0].id.clone(),
			target: pair[1].id.clone(),
			kind: LinkKind::Backbone(SequencePayload {
				id: node.id.clone(),
				link_num,
				length: node.sequence.len(),
				sequence: Arc::clone(&sequence),
			}),
			attrs: node.attrs.clone(),
		})
		.collect()
}

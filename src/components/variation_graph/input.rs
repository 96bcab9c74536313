//! Building and checking a [`SourceGraph`] from a JSON graph document.
//!
//! The expected shape is `{"nodes": [...], "links": [...]}` where each node
//! carries a string `id` and a non-empty string `sequence`, and each link a
//! `source`, `target`, `strand1` and `strand2`. Every other key is kept as an
//! attribute. `links` may be left out for graphs without adjacencies.

use std::collections::HashSet;

use log::warn;
use serde_json::Value;

use super::error::GraphError;
use super::types::{Attrs, SourceGraph, SourceLink, SourceNode, Strand};

const LINK_KEYS: [&str; 4] = ["source", "target", "strand1", "strand2"];

impl SourceGraph {
	/// Parse and validate a graph document.
	pub fn from_json_str(text: &str) -> Result<Self, GraphError> {
		let value: Value = serde_json::from_str(text)
			.map_err(|e| GraphError::shape(format!("not a JSON document: {e}")))?;
		Self::from_value(value)
	}

	pub fn from_value(value: Value) -> Result<Self, GraphError> {
		let Value::Object(mut doc) = value else {
			return Err(GraphError::shape("graph document must be an object"));
		};
		let nodes = match doc.remove("nodes") {
			Some(Value::Array(items)) => items
				.into_iter()
				.enumerate()
				.map(|(i, item)| parse_node(i, item))
				.collect::<Result<Vec<_>, _>>()?,
			Some(_) => return Err(GraphError::shape("`nodes` must be an array")),
			None => return Err(GraphError::shape("missing `nodes` array")),
		};
		let links = match doc.remove("links") {
			Some(Value::Array(items)) => items
				.into_iter()
				.enumerate()
				.map(|(i, item)| parse_link(i, item))
				.collect::<Result<Vec<_>, _>>()?,
			Some(_) => return Err(GraphError::shape("`links` must be an array")),
			None => Vec::new(),
		};

		let graph = SourceGraph { nodes, links };
		graph.validate()?;
		Ok(graph)
	}

	/// Reject graphs that would assemble into dangling or colliding segments.
	pub fn validate(&self) -> Result<(), GraphError> {
		let mut ids = HashSet::with_capacity(self.nodes.len());
		for (i, node) in self.nodes.iter().enumerate() {
			if node.id.is_empty() {
				return Err(GraphError::shape(format!("node {i} has an empty id")));
			}
			if node.sequence.is_empty() {
				return Err(GraphError::shape(format!(
					"node {:?} has an empty sequence",
					node.id
				)));
			}
			if !ids.insert(node.id.as_str()) {
				return Err(GraphError::shape(format!("duplicate node id {:?}", node.id)));
			}
		}
		for (i, link) in self.links.iter().enumerate() {
			for end in [&link.source, &link.target] {
				if !ids.contains(end.as_str()) {
					warn!("link {i} references unknown node {end:?}");
					return Err(GraphError::shape(format!(
						"link {i} references unknown node {end:?}"
					)));
				}
			}
		}
		Ok(())
	}
}

fn parse_node(index: usize, item: Value) -> Result<SourceNode, GraphError> {
	let Value::Object(mut attrs) = item else {
		return Err(GraphError::shape(format!("node {index} is not an object")));
	};
	let id = take_string(&mut attrs, "id", || format!("node {index}"))?;
	let sequence = take_string(&mut attrs, "sequence", || format!("node {id:?}"))?;
	Ok(SourceNode {
		id,
		sequence,
		attrs,
	})
}

fn parse_link(index: usize, item: Value) -> Result<SourceLink, GraphError> {
	let Value::Object(mut attrs) = item else {
		return Err(GraphError::shape(format!("link {index} is not an object")));
	};
	let [source, target, strand1, strand2] =
		LINK_KEYS.map(|key| take_string(&mut attrs, key, || format!("link {index}")));
	let link = SourceLink {
		source: source?,
		target: target?,
		strand1: strand1?.parse::<Strand>()?,
		strand2: strand2?.parse::<Strand>()?,
		attrs,
	};
	Ok(link)
}

fn take_string(
	attrs: &mut Attrs,
	key: &str,
	owner: impl Fn() -> String,
) -> Result<String, GraphError> {
	match attrs.remove(key) {
		Some(Value::String(s)) => Ok(s),
		Some(other) => Err(GraphError::shape(format!(
			"{}: `{key}` must be a string, got {other}",
			owner()
		))),
		None => Err(GraphError::shape(format!("{}: missing `{key}`", owner()))),
	}
}

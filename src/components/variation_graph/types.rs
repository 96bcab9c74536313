use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::error::GraphError;

/// Free-form attributes carried from the input document onto derived records.
pub type Attrs = Map<String, Value>;

/// Which physical end of a sequence an adjacency attaches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strand {
	/// `+`
	Forward,
	/// `-`
	Reverse,
}

impl Strand {
	/// The single-character form used in graph documents.
	pub fn as_str(self) -> &'static str {
		match self {
			Strand::Forward => "+",
			Strand::Reverse => "-",
		}
	}
}

impl FromStr for Strand {
	type Err = GraphError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"+" => Ok(Strand::Forward),
			"-" => Ok(Strand::Reverse),
			other => Err(GraphError::InvalidStrand {
				value: other.to_string(),
			}),
		}
	}
}

impl fmt::Display for Strand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One genomic sequence of the input graph.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceNode {
	pub id: String,
	pub sequence: String,
	pub attrs: Attrs,
}

impl SourceNode {
	pub fn new(id: impl Into<String>, sequence: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			sequence: sequence.into(),
			attrs: Attrs::new(),
		}
	}

	pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attrs.insert(key.into(), value.into());
		self
	}
}

/// Strand-oriented adjacency between the ends of two sequences.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceLink {
	pub source: String,
	pub target: String,
	pub strand1: Strand,
	pub strand2: Strand,
	pub attrs: Attrs,
}

impl SourceLink {
	pub fn new(
		source: impl Into<String>,
		target: impl Into<String>,
		strand1: Strand,
		strand2: Strand,
	) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			strand1,
			strand2,
			attrs: Attrs::new(),
		}
	}

	pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attrs.insert(key.into(), value.into());
		self
	}
}

/// The raw variation graph as handed over by the file-open surface.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceGraph {
	pub nodes: Vec<SourceNode>,
	pub links: Vec<SourceLink>,
}

/// A positional block of one source sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentNode {
	pub id: String,
	pub pos: usize,
	pub attrs: Attrs,
}

/// Sequence metadata carried by backbone links for colouring and tooltips.
#[derive(Clone, Debug, PartialEq)]
pub struct SequencePayload {
	/// Id of the owning source node.
	pub id: String,
	/// Index of the owning node in the source graph.
	pub link_num: usize,
	pub length: usize,
	pub sequence: Arc<str>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LinkKind {
	/// Joins consecutive segments of the same sequence.
	Backbone(SequencePayload),
	/// Joins segments of two sequences, one per source link.
	Adjacency,
}

/// An edge of the assembled layout graph.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
	pub kind: LinkKind,
	pub attrs: Attrs,
}

impl GraphLink {
	pub fn payload(&self) -> Option<&SequencePayload> {
		match &self.kind {
			LinkKind::Backbone(payload) => Some(payload),
			LinkKind::Adjacency => None,
		}
	}

	pub fn is_backbone(&self) -> bool {
		self.payload().is_some()
	}

	/// The owning node id for backbone links, the `id` attribute otherwise.
	pub fn id(&self) -> Option<&str> {
		match &self.kind {
			LinkKind::Backbone(payload) => Some(&payload.id),
			LinkKind::Adjacency => self.attrs.get("id").and_then(Value::as_str),
		}
	}

	/// Flat JSON view of the link, attrs included, as handed to click callbacks.
	pub fn record(&self) -> Value {
		let mut map = self.attrs.clone();
		map.insert("source".into(), Value::from(self.source.as_str()));
		map.insert("target".into(), Value::from(self.target.as_str()));
		if let LinkKind::Backbone(payload) = &self.kind {
			map.insert("id".into(), Value::from(payload.id.as_str()));
			map.insert("linkNum".into(), Value::from(payload.link_num));
			map.insert("length".into(), Value::from(payload.length));
			map.insert("sequence".into(), Value::from(&*payload.sequence));
		}
		Value::Object(map)
	}
}

/// Segmented graph ready for layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssembledGraph {
	pub nodes: Vec<SegmentNode>,
	pub links: Vec<GraphLink>,
	/// Number of source nodes, the denominator of the colour ramp.
	pub source_node_count: usize,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_strand_parse() {
		assert_eq!("+".parse::<Strand>(), Ok(Strand::Forward));
		assert_eq!("-".parse::<Strand>(), Ok(Strand::Reverse));
		assert_eq!(
			"x".parse::<Strand>(),
			Err(GraphError::InvalidStrand { value: "x".into() })
		);
		assert!("".parse::<Strand>().is_err());
		assert!("++".parse::<Strand>().is_err());
	}

	#[test]
	fn test_backbone_record() {
		let link = GraphLink {
			source: "n1-start".into(),
			target: "n1-end".into(),
			kind: LinkKind::Backbone(SequencePayload {
				id: "n1".into(),
				link_num: 3,
				length: 4,
				sequence: Arc::from("ACGT"),
			}),
			attrs: SourceNode::new("n1", "ACGT").with_attr("name", "chrM").attrs,
		};
		let record = link.record();
		assert_eq!(record["id"], "n1");
		assert_eq!(record["linkNum"], 3);
		assert_eq!(record["length"], 4);
		assert_eq!(record["sequence"], "ACGT");
		assert_eq!(record["name"], "chrM");
		assert_eq!(link.id(), Some("n1"));
	}

	#[test]
	fn test_adjacency_id_from_attrs() {
		let mut link = GraphLink {
			source: "a-end".into(),
			target: "b-start".into(),
			kind: LinkKind::Adjacency,
			attrs: Attrs::new(),
		};
		assert_eq!(link.id(), None);
		assert!(!link.is_backbone());
		link.attrs.insert("id".into(), Value::from("edge7"));
		assert_eq!(link.id(), Some("edge7"));
		assert_eq!(link.record()["source"], "a-end");
	}
}

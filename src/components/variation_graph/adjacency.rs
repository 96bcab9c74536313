use super::segment::{end_id, start_id};
use super::types::{GraphLink, LinkKind, SourceLink, Strand};

/// Segment ids a strand-oriented link attaches to.
///
/// `+` leaves the source from its end and enters the target at its start;
/// `-` flips the respective side.
pub fn endpoints(link: &SourceLink) -> (String, String) {
	use Strand::{Forward, Reverse};

	match (link.strand1, link.strand2) {
		(Forward, Forward) => (end_id(&link.source), start_id(&link.target)),
		(Reverse, Forward) => (start_id(&link.source), start_id(&link.target)),
		(Reverse, Reverse) => (start_id(&link.source), end_id(&link.target)),
		(Forward, Reverse) => (end_id(&link.source), end_id(&link.target)),
	}
}

pub fn resolve(link: &SourceLink) -> GraphLink {
	let (source, target) = endpoints(link);
	GraphLink {
		source,
		target,
		kind: LinkKind::Adjacency,
		attrs: link.attrs.clone(),
	}
}

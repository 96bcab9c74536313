use thiserror::Error;

/// Failures of the graph pipeline. All of them are local computation
/// failures surfaced to whoever asked for the assembly or layout.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GraphError {
	/// Malformed node or link in the source document.
	#[error("invalid graph input: {0}")]
	InputShape(String),

	/// A strand value other than `+` or `-`.
	#[error("invalid strand {value:?}: expected '+' or '-'")]
	InvalidStrand { value: String },

	/// Simulation produced no usable coordinates.
	#[error("layout diverged: {0}")]
	LayoutDivergence(String),

	/// Configuration value out of range.
	#[error("invalid configuration: {0}")]
	Config(String),
}

impl GraphError {
	pub(crate) fn shape(msg: impl Into<String>) -> Self {
		Self::InputShape(msg.into())
	}
}

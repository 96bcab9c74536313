use serde::{Deserialize, Serialize};

use super::error::GraphError;
use super::layout::{DEFAULT_HEIGHT, DEFAULT_STEPS, DEFAULT_WIDTH, LayoutConfig};
use super::scale::ColorScheme;
use super::scene::{DEFAULT_THICKNESS, RenderStyle};
use super::segment::DEFAULT_BLOCK_SIZE;

/// Every knob of the graph view. Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphConfig {
	pub block_size: usize,
	pub thickness: f64,
	pub color_scheme: ColorScheme,
	pub width: f64,
	pub height: f64,
	pub steps: usize,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			block_size: DEFAULT_BLOCK_SIZE,
			thickness: DEFAULT_THICKNESS,
			color_scheme: ColorScheme::default(),
			width: DEFAULT_WIDTH,
			height: DEFAULT_HEIGHT,
			steps: DEFAULT_STEPS,
		}
	}
}

impl GraphConfig {
	pub fn validate(&self) -> Result<(), GraphError> {
		if self.block_size == 0 {
			return Err(GraphError::Config("block size must be positive".into()));
		}
		self.render_style().validate()?;
		self.layout_config().validate()
	}

	/// Parameters that require a new simulation when changed.
	pub fn layout_config(&self) -> LayoutConfig {
		LayoutConfig {
			width: self.width,
			height: self.height,
			steps: self.steps,
			..LayoutConfig::default()
		}
	}

	/// Parameters that only restyle an existing layout.
	pub fn render_style(&self) -> RenderStyle {
		RenderStyle {
			thickness: self.thickness,
			color_scheme: self.color_scheme,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = GraphConfig::default();
		assert_eq!(config.block_size, 500);
		assert_eq!(config.thickness, 10.0);
		assert_eq!(config.color_scheme, ColorScheme::Rainbow);
		assert_eq!((config.width, config.height), (1000.0, 1000.0));
		assert_eq!(config.steps, 2000);
		assert_eq!(config.layout_config().charge_strength, -100.0);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_partial_json() {
		let config: GraphConfig =
			serde_json::from_str(r#"{"blockSize": 250, "colorScheme": "Viridis"}"#).unwrap();
		assert_eq!(config.block_size, 250);
		assert_eq!(config.color_scheme, ColorScheme::Viridis);
		assert_eq!(config.steps, DEFAULT_STEPS);
	}

	#[test]
	fn test_invalid_values() {
		for config in [
			GraphConfig {
				block_size: 0,
				..GraphConfig::default()
			},
			GraphConfig {
				thickness: -1.0,
				..GraphConfig::default()
			},
			GraphConfig {
				width: f64::INFINITY,
				..GraphConfig::default()
			},
		] {
			assert!(matches!(config.validate(), Err(GraphError::Config(_))));
		}
	}
}

use crate::engine::default_line_color;
use crate::geom::Bounds;
use crate::render::StrokeStyle;
use csscolorparser::Color;
use glam::{dvec2, DVec2};
use std::time::Duration;

pub const STEP_SIZE_DEFAULT: f64 = 10.0;
pub const CHANGE_IN_OPACITY_DEFAULT: f64 = 20.0;
pub const BATCH_TIME_DEFAULT: Duration = Duration::from_millis(5);
pub const WIDTH_DEFAULT: f64 = 800.0;
pub const HEIGHT_DEFAULT: f64 = 500.0;

#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("step size must be positive, got {0}")]
	StepSize(f64),

	#[error("bounds must be finite and non-negative, got {width}×{height}")]
	Bounds { width: f64, height: f64 },

	#[error("change in opacity must be finite and non-negative, got {0}")]
	ChangeInOpacity(f64),

	#[error("line width must be positive, got {0}")]
	LineWidth(f64),

	#[error("initial cursor ({x}, {y}) lies outside the surface")]
	CursorOutOfBounds { x: f64, y: f64 },
}

static_assertions::assert_impl_all!(ConfigError: std::error::Error, Send, Sync);

/// Options recognized by a sketch. Build with [`SketchConfig::builder`]; anything left unset takes
/// its default.
#[derive(Clone, Debug, bon::Builder)]
pub struct SketchConfig {
	/// Pixels moved per discrete step.
	#[builder(default = STEP_SIZE_DEFAULT)]
	pub step_size: f64,

	/// Window within which consecutive steps are coalesced.
	#[builder(default = BATCH_TIME_DEFAULT)]
	pub batch_time: Duration,

	/// Opacity taken off every segment per shake.
	#[builder(default = CHANGE_IN_OPACITY_DEFAULT)]
	pub change_in_opacity: f64,

	#[builder(default = WIDTH_DEFAULT)]
	pub width: f64,

	#[builder(default = HEIGHT_DEFAULT)]
	pub height: f64,

	/// Where the cursor starts. A random point on the surface when unset.
	pub cursor: Option<DVec2>,

	#[builder(default = default_line_color())]
	pub line_color: Color,

	#[builder(default)]
	pub style: StrokeStyle,

	/// Whether WASD and arrow keys move the cursor.
	#[builder(default = true)]
	pub hotkeys: bool,

	/// Whether a board press near a knob grabs the knob. See
	/// [`LayoutProvider::finger_guide`](crate::layout::LayoutProvider::finger_guide).
	#[builder(default = true)]
	pub finger_guides: bool,
}

impl Default for SketchConfig {
	fn default() -> Self {
		Self::builder().build()
	}
}

impl SketchConfig {
	pub fn bounds(&self) -> Bounds {
		Bounds::new(self.width, self.height)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if !(self.step_size.is_finite() && self.step_size > 0.0) {
			return Err(ConfigError::StepSize(self.step_size));
		}
		let extent_ok = |v: f64| v.is_finite() && v >= 0.0;
		if !(extent_ok(self.width) && extent_ok(self.height)) {
			return Err(ConfigError::Bounds {
				width: self.width,
				height: self.height,
			});
		}
		if !(self.change_in_opacity.is_finite() && self.change_in_opacity >= 0.0) {
			return Err(ConfigError::ChangeInOpacity(self.change_in_opacity));
		}
		if !(self.style.line_width.is_finite() && self.style.line_width > 0.0) {
			return Err(ConfigError::LineWidth(self.style.line_width));
		}
		if let Some(cursor) = self.cursor {
			if !self.bounds().contains(cursor) {
				return Err(ConfigError::CursorOutOfBounds {
					x: cursor.x,
					y: cursor.y,
				});
			}
		}
		Ok(())
	}

	/// The configured cursor, or a random whole-pixel point on the surface.
	pub fn initial_cursor(&self) -> DVec2 {
		self.cursor.unwrap_or_else(|| {
			let random_integer = |max: f64| (fastrand::f64() * max).floor();
			dvec2(random_integer(self.width), random_integer(self.height))
		})
	}
}

use crate::engine::Segment;
use csscolorparser::Color;
use glam::DVec2;
use std::cell::RefCell;
use std::rc::Rc;

pub mod raster;

mod canvas;
pub use canvas::*;

pub const DEFAULT_LINE_WIDTH: f64 = 2.0;

pub fn default_cursor_color() -> Color {
	Color::from_rgba8(0xb2, 0xa6, 0xaf, 0xff)
}

/// How segments and the cursor are painted.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
	pub line_width: f64,
	pub cursor_color: Color,
}

impl Default for StrokeStyle {
	fn default() -> Self {
		Self {
			line_width: DEFAULT_LINE_WIDTH,
			cursor_color: default_cursor_color(),
		}
	}
}

#[derive(Clone, Debug, thiserror::Error)]
pub enum RenderError {
	#[error("render surface unavailable: {0}")]
	Unavailable(String),
}

static_assertions::assert_impl_all!(RenderError: std::error::Error, Send, Sync);

/// The surface a sketch is painted on.
///
/// `draw` is called after every change to the drawing with the complete frame. Whether the frame
/// is presented immediately or later is up to the implementation.
pub trait RenderPort {
	fn draw(
		&mut self,
		segments: &[Segment],
		cursor: DVec2,
		style: &StrokeStyle,
	) -> Result<(), RenderError>;

	fn clear(&mut self) -> Result<(), RenderError>;
}

/// Lets the host keep a handle on a surface it has given to a sketch.
impl<T: RenderPort> RenderPort for Rc<RefCell<T>> {
	fn draw(
		&mut self,
		segments: &[Segment],
		cursor: DVec2,
		style: &StrokeStyle,
	) -> Result<(), RenderError> {
		self.borrow_mut().draw(segments, cursor, style)
	}

	fn clear(&mut self) -> Result<(), RenderError> {
		self.borrow_mut().clear()
	}
}

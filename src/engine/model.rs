use crate::geom::Bounds;
use csscolorparser::Color;
use glam::DVec2;

pub const FULL_OPACITY: f64 = 100.0;

pub fn default_line_color() -> Color {
	Color::from_rgba8(0, 0, 0, 255)
}

/// A straight line between two historical cursor positions.
///
/// Opacity starts at 100 and only ever goes down.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
	pub from: DVec2,
	pub to: DVec2,
	pub color: Color,
	opacity: f64,
}

impl Segment {
	pub fn new(from: DVec2, to: DVec2, color: Color) -> Self {
		Self {
			from,
			to,
			color,
			opacity: FULL_OPACITY,
		}
	}

	/// Opacity in the range `(0, 100]` for any segment still held by a model.
	pub fn opacity(&self) -> f64 {
		self.opacity
	}

	/// Opacity as a `[0, 1]` alpha factor.
	pub fn alpha(&self) -> f64 {
		(self.opacity / FULL_OPACITY).clamp(0.0, 1.0)
	}

	fn fade(&mut self, amount: f64) {
		self.opacity -= amount.max(0.0);
	}

	fn is_visible(&self) -> bool {
		self.opacity > 0.0
	}
}

/// The drawing: fading segments in draw order (oldest first) and the cursor that made them.
#[derive(Debug, Clone)]
pub struct SketchModel {
	segments: Vec<Segment>,
	cursor: DVec2,
	bounds: Bounds,
	line_color: Color,
}

impl SketchModel {
	/// `cursor` is clamped into `bounds`.
	pub fn new(bounds: Bounds, cursor: DVec2) -> Self {
		Self {
			segments: Vec::new(),
			cursor: bounds.clamp(cursor),
			bounds,
			line_color: default_line_color(),
		}
	}

	pub fn with_line_color(self, line_color: Color) -> Self {
		Self { line_color, ..self }
	}

	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	pub fn cursor(&self) -> DVec2 {
		self.cursor
	}

	pub fn bounds(&self) -> Bounds {
		self.bounds
	}

	pub fn line_color(&self) -> &Color {
		&self.line_color
	}

	/// Moves the cursor by `displacement`, saturating at the bounds, and records the move as a new
	/// segment. A fully saturated move still records a zero-length segment.
	pub fn apply_displacement(&mut self, displacement: DVec2) {
		let next = self.bounds.clamp(self.cursor + displacement);
		self
			.segments
			.push(Segment::new(self.cursor, next, self.line_color.clone()));
		self.cursor = next;
	}

	/// Fades every segment by `amount` and drops the ones that are no longer visible. Returns the
	/// number of segments removed.
	pub fn decay(&mut self, amount: f64) -> usize {
		let before = self.segments.len();
		for segment in &mut self.segments {
			segment.fade(amount);
		}
		self.segments.retain(Segment::is_visible);
		before - self.segments.len()
	}

	/// Erases every segment. The cursor stays where it is.
	pub fn reset(&mut self) {
		self.segments.clear();
	}
}

use super::raster::{square_pixels, stroke_pixels};
use super::{RenderError, RenderPort, StrokeStyle};
use crate::engine::Segment;
use csscolorparser::Color;
use glam::DVec2;

/// An in-memory RGBA8 surface, row-major with straight alpha.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
	width: u32,
	height: u32,
	data: Vec<u8>,
	frames: usize,
}

impl PixelCanvas {
	const TRANSPARENT: [u8; 4] = [0; 4];

	pub fn new(width: u32, height: u32) -> Self {
		Self {
			width,
			height,
			data: vec![0; width as usize * height as usize * 4],
			frames: 0,
		}
	}

	pub fn width(&self) -> u32 {
		self.width
	}

	pub fn height(&self) -> u32 {
		self.height
	}

	/// Number of frames drawn so far.
	pub fn frames(&self) -> usize {
		self.frames
	}

	fn index(&self, x: i32, y: i32) -> Option<usize> {
		let x = u32::try_from(x).ok().filter(|&x| x < self.width)?;
		let y = u32::try_from(y).ok().filter(|&y| y < self.height)?;
		Some((y as usize * self.width as usize + x as usize) * 4)
	}

	pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
		let i = self.index(x, y)?;
		let mut pixel = Self::TRANSPARENT;
		pixel.copy_from_slice(&self.data[i..i + 4]);
		Some(pixel)
	}

	/// Pixels with any coverage at all.
	pub fn painted_pixels(&self) -> usize {
		self.data.chunks_exact(4).filter(|p| p[3] != 0).count()
	}

	/// Source-over blend of `color`, with its alpha scaled by `alpha`. Out-of-bounds pixels are
	/// clipped.
	fn blend(&mut self, x: i32, y: i32, color: [u8; 4], alpha: f64) {
		let Some(i) = self.index(x, y) else {
			return;
		};
		let source_alpha = color[3] as f64 / 255.0 * alpha;
		if source_alpha <= 0.0 {
			return;
		}
		let destination = &mut self.data[i..i + 4];
		let destination_alpha = destination[3] as f64 / 255.0;
		let out_alpha = source_alpha + destination_alpha * (1.0 - source_alpha);
		for channel in 0..3 {
			let source = color[channel] as f64 * source_alpha;
			let below = destination[channel] as f64 * destination_alpha * (1.0 - source_alpha);
			destination[channel] = ((source + below) / out_alpha).round().clamp(0.0, 255.0) as u8;
		}
		destination[3] = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
	}

	fn stroke(&mut self, segment: &Segment, line_width: f64) {
		let color = segment.color.to_rgba8();
		let alpha = segment.alpha();
		for (x, y) in stroke_pixels(segment.from, segment.to, line_width) {
			self.blend(x, y, color, alpha);
		}
	}

	fn fill_cursor(&mut self, cursor: DVec2, line_width: f64, color: &Color) {
		let color = color.to_rgba8();
		for (x, y) in square_pixels(cursor, line_width) {
			self.blend(x, y, color, 1.0);
		}
	}
}

impl RenderPort for PixelCanvas {
	/// Repaints from scratch. An empty drawing leaves the surface blank, cursor included.
	fn draw(
		&mut self,
		segments: &[Segment],
		cursor: DVec2,
		style: &StrokeStyle,
	) -> Result<(), RenderError> {
		self.clear()?;
		self.frames += 1;
		if segments.is_empty() {
			return Ok(());
		}
		for segment in segments {
			self.stroke(segment, style.line_width);
		}
		self.fill_cursor(cursor, style.line_width, &style.cursor_color);
		Ok(())
	}

	fn clear(&mut self) -> Result<(), RenderError> {
		self.data.fill(0);
		Ok(())
	}
}

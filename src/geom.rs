use glam::DVec2;

/// Rotation that aligns the zero angle with a dial's resting orientation.
const ANGLE_OFFSET: f64 = std::f64::consts::FRAC_PI_4;

/// Angle in degrees of the vector from `p1` to `p2`, offset by a quarter turn counter-clockwise.
pub fn angle_between(p1: DVec2, p2: DVec2) -> f64 {
	let d = p2 - p1;
	(d.y.atan2(d.x) - ANGLE_OFFSET).to_degrees()
}

pub fn distance(p1: DVec2, p2: DVec2) -> f64 {
	p1.distance(p2)
}

/// Saturating clamp. Unlike `f64::clamp` this does not panic when `lo > hi`; callers are expected
/// to uphold `lo <= hi` anyway.
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
	if value < lo {
		lo
	} else if value > hi {
		hi
	} else {
		value
	}
}

/// An axis-aligned rectangle in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
	min: DVec2,
	max: DVec2,
}

impl Rect {
	pub fn new(min: DVec2, max: DVec2) -> Self {
		Self { min, max }
	}

	pub fn from_origin_size(origin: DVec2, size: DVec2) -> Self {
		Self::new(origin, origin + size)
	}

	pub fn min(&self) -> DVec2 {
		self.min
	}

	pub fn max(&self) -> DVec2 {
		self.max
	}

	pub fn size(&self) -> DVec2 {
		self.max - self.min
	}

	pub fn center(&self) -> DVec2 {
		self.min + self.size() / 2.0
	}

	/// Half-open containment: the left and top edges are inside, the right and bottom edges are not.
	pub fn contains(&self, point: DVec2) -> bool {
		point.x < self.max.x
			&& point.y < self.max.y
			&& !(point.x < self.min.x)
			&& !(point.y < self.min.y)
	}

	/// A rectangle with the same center, scaled by `factor` along both axes.
	pub fn scaled_about_center(&self, factor: f64) -> Self {
		let center = self.center();
		let half = self.size() * (factor / 2.0);
		Self::new(center - half, center + half)
	}
}

/// The drawable extent of a sketch. Valid positions are `[0, width] × [0, height]`, inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
	pub width: f64,
	pub height: f64,
}

impl Bounds {
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	pub fn clamp(&self, point: DVec2) -> DVec2 {
		DVec2::new(
			clamp(point.x, 0.0, self.width),
			clamp(point.y, 0.0, self.height),
		)
	}

	pub fn contains(&self, point: DVec2) -> bool {
		(0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
	}
}

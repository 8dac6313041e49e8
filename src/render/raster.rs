//! Conservative rasterization: every pixel a shape touches is produced, not only those whose
//! centers it covers. Pixel `(x, y)` is the unit square with its minimum corner at `(x, y)`.

use glam::{dvec2, DVec2};
use itertools::Itertools;

fn floor_as_i32(x: f64) -> i32 {
	x.floor() as i32
}

/// For each pixel column from `p0.x` to `p1.x`, the highest row touched by the edge `p0 → p1`.
/// Requires `p0.x <= p1.x`.
fn upper_edge(p0: DVec2, p1: DVec2) -> impl Iterator<Item = i32> {
	let d = p1 - p0;
	debug_assert!(d.x >= 0.0);
	let slope = d.y / d.x;
	let intercept = p0.y - slope * p0.x;
	let first_column = floor_as_i32(p0.x);
	let last_column = floor_as_i32(p1.x);

	// Within a column the edge peaks at one of its ends: the far end when rising, the near end
	// when falling. Interior column boundaries are shared by neighbouring columns.
	let (leading, trailing) = if d.y >= 0.0 {
		(None, Some(floor_as_i32(p1.y)))
	} else {
		(Some(floor_as_i32(p0.y)), None)
	};
	leading
		.into_iter()
		.chain(
			(first_column + 1..=last_column)
				.map(move |column| floor_as_i32(intercept + slope * column as f64)),
		)
		.chain(trailing)
}

/// For each pixel column from `p0.x` to `p1.x`, the lowest row touched by the edge `p0 → p1`.
fn lower_edge(p0: DVec2, p1: DVec2) -> impl Iterator<Item = i32> {
	upper_edge(dvec2(p0.x, -p0.y), dvec2(p1.x, -p1.y)).map(|row| -(row + 1))
}

/// Pixels between the edges `a → c` (below) and `a → b` (above), over the columns of `a → b`.
fn wedge(a: DVec2, b: DVec2, c: DVec2) -> impl Iterator<Item = (i32, i32)> {
	debug_assert!(b.x >= a.x);
	debug_assert!(c.x >= b.x);
	(floor_as_i32(a.x)..)
		.zip(lower_edge(a, c))
		.zip(upper_edge(a, b))
		.flat_map(|((column, bottom), top)| (bottom..=top).map(move |row| (column, row)))
}

/// A triangle sorted by `x` whose middle vertex lies above the `a → c` edge.
fn upper_triangle(a: DVec2, b: DVec2, c: DVec2) -> impl Iterator<Item = (i32, i32)> {
	let mirror = |p: DVec2| dvec2(-p.x, p.y);
	wedge(a, b, c).chain(
		wedge(mirror(c), mirror(b), mirror(a)).map(|(column, row)| (-(column + 1), row)),
	)
}

/// Every pixel touched by the triangle `a b c`, each exactly once, in sorted order.
pub fn triangle_pixels(a: DVec2, b: DVec2, c: DVec2) -> Vec<(i32, i32)> {
	let mut corners = [a, b, c];
	corners.sort_by(|p, q| p.x.total_cmp(&q.x));
	let [a, b, c] = corners;
	let flip = |p: DVec2| dvec2(p.x, -p.y);
	let pixels: Vec<_> = if (c - a).perp_dot(b - a) >= 0.0 {
		upper_triangle(a, b, c).collect()
	} else {
		upper_triangle(flip(a), flip(b), flip(c))
			.map(|(column, row)| (column, -(row + 1)))
			.collect()
	};
	pixels.into_iter().sorted().dedup().collect()
}

/// How far stroke outlines are pulled in before rasterizing, so that a pixel the stroke only
/// touches along an edge or corner is not painted.
const EDGE_INSET: f64 = 1e-6;

/// Every pixel a `width`-wide stroke from `from` to `to` with flat ends overlaps. A stroke of
/// zero length or width paints nothing.
pub fn stroke_pixels(from: DVec2, to: DVec2, width: f64) -> Vec<(i32, i32)> {
	let direction = (to - from).normalize_or_zero();
	if direction == DVec2::ZERO
		|| from.distance(to) <= 2.0 * EDGE_INSET
		|| width <= 2.0 * EDGE_INSET
	{
		return Vec::new();
	}
	let along = direction * EDGE_INSET;
	let (from, to) = (from + along, to - along);
	let offset = direction.perp() * (width / 2.0 - EDGE_INSET);
	let corners = [from + offset, to + offset, to - offset, from - offset];
	triangle_pixels(corners[0], corners[1], corners[2])
		.into_iter()
		.chain(triangle_pixels(corners[0], corners[2], corners[3]))
		.sorted()
		.dedup()
		.collect()
}

/// Every pixel touched by the axis-aligned square of side `2 * half` centered on `center`.
pub fn square_pixels(center: DVec2, half: f64) -> impl Iterator<Item = (i32, i32)> {
	let min = center - half;
	let max = center + half;
	let columns = floor_as_i32(min.x)..max.x.ceil() as i32;
	let rows = floor_as_i32(min.y)..max.y.ceil() as i32;
	columns.cartesian_product(rows)
}

//! Geometry of the on-screen elements the gesture handlers need: the board and the two knobs.
//!
//! Layout is owned by whatever hosts the sketch. The core only ever asks for rectangles, and a
//! missing element is a fault of the host rather than something the core can recover from.

use crate::geom::Rect;
use glam::{dvec2, DVec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Element {
	#[display("board")]
	Board,
	#[display("left knob")]
	LeftKnob,
	#[display("right knob")]
	RightKnob,
}

#[derive(Clone, Debug, thiserror::Error)]
pub enum LayoutError {
	#[error("no geometry for {0}")]
	Missing(Element),
}

static_assertions::assert_impl_all!(LayoutError: std::error::Error, Send, Sync);

/// Side of the touch target around a knob, relative to the knob itself.
pub const FINGER_GUIDE_RATIO: f64 = 2.0;

pub trait LayoutProvider {
	fn rect(&self, element: Element) -> Result<Rect, LayoutError>;

	fn center(&self, element: Element) -> Result<DVec2, LayoutError> {
		self.rect(element).map(|rect| rect.center())
	}

	/// The enlarged grab area around a knob. A press inside it turns the knob.
	fn finger_guide(&self, knob: Element) -> Result<Rect, LayoutError> {
		self
			.rect(knob)
			.map(|rect| rect.scaled_about_center(FINGER_GUIDE_RATIO))
	}
}

/// A layout whose rectangles never change.
#[derive(Debug, Clone, Default, bon::Builder)]
pub struct FixedLayout {
	board: Option<Rect>,
	left_knob: Option<Rect>,
	right_knob: Option<Rect>,
}

impl FixedLayout {
	/// Places the board at the origin with the knobs in its bottom corners, inset by the border.
	pub fn from_proportions(proportions: &Proportions) -> Self {
		let Proportions {
			width,
			height,
			border,
			knob,
		} = *proportions;
		let knob_size = dvec2(knob, knob);
		let knob_top = height - border - knob;
		Self {
			board: Some(Rect::new(DVec2::ZERO, dvec2(width, height))),
			left_knob: Some(Rect::from_origin_size(dvec2(border, knob_top), knob_size)),
			right_knob: Some(Rect::from_origin_size(
				dvec2(width - border - knob, knob_top),
				knob_size,
			)),
		}
	}
}

impl LayoutProvider for FixedLayout {
	fn rect(&self, element: Element) -> Result<Rect, LayoutError> {
		match element {
			Element::Board => self.board,
			Element::LeftKnob => self.left_knob,
			Element::RightKnob => self.right_knob,
		}
		.ok_or(LayoutError::Missing(element))
	}
}

/// Sizes of the toy's frame, derived from the space available to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proportions {
	pub width: f64,
	pub height: f64,
	pub border: f64,
	pub knob: f64,
}

impl Proportions {
	pub const HEIGHT_TO_WIDTH_RATIO: f64 = 3.25 / 3.75;
	pub const HEIGHT_TO_KNOB_RATIO: f64 = 1.0 / 6.0;
	pub const HEIGHT_TO_BORDER_RATIO: f64 = 1.0 / 7.0;

	/// The largest frame with the toy's aspect ratio that fits in `view_width × view_height`.
	pub fn fit(view_width: f64, view_height: f64) -> Self {
		let height_restricted = view_height / view_width < Self::HEIGHT_TO_WIDTH_RATIO;
		let (width, height) = if height_restricted {
			(view_height / Self::HEIGHT_TO_WIDTH_RATIO, view_height)
		} else {
			(view_width, view_width * Self::HEIGHT_TO_WIDTH_RATIO)
		};
		Self {
			width,
			height,
			border: height * Self::HEIGHT_TO_BORDER_RATIO,
			knob: height * Self::HEIGHT_TO_KNOB_RATIO,
		}
	}
}

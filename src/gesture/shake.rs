use super::input::PointerSample;
use super::lock::LockRegistry;
use crate::geom::{angle_between, distance};
use crate::layout::{Element, LayoutError, LayoutProvider};
use glam::DVec2;
use std::fmt;
use std::rc::Rc;

/// Minimum distance, in pixels, a drag must travel from its reference point to count as a shake.
pub const SHAKE_DISTANCE: f64 = 50.0;
/// Minimum change, in degrees, of the drag's angle around the board center to count as a shake.
pub const SHAKE_ANGLE: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShakeReference {
	pub point: DVec2,
	pub angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ShakeState {
	#[default]
	Idle,
	/// A drag is in progress. The reference is taken from the first move sample.
	Tracking { reference: Option<ShakeReference> },
}

/// Recognizes an oscillating drag of the board.
///
/// Each time the drag moves far enough from its reference point while also swinging far enough
/// around the board center, `on_shake` fires and the reference moves to the current sample, so a
/// sustained shake keeps firing.
pub struct ShakeDetector {
	on_shake: Box<dyn FnMut()>,
	locks: LockRegistry,
	layout: Rc<dyn LayoutProvider>,
	state: ShakeState,
}

impl fmt::Debug for ShakeDetector {
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
		fmt
			.debug_struct("ShakeDetector")
			.field("state", &self.state)
			.finish()
	}
}

impl ShakeDetector {
	pub fn new(
		on_shake: impl FnMut() + 'static,
		locks: LockRegistry,
		layout: Rc<dyn LayoutProvider>,
	) -> Self {
		Self {
			on_shake: Box::new(on_shake),
			locks,
			layout,
			state: ShakeState::Idle,
		}
	}

	pub fn state(&self) -> ShakeState {
		self.state
	}

	pub fn is_tracking(&self) -> bool {
		matches!(self.state, ShakeState::Tracking { .. })
	}

	pub fn on_gesture_down(&mut self) {
		self.state = ShakeState::Tracking { reference: None };
	}

	pub fn on_gesture_move(&mut self, sample: &PointerSample) -> Result<(), LayoutError> {
		let ShakeState::Tracking { reference } = self.state else {
			return Ok(());
		};
		if !self.locks.is_free() {
			tracing::trace!(held = ?self.locks.all_held(), "shake suppressed by held lock");
			return Ok(());
		}

		let point = sample.position();
		let angle = angle_between(point, self.layout.center(Element::Board)?);
		let current = ShakeReference { point, angle };

		let Some(reference) = reference else {
			self.state = ShakeState::Tracking {
				reference: Some(current),
			};
			return Ok(());
		};

		let moved = distance(point, reference.point);
		let swung = (reference.angle - angle).abs();
		if moved > SHAKE_DISTANCE && swung > SHAKE_ANGLE {
			tracing::debug!(moved, swung, "shake detected");
			(self.on_shake)();
			self.state = ShakeState::Tracking {
				reference: Some(current),
			};
		}
		Ok(())
	}

	pub fn on_gesture_up(&mut self) {
		self.state = ShakeState::Idle;
	}
}

use super::input::{PointerEvent, PointerSample, TouchId};
use super::lock::{LockRegistry, LockToken};
use crate::geom::angle_between;
use crate::layout::{Element, LayoutError, LayoutProvider};
use std::fmt;
use std::rc::Rc;

/// How far, in degrees, a dial must turn past the last step before it steps again.
pub const STEP_ANGLE: f64 = 10.0;

/// The live part of a knob gesture. Exists from gesture-down to gesture-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnobState {
	pub lock_token: LockToken,
	/// Absolute angle of the pointer when the gesture started.
	pub baseline_angle: f64,
	/// Relative angle at which the last step fired. Starts at the baseline.
	pub tracking_angle: f64,
	/// Latest relative angle, i.e. how far the dial has been turned.
	pub rotation: f64,
	pub active_identifier: Option<TouchId>,
}

/// A rotary control. Turning it emits discrete increase/decrease steps, one per [`STEP_ANGLE`]
/// crossing.
pub struct GestureKnob {
	increase: Box<dyn FnMut()>,
	decrease: Box<dyn FnMut()>,
	locks: LockRegistry,
	lock_token: LockToken,
	layout: Rc<dyn LayoutProvider>,
	element: Element,
	state: Option<KnobState>,
}

impl fmt::Debug for GestureKnob {
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
		fmt
			.debug_struct("GestureKnob")
			.field("lock_token", &self.lock_token)
			.field("element", &self.element)
			.field("state", &self.state)
			.finish()
	}
}

impl GestureKnob {
	pub fn new(
		increase: impl FnMut() + 'static,
		decrease: impl FnMut() + 'static,
		locks: LockRegistry,
		lock_token: LockToken,
		layout: Rc<dyn LayoutProvider>,
		element: Element,
	) -> Self {
		Self {
			increase: Box::new(increase),
			decrease: Box::new(decrease),
			locks,
			lock_token,
			layout,
			element,
			state: None,
		}
	}

	pub fn state(&self) -> Option<&KnobState> {
		self.state.as_ref()
	}

	pub fn is_active(&self) -> bool {
		self.state.is_some()
	}

	pub fn active_identifier(&self) -> Option<TouchId> {
		self.state.and_then(|state| state.active_identifier)
	}

	pub fn rotation(&self) -> Option<f64> {
		self.state.map(|state| state.rotation)
	}

	fn angle_of(&self, sample: &PointerSample) -> Result<f64, LayoutError> {
		let center = self.layout.center(self.element)?;
		Ok(angle_between(sample.position(), center))
	}

	pub fn on_gesture_down(&mut self, sample: &PointerSample) -> Result<(), LayoutError> {
		if let Some(state) = &self.state {
			tracing::trace!(
				knob = %self.element,
				active = ?state.active_identifier,
				ignored = ?sample.identifier(),
				"knob already held"
			);
			return Ok(());
		}

		if !self.locks.is_free_for(self.lock_token) {
			tracing::trace!(
				knob = %self.element,
				held = ?self.locks.all_held(),
				"another control is driving"
			);
			return Ok(());
		}

		let baseline_angle = self.angle_of(sample)?;
		self.locks.acquire(self.lock_token);
		self.state = Some(KnobState {
			lock_token: self.lock_token,
			baseline_angle,
			tracking_angle: baseline_angle,
			rotation: 0.0,
			active_identifier: sample.identifier(),
		});
		Ok(())
	}

	pub fn on_gesture_move(&mut self, sample: &PointerSample) -> Result<(), LayoutError> {
		let Some(state) = self.state else {
			return Ok(());
		};
		// Mouse gestures follow only the mouse, touch gestures only their own contact.
		if sample.identifier() != state.active_identifier {
			return Ok(());
		}

		let next_angle = self.angle_of(sample)? - state.baseline_angle;
		let tracking_angle = state.tracking_angle;
		if let Some(state) = &mut self.state {
			state.rotation = next_angle;
		}

		if !self.locks.is_free_for(self.lock_token) {
			tracing::trace!(knob = %self.element, held = ?self.locks.all_held(), "turn while locked out");
			return Ok(());
		}
		if (next_angle - tracking_angle).abs() < STEP_ANGLE {
			tracing::trace!(knob = %self.element, next_angle, tracking_angle, "inside dead zone");
			return Ok(());
		}

		if next_angle > tracking_angle {
			(self.increase)();
		} else if next_angle < tracking_angle {
			(self.decrease)();
		}
		if let Some(state) = &mut self.state {
			state.tracking_angle = next_angle;
		}
		Ok(())
	}

	pub fn on_gesture_up(&mut self) {
		if self.state.take().is_some() {
			self.locks.release(self.lock_token);
		}
	}

	/// Ends the gesture if `event` releases the pointer driving it: the mouse for a mouse gesture,
	/// the bound contact for a touch gesture.
	pub fn on_pointer_up(&mut self, event: &PointerEvent) {
		let Some(state) = self.state else {
			return;
		};
		let released = match state.active_identifier {
			Some(active) => event.changed_identifiers().any(|id| id == active),
			None => matches!(event, PointerEvent::Mouse { .. }),
		};
		if released {
			self.on_gesture_up();
		}
	}
}

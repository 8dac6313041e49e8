use glam::{dvec2, DVec2};

/// Identifier of one finger for the lifetime of its touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub struct TouchId(pub i64);

/// One contact point as reported by the event source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
	pub identifier: TouchId,
	pub page_x: f64,
	pub page_y: f64,
}

impl Touch {
	pub fn new(identifier: i64, page_x: f64, page_y: f64) -> Self {
		Self {
			identifier: TouchId(identifier),
			page_x,
			page_y,
		}
	}
}

/// A raw pointer event as delivered by the host, before normalization. Mouse coordinates may be
/// missing; touch lists may be empty.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
	Mouse {
		page_x: Option<f64>,
		page_y: Option<f64>,
	},
	Touch {
		/// Every contact currently on the surface.
		touches: Vec<Touch>,
		/// The contacts that started, moved or ended in this event.
		changed_touches: Vec<Touch>,
	},
}

impl PointerEvent {
	pub fn mouse(x: f64, y: f64) -> Self {
		Self::Mouse {
			page_x: Some(x),
			page_y: Some(y),
		}
	}

	/// A touch event where `changed` is the only contact involved.
	pub fn touch(changed: Touch) -> Self {
		Self::Touch {
			touches: vec![changed],
			changed_touches: vec![changed],
		}
	}

	/// A touch-end for `changed`, which is no longer part of the active contacts.
	pub fn touch_end(changed: Touch) -> Self {
		Self::Touch {
			touches: Vec::new(),
			changed_touches: vec![changed],
		}
	}

	/// Identifiers of the contacts that changed in this event. Empty for mouse events.
	pub fn changed_identifiers(&self) -> impl Iterator<Item = TouchId> + '_ {
		let changed: &[Touch] = match self {
			Self::Mouse { .. } => &[],
			Self::Touch {
				changed_touches, ..
			} => changed_touches,
		};
		changed.iter().map(|touch| touch.identifier)
	}
}

/// A normalized position sample fed to the gesture recognizers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerSample {
	Mouse { position: DVec2 },
	Touch { identifier: TouchId, position: DVec2 },
}

impl PointerSample {
	pub fn position(&self) -> DVec2 {
		match self {
			Self::Mouse { position } | Self::Touch { position, .. } => *position,
		}
	}

	pub fn identifier(&self) -> Option<TouchId> {
		match self {
			Self::Mouse { .. } => None,
			Self::Touch { identifier, .. } => Some(*identifier),
		}
	}
}

impl From<Touch> for PointerSample {
	fn from(touch: Touch) -> Self {
		Self::Touch {
			identifier: touch.identifier,
			position: dvec2(touch.page_x, touch.page_y),
		}
	}
}

/// The single normalization step between host events and the recognizers. Each method returns
/// `None` when the event does not carry a usable position, which handlers treat as noise.
pub trait SampleSource {
	/// The sample that starts a gesture. For touches this is the first changed contact, whose
	/// identifier the gesture then follows.
	fn start_sample(&self) -> Option<PointerSample>;

	/// The sample that continues a gesture bound to `identifier`, or the first active contact when
	/// the gesture is not bound to one.
	fn sample_for(&self, identifier: Option<TouchId>) -> Option<PointerSample>;
}

impl SampleSource for PointerEvent {
	fn start_sample(&self) -> Option<PointerSample> {
		match self {
			Self::Mouse { .. } => self.sample_for(None),
			Self::Touch {
				changed_touches, ..
			} => changed_touches.first().copied().map(PointerSample::from),
		}
	}

	fn sample_for(&self, identifier: Option<TouchId>) -> Option<PointerSample> {
		match self {
			Self::Mouse { page_x, page_y } => {
				let position = dvec2((*page_x)?, (*page_y)?);
				Some(PointerSample::Mouse { position })
			}
			Self::Touch { touches, .. } => {
				let touch = match identifier {
					Some(identifier) => touches.iter().find(|t| t.identifier == identifier),
					None => touches.first(),
				};
				touch.copied().map(PointerSample::from)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn mouse_without_coordinates_is_dropped() {
		let event = PointerEvent::Mouse {
			page_x: Some(4.0),
			page_y: None,
		};
		assert_eq!(event.start_sample(), None);
		assert_eq!(event.sample_for(None), None);
	}

	#[test]
	fn mouse_sample_has_no_identifier() {
		let sample = PointerEvent::mouse(3.0, 4.0).start_sample().unwrap();
		assert_eq!(sample.position(), dvec2(3.0, 4.0));
		assert_eq!(sample.identifier(), None);
	}

	#[test]
	fn touch_start_uses_first_changed_touch() {
		let event = PointerEvent::Touch {
			touches: vec![Touch::new(1, 0.0, 0.0), Touch::new(2, 5.0, 6.0)],
			changed_touches: vec![Touch::new(2, 5.0, 6.0)],
		};
		let sample = event.start_sample().unwrap();
		assert_eq!(sample.identifier(), Some(TouchId(2)));
		assert_eq!(sample.position(), dvec2(5.0, 6.0));
	}

	#[test]
	fn touch_move_follows_identifier() {
		let event = PointerEvent::Touch {
			touches: vec![Touch::new(1, 0.0, 0.0), Touch::new(2, 5.0, 6.0)],
			changed_touches: vec![Touch::new(1, 0.0, 0.0)],
		};
		assert_eq!(
			event.sample_for(Some(TouchId(2))).map(|s| s.position()),
			Some(dvec2(5.0, 6.0))
		);
		assert_eq!(
			event.sample_for(None).map(|s| s.position()),
			Some(dvec2(0.0, 0.0))
		);
		assert_eq!(event.sample_for(Some(TouchId(9))), None);
	}

	#[test]
	fn changed_identifiers_of_touch_end() {
		let event = PointerEvent::touch_end(Touch::new(7, 1.0, 1.0));
		assert_eq!(event.changed_identifiers().collect::<Vec<_>>(), vec![TouchId(7)]);
		assert_eq!(event.sample_for(None), None);
		assert_eq!(PointerEvent::mouse(0.0, 0.0).changed_identifiers().count(), 0);
	}
}

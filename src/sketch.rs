use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, SketchConfig};
use crate::engine::{MoveBatcher, Segment, SketchModel};
use crate::gesture::{
	Direction, GestureKnob, KeyboardState, LockRegistry, LockToken, PointerEvent, SampleSource,
	ShakeDetector, ShakeState,
};
use crate::layout::{Element, LayoutError, LayoutProvider};
use crate::render::{RenderPort, StrokeStyle};
use crate::util::ResultExt;
use glam::DVec2;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, thiserror::Error)]
pub enum SketchError {
	#[error("invalid configuration: {0}")]
	Config(#[from] ConfigError),

	#[error("layout query failed: {0}")]
	Layout(#[from] LayoutError),
}

static_assertions::assert_impl_all!(SketchError: std::error::Error, Send, Sync);

/// Everything a step or a shake touches. Shared between the session and the gesture callbacks.
struct Drawing {
	model: SketchModel,
	batcher: MoveBatcher,
	render: Box<dyn RenderPort>,
	style: StrokeStyle,
	clock: Rc<dyn Clock>,
	step_size: f64,
	change_in_opacity: f64,
}

impl Drawing {
	fn step(&mut self, direction: Direction) {
		let now = self.clock.now();
		let step = direction.unit() * self.step_size;
		if let Some(displacement) = self.batcher.record_step(step, now) {
			self.model.apply_displacement(displacement);
			self.draw();
		}
	}

	fn shake(&mut self) {
		let removed = self.model.decay(self.change_in_opacity);
		tracing::info!(
			removed,
			remaining = self.model.segments().len(),
			"shake"
		);
		self.draw();
	}

	fn draw(&mut self) {
		self
			.render
			.draw(self.model.segments(), self.model.cursor(), &self.style)
			.ok_or_log("draw");
	}
}

fn stepper(drawing: &Rc<RefCell<Drawing>>, direction: Direction) -> impl FnMut() + 'static {
	let drawing = drawing.clone();
	move || drawing.borrow_mut().step(direction)
}

/// A running etch-a-sketch: two knobs, a shakeable board and optional hotkeys driving one drawing.
///
/// The host forwards its pointer and key events here. Every change to the drawing is pushed to the
/// [`RenderPort`] as a complete frame.
pub struct Sketch {
	drawing: Rc<RefCell<Drawing>>,
	locks: LockRegistry,
	layout: Rc<dyn LayoutProvider>,
	left_knob: GestureKnob,
	right_knob: GestureKnob,
	shake: ShakeDetector,
	keyboard: Option<KeyboardState>,
	finger_guides: bool,
}

impl fmt::Debug for Sketch {
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
		fmt
			.debug_struct("Sketch")
			.field("cursor", &self.cursor())
			.field("segments", &self.segment_count())
			.field("locks", &self.locks)
			.field("left_knob", &self.left_knob)
			.field("right_knob", &self.right_knob)
			.field("shake", &self.shake)
			.finish()
	}
}

impl Sketch {
	pub fn new(
		config: SketchConfig,
		layout: Rc<dyn LayoutProvider>,
		render: impl RenderPort + 'static,
	) -> Result<Self, SketchError> {
		Self::with_clock(config, layout, render, Rc::new(SystemClock))
	}

	#[tracing::instrument(err, skip(layout, render, clock))]
	pub fn with_clock(
		config: SketchConfig,
		layout: Rc<dyn LayoutProvider>,
		render: impl RenderPort + 'static,
		clock: Rc<dyn Clock>,
	) -> Result<Self, SketchError> {
		config.validate()?;

		let cursor = config.initial_cursor();
		let model = SketchModel::new(config.bounds(), cursor).with_line_color(config.line_color);
		let drawing = Rc::new(RefCell::new(Drawing {
			model,
			batcher: MoveBatcher::new(config.batch_time),
			render: Box::new(render),
			style: config.style,
			clock,
			step_size: config.step_size,
			change_in_opacity: config.change_in_opacity,
		}));

		let locks = LockRegistry::new();
		let left_knob = GestureKnob::new(
			stepper(&drawing, Direction::Right),
			stepper(&drawing, Direction::Left),
			locks.clone(),
			LockToken::LeftKnob,
			layout.clone(),
			Element::LeftKnob,
		);
		let right_knob = GestureKnob::new(
			stepper(&drawing, Direction::Up),
			stepper(&drawing, Direction::Down),
			locks.clone(),
			LockToken::RightKnob,
			layout.clone(),
			Element::RightKnob,
		);
		let shake = ShakeDetector::new(
			{
				let drawing = drawing.clone();
				move || drawing.borrow_mut().shake()
			},
			locks.clone(),
			layout.clone(),
		);
		let keyboard = config.hotkeys.then(|| KeyboardState::new(locks.clone()));

		tracing::info!(%cursor, hotkeys = config.hotkeys, "sketch ready");
		Ok(Self {
			drawing,
			locks,
			layout,
			left_knob,
			right_knob,
			shake,
			keyboard,
			finger_guides: config.finger_guides,
		})
	}

	fn knob_mut(&mut self, element: Element) -> Option<&mut GestureKnob> {
		match element {
			Element::LeftKnob => Some(&mut self.left_knob),
			Element::RightKnob => Some(&mut self.right_knob),
			Element::Board => None,
		}
	}

	/// Starts a gesture on `target`.
	///
	/// A board press inside a knob's finger guide turns that knob instead. Any other board press
	/// starts shake tracking, unless a control is held or the press lands on a knob.
	pub fn pointer_down(&mut self, target: Element, event: &PointerEvent) -> Result<(), SketchError> {
		let Some(sample) = event.start_sample() else {
			tracing::trace!(%target, "down without a position");
			return Ok(());
		};

		let target = match target {
			Element::Board if self.finger_guides => self.guide_under(sample.position())?,
			target => target,
		};
		if let Some(knob) = self.knob_mut(target) {
			knob.on_gesture_down(&sample)?;
			return Ok(());
		}

		if !self.locks.is_free() {
			tracing::trace!(held = ?self.locks.all_held(), "board press while a control is held");
			return Ok(());
		}
		for knob in [Element::LeftKnob, Element::RightKnob] {
			if self.layout.rect(knob)?.contains(sample.position()) {
				tracing::trace!(%knob, "board press on a knob");
				return Ok(());
			}
		}
		self.shake.on_gesture_down();
		Ok(())
	}

	/// The knob whose finger guide contains `position`, or the board.
	fn guide_under(&self, position: DVec2) -> Result<Element, LayoutError> {
		for knob in [Element::LeftKnob, Element::RightKnob] {
			if self.layout.finger_guide(knob)?.contains(position) {
				tracing::trace!(%knob, "board press on a finger guide");
				return Ok(knob);
			}
		}
		Ok(Element::Board)
	}

	pub fn pointer_move(&mut self, event: &PointerEvent) -> Result<(), SketchError> {
		for knob in [&mut self.left_knob, &mut self.right_knob] {
			if !knob.is_active() {
				continue;
			}
			if let Some(sample) = event.sample_for(knob.active_identifier()) {
				knob.on_gesture_move(&sample)?;
			}
		}

		if self.shake.is_tracking() {
			if let Some(sample) = event.sample_for(None) {
				self.shake.on_gesture_move(&sample)?;
			}
		}
		Ok(())
	}

	/// Ends the gestures `event` lets go of. A knob stays held until the pointer that grabbed it
	/// lifts.
	pub fn pointer_up(&mut self, event: &PointerEvent) {
		self.left_knob.on_pointer_up(event);
		self.right_knob.on_pointer_up(event);
		self.shake.on_gesture_up();
	}

	pub fn key_down(&mut self, key: &str, repeat: bool) {
		let Some(keyboard) = &mut self.keyboard else {
			return;
		};
		if let Some(direction) = keyboard.key_down(key, repeat) {
			self.step(direction);
		}
	}

	pub fn key_up(&mut self, key: &str) {
		if let Some(keyboard) = &mut self.keyboard {
			keyboard.key_up(key);
		}
	}

	/// Moves the cursor one step, as a knob turn or a hotkey would.
	pub fn step(&mut self, direction: Direction) {
		self.drawing.borrow_mut().step(direction);
	}

	/// Fades the drawing once, as a detected shake would.
	pub fn shake(&mut self) {
		self.drawing.borrow_mut().shake();
	}

	/// Erases every segment. The cursor stays where it is.
	pub fn clear(&mut self) {
		let mut drawing = self.drawing.borrow_mut();
		drawing.model.reset();
		drawing.render.clear().ok_or_log("clear");
		tracing::info!(cursor = %drawing.model.cursor(), "cleared");
	}

	pub fn set_line_width(&mut self, line_width: f64) -> Result<(), ConfigError> {
		if !(line_width.is_finite() && line_width > 0.0) {
			return Err(ConfigError::LineWidth(line_width));
		}
		let mut drawing = self.drawing.borrow_mut();
		drawing.style.line_width = line_width;
		drawing.draw();
		Ok(())
	}

	pub fn cursor(&self) -> DVec2 {
		self.drawing.borrow().model.cursor()
	}

	pub fn segments(&self) -> Vec<Segment> {
		self.drawing.borrow().model.segments().to_vec()
	}

	pub fn segment_count(&self) -> usize {
		self.drawing.borrow().model.segments().len()
	}

	pub fn style(&self) -> StrokeStyle {
		self.drawing.borrow().style.clone()
	}

	/// Displacement buffered by the batcher and not yet applied.
	pub fn pending(&self) -> DVec2 {
		self.drawing.borrow().batcher.pending()
	}

	/// How far the knob has been turned in its current gesture, or `None` when it is not held.
	pub fn knob_rotation(&self, knob: Element) -> Option<f64> {
		match knob {
			Element::LeftKnob => self.left_knob.rotation(),
			Element::RightKnob => self.right_knob.rotation(),
			Element::Board => None,
		}
	}

	pub fn shake_state(&self) -> ShakeState {
		self.shake.state()
	}

	pub fn locks(&self) -> &LockRegistry {
		&self.locks
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::clock::ManualClock;
	use crate::gesture::Touch;
	use crate::test::{
		board_layout, point_at_angle, BrokenRender, RecordingRender, BOARD_CENTER, KNOB_CENTER,
		RIGHT_KNOB_CENTER,
	};
	use approx::assert_relative_eq;
	use glam::dvec2;

	const START: DVec2 = DVec2::new(400.0, 250.0);

	fn config() -> SketchConfig {
		SketchConfig::builder().cursor(START).build()
	}

	fn sketch_with(config: SketchConfig) -> (Sketch, RecordingRender, ManualClock) {
		let render = RecordingRender::default();
		let clock = ManualClock::new();
		let sketch = Sketch::with_clock(
			config,
			board_layout(),
			render.clone(),
			Rc::new(clock.clone()),
		)
		.unwrap();
		(sketch, render, clock)
	}

	fn sketch() -> (Sketch, RecordingRender, ManualClock) {
		sketch_with(config())
	}

	fn at_angle(center: DVec2, degrees: f64) -> PointerEvent {
		let point = point_at_angle(center, 30.0, degrees);
		PointerEvent::mouse(point.x, point.y)
	}

	#[test]
	fn rejects_invalid_config() {
		let config = SketchConfig::builder().step_size(0.0).build();
		let result = Sketch::new(config, board_layout(), RecordingRender::default());
		assert!(matches!(result, Err(SketchError::Config(ConfigError::StepSize(_)))));
	}

	#[test]
	fn steps_are_batched() {
		let (mut sketch, render, clock) = sketch();

		sketch.step(Direction::Right);
		assert_eq!(sketch.cursor(), START + dvec2(10.0, 0.0));
		assert_eq!(render.frames(), 1);

		clock.advance_millis(1);
		sketch.step(Direction::Right);
		clock.advance_millis(1);
		sketch.step(Direction::Right);
		assert_eq!(sketch.cursor(), START + dvec2(10.0, 0.0));
		assert_eq!(sketch.pending(), dvec2(20.0, 0.0));
		assert_eq!(render.frames(), 1);

		clock.advance_millis(6);
		sketch.step(Direction::Right);
		assert_eq!(sketch.cursor(), START + dvec2(40.0, 0.0));
		assert_eq!(sketch.pending(), DVec2::ZERO);
		assert_eq!(render.frames(), 2);

		let frame = render.last_frame().unwrap();
		assert_eq!(frame.cursor, sketch.cursor());
		assert_eq!(frame.segments.len(), 2);
	}

	#[test]
	fn left_knob_moves_horizontally() {
		let (mut sketch, _, _) = sketch();

		sketch
			.pointer_down(Element::LeftKnob, &at_angle(KNOB_CENTER, 0.0))
			.unwrap();
		assert!(sketch.locks().is_held(LockToken::LeftKnob));
		sketch.pointer_move(&at_angle(KNOB_CENTER, 15.0)).unwrap();
		assert_eq!(sketch.cursor(), START + dvec2(10.0, 0.0));
		assert_relative_eq!(
			sketch.knob_rotation(Element::LeftKnob).unwrap(),
			15.0,
			epsilon = 1e-9
		);

		sketch.pointer_up(&PointerEvent::mouse(0.0, 0.0));
		assert!(sketch.locks().is_free());
		assert_eq!(sketch.knob_rotation(Element::LeftKnob), None);
	}

	#[test]
	fn right_knob_moves_vertically() {
		let (mut sketch, _, clock) = sketch();

		sketch
			.pointer_down(Element::RightKnob, &at_angle(RIGHT_KNOB_CENTER, 0.0))
			.unwrap();
		sketch
			.pointer_move(&at_angle(RIGHT_KNOB_CENTER, 12.0))
			.unwrap();
		assert_eq!(sketch.cursor(), START + dvec2(0.0, -10.0));

		clock.advance_millis(10);
		sketch
			.pointer_move(&at_angle(RIGHT_KNOB_CENTER, 0.0))
			.unwrap();
		assert_eq!(sketch.cursor(), START);
	}

	#[test]
	fn touch_knob_ignores_other_contacts() {
		let (mut sketch, _, _) = sketch();
		let down = point_at_angle(KNOB_CENTER, 30.0, 0.0);
		sketch
			.pointer_down(Element::LeftKnob, &PointerEvent::touch(Touch::new(7, down.x, down.y)))
			.unwrap();

		let turned = point_at_angle(KNOB_CENTER, 30.0, 15.0);
		let other = PointerEvent::Touch {
			touches: vec![
				Touch::new(3, turned.x, turned.y),
				Touch::new(7, down.x, down.y),
			],
			changed_touches: vec![Touch::new(3, turned.x, turned.y)],
		};
		sketch.pointer_move(&other).unwrap();
		assert_eq!(sketch.cursor(), START);

		sketch
			.pointer_move(&PointerEvent::touch(Touch::new(7, turned.x, turned.y)))
			.unwrap();
		assert_eq!(sketch.cursor(), START + dvec2(10.0, 0.0));

		sketch.pointer_up(&PointerEvent::touch_end(Touch::new(3, 0.0, 0.0)));
		assert!(sketch.locks().is_held(LockToken::LeftKnob));
		sketch.pointer_up(&PointerEvent::touch_end(Touch::new(7, 0.0, 0.0)));
		assert!(sketch.locks().is_free());
	}

	/// Draws two segments, then shakes the board until they fade out.
	#[test]
	fn board_shake_fades_drawing() {
		let (mut sketch, render, clock) = sketch();
		sketch.step(Direction::Right);
		clock.advance_millis(10);
		sketch.step(Direction::Down);
		assert_eq!(sketch.segment_count(), 2);

		let swing = |degrees: f64| {
			let point = point_at_angle(BOARD_CENTER, 150.0, degrees);
			PointerEvent::mouse(point.x, point.y)
		};
		let above = point_at_angle(BOARD_CENTER, 150.0, 0.0);
		sketch
			.pointer_down(Element::Board, &PointerEvent::mouse(above.x, above.y))
			.unwrap();
		assert!(sketch.shake_state() != ShakeState::Idle);

		sketch.pointer_move(&swing(0.0)).unwrap();
		let frames = render.frames();
		for shake in 1..=5 {
			let degrees = if shake % 2 == 1 { 40.0 } else { 0.0 };
			sketch.pointer_move(&swing(degrees)).unwrap();
		}
		assert_eq!(render.frames(), frames + 5);
		assert_eq!(sketch.segment_count(), 0);

		sketch.pointer_up(&PointerEvent::mouse(0.0, 0.0));
		assert_eq!(sketch.shake_state(), ShakeState::Idle);
	}

	#[test]
	fn board_press_on_finger_guide_turns_knob() {
		let (mut sketch, _, _) = sketch();
		let grab = |degrees: f64| {
			let point = point_at_angle(KNOB_CENTER, 60.0, degrees);
			PointerEvent::mouse(point.x, point.y)
		};

		sketch.pointer_down(Element::Board, &grab(0.0)).unwrap();
		assert_eq!(sketch.shake_state(), ShakeState::Idle);
		assert!(sketch.locks().is_held(LockToken::LeftKnob));

		sketch.pointer_move(&grab(15.0)).unwrap();
		assert_eq!(sketch.cursor(), START + dvec2(10.0, 0.0));
	}

	#[test]
	fn board_press_on_knob_without_guides_does_nothing() {
		let (mut sketch, _, _) = sketch_with(
			SketchConfig::builder()
				.cursor(START)
				.finger_guides(false)
				.build(),
		);
		sketch
			.pointer_down(
				Element::Board,
				&PointerEvent::mouse(KNOB_CENTER.x, KNOB_CENTER.y),
			)
			.unwrap();
		assert_eq!(sketch.shake_state(), ShakeState::Idle);
		assert!(sketch.locks().is_free());
	}

	#[test]
	fn one_knob_drives_at_a_time() {
		let (mut sketch, _, _) = sketch();
		let down = point_at_angle(KNOB_CENTER, 30.0, 0.0);
		sketch
			.pointer_down(Element::LeftKnob, &PointerEvent::touch(Touch::new(1, down.x, down.y)))
			.unwrap();

		sketch
			.pointer_down(Element::RightKnob, &at_angle(RIGHT_KNOB_CENTER, 0.0))
			.unwrap();
		assert_eq!(sketch.knob_rotation(Element::RightKnob), None);
		assert!(!sketch.locks().is_held(LockToken::RightKnob));

		sketch
			.pointer_move(&at_angle(RIGHT_KNOB_CENTER, 15.0))
			.unwrap();
		sketch.key_down("d", false);
		assert_eq!(sketch.cursor(), START);
		assert!(!sketch.locks().is_held(LockToken::Keyboard));
		sketch.key_up("d");

		sketch.pointer_up(&PointerEvent::touch_end(Touch::new(1, down.x, down.y)));
		assert!(sketch.locks().is_free());
		sketch
			.pointer_down(Element::RightKnob, &at_angle(RIGHT_KNOB_CENTER, 0.0))
			.unwrap();
		sketch
			.pointer_move(&at_angle(RIGHT_KNOB_CENTER, 15.0))
			.unwrap();
		assert_eq!(sketch.cursor(), START + dvec2(0.0, -10.0));
	}

	#[test]
	fn touch_does_not_drive_mouse_knob() {
		let (mut sketch, _, _) = sketch();
		sketch
			.pointer_down(Element::LeftKnob, &at_angle(KNOB_CENTER, 0.0))
			.unwrap();

		let turned = point_at_angle(KNOB_CENTER, 30.0, 15.0);
		let finger = Touch::new(2, turned.x, turned.y);
		sketch.pointer_move(&PointerEvent::touch(finger)).unwrap();
		assert_eq!(sketch.cursor(), START);

		sketch.pointer_up(&PointerEvent::touch_end(finger));
		assert!(sketch.locks().is_held(LockToken::LeftKnob));
		sketch.pointer_move(&at_angle(KNOB_CENTER, 15.0)).unwrap();
		assert_eq!(sketch.cursor(), START + dvec2(10.0, 0.0));
	}

	#[test]
	fn held_key_blocks_knobs() {
		let (mut sketch, _, _) = sketch();
		sketch.key_down("Shift", false);
		sketch
			.pointer_down(Element::LeftKnob, &at_angle(KNOB_CENTER, 0.0))
			.unwrap();
		assert_eq!(sketch.knob_rotation(Element::LeftKnob), None);
		sketch.key_up("Shift");
		assert!(sketch.locks().is_free());
	}

	#[test]
	fn held_knob_blocks_board_press() {
		let (mut sketch, _, _) = sketch();
		sketch
			.pointer_down(Element::LeftKnob, &at_angle(KNOB_CENTER, 0.0))
			.unwrap();
		sketch
			.pointer_down(
				Element::Board,
				&PointerEvent::mouse(BOARD_CENTER.x, BOARD_CENTER.y - 150.0),
			)
			.unwrap();
		assert_eq!(sketch.shake_state(), ShakeState::Idle);
	}

	#[test]
	fn down_without_position_is_ignored() {
		let (mut sketch, _, _) = sketch();
		let event = PointerEvent::Mouse {
			page_x: None,
			page_y: Some(10.0),
		};
		sketch.pointer_down(Element::LeftKnob, &event).unwrap();
		assert_eq!(sketch.knob_rotation(Element::LeftKnob), None);
		assert!(sketch.locks().is_free());
	}

	#[test]
	fn hotkeys_step_and_hold_keyboard_lock() {
		let (mut sketch, _, clock) = sketch();

		sketch.key_down("ArrowLeft", false);
		assert_eq!(sketch.cursor(), START + dvec2(-10.0, 0.0));
		assert!(sketch.locks().is_held(LockToken::Keyboard));

		clock.advance_millis(10);
		sketch.key_down("ArrowLeft", true);
		assert_eq!(sketch.cursor(), START + dvec2(-20.0, 0.0));

		sketch.key_up("ArrowLeft");
		assert!(sketch.locks().is_free());
	}

	#[test]
	fn hotkeys_can_be_disabled() {
		let (mut sketch, _, _) = sketch_with(
			SketchConfig::builder()
				.cursor(START)
				.hotkeys(false)
				.build(),
		);
		sketch.key_down("d", false);
		assert_eq!(sketch.cursor(), START);
		assert!(sketch.locks().is_free());
	}

	#[test]
	fn clear_keeps_cursor() {
		let (mut sketch, render, _) = sketch();
		sketch.step(Direction::Up);
		sketch.clear();
		assert_eq!(sketch.segment_count(), 0);
		assert_eq!(sketch.cursor(), START + dvec2(0.0, -10.0));
		assert_eq!(render.clears(), 1);
	}

	#[test]
	fn set_line_width_redraws() {
		let (mut sketch, render, _) = sketch();
		sketch.set_line_width(5.0).unwrap();
		assert_eq!(sketch.style().line_width, 5.0);
		assert_eq!(render.last_frame().unwrap().style.line_width, 5.0);
		assert!(matches!(
			sketch.set_line_width(-1.0),
			Err(ConfigError::LineWidth(_))
		));
	}

	#[test]
	fn render_failures_are_absorbed() {
		let mut sketch = Sketch::new(config(), board_layout(), BrokenRender).unwrap();
		sketch.step(Direction::Down);
		sketch.clear();
		assert_eq!(sketch.cursor(), START + dvec2(0.0, 10.0));
		assert_eq!(sketch.segment_count(), 0);
	}

	#[test]
	fn missing_layout_surfaces() {
		let layout = Rc::new(crate::layout::FixedLayout::default());
		let mut sketch = Sketch::new(config(), layout, RecordingRender::default()).unwrap();
		let result = sketch.pointer_down(Element::LeftKnob, &PointerEvent::mouse(1.0, 1.0));
		assert!(matches!(
			result,
			Err(SketchError::Layout(LayoutError::Missing(Element::LeftKnob)))
		));
	}
}

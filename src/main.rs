use etch::clock::ManualClock;
use etch::config::SketchConfig;
use etch::gesture::{PointerEvent, Touch};
use etch::layout::{Element, FixedLayout, LayoutProvider, Proportions};
use etch::render::PixelCanvas;
use etch::Sketch;
use glam::{dvec2, DVec2};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(thiserror::Error, Debug)]
#[error("no global tracing subscriber set")]
struct NoTracingSubscriber;

fn configure_tracing() -> anyhow::Result<()> {
	let result = Err(NoTracingSubscriber);

	let result = result.or_else(|_| {
		let max_level = if cfg!(debug_assertions) {
			tracing::Level::TRACE
		} else {
			tracing::Level::INFO
		};
		tracing::subscriber::set_global_default(
			tracing_subscriber::FmtSubscriber::builder()
				.with_max_level(max_level)
				.finish(),
		)
	});

	Ok(result?)
}

fn configure_logging() -> anyhow::Result<()> {
	configure_tracing()?;

	// Anything still logging through `log` ends up in the same subscriber.
	#[cfg(feature = "log")]
	tracing_log::LogTracer::init()?;

	Ok(())
}

/// The position at `degrees` on a circle of `radius` around `center`, measured the way knob angles
/// are.
fn around(center: DVec2, radius: f64, degrees: f64) -> DVec2 {
	let direction = (degrees + 45.0).to_radians();
	center - radius * dvec2(direction.cos(), direction.sin())
}

fn mouse(point: DVec2) -> PointerEvent {
	PointerEvent::mouse(point.x, point.y)
}

/// Turns a knob by `turns` full steps, one move every 10 ms so that every step flushes.
fn turn(
	sketch: &mut Sketch,
	clock: &ManualClock,
	layout: &dyn LayoutProvider,
	knob: Element,
	turns: i32,
) -> anyhow::Result<()> {
	let center = layout.center(knob)?;
	let radius = layout.rect(knob)?.size().x / 2.0;
	sketch.pointer_down(knob, &mouse(around(center, radius, 0.0)))?;
	for step in 1..=turns.abs() {
		clock.advance_millis(10);
		let degrees = f64::from(step * turns.signum()) * 12.0;
		sketch.pointer_move(&mouse(around(center, radius, degrees)))?;
	}
	sketch.pointer_up(&mouse(around(center, radius, 0.0)));
	Ok(())
}

fn replay() -> anyhow::Result<()> {
	let proportions = Proportions::fit(800.0, 600.0);
	let layout = Rc::new(FixedLayout::from_proportions(&proportions));
	let canvas = Rc::new(RefCell::new(PixelCanvas::new(
		proportions.width.ceil() as u32,
		proportions.height.ceil() as u32,
	)));
	let clock = ManualClock::new();
	let config = SketchConfig::builder()
		.width(proportions.width)
		.height(proportions.height)
		.cursor(dvec2(proportions.width / 2.0, proportions.height / 2.0))
		.build();
	let mut sketch = Sketch::with_clock(config, layout.clone(), canvas.clone(), Rc::new(clock.clone()))?;

	// A square, half by knob and half by keyboard.
	turn(&mut sketch, &clock, layout.as_ref(), Element::LeftKnob, 8)?;
	turn(&mut sketch, &clock, layout.as_ref(), Element::RightKnob, -8)?;
	for key in ["a", "w"] {
		for repeat in 0..8 {
			clock.advance_millis(10);
			sketch.key_down(key, repeat > 0);
		}
		sketch.key_up(key);
	}
	tracing::info!(
		cursor = %sketch.cursor(),
		segments = sketch.segment_count(),
		painted = canvas.borrow().painted_pixels(),
		"square drawn"
	);

	// A finger drags the board back and forth until the drawing is gone.
	let board = layout.center(Element::Board)?;
	let radius = proportions.height / 3.0;
	let finger = |degrees: f64| {
		let point = around(board, radius, degrees);
		PointerEvent::touch(Touch::new(1, point.x, point.y))
	};
	sketch.pointer_down(Element::Board, &finger(0.0))?;
	let mut swings = 0;
	while sketch.segment_count() > 0 && swings < 20 {
		swings += 1;
		let degrees = if swings % 2 == 1 { 40.0 } else { 0.0 };
		sketch.pointer_move(&finger(degrees))?;
	}
	sketch.pointer_up(&PointerEvent::touch_end(Touch::new(1, board.x, board.y)));

	tracing::info!(
		swings,
		segments = sketch.segment_count(),
		painted = canvas.borrow().painted_pixels(),
		frames = canvas.borrow().frames(),
		"board shaken"
	);
	Ok(())
}

fn main() -> anyhow::Result<()> {
	if let Err(error) = configure_logging() {
		// We can technically continue without logging.
		tracing::error!(error = error.to_string());
	}

	replay()
}

use super::lock::{LockRegistry, LockToken};
use glam::{dvec2, DVec2};
use std::collections::HashSet;

/// One of the four directions the cursor can be nudged in. `Up` is towards smaller `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Direction {
	#[display("left")]
	Left,
	#[display("right")]
	Right,
	#[display("up")]
	Up,
	#[display("down")]
	Down,
}

impl Direction {
	pub fn unit(self) -> DVec2 {
		match self {
			Direction::Left => dvec2(-1.0, 0.0),
			Direction::Right => dvec2(1.0, 0.0),
			Direction::Up => dvec2(0.0, -1.0),
			Direction::Down => dvec2(0.0, 1.0),
		}
	}

	/// The direction bound to a key, using the `KeyboardEvent.key` naming.
	pub fn for_key(key: &str) -> Option<Self> {
		match key {
			"d" | "D" | "ArrowRight" => Some(Direction::Right),
			"a" | "A" | "ArrowLeft" => Some(Direction::Left),
			"w" | "W" | "ArrowUp" => Some(Direction::Up),
			"s" | "S" | "ArrowDown" => Some(Direction::Down),
			_ => None,
		}
	}
}

/// Tracks pressed keys. Holds the keyboard lock while any key is down.
#[derive(Debug)]
pub struct KeyboardState {
	pressed: HashSet<String>,
	locks: LockRegistry,
}

impl KeyboardState {
	pub fn new(locks: LockRegistry) -> Self {
		Self {
			pressed: HashSet::new(),
			locks,
		}
	}

	/// Registers a key press and returns the direction it steps in, if any. Auto-repeated presses
	/// step again. While a knob is being turned, presses are recorded but do not step.
	pub fn key_down(&mut self, key: &str, repeat: bool) -> Option<Direction> {
		if !self.pressed.insert(key.to_owned()) && !repeat {
			tracing::warn!(key, "key already down");
		}
		if !self.locks.is_free_for(LockToken::Keyboard) {
			tracing::trace!(key, held = ?self.locks.all_held(), "key press while a knob is held");
			return None;
		}
		self.locks.acquire(LockToken::Keyboard);
		Direction::for_key(key)
	}

	pub fn key_up(&mut self, key: &str) {
		if !self.pressed.remove(key) {
			tracing::warn!(key, "key not down");
		}
		if self.pressed.is_empty() {
			self.locks.release(LockToken::Keyboard);
		}
	}
}

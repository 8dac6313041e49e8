use std::{cell::RefCell, collections::HashSet, rc::Rc};

/// Identifies a control that can hold a gesture lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum LockToken {
	#[display("left knob")]
	LeftKnob,
	#[display("right knob")]
	RightKnob,
	#[display("keyboard")]
	Keyboard,
}

#[derive(Default, Debug)]
struct InternalLockRegistry {
	held: HashSet<LockToken>,
}

/// The set of controls currently being gestured. Clones share the same set.
///
/// Rotary input and keyboard input hold a lock for the duration of their gesture. The shake
/// detector only acts while no lock is held.
#[derive(Clone, Default, Debug)]
pub struct LockRegistry(Rc<RefCell<InternalLockRegistry>>);

impl LockRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns `false` if `token` was already held.
	pub fn acquire(&self, token: LockToken) -> bool {
		let acquired = self.0.as_ref().borrow_mut().held.insert(token);
		if acquired {
			tracing::debug!(%token, "lock acquired");
		}
		acquired
	}

	/// Returns `false` if `token` was not held.
	pub fn release(&self, token: LockToken) -> bool {
		let released = self.0.as_ref().borrow_mut().held.remove(&token);
		if released {
			tracing::debug!(%token, "lock released");
		}
		released
	}

	pub fn is_held(&self, token: LockToken) -> bool {
		self.0.as_ref().borrow().held.contains(&token)
	}

	pub fn is_free(&self) -> bool {
		self.0.as_ref().borrow().held.is_empty()
	}

	/// Whether the control behind `token` may drive motion: nothing is held, or only `token` itself.
	pub fn is_free_for(&self, token: LockToken) -> bool {
		self.0.as_ref().borrow().held.iter().all(|&held| held == token)
	}

	pub fn all_held(&self) -> HashSet<LockToken> {
		self.0.as_ref().borrow().held.clone()
	}
}

//! Turning raw pointer and key input into discrete steps and shake triggers.

mod input;
pub use input::*;

mod lock;
pub use lock::*;

mod knob;
pub use knob::*;

mod shake;
pub use shake::*;

mod keyboard;
pub use keyboard::*;

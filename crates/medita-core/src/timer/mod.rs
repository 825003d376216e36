pub mod clock;
pub mod display;
pub mod driver;
mod duration;
mod engine;
mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use duration::{custom_duration_ms, DurationSource, Preset};
pub use engine::{TimerEngine, TimerState};
pub use session::{Command, TimerSession, TransitionPolicy};

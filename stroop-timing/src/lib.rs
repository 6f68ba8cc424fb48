pub mod clock;
pub mod timer;

pub use clock::{ClockEvent, ClockToken, CountdownClock, DEFAULT_TICK};
pub use timer::{HighPrecisionTimer, ManualTimer, Timer};

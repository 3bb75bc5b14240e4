mod engine;
mod mode;
mod transition;

pub use engine::TimerEngine;
pub use mode::Mode;
pub use transition::{next_period, NextPeriod};

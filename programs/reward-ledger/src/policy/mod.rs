pub mod calculator;
pub use calculator::*;

pub mod prize;
pub use prize::*;

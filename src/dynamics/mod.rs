//! Time-driven motion curves for staged foot placement.

mod step;

pub use step::{smoothstep, StepCurve, StepShape};

pub mod artifact;
pub mod comparison;
pub mod composite;
pub mod frame;
pub mod gate;
pub mod readiness;
pub mod screenshot;

pub use comparison::{ComparisonCapture, ComparisonError, ComparisonPhase, ComparisonSession};
pub use frame::{CapturedImage, FrameError, SceneFrame};
pub use gate::{Busy, OpGate};
pub use readiness::imagery_ready;
pub use screenshot::{take_dated_screenshot, take_screenshot};

#[cfg(test)]
pub(crate) mod fakes;

//! Rotation draw module
//!
//! All selection logic lives here. It is pure:
//! - Transitions take the current state and return a new one
//! - Randomness comes in through the `Rng` argument only
//! - Time comes in through the `now` argument only
//! - No storage or DOM access

pub mod engine;
pub mod february;
pub mod state;
pub mod wheel;

pub use engine::{
    RotationEvent, Transition, cancel_draw, complete_draw, draw, finalize, rename, reset,
    set_avatar, start_draw,
};
pub use february::{DESIGNATED_NAMES, FebruaryOverride, designated_participant};
pub use state::{CyclePhase, Month, MonthlyRecord, RotationState, Snapshot, Spin};
pub use wheel::Wheel;

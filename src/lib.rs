//! Rotation Wheel - a monthly two-winner draw for a fixed roster
//!
//! Core modules:
//! - `draw`: Pure rotation logic (draws, pairing, monthly records, February rule)
//! - `persistence`: Snapshot save/load with expiry and per-field validation
//! - `platform`: Browser/native platform abstraction
//! - `settings`: User preferences
//! - `share`: History summary, share links and export naming

pub mod draw;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod share;

pub use draw::{CyclePhase, Month, MonthlyRecord, RotationEvent, RotationState, Snapshot, Transition};
pub use error::{RotationError, StorageError};
pub use persistence::{KeyValueStore, MemoryStore, SnapshotStore};
pub use settings::Settings;

use glam::Vec2;

/// Rotation configuration constants
pub mod consts {
    /// Number of roster slots in one cycle set
    pub const ROSTER_SIZE: usize = 10;

    /// Winners per month
    pub const PAIR_SIZE: usize = 2;

    /// A stored snapshot older than this is discarded on load
    pub const EXPIRY_DAYS: i64 = 7;

    /// Visual spin delay before a draw completes (ms)
    pub const SPIN_DURATION_MS: i32 = 3000;

    /// Full turns the wheel makes before landing
    pub const SPIN_FULL_TURNS: u32 = 5;

    /// LocalStorage key for the rotation snapshot
    pub const STATE_KEY: &str = "rotation_wheel_state";
    /// LocalStorage key for user preferences
    pub const SETTINGS_KEY: &str = "rotation_wheel_settings";

    /// Default avatar per roster slot
    pub const DEFAULT_AVATARS: [&str; ROSTER_SIZE] =
        ["🦊", "🐼", "🐸", "🦁", "🐙", "🐧", "🦄", "🐢", "🐝", "🐳"];

    /// Glyph for a slot beyond the avatar list
    pub const FALLBACK_AVATAR: &str = "🙂";

    /// Glyph for a record name that no longer matches the roster
    pub const CELEBRATION_GLYPH: &str = "🎉";
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Avatar for a roster slot, degrading to the fallback glyph
pub fn avatar_for_slot(avatars: &[String], slot: usize) -> &str {
    avatars
        .get(slot)
        .map(String::as_str)
        .filter(|g| !g.is_empty())
        .unwrap_or(consts::FALLBACK_AVATAR)
}

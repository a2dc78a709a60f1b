//! Wheel geometry for the spin animation
//!
//! The wheel shows one equal slice per eligible candidate. Slice `i` starts
//! `i * span` degrees clockwise from the pointer at twelve o'clock when the
//! wheel is unrotated. Rotations are clockwise degrees, as CSS `rotate()` uses.

use glam::Vec2;

use crate::{normalize_angle, polar_to_cartesian};

/// Equal-slice wheel over `slices` candidates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wheel {
    pub slices: usize,
}

impl Wheel {
    pub fn new(slices: usize) -> Self {
        Self { slices }
    }

    /// Angular size of one slice (degrees)
    pub fn span_deg(&self) -> f32 {
        if self.slices == 0 {
            360.0
        } else {
            360.0 / self.slices as f32
        }
    }

    /// Clockwise offset of a slice's center from twelve o'clock (degrees)
    pub fn center_deg(&self, slot: usize) -> f32 {
        (slot as f32 + 0.5) * self.span_deg()
    }

    /// Absolute rotation that lands `slot` under the pointer after `turns` full turns
    ///
    /// The result is always past `current_deg` so the wheel only spins forward.
    pub fn landing_rotation(&self, current_deg: f32, slot: usize, turns: u32) -> f32 {
        let base = current_deg - current_deg.rem_euclid(360.0);
        let mut target = base + (360.0 - self.center_deg(slot));
        while target <= current_deg {
            target += 360.0;
        }
        target + turns.max(1) as f32 * 360.0
    }

    /// Slice under the pointer for a given rotation
    pub fn slot_at_pointer(&self, rotation_deg: f32) -> usize {
        if self.slices == 0 {
            return 0;
        }
        let offset = (360.0 - rotation_deg.rem_euclid(360.0)).rem_euclid(360.0);
        ((offset / self.span_deg()) as usize).min(self.slices - 1)
    }

    /// Label anchor for a slice on an unrotated wheel (y up, origin at hub)
    pub fn label_anchor(&self, slot: usize, radius: f32) -> Vec2 {
        let theta = std::f32::consts::FRAC_PI_2 - self.center_deg(slot).to_radians();
        polar_to_cartesian(radius, normalize_angle(theta))
    }
}

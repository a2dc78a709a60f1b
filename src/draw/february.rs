//! February override
//!
//! The February slot of every cycle set always includes one designated
//! participant. The lottery still decides the second winner.

use super::state::{Month, Snapshot};
use crate::consts::PAIR_SIZE;

/// Roster names (trimmed, case-insensitive) that trigger the override
pub const DESIGNATED_NAMES: [&str; 2] = ["dennis", "denno"];

/// What the override did to a drawn pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FebruaryOverride {
    /// Designated participant was drawn; moved to the front of the pair
    Reordered { name: String },
    /// Designated participant replaced the first drawn winner
    Substituted { name: String, replaced: String },
}

/// Finalized pair plus the Draw Order it implies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub pair: [String; PAIR_SIZE],
    pub order: Vec<String>,
    pub applied: Option<FebruaryOverride>,
}

/// Whether a roster name is one of the designated names
pub fn is_designated(name: &str) -> bool {
    DESIGNATED_NAMES.contains(&name.trim().to_lowercase().as_str())
}

/// First roster name matching a designated name, as stored
pub fn designated_participant(names: &[String]) -> Option<&str> {
    names.iter().map(String::as_str).find(|name| is_designated(name))
}

/// Resolve the drawn pair for `month`
pub fn resolve(month: Month, snapshot: &Snapshot, drawn: &[String; PAIR_SIZE]) -> Resolution {
    let unchanged = Resolution {
        pair: drawn.clone(),
        order: snapshot.order.clone(),
        applied: None,
    };
    if month != Month::February {
        return unchanged;
    }
    if designated_participant(&snapshot.names).is_none() {
        return unchanged;
    }

    // A designee in the drawn pair wins over any other roster designee
    if let Some(pos) = drawn.iter().position(|w| is_designated(w)) {
        let name = drawn[pos].clone();
        let other = drawn[1 - pos].clone();
        return Resolution {
            pair: [name.clone(), other],
            order: snapshot.order.clone(),
            applied: Some(FebruaryOverride::Reordered { name }),
        };
    }

    // Otherwise the first designee not yet in Draw Order; one drawn in an
    // earlier month cannot be added again
    let Some(name) = snapshot
        .names
        .iter()
        .map(String::as_str)
        .find(|n| is_designated(n) && !snapshot.order.iter().any(|o| o == n))
    else {
        log::info!("February override skipped: designee already drawn this cycle");
        return unchanged;
    };

    let pair = [name.to_string(), drawn[1].clone()];
    let mut order: Vec<String> = snapshot
        .order
        .iter()
        .filter(|n| !drawn.contains(*n))
        .cloned()
        .collect();
    order.extend(pair.iter().cloned());

    Resolution {
        pair,
        order,
        applied: Some(FebruaryOverride::Substituted {
            name: name.to_string(),
            replaced: drawn[0].clone(),
        }),
    }
}

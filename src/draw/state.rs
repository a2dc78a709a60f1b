//! Rotation state and core draw types
//!
//! Everything persisted between visits lives in `Snapshot`. `RotationState`
//! wraps it with the transient pending pair and the in-flight spin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Calendar label of a monthly record (assigned by history length, not wall clock)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Month label for the record that follows `history_len` records
    pub fn for_history_len(history_len: usize) -> Self {
        Self::ALL[history_len % Self::ALL.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finalized month (append-only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub month: Month,
    /// Finalized winners, in display order
    pub pair: [String; PAIR_SIZE],
    /// When the month was saved
    pub date: DateTime<Utc>,
    /// Avatar per winner, copied at finalize time
    #[serde(rename = "emojis")]
    pub avatars: [String; PAIR_SIZE],
    /// Random outcome before the February override replaced it
    #[serde(
        rename = "drawnPair",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub drawn_pair: Option<[String; PAIR_SIZE]>,
}

/// Serializable state of one cycle set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Roster display names (fixed size, blank = empty slot)
    pub names: Vec<String>,
    /// Avatar glyph per slot (at least as long as `names`)
    #[serde(rename = "emojis")]
    pub avatars: Vec<String>,
    /// Names already drawn, in draw order
    pub order: Vec<String>,
    /// Names are frozen once the first draw happens
    pub locked: bool,
    /// Finalized months
    pub history: Vec<MonthlyRecord>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            names: vec![String::new(); ROSTER_SIZE],
            avatars: default_avatars(),
            order: Vec::new(),
            locked: false,
            history: Vec::new(),
        }
    }
}

impl Snapshot {
    /// Slot index of a roster name (exact match)
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Roster names that can still be drawn, in slot order, without duplicates
    pub fn eligible(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for name in &self.names {
            if is_blank(name) || self.order.contains(name) || out.contains(name) {
                continue;
            }
            out.push(name.clone());
        }
        out
    }

    /// Roster names are frozen once anyone has been drawn
    pub fn roster_locked(&self) -> bool {
        self.locked || !self.order.is_empty()
    }

    /// Avatar recorded for a finalized name
    pub fn record_avatar(&self, name: &str) -> String {
        self.slot_of(name)
            .and_then(|slot| self.avatars.get(slot))
            .filter(|g| !g.is_empty())
            .cloned()
            .unwrap_or_else(|| CELEBRATION_GLYPH.to_string())
    }
}

/// Default avatar list
pub fn default_avatars() -> Vec<String> {
    DEFAULT_AVATARS.iter().map(|g| g.to_string()).collect()
}

/// Blank roster slots are never drawn
pub fn is_blank(name: &str) -> bool {
    name.trim().is_empty()
}

/// A draw that has been decided but whose spin has not finished yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spin {
    /// Identifies this spin; a completion carrying another ticket is stale
    pub ticket: u64,
    pub winner: String,
    /// Index of the winner within `candidates`
    pub slot: usize,
    /// Wheel slices at spin start
    pub candidates: Vec<String>,
}

/// Logical state of the current month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// A draw is in flight
    Spinning,
    /// Fewer than two winners pending
    Open,
    /// Two winners pending, waiting for save
    PairReady,
    /// Last month flushed into history, nothing pending
    Saved,
}

/// Complete in-memory rotation state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RotationState {
    pub snapshot: Snapshot,
    /// Winners drawn since the last save (0..=2)
    pub pending: Vec<String>,
    /// Draw waiting for its spin to finish
    pub spin: Option<Spin>,
    /// Spins started in this session (survives reset)
    pub spins: u64,
}

impl RotationState {
    /// Rebuild transient state from a loaded snapshot
    ///
    /// Draw Order entries past the finalized pairs are the pending winners.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let finalized = snapshot.history.len() * PAIR_SIZE;
        let pending = match snapshot.order.len().checked_sub(finalized) {
            Some(extra) if extra <= PAIR_SIZE => snapshot.order[finalized..].to_vec(),
            _ => {
                log::warn!(
                    "Draw order ({}) does not match history ({} months), dropping pending winners",
                    snapshot.order.len(),
                    snapshot.history.len()
                );
                Vec::new()
            }
        };
        Self {
            snapshot,
            pending,
            spin: None,
            spins: 0,
        }
    }

    pub fn phase(&self) -> CyclePhase {
        if self.spin.is_some() {
            CyclePhase::Spinning
        } else if self.pending.len() >= PAIR_SIZE {
            CyclePhase::PairReady
        } else if self.pending.is_empty() && !self.snapshot.history.is_empty() {
            CyclePhase::Saved
        } else {
            CyclePhase::Open
        }
    }

    /// Month the next finalize will produce
    pub fn next_month(&self) -> Month {
        Month::for_history_len(self.snapshot.history.len())
    }
}

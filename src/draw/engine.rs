//! Rotation transitions
//!
//! Each transition reads the current state and returns the next one together
//! with the event it produced. On error the caller keeps the old state.

use chrono::{DateTime, Utc};
use rand::Rng;

use super::february::{self, FebruaryOverride};
use super::state::{MonthlyRecord, RotationState, Snapshot, Spin};
use crate::consts::*;
use crate::error::{Result, RotationError};

/// Something that happened during a transition (drives UI feedback)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationEvent {
    /// Winner chosen, wheel should spin to `slot` of `candidates`
    SpinStarted {
        ticket: u64,
        winner: String,
        slot: usize,
        candidates: usize,
    },
    /// Spin finished, winner is now pending
    WinnerDrawn { winner: String, pending: usize },
    /// In-flight spin dropped
    SpinCancelled,
    /// A month was saved
    MonthFinalized {
        record: MonthlyRecord,
        applied: Option<FebruaryOverride>,
    },
    NameChanged { slot: usize },
    AvatarChanged { slot: usize },
    Reset,
}

/// New state plus the event that produced it
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: RotationState,
    pub event: RotationEvent,
}

/// Pick a winner and start the spin
pub fn start_draw<R: Rng>(state: &RotationState, rng: &mut R) -> Result<Transition> {
    if state.spin.is_some() {
        return Err(RotationError::DrawInFlight);
    }
    if state.pending.len() >= PAIR_SIZE {
        return Err(RotationError::PairPending);
    }
    let candidates = state.snapshot.eligible();
    if candidates.is_empty() {
        return Err(RotationError::NoCandidates);
    }

    let slot = rng.random_range(0..candidates.len());
    let winner = candidates[slot].clone();
    log::debug!("Spin started: {} of {} candidates", slot, candidates.len());

    let mut next = state.clone();
    let ticket = state.spins + 1;
    let count = candidates.len();
    next.spins = ticket;
    next.spin = Some(Spin {
        ticket,
        winner: winner.clone(),
        slot,
        candidates,
    });
    Ok(Transition {
        state: next,
        event: RotationEvent::SpinStarted {
            ticket,
            winner,
            slot,
            candidates: count,
        },
    })
}

/// Land the in-flight spin identified by `ticket`
pub fn complete_draw(state: &RotationState, ticket: u64) -> Result<Transition> {
    let Some(spin) = state.spin.as_ref() else {
        return Err(RotationError::NoDrawInFlight);
    };
    if spin.ticket != ticket {
        return Err(RotationError::StaleSpin(ticket));
    }

    let mut next = state.clone();
    next.spin = None;
    next.snapshot.order.push(spin.winner.clone());
    next.pending.push(spin.winner.clone());
    next.snapshot.locked = true;

    log::info!("Winner drawn: {} ({} pending)", spin.winner, next.pending.len());
    let event = RotationEvent::WinnerDrawn {
        winner: spin.winner.clone(),
        pending: next.pending.len(),
    };
    Ok(Transition { state: next, event })
}

/// Drop the in-flight spin without drawing anyone
pub fn cancel_draw(state: &RotationState) -> Result<Transition> {
    if state.spin.is_none() {
        return Err(RotationError::NoDrawInFlight);
    }
    let mut next = state.clone();
    next.spin = None;
    Ok(Transition {
        state: next,
        event: RotationEvent::SpinCancelled,
    })
}

/// Draw one winner immediately (no spin delay)
pub fn draw<R: Rng>(state: &RotationState, rng: &mut R) -> Result<Transition> {
    let started = start_draw(state, rng)?;
    complete_draw(&started.state, started.state.spins)
}

/// Save the pending pair as the next month
pub fn finalize(state: &RotationState, now: DateTime<Utc>) -> Result<Transition> {
    if state.spin.is_some() {
        return Err(RotationError::DrawInFlight);
    }
    let drawn: [String; PAIR_SIZE] = state
        .pending
        .clone()
        .try_into()
        .map_err(|pending: Vec<String>| RotationError::NeedTwoWinners {
            have: pending.len(),
        })?;

    let month = state.next_month();
    let resolution = february::resolve(month, &state.snapshot, &drawn);
    let avatars = [
        state.snapshot.record_avatar(&resolution.pair[0]),
        state.snapshot.record_avatar(&resolution.pair[1]),
    ];
    let drawn_pair = match resolution.applied {
        Some(FebruaryOverride::Substituted { .. }) => Some(drawn),
        _ => None,
    };
    let record = MonthlyRecord {
        month,
        pair: resolution.pair,
        date: now,
        avatars,
        drawn_pair,
    };

    let mut next = state.clone();
    next.snapshot.order = resolution.order;
    next.snapshot.history.push(record.clone());
    next.snapshot.locked = true;
    next.pending.clear();

    log::info!("{} saved: {} & {}", month, record.pair[0], record.pair[1]);
    Ok(Transition {
        state: next,
        event: RotationEvent::MonthFinalized {
            record,
            applied: resolution.applied,
        },
    })
}

/// Wipe the whole cycle set
///
/// The spin counter carries over so a completion scheduled before the reset
/// can never land a later spin.
pub fn reset(state: &RotationState) -> Transition {
    log::info!("Rotation reset");
    Transition {
        state: RotationState {
            snapshot: Snapshot::default(),
            pending: Vec::new(),
            spin: None,
            spins: state.spins,
        },
        event: RotationEvent::Reset,
    }
}

/// Edit a roster name (only before the first draw)
pub fn rename(state: &RotationState, slot: usize, name: &str) -> Result<Transition> {
    if state.spin.is_some() {
        return Err(RotationError::DrawInFlight);
    }
    if state.snapshot.roster_locked() {
        return Err(RotationError::RosterLocked);
    }
    if slot >= state.snapshot.names.len() {
        return Err(RotationError::SlotOutOfRange(slot));
    }
    let mut next = state.clone();
    next.snapshot.names[slot] = name.to_string();
    Ok(Transition {
        state: next,
        event: RotationEvent::NameChanged { slot },
    })
}

/// Change a slot's avatar (allowed while locked)
pub fn set_avatar(state: &RotationState, slot: usize, glyph: &str) -> Result<Transition> {
    if slot >= state.snapshot.names.len() {
        return Err(RotationError::SlotOutOfRange(slot));
    }
    let mut next = state.clone();
    if next.snapshot.avatars.len() <= slot {
        next.snapshot
            .avatars
            .resize(slot + 1, FALLBACK_AVATAR.to_string());
    }
    next.snapshot.avatars[slot] = glyph.to_string();
    Ok(Transition {
        state: next,
        event: RotationEvent::AvatarChanged { slot },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::state::{CyclePhase, Month};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn roster(names: &[&str]) -> RotationState {
        let mut state = RotationState::default();
        for (slot, name) in names.iter().enumerate() {
            state = rename(&state, slot, name).unwrap().state;
        }
        state
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-15T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_draw_appends_and_locks() {
        let mut rng = Pcg32::seed_from_u64(7);
        let state = roster(&["Ann", "Bob", "Cy"]);
        assert!(!state.snapshot.locked);

        let t = draw(&state, &mut rng).unwrap();
        assert!(t.state.snapshot.locked);
        assert_eq!(t.state.snapshot.order.len(), 1);
        assert_eq!(t.state.pending, t.state.snapshot.order);
        assert!(matches!(t.event, RotationEvent::WinnerDrawn { pending: 1, .. }));
        // Input state is untouched
        assert!(state.snapshot.order.is_empty());
    }

    #[test]
    fn test_spin_guard() {
        let mut rng = Pcg32::seed_from_u64(1);
        let state = roster(&["Ann", "Bob", "Cy"]);
        let spinning = start_draw(&state, &mut rng).unwrap().state;
        assert_eq!(spinning.phase(), CyclePhase::Spinning);
        assert!(spinning.snapshot.order.is_empty());

        assert_eq!(
            start_draw(&spinning, &mut rng).unwrap_err(),
            RotationError::DrawInFlight
        );
        assert_eq!(finalize(&spinning, now()).unwrap_err(), RotationError::DrawInFlight);

        let landed = complete_draw(&spinning, spinning.spins).unwrap().state;
        assert!(landed.spin.is_none());
        assert_eq!(
            complete_draw(&landed, spinning.spins).unwrap_err(),
            RotationError::NoDrawInFlight
        );
    }

    #[test]
    fn test_rename_rejected_while_spinning() {
        let mut rng = Pcg32::seed_from_u64(1);
        let state = roster(&["Ann", "Bob"]);
        let spinning = start_draw(&state, &mut rng).unwrap().state;
        let winner = spinning.spin.as_ref().unwrap().winner.clone();
        let slot = spinning.snapshot.slot_of(&winner).unwrap();

        assert_eq!(
            rename(&spinning, slot, "Zed").unwrap_err(),
            RotationError::DrawInFlight
        );

        let landed = complete_draw(&spinning, spinning.spins).unwrap().state;
        assert!(landed.snapshot.names.contains(&landed.snapshot.order[0]));
    }

    #[test]
    fn test_rename_rejected_with_drawn_order() {
        // Blob that says unlocked but already has draws
        let mut state = roster(&["Ann", "Bob"]);
        state.snapshot.order = vec!["Ann".into()];
        state.pending = vec!["Ann".into()];
        assert!(!state.snapshot.locked);
        assert_eq!(rename(&state, 0, "Zed").unwrap_err(), RotationError::RosterLocked);
    }

    #[test]
    fn test_stale_completion_after_reset() {
        let mut rng = Pcg32::seed_from_u64(6);
        let state = roster(&["Ann", "Bob", "Cy"]);
        let first = start_draw(&state, &mut rng).unwrap().state;
        let stale = first.spins;

        // Reset mid-spin, refill the roster and spin again
        let mut again = reset(&first).state;
        for (slot, name) in ["Ann", "Bob", "Cy"].iter().enumerate() {
            again = rename(&again, slot, name).unwrap().state;
        }
        let second = start_draw(&again, &mut rng).unwrap();
        let RotationEvent::SpinStarted { ticket, .. } = second.event else {
            panic!("unexpected event {:?}", second.event);
        };
        assert_ne!(ticket, stale);

        assert_eq!(
            complete_draw(&second.state, stale).unwrap_err(),
            RotationError::StaleSpin(stale)
        );
        let landed = complete_draw(&second.state, ticket).unwrap().state;
        assert_eq!(landed.pending.len(), 1);
    }

    #[test]
    fn test_cancel_leaves_state() {
        let mut rng = Pcg32::seed_from_u64(3);
        let state = roster(&["Ann", "Bob"]);
        let spinning = start_draw(&state, &mut rng).unwrap().state;
        let t = cancel_draw(&spinning).unwrap();
        assert_eq!(t.state.snapshot, state.snapshot);
        assert_eq!(t.state.phase(), state.phase());
        assert!(t.state.spin.is_none());
        assert_eq!(t.event, RotationEvent::SpinCancelled);
    }

    #[test]
    fn test_third_draw_rejected() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut state = roster(&["Ann", "Bob", "Cy", "Dee"]);
        state = draw(&state, &mut rng).unwrap().state;
        state = draw(&state, &mut rng).unwrap().state;
        assert_eq!(state.phase(), CyclePhase::PairReady);
        assert_eq!(draw(&state, &mut rng).unwrap_err(), RotationError::PairPending);
    }

    #[test]
    fn test_no_candidates() {
        let mut rng = Pcg32::seed_from_u64(5);
        let state = RotationState::default();
        assert_eq!(draw(&state, &mut rng).unwrap_err(), RotationError::NoCandidates);
    }

    #[test]
    fn test_finalize_needs_two() {
        let mut rng = Pcg32::seed_from_u64(9);
        let state = roster(&["Ann", "Bob"]);
        assert_eq!(
            finalize(&state, now()).unwrap_err(),
            RotationError::NeedTwoWinners { have: 0 }
        );
        let one = draw(&state, &mut rng).unwrap().state;
        assert_eq!(
            finalize(&one, now()).unwrap_err(),
            RotationError::NeedTwoWinners { have: 1 }
        );
    }

    #[test]
    fn test_finalize_records_month() {
        let mut rng = Pcg32::seed_from_u64(21);
        let mut state = roster(&["Ann", "Bob", "Cy"]);
        state = draw(&state, &mut rng).unwrap().state;
        state = draw(&state, &mut rng).unwrap().state;
        let drawn = state.pending.clone();

        let t = finalize(&state, now()).unwrap();
        let saved = t.state;
        assert_eq!(saved.phase(), CyclePhase::Saved);
        assert!(saved.pending.is_empty());
        let record = &saved.snapshot.history[0];
        assert_eq!(record.month, Month::January);
        assert_eq!(record.pair.to_vec(), drawn);
        assert_eq!(record.date, now());
        let slot = saved.snapshot.slot_of(&record.pair[0]).unwrap();
        assert_eq!(record.avatars[0], DEFAULT_AVATARS[slot]);
        assert!(record.drawn_pair.is_none());

        // Buffer is empty now, a repeat is rejected
        assert_eq!(
            finalize(&saved, now()).unwrap_err(),
            RotationError::NeedTwoWinners { have: 0 }
        );
    }

    #[test]
    fn test_february_substitution_through_finalize() {
        let mut state = roster(&["Ann", "Bob", "Cy", "Dee", "Denno"]);
        // January: Ann & Bob
        state.snapshot.order = vec!["Ann".into(), "Bob".into()];
        state.pending = state.snapshot.order.clone();
        state.snapshot.locked = true;
        state = finalize(&state, now()).unwrap().state;

        // February draw lands on Cy & Dee
        state.snapshot.order.extend(["Cy".to_string(), "Dee".to_string()]);
        state.pending = vec!["Cy".into(), "Dee".into()];
        let t = finalize(&state, now()).unwrap();

        let record = t.state.snapshot.history.last().unwrap();
        assert_eq!(record.month, Month::February);
        assert_eq!(record.pair, ["Denno".to_string(), "Dee".to_string()]);
        assert_eq!(record.drawn_pair, Some(["Cy".to_string(), "Dee".to_string()]));
        assert_eq!(record.avatars[0], DEFAULT_AVATARS[4]);
        assert_eq!(t.state.snapshot.order, vec!["Ann", "Bob", "Denno", "Dee"]);
        // Cy is back in the pool
        assert!(t.state.snapshot.eligible().contains(&"Cy".to_string()));
    }

    #[test]
    fn test_rename_locked_and_range() {
        let mut rng = Pcg32::seed_from_u64(2);
        let state = roster(&["Ann", "Bob"]);
        assert_eq!(
            rename(&state, ROSTER_SIZE, "X").unwrap_err(),
            RotationError::SlotOutOfRange(ROSTER_SIZE)
        );
        let drawn = draw(&state, &mut rng).unwrap().state;
        assert_eq!(rename(&drawn, 0, "Zed").unwrap_err(), RotationError::RosterLocked);
        // Avatars stay editable
        let t = set_avatar(&drawn, 1, "🐯").unwrap();
        assert_eq!(t.state.snapshot.avatars[1], "🐯");
    }

    #[test]
    fn test_reset_from_spinning() {
        let mut rng = Pcg32::seed_from_u64(4);
        let state = roster(&["Ann", "Bob"]);
        let spinning = start_draw(&state, &mut rng).unwrap().state;
        let t = reset(&spinning);
        assert_eq!(t.state.snapshot, Snapshot::default());
        assert!(t.state.spin.is_none() && t.state.pending.is_empty());
        assert_eq!(t.state.spins, spinning.spins);
        assert_eq!(t.event, RotationEvent::Reset);
    }
}

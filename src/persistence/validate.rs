//! Per-field validation of a stored snapshot blob
//!
//! Each field is checked on its own; a field of the wrong shape is replaced
//! by its default and the rest of the blob is kept.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::consts::*;
use crate::draw::state::{MonthlyRecord, Snapshot, default_avatars, is_blank};

/// A parsed blob before the expiry check
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlob {
    pub snapshot: Snapshot,
    /// `None` when the blob carried no readable timestamp
    pub saved_at: Option<DateTime<Utc>>,
}

/// Parse a raw blob; `None` if it is not a JSON object at all
pub fn parse_blob(raw: &str) -> Option<StoredBlob> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Stored rotation is not valid JSON: {}", e);
            return None;
        }
    };
    let Value::Object(obj) = value else {
        log::warn!("Stored rotation is not an object");
        return None;
    };

    let saved_at = obj
        .get("savedAt")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc));

    Some(StoredBlob {
        snapshot: validate(&obj),
        saved_at,
    })
}

/// Build a snapshot from a JSON object, defaulting field by field
pub fn validate(obj: &Map<String, Value>) -> Snapshot {
    let defaults = Snapshot::default();

    let mut names: Vec<String> = field(obj, "names").unwrap_or(defaults.names);
    names.resize(ROSTER_SIZE, String::new());

    let mut avatars: Vec<String> = field(obj, "emojis").unwrap_or(defaults.avatars);
    if avatars.len() < names.len() {
        let fill = default_avatars();
        for slot in avatars.len()..names.len() {
            avatars.push(
                fill.get(slot)
                    .cloned()
                    .unwrap_or_else(|| FALLBACK_AVATAR.to_string()),
            );
        }
    }

    let raw_order: Vec<String> = field(obj, "order").unwrap_or(defaults.order);
    let order = clean_order(raw_order, &names);

    let locked: bool = field(obj, "locked").unwrap_or(defaults.locked);
    let history: Vec<MonthlyRecord> = field(obj, "history").unwrap_or(defaults.history);

    Snapshot {
        names,
        avatars,
        order,
        locked,
        history,
    }
}

/// Typed field lookup; missing or mistyped fields yield `None`
fn field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Option<T> {
    let value = obj.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("Stored field '{}' has the wrong shape, using default: {}", key, e);
            None
        }
    }
}

/// Keep only distinct, non-blank roster members
fn clean_order(order: Vec<String>, names: &[String]) -> Vec<String> {
    let before = order.len();
    let mut out: Vec<String> = Vec::with_capacity(before);
    for name in order {
        if is_blank(&name) || !names.contains(&name) || out.contains(&name) {
            continue;
        }
        out.push(name);
    }
    if out.len() != before {
        log::warn!("Dropped {} invalid draw order entries", before - out.len());
    }
    out
}

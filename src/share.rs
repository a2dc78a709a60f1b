//! Sharing and export helpers
//!
//! Turns the history into a plain-text summary, builds outbound share links,
//! and names export artifacts after the current month.

use serde::{Deserialize, Serialize};

use crate::draw::{Month, MonthlyRecord};
use crate::settings::ExportFormat;

/// Messaging destination for the Share button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ShareTarget {
    #[default]
    WhatsApp,
    Telegram,
    Email,
}

impl ShareTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareTarget::WhatsApp => "WhatsApp",
            ShareTarget::Telegram => "Telegram",
            ShareTarget::Email => "Email",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "whatsapp" | "wa" => Some(ShareTarget::WhatsApp),
            "telegram" | "tg" => Some(ShareTarget::Telegram),
            "email" | "mail" => Some(ShareTarget::Email),
            _ => None,
        }
    }
}

const SUMMARY_TITLE: &str = "🎡 Monthly Rotation";

/// Plain-text summary of every finalized month
pub fn summary(history: &[MonthlyRecord]) -> String {
    let mut out = String::from(SUMMARY_TITLE);
    if history.is_empty() {
        out.push_str("\nNo months drawn yet.");
        return out;
    }
    for record in history {
        out.push_str(&format!(
            "\n{}: {} {} & {} {}",
            record.month, record.avatars[0], record.pair[0], record.avatars[1], record.pair[1]
        ));
    }
    out
}

/// Outbound link carrying `text` to the chosen target
pub fn share_url(target: ShareTarget, text: &str) -> String {
    let encoded = urlencoding::encode(text);
    match target {
        ShareTarget::WhatsApp => format!("https://wa.me/?text={}", encoded),
        ShareTarget::Telegram => format!("https://t.me/share/url?url=&text={}", encoded),
        ShareTarget::Email => format!(
            "mailto:?subject={}&body={}",
            urlencoding::encode(SUMMARY_TITLE),
            encoded
        ),
    }
}

/// File name for an exported snapshot of the page
pub fn export_file_name(month: Month, format: ExportFormat) -> String {
    format!("rotation-{}.{}", month.as_str().to_lowercase(), format.extension())
}

//! User preferences
//!
//! Persisted separately from the rotation snapshot, under their own key, and
//! never expired or cleared by a rotation reset.

use serde::{Deserialize, Serialize};

use crate::consts::SETTINGS_KEY;
use crate::persistence::KeyValueStore;
use crate::share::ShareTarget;

/// Export artifact format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExportFormat {
    #[default]
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "png" | "image" => Some(ExportFormat::Png),
            "pdf" => Some(ExportFormat::Pdf),
            _ => None,
        }
    }
}

/// Rotation preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the Share button sends the summary
    pub share_target: ShareTarget,
    /// Format the Export button produces
    pub export_format: ExportFormat,
    /// Confetti after a month is saved
    pub confetti: bool,
    /// Reduced motion (skip confetti, shorten the wheel easing)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            share_target: ShareTarget::WhatsApp,
            export_format: ExportFormat::Png,
            confetti: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective confetti (respects reduced_motion)
    pub fn effective_confetti(&self) -> bool {
        self.confetti && !self.reduced_motion
    }

    /// Apply a share target picked on the page; false leaves it unchanged
    pub fn choose_share_target(&mut self, value: &str) -> bool {
        match ShareTarget::from_str(value) {
            Some(target) => {
                self.share_target = target;
                true
            }
            None => false,
        }
    }

    /// Apply an export format picked on the page; false leaves it unchanged
    pub fn choose_export_format(&mut self, value: &str) -> bool {
        match ExportFormat::from_str(value) {
            Some(format) => {
                self.export_format = format;
                true
            }
            None => false,
        }
    }

    /// Load settings, falling back to defaults
    pub fn load(storage: &impl KeyValueStore) -> Self {
        if let Some(json) = storage.get(SETTINGS_KEY) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings
    pub fn save(&self, storage: &mut impl KeyValueStore) {
        let result = serde_json::to_string(self)
            .map_err(Into::into)
            .and_then(|json| storage.set(SETTINGS_KEY, &json));
        match result {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Settings not saved: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_defaults_when_missing_or_broken() {
        let mut storage = MemoryStore::new();
        assert_eq!(Settings::load(&storage), Settings::default());
        storage.set(SETTINGS_KEY, "{{{").unwrap();
        assert_eq!(Settings::load(&storage), Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let mut storage = MemoryStore::new();
        let settings = Settings {
            share_target: ShareTarget::Telegram,
            export_format: ExportFormat::Pdf,
            confetti: false,
            reduced_motion: true,
        };
        settings.save(&mut storage);
        assert_eq!(Settings::load(&storage), settings);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let mut storage = MemoryStore::new();
        storage.set(SETTINGS_KEY, r#"{"reduced_motion": true}"#).unwrap();
        let settings = Settings::load(&storage);
        assert!(settings.reduced_motion);
        assert!(!settings.effective_confetti());
        assert_eq!(settings.share_target, ShareTarget::WhatsApp);
    }

    #[test]
    fn test_choices_from_page_values() {
        let mut settings = Settings::default();
        assert!(settings.choose_share_target(ShareTarget::Email.as_str()));
        assert!(settings.choose_export_format(ExportFormat::Pdf.extension()));
        assert_eq!(settings.share_target, ShareTarget::Email);
        assert_eq!(settings.export_format, ExportFormat::Pdf);

        assert!(!settings.choose_share_target("carrier pigeon"));
        assert!(!settings.choose_export_format("gif"));
        assert_eq!(settings.share_target, ShareTarget::Email);
        assert_eq!(settings.export_format, ExportFormat::Pdf);
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!(ExportFormat::from_str("PDF"), Some(ExportFormat::Pdf));
        assert_eq!(ExportFormat::from_str("image"), Some(ExportFormat::Png));
        assert_eq!(ExportFormat::from_str("gif"), None);
        assert_eq!(ExportFormat::Pdf.extension(), "pdf");
    }
}

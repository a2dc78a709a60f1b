//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall clock
//! - Draw RNG seeding
//! - Storage (LocalStorage on web)

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Current time
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Draw RNG seeded from the clock
pub fn seeded_rng() -> Pcg32 {
    let seed = now().timestamp_millis() as u64;
    log::debug!("Draw RNG seeded with {}", seed);
    Pcg32::seed_from_u64(seed)
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod web {
    use crate::error::StorageError;
    use crate::persistence::KeyValueStore;

    /// Browser LocalStorage substrate
    ///
    /// When storage is unavailable (private mode, disabled) reads return
    /// nothing and writes fail.
    pub struct LocalStorage {
        storage: Option<web_sys::Storage>,
    }

    impl LocalStorage {
        pub fn open() -> Self {
            let storage = web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten();
            if storage.is_none() {
                log::warn!("LocalStorage unavailable - rotation will not persist");
            }
            Self { storage }
        }
    }

    impl KeyValueStore for LocalStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.storage.as_ref()?.get_item(key).ok().flatten()
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            let storage = self.storage.as_ref().ok_or(StorageError::Unavailable)?;
            storage
                .set_item(key, value)
                .map_err(|e| StorageError::WriteRejected(format!("{:?}", e)))
        }

        fn remove(&mut self, key: &str) {
            if let Some(storage) = &self.storage {
                let _ = storage.remove_item(key);
            }
        }
    }
}

//! Session-scoped settings.
//!
//! The theme flag and the active profile selection persist in the local
//! settings store so the application reopens where the user left it.

use anyhow::Result;
use log::{info, warn};
use shared::{ProfileRef, Theme};

use crate::storage::LocalStore;

/// Key the theme flag is stored under
const THEME_KEY: &str = "theme";
/// Key the active profile selection is stored under
const ACTIVE_PROFILE_KEY: &str = "active-profile";

/// Settings service backed by the local key-value store
#[derive(Clone)]
pub struct SessionService<S: LocalStore> {
    store: S,
}

impl<S: LocalStore> SessionService<S> {
    /// Create a new session service over a local store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored theme, defaulting to light when absent or unreadable
    pub async fn theme(&self) -> Result<Theme> {
        match self.store.get(THEME_KEY).await? {
            Some(value) => match Theme::parse(&value) {
                Ok(theme) => Ok(theme),
                Err(e) => {
                    warn!("Stored theme '{}' is invalid ({}), using light", value, e);
                    Ok(Theme::default())
                }
            },
            None => Ok(Theme::default()),
        }
    }

    /// Persist a theme change
    pub async fn set_theme(&self, theme: Theme) -> Result<()> {
        self.store.put(THEME_KEY, theme.as_str()).await?;
        info!("🎨 Theme set to {}", theme.as_str());
        Ok(())
    }

    /// Flip between light and dark, returning the new theme
    pub async fn toggle_theme(&self) -> Result<Theme> {
        let next = match self.theme().await? {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        };
        self.set_theme(next).await?;
        Ok(next)
    }

    /// Stored profile selection, if any
    pub async fn active_profile(&self) -> Result<Option<ProfileRef>> {
        match self.store.get(ACTIVE_PROFILE_KEY).await? {
            Some(payload) => match serde_json::from_str(&payload) {
                Ok(profile) => Ok(Some(profile)),
                Err(e) => {
                    warn!("Stored profile selection is unreadable ({}), ignoring", e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Persist the profile selection
    pub async fn set_active_profile(&self, profile: &ProfileRef) -> Result<()> {
        let payload = serde_json::to_string(profile)?;
        self.store.put(ACTIVE_PROFILE_KEY, &payload).await?;
        Ok(())
    }
}

//! Theme catalogue and persisted theme selection.
//!
//! # Invariants
//! - The catalogue order is stable; cycling walks it and wraps around.
//! - Unknown stored ids read as "no stored theme".

use crate::storage::PersistentStorage;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key for the selected theme id.
pub const THEME_STORAGE_KEY: &str = "luma:theme";

/// Stored id for the light pastel theme.
pub const THEME_ID_PASTEL: &str = "pastel";
/// Stored id for the dark pastel theme.
pub const THEME_ID_PASTEL_DARK: &str = "pastel-dark";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeId {
    Pastel,
    PastelDark,
}

impl ThemeId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pastel => THEME_ID_PASTEL,
            Self::PastelDark => THEME_ID_PASTEL_DARK,
        }
    }
}

impl Display for ThemeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a theme id from its stored string form.
pub fn parse_theme_id(value: &str) -> Result<ThemeId, ThemeError> {
    match value.trim() {
        THEME_ID_PASTEL => Ok(ThemeId::Pastel),
        THEME_ID_PASTEL_DARK => Ok(ThemeId::PastelDark),
        other => Err(ThemeError::UnknownTheme(other.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    UnknownTheme(String),
}

impl Display for ThemeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTheme(value) => write!(f, "unknown theme id: `{value}`"),
        }
    }
}

impl Error for ThemeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub id: ThemeId,
    pub label: &'static str,
    pub mode: ThemeMode,
}

const THEMES: &[Theme] = &[
    Theme {
        id: ThemeId::Pastel,
        label: "Pastel Light",
        mode: ThemeMode::Light,
    },
    Theme {
        id: ThemeId::PastelDark,
        label: "Pastel Dark",
        mode: ThemeMode::Dark,
    },
];

pub fn available_themes() -> &'static [Theme] {
    THEMES
}

pub fn theme_by_id(id: ThemeId) -> &'static Theme {
    // The catalogue holds one entry per `ThemeId` variant.
    match id {
        ThemeId::Pastel => &THEMES[0],
        ThemeId::PastelDark => &THEMES[1],
    }
}

/// Returns the id after `current` in catalogue order.
pub fn next_theme_id(current: ThemeId) -> ThemeId {
    match THEMES.iter().position(|theme| theme.id == current) {
        Some(index) => THEMES[(index + 1) % THEMES.len()].id,
        None => THEMES[0].id,
    }
}

/// Same as [`next_theme_id`] for a raw stored string; unknown ids map to
/// the first theme.
pub fn next_theme_id_from_str(current: &str) -> ThemeId {
    parse_theme_id(current).map_or(THEMES[0].id, next_theme_id)
}

/// Theme selection persisted through the shared storage adapter.
#[derive(Clone)]
pub struct ThemeSettings {
    storage: PersistentStorage,
}

impl ThemeSettings {
    pub fn new(storage: PersistentStorage) -> Self {
        Self { storage }
    }

    pub fn stored_theme_id(&self) -> Option<ThemeId> {
        let raw: Option<String> = self.storage.load(THEME_STORAGE_KEY, None);
        raw.and_then(|value| parse_theme_id(value.as_str()).ok())
    }

    /// Stored theme if any, otherwise the one matching the system preference.
    pub fn resolve_initial_theme(&self, prefers_dark: bool) -> &'static Theme {
        if let Some(id) = self.stored_theme_id() {
            return theme_by_id(id);
        }
        if prefers_dark {
            theme_by_id(ThemeId::PastelDark)
        } else {
            theme_by_id(ThemeId::Pastel)
        }
    }

    /// Persists `theme` as the current selection.
    pub fn apply_theme(&self, theme: &Theme) {
        self.storage.save(THEME_STORAGE_KEY, theme.id.as_str());
        info!("event=theme_apply module=theme status=ok theme={}", theme.id);
    }

    /// Applies and returns the theme after the current one.
    pub fn cycle(&self, prefers_dark: bool) -> &'static Theme {
        let current = self.resolve_initial_theme(prefers_dark);
        let next = theme_by_id(next_theme_id(current.id));
        self.apply_theme(next);
        next
    }
}

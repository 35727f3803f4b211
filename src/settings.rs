//! Runtime settings
//!
//! Read from `data-*` attributes on the page root rather than LocalStorage:
//! an import wipes the local store, settings must survive it.

use serde::{Deserialize, Serialize};

use crate::consts::REMOTE_DOCUMENT_KEY;

/// Logging verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "Quiet",
            Verbosity::Normal => "Normal",
            Verbosity::Verbose => "Verbose",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quiet" | "warn" => Some(Verbosity::Quiet),
            "normal" | "info" => Some(Verbosity::Normal),
            "verbose" | "debug" => Some(Verbosity::Verbose),
            _ => None,
        }
    }

    /// Most detailed level that gets logged
    pub fn level(&self) -> log::Level {
        match self {
            Verbosity::Quiet => log::Level::Warn,
            Verbosity::Normal => log::Level::Info,
            Verbosity::Verbose => log::Level::Debug,
        }
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        self.level().to_level_filter()
    }
}

/// Planner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the realtime database; no remote mirror when unset
    pub remote_url: Option<String>,
    /// Key of the mirrored document under `remote_url`
    pub document_key: String,
    pub verbosity: Verbosity,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            remote_url: None,
            document_key: REMOTE_DOCUMENT_KEY.to_string(),
            verbosity: Verbosity::Normal,
        }
    }
}

impl Settings {
    /// Build from attribute lookups; blank or unknown values keep the defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let present = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            remote_url: present(Self::REMOTE_URL_ATTR).map(|url| url.trim_end_matches('/').to_string()),
            document_key: present(Self::DOCUMENT_KEY_ATTR).unwrap_or(defaults.document_key),
            verbosity: present(Self::LOG_LEVEL_ATTR)
                .and_then(|v| Verbosity::from_str(&v))
                .unwrap_or(defaults.verbosity),
        }
    }

    /// Full URL of the mirrored document (REST form)
    pub fn document_url(&self) -> Option<String> {
        self.remote_url
            .as_ref()
            .map(|base| format!("{}/{}.json", base, self.document_key))
    }

    const REMOTE_URL_ATTR: &'static str = "data-remote-url";
    const DOCUMENT_KEY_ATTR: &'static str = "data-document-key";
    const LOG_LEVEL_ATTR: &'static str = "data-log-level";

    /// Load settings from the page root element (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let root = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element());

        match root {
            Some(root) => {
                let settings = Self::from_lookup(|name| root.get_attribute(name));
                log::info!(
                    "Loaded settings (remote mirror {})",
                    if settings.remote_url.is_some() { "on" } else { "off" }
                );
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

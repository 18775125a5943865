use crate::calc::civil_time::parse_timezone;
use crate::data::persistence::Persistable;
use anyhow::Result;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEZONE: &str = "Europe/London";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    /// Used when an event's venue is unknown or has no usable timezone.
    pub default_timezone: String,
    /// `tracing` filter directive; `RUST_LOG` takes precedence.
    pub log_filter: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            default_timezone: DEFAULT_TIMEZONE.to_string(),
            log_filter: "info".to_string(),
        }
    }
}

/// Wrapper that reads the `settings` key from config.yaml.
#[derive(Serialize, Deserialize, Default, Debug)]
struct SettingsWrapper {
    #[serde(default)]
    settings: AppSettings,
}

impl Persistable for SettingsWrapper {
    fn filename() -> &'static str {
        "config.yaml"
    }
    fn is_json() -> bool {
        false
    }
}

impl AppSettings {
    pub fn load() -> Result<Self> {
        Ok(SettingsWrapper::load()?.settings)
    }

    pub fn load_from(dir: &std::path::Path) -> Result<Self> {
        Ok(SettingsWrapper::load_from(dir)?.settings)
    }

    pub fn save_to(&self, dir: &std::path::Path) -> Result<()> {
        let wrapper = SettingsWrapper {
            settings: self.clone(),
        };
        wrapper.save_to(dir)
    }

    /// Resolves `default_timezone`, falling back to Europe/London.
    pub fn timezone(&self) -> Tz {
        parse_timezone(&self.default_timezone).unwrap_or_else(|err| {
            tracing::warn!(%err, "falling back to {DEFAULT_TIMEZONE}");
            chrono_tz::Europe::London
        })
    }

    /// Timezone of the venue if it parses, otherwise the default.
    pub fn timezone_for(&self, venue_tz: Option<&str>) -> Tz {
        venue_tz
            .and_then(|name| parse_timezone(name).ok())
            .unwrap_or_else(|| self.timezone())
    }
}

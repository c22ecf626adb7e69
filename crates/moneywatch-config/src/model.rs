use std::{fmt, path::PathBuf};

use chrono::Weekday;
use moneywatch_domain::TrendRange;
use serde::{de::Deserializer, Deserialize, Serialize};

const DATA_DIR_NAME: &str = "moneywatch";

/// User preferences. Every field has a default, so a partial file loads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "Config::default_currency")]
    pub currency: String,
    #[serde(default = "Config::default_locale")]
    pub locale: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for the ledger files. Defaults to the platform data
    /// directory plus `moneywatch`.
    pub data_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub reseed: ReseedSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
    #[serde(default)]
    pub week_start: WeekStart,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: Self::default_currency(),
            locale: Self::default_locale(),
            data_dir: None,
            seed: None,
            reseed: ReseedSettings::default(),
            dashboard: DashboardSettings::default(),
            week_start: WeekStart::default(),
        }
    }
}

impl Config {
    pub fn default_currency() -> String {
        "USD".into()
    }

    pub fn default_locale() -> String {
        "en-US".into()
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(path) = &self.data_dir {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join(DATA_DIR_NAME)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReseedSettings {
    #[serde(default = "ReseedSettings::default_min_transactions")]
    pub min_transactions: usize,
    #[serde(default)]
    pub horizon_days: u32,
}

impl ReseedSettings {
    fn default_min_transactions() -> usize {
        100
    }
}

impl Default for ReseedSettings {
    fn default() -> Self {
        Self {
            min_transactions: Self::default_min_transactions(),
            horizon_days: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardSettings {
    #[serde(default)]
    pub trend_range: TrendRange,
    #[serde(default = "DashboardSettings::default_upcoming_horizon_days")]
    pub upcoming_horizon_days: u32,
    #[serde(default = "DashboardSettings::default_breakdown_limit")]
    pub breakdown_limit: usize,
}

impl DashboardSettings {
    fn default_upcoming_horizon_days() -> u32 {
        30
    }

    fn default_breakdown_limit() -> usize {
        8
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            trend_range: TrendRange::default(),
            upcoming_horizon_days: Self::default_upcoming_horizon_days(),
            breakdown_limit: Self::default_breakdown_limit(),
        }
    }
}

/// First day of the week for weekly budgets.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    pub fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "sunday" | "sun" => WeekStart::Sunday,
            _ => WeekStart::Monday,
        }
    }

    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WeekStart::Monday => "monday",
            WeekStart::Sunday => "sunday",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for WeekStart {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .map(|v| WeekStart::from_str(&v))
            .unwrap_or_default())
    }
}

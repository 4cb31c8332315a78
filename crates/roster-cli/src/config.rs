// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use roster_app::{
    BUFFER_ROWS, CONTAINER_HEIGHT, INCREMENTAL_LOAD, INTERSECTION_THROTTLE, MAX_DELAY, PAGE_SIZE,
    ROW_HEIGHT, SCROLL_THROTTLE, SEARCH_DEBOUNCE, TOTAL_RECORDS, TableSettings, WindowConfig,
};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
const APP_NAME: &str = "roster";
const CONFIG_PATH_ENV: &str = "ROSTER_CONFIG_PATH";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub table: Table,
    #[serde(default)]
    pub delays: Delays,
    #[serde(default)]
    pub data: Data,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            table: Table::default(),
            delays: Delays::default(),
            data: Data::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Table {
    pub row_height: Option<i64>,
    pub container_height: Option<i64>,
    pub buffer_rows: Option<i64>,
    pub incremental_load: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delays {
    pub search_debounce: Option<String>,
    pub scroll_throttle: Option<String>,
    pub intersection_throttle: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Data {
    pub total_records: Option<i64>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [table], [delays], and [data]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let positive = [
            ("table.row_height", self.table.row_height),
            ("table.container_height", self.table.container_height),
            ("table.incremental_load", self.table.incremental_load),
            ("table.page_size", self.table.page_size),
        ];
        for (key, value) in positive {
            if let Some(value) = value
                && value <= 0
            {
                bail!(
                    "{key} in {} must be positive, got {value}",
                    path.display()
                );
            }
        }

        let non_negative = [
            ("table.buffer_rows", self.table.buffer_rows),
            ("data.total_records", self.data.total_records),
        ];
        for (key, value) in non_negative {
            if let Some(value) = value
                && value < 0
            {
                bail!(
                    "{key} in {} must be non-negative, got {value}",
                    path.display()
                );
            }
        }

        let delays = [
            ("delays.search_debounce", &self.delays.search_debounce),
            ("delays.scroll_throttle", &self.delays.scroll_throttle),
            (
                "delays.intersection_throttle",
                &self.delays.intersection_throttle,
            ),
        ];
        for (key, raw) in delays {
            if let Some(raw) = raw {
                let parsed = parse_duration(raw)
                    .with_context(|| format!("{key} in {}", path.display()))?;
                if parsed <= Duration::ZERO {
                    bail!("{key} in {} must be positive, got {raw}", path.display());
                }
                if parsed > MAX_DELAY {
                    bail!("{key} in {} must be at most 1h, got {raw}", path.display());
                }
            }
        }

        // Pixel sizes are carried as u32.
        for (key, value) in [
            ("table.row_height", self.table.row_height),
            ("table.container_height", self.table.container_height),
        ] {
            if let Some(value) = value
                && u32::try_from(value).is_err()
            {
                bail!("{key} in {} is too large, got {value}", path.display());
            }
        }

        Ok(())
    }

    /// Core settings with every unset key at its default.
    pub fn table_settings(&self) -> Result<TableSettings> {
        let settings = TableSettings {
            window: WindowConfig {
                row_height: pixels(self.table.row_height, ROW_HEIGHT)?,
                container_height: pixels(self.table.container_height, CONTAINER_HEIGHT)?,
                buffer_rows: count(self.table.buffer_rows, BUFFER_ROWS)?,
                incremental_load: count(self.table.incremental_load, INCREMENTAL_LOAD)?,
            },
            page_size: count(self.table.page_size, PAGE_SIZE)?,
            search_debounce: delay(self.delays.search_debounce.as_deref(), SEARCH_DEBOUNCE)?,
            scroll_throttle: delay(self.delays.scroll_throttle.as_deref(), SCROLL_THROTTLE)?,
            intersection_throttle: delay(
                self.delays.intersection_throttle.as_deref(),
                INTERSECTION_THROTTLE,
            )?,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn total_records(&self) -> Result<usize> {
        count(self.data.total_records, TOTAL_RECORDS)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# roster config\n# Place this file at: {}\n\nversion = 1\n\n[table]\n# Pixel height of one row and of the scroll viewport.\nrow_height = {}\ncontainer_height = {}\n# Extra rows rendered above and below the viewport.\nbuffer_rows = {}\n# Rows revealed per load-more step.\nincremental_load = {}\npage_size = {}\n\n[delays]\nsearch_debounce = \"{}ms\"\nscroll_throttle = \"{}ms\"\nintersection_throttle = \"{}ms\"\n\n[data]\n# Number of generated demo records.\ntotal_records = {}\n",
            path.display(),
            ROW_HEIGHT,
            CONTAINER_HEIGHT,
            BUFFER_ROWS,
            INCREMENTAL_LOAD,
            PAGE_SIZE,
            SEARCH_DEBOUNCE.as_millis(),
            SCROLL_THROTTLE.as_millis(),
            INTERSECTION_THROTTLE.as_millis(),
            TOTAL_RECORDS,
        )
    }
}

fn pixels(value: Option<i64>, default: u32) -> Result<u32> {
    match value {
        Some(value) => u32::try_from(value).with_context(|| format!("pixel size {value}")),
        None => Ok(default),
    }
}

fn count(value: Option<i64>, default: usize) -> Result<usize> {
    match value {
        Some(value) => usize::try_from(value).with_context(|| format!("count {value}")),
        None => Ok(default),
    }
}

fn delay(value: Option<&str>, default: Duration) -> Result<Duration> {
    match value {
        Some(raw) => parse_duration(raw),
        None => Ok(default),
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("duration {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 300ms or 1s)")
}

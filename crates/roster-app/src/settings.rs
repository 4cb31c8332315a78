// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use std::time::Duration;

use crate::window::WindowConfig;

pub const ROW_HEIGHT: u32 = 72;
pub const CONTAINER_HEIGHT: u32 = 360;
pub const BUFFER_ROWS: usize = 2;
pub const INCREMENTAL_LOAD: usize = 5;
pub const PAGE_SIZE: usize = 10;
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
pub const SCROLL_THROTTLE: Duration = Duration::from_millis(50);
pub const INTERSECTION_THROTTLE: Duration = Duration::from_millis(200);
pub const TOTAL_RECORDS: usize = 100;
/// Upper bound for any debounce or throttle delay.
pub const MAX_DELAY: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSettings {
    pub window: WindowConfig,
    pub page_size: usize,
    pub search_debounce: Duration,
    pub scroll_throttle: Duration,
    pub intersection_throttle: Duration,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            window: WindowConfig {
                row_height: ROW_HEIGHT,
                container_height: CONTAINER_HEIGHT,
                buffer_rows: BUFFER_ROWS,
                incremental_load: INCREMENTAL_LOAD,
            },
            page_size: PAGE_SIZE,
            search_debounce: SEARCH_DEBOUNCE,
            scroll_throttle: SCROLL_THROTTLE,
            intersection_throttle: INTERSECTION_THROTTLE,
        }
    }
}

impl TableSettings {
    pub fn validate(&self) -> Result<()> {
        if self.window.row_height == 0 {
            bail!("row height must be positive");
        }
        if self.window.container_height == 0 {
            bail!("container height must be positive");
        }
        if self.window.incremental_load == 0 {
            bail!("incremental load must reveal at least 1 row");
        }
        if self.page_size == 0 {
            bail!("page size must be at least 1");
        }
        for (name, delay) in [
            ("search debounce", self.search_debounce),
            ("scroll throttle", self.scroll_throttle),
            ("intersection throttle", self.intersection_throttle),
        ] {
            if delay > MAX_DELAY {
                bail!("{name} must be at most 1h, got {}ms", delay.as_millis());
            }
        }
        Ok(())
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use roster_app::Record;
use roster_testkit::{current_date, generate_records};
use tracing::debug;

/// Supplies the generated demo roster, dated relative to today.
pub struct DemoRuntime {
    total_records: usize,
}

impl DemoRuntime {
    pub fn new(total_records: usize) -> Self {
        Self { total_records }
    }

    pub fn records(&self) -> Vec<Record> {
        let today = current_date();
        debug!(count = self.total_records, %today, "generating demo records");
        generate_records(self.total_records, today)
    }
}

impl roster_tui::AppRuntime for DemoRuntime {
    fn load_records(&mut self) -> Result<Vec<Record>> {
        Ok(self.records())
    }
}

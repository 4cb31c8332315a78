// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::Instant;

use crate::limiter::{Debouncer, Throttler};
use crate::settings::TableSettings;
use crate::state::TableCommand;

/// Turns raw, high-frequency UI input into rate-limited table commands.
///
/// Search keystrokes are debounced; scroll ticks and near-bottom signals are
/// throttled. The resulting commands are the same ones an unthrottled caller
/// would send, so the final table state does not depend on the timing.
#[derive(Debug, Clone)]
pub struct InputScheduler {
    search: Debouncer<String>,
    scroll: Throttler<u64>,
    near_bottom: Throttler<()>,
}

impl InputScheduler {
    pub fn new(settings: &TableSettings) -> Self {
        Self {
            search: Debouncer::new(settings.search_debounce),
            scroll: Throttler::new(settings.scroll_throttle),
            near_bottom: Throttler::new(settings.intersection_throttle),
        }
    }

    pub fn search_input(&mut self, now: Instant, text: impl Into<String>) {
        self.search.call(now, text.into());
    }

    pub fn scroll_input(&mut self, now: Instant, offset_px: u64) -> Option<TableCommand> {
        self.scroll.call(now, offset_px).map(TableCommand::Scroll)
    }

    pub fn near_bottom(&mut self, now: Instant) -> Option<TableCommand> {
        self.near_bottom.call(now, ()).map(|()| TableCommand::LoadMore)
    }

    /// Releases every deferred command that is due, oldest concern first.
    pub fn poll(&mut self, now: Instant) -> Vec<TableCommand> {
        let mut commands = Vec::new();
        if let Some(text) = self.search.poll(now) {
            commands.push(TableCommand::SetSearch(text));
        }
        if let Some(offset) = self.scroll.poll(now) {
            commands.push(TableCommand::Scroll(offset));
        }
        if self.near_bottom.poll(now).is_some() {
            commands.push(TableCommand::LoadMore);
        }
        commands
    }

    /// Sends a pending search right away, e.g. when the input loses focus.
    pub fn flush_search(&mut self) -> Option<TableCommand> {
        self.search.flush().map(TableCommand::SetSearch)
    }

    pub fn search_pending(&self) -> bool {
        self.search.is_pending()
    }

    pub fn cancel_search(&mut self) {
        self.search.cancel();
    }

    /// Drops the pending scroll position. Used when the window is reset so a
    /// stale offset cannot land on the new rows.
    pub fn cancel_scroll(&mut self) {
        self.scroll.cancel();
        self.near_bottom.cancel();
    }

    pub fn cancel_all(&mut self) {
        self.search.cancel();
        self.scroll.cancel();
        self.near_bottom.cancel();
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.search.next_deadline(),
            self.scroll.next_deadline(),
            self.near_bottom.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn is_idle(&self) -> bool {
        !self.search.is_pending() && !self.scroll.is_pending() && !self.near_bottom.is_pending()
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowConfig {
    pub row_height: u32,
    pub container_height: u32,
    pub buffer_rows: usize,
    pub incremental_load: usize,
}

impl WindowConfig {
    fn row_height_px(self) -> u64 {
        u64::from(self.row_height.max(1))
    }

    /// Rows overlapping the viewport plus the buffer on both sides.
    pub fn visible_row_count(self) -> usize {
        let rows = u64::from(self.container_height).div_ceil(self.row_height_px());
        rows as usize + self.buffer_rows * 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRange {
    pub start_index: usize,
    pub end_index: usize,
    pub content_height_px: u64,
}

impl WindowRange {
    pub const fn indices(&self) -> Range<usize> {
        self.start_index..self.end_index
    }

    pub const fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }
}

/// Maps a scroll offset onto the materialized index range of the revealed
/// prefix `rows[..min(visible_ceiling, rows_len)]`.
pub fn compute_window(
    rows_len: usize,
    scroll_offset_px: u64,
    visible_ceiling: usize,
    config: WindowConfig,
) -> WindowRange {
    let revealed = visible_ceiling.min(rows_len);
    let first_row = (scroll_offset_px / config.row_height_px()) as usize;
    let start_index = first_row.saturating_sub(config.buffer_rows).min(revealed);
    let end_index = revealed.min(start_index.saturating_add(config.visible_row_count()));
    WindowRange {
        start_index,
        end_index,
        content_height_px: revealed as u64 * config.row_height_px(),
    }
}

/// Raises the reveal ceiling by one increment, saturating at `rows_len`.
/// A ceiling already at or past `rows_len` is returned unchanged.
pub fn grow_ceiling(current: usize, rows_len: usize, increment: usize) -> usize {
    if current >= rows_len {
        return current;
    }
    current.saturating_add(increment).min(rows_len)
}

pub fn visible_slice<T>(rows: &[T], range: WindowRange) -> &[T] {
    let end = range.end_index.min(rows.len());
    let start = range.start_index.min(end);
    &rows[start..end]
}

/// Scroll position and reveal ceiling for the current page's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualWindow {
    pub scroll_offset_px: u64,
    pub visible_ceiling: usize,
}

impl VirtualWindow {
    pub const fn new(config: WindowConfig) -> Self {
        Self {
            scroll_offset_px: 0,
            visible_ceiling: config.incremental_load,
        }
    }

    pub fn reset(&mut self, config: WindowConfig) {
        *self = Self::new(config);
    }

    pub fn range(&self, rows_len: usize, config: WindowConfig) -> WindowRange {
        compute_window(rows_len, self.scroll_offset_px, self.visible_ceiling, config)
    }

    pub fn revealed_len(&self, rows_len: usize) -> usize {
        self.visible_ceiling.min(rows_len)
    }

    /// Returns true when the ceiling moved.
    pub fn load_more(&mut self, rows_len: usize, config: WindowConfig) -> bool {
        let next = grow_ceiling(self.visible_ceiling, rows_len, config.incremental_load);
        let grew = next != self.visible_ceiling;
        self.visible_ceiling = next;
        grew
    }

    pub fn can_load_more(&self, rows_len: usize) -> bool {
        self.visible_ceiling < rows_len
    }

    /// The viewport bottom has reached the last revealed row.
    pub fn near_bottom(&self, rows_len: usize, config: WindowConfig) -> bool {
        let content = self.range(rows_len, config).content_height_px;
        self.scroll_offset_px + u64::from(config.container_height) >= content
    }

    /// Largest offset that still shows a full viewport of revealed rows.
    pub fn max_scroll_offset(&self, rows_len: usize, config: WindowConfig) -> u64 {
        let content = self.range(rows_len, config).content_height_px;
        content.saturating_sub(u64::from(config.container_height))
    }

    pub fn row_top_px(index: usize, config: WindowConfig) -> u64 {
        index as u64 * config.row_height_px()
    }
}

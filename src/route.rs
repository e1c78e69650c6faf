//! Per-day paint sequences and the route they concatenate into.
//!
//! Every layer named `Day <n>` contributes the fully opaque cells of its grid, ordered by
//! descending red channel. The artist encodes stroke order in red, so brighter cells are painted
//! first.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use crate::document::{Document, Layer};
use crate::foundation::core::Coord;

/// Literal prefix of layers carrying a day's route.
pub const DAY_PREFIX: &str = "Day ";

/// Day number encoded in a layer name, if it is a day layer.
///
/// The number is the second space-separated token, so `Day 7 (redo)` is day 7. Negative and
/// zero days are accepted and sort before day 1.
pub fn parse_day_number(name: &str) -> Option<i64> {
    if !is_day_layer(name) {
        return None;
    }
    name.split(' ').nth(1)?.parse().ok()
}

/// Opaque cells of `layer` in paint order.
///
/// Cells are ordered by descending `(red, x, y)`, so equal red values keep reverse scan order.
pub fn extract_day(layer: &Layer) -> Vec<Coord> {
    let mut cells: Vec<(u8, Coord)> = Coord::scan_order()
        .filter_map(|c| {
            let px = layer.pixel(c);
            (px[3] == 255).then_some((px[0], c))
        })
        .collect();
    cells.sort_unstable_by(|a, b| b.cmp(a));
    cells.into_iter().map(|(_, c)| c).collect()
}

/// Whether `name` marks a day layer, numbered or not.
pub fn is_day_layer(name: &str) -> bool {
    name.starts_with(DAY_PREFIX)
}

/// Progress record for one processed day layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayReport {
    pub layer_name: String,
    pub day: i64,
    pub pixels: usize,
}

/// Paint sequences keyed by day number.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DayRoutes {
    by_day: BTreeMap<i64, Vec<Coord>>,
}

impl DayRoutes {
    /// Extract every day layer of `doc`, in document order.
    ///
    /// When two layers share a day number the later one replaces the earlier one.
    pub fn from_document(doc: &Document) -> (Self, Vec<DayReport>) {
        let mut by_day = BTreeMap::new();
        let mut reports = Vec::new();

        for layer in &doc.layers {
            if !is_day_layer(&layer.name) {
                continue;
            }
            let Some(day) = parse_day_number(&layer.name) else {
                tracing::warn!(name = %layer.name, "skipping day layer without a day number");
                continue;
            };

            let pixels = extract_day(layer);
            tracing::debug!(day, pixels = pixels.len(), "extracted day layer");
            reports.push(DayReport {
                layer_name: layer.name.clone(),
                day,
                pixels: pixels.len(),
            });
            if by_day.insert(day, pixels).is_some() {
                tracing::warn!(day, name = %layer.name, "day number repeated, keeping the later layer");
            }
        }

        (Self { by_day }, reports)
    }

    pub fn from_days(days: impl IntoIterator<Item = (i64, Vec<Coord>)>) -> Self {
        Self {
            by_day: days.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_day.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }

    /// Days in ascending numeric order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &[Coord])> {
        self.by_day.iter().map(|(&d, px)| (d, px.as_slice()))
    }
}

/// The concatenated route across all days.
#[derive(Clone, Debug, Default)]
pub struct Route {
    /// Every painted cell, day after day.
    pub pixels: Vec<Coord>,
    /// Cumulative route length at each day boundary, starting with `0`.
    pub day_index: Vec<usize>,
    /// Each cell that was already on the route when appended again, once per repeat.
    pub duplicates: Vec<Coord>,
    first_seen: HashMap<Coord, usize>,
}

impl Route {
    /// Concatenate `days` in ascending day order.
    pub fn assemble(days: &DayRoutes) -> Self {
        let mut route = Self {
            day_index: vec![0],
            ..Self::default()
        };

        for (_, pixels) in days.iter() {
            for &px in pixels {
                match route.first_seen.entry(px) {
                    Entry::Occupied(_) => {
                        tracing::warn!(%px, "duplicate route pixel");
                        route.duplicates.push(px);
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(route.pixels.len());
                    }
                }
                route.pixels.push(px);
            }
            route.day_index.push(route.pixels.len());
        }
        route
    }

    /// Index of the first occurrence of `c` on the route.
    pub fn position(&self, c: Coord) -> Option<usize> {
        self.first_seen.get(&c).copied()
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/unit/route.rs"]
mod tests;

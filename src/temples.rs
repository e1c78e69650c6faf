//! Temple landmarks, ordered by when the route reaches them.

use crate::document::Document;
use crate::foundation::core::{Coord, TEMPLE_MARKER};
use crate::foundation::error::{RouteError, RouteResult};
use crate::route::Route;

/// Name of the layer(s) carrying temple markers.
pub const TEMPLES_LAYER: &str = "Temples";

/// Marker cells of every `Temples` layer, in document then scan order.
pub fn scan_markers(doc: &Document) -> Vec<Coord> {
    doc.layers_named(TEMPLES_LAYER)
        .flat_map(|layer| Coord::scan_order().filter(move |&c| layer.pixel(c) == TEMPLE_MARKER))
        .collect()
}

/// Reorder `markers` by their first position on `route`.
///
/// Every marker must lie on the route; otherwise there is no arrival order to sort by.
pub fn order_by_arrival(markers: &[Coord], route: &Route) -> RouteResult<Vec<Coord>> {
    let mut keyed = markers
        .iter()
        .map(|&c| {
            route
                .position(c)
                .map(|pos| (pos, c))
                .ok_or_else(|| RouteError::consistency(format!("temple {c} is not on the route")))
        })
        .collect::<RouteResult<Vec<_>>>()?;
    keyed.sort_by_key(|&(pos, _)| pos);
    Ok(keyed.into_iter().map(|(_, c)| c).collect())
}

/// Number of temples reached before each day boundary of `route`.
///
/// `temples` must already be in arrival order.
pub fn arrival_counts(temples: &[Coord], route: &Route) -> Vec<usize> {
    let positions: Vec<usize> = temples.iter().filter_map(|&c| route.position(c)).collect();
    route
        .day_index
        .iter()
        .map(|&boundary| positions.partition_point(|&pos| pos < boundary))
        .collect()
}

#[cfg(test)]
#[path = "../tests/unit/temples.rs"]
mod tests;

use std::io::Write;

use crate::{
    document::Document,
    emit::{TableLengths, Tables},
    foundation::core::Coord,
    foundation::error::RouteResult,
    route::{DayReport, DayRoutes, Route, is_day_layer},
    temples::{arrival_counts, order_by_arrival, scan_markers},
};

/// Everything pulled out of one document, ready to emit.
#[derive(Clone, Debug)]
pub struct Extraction {
    /// Total number of layers in the source document.
    pub layer_count: usize,
    /// Layers whose name carries the day prefix, including ones without a usable number.
    pub day_layer_count: usize,
    /// One entry per day layer, in document order.
    pub day_reports: Vec<DayReport>,
    pub route: Route,
    /// Temples in arrival order.
    pub temples: Vec<Coord>,
    /// Temples reached by each day boundary.
    pub temple_arrivals: Vec<usize>,
}

/// Run the full extraction: days, route, then temples.
#[tracing::instrument(skip(doc), fields(layers = doc.layers.len()))]
pub fn extract(doc: &Document) -> RouteResult<Extraction> {
    let (days, day_reports) = DayRoutes::from_document(doc);
    let route = Route::assemble(&days);

    let markers = scan_markers(doc);
    let temples = order_by_arrival(&markers, &route)?;
    let temple_arrivals = arrival_counts(&temples, &route);

    tracing::debug!(
        days = days.len(),
        route = route.len(),
        duplicates = route.duplicates.len(),
        temples = temples.len(),
        "extraction done"
    );

    Ok(Extraction {
        layer_count: doc.layers.len(),
        day_layer_count: doc.layers.iter().filter(|l| is_day_layer(&l.name)).count(),
        day_reports,
        route,
        temples,
        temple_arrivals,
    })
}

impl Extraction {
    pub fn tables(&self) -> Tables<'_> {
        Tables {
            route: &self.route.pixels,
            day_index: &self.route.day_index,
            temples: &self.temples,
            temple_arrivals: &self.temple_arrivals,
        }
    }

    /// Human-readable progress lines: layer summary, per-day counts, duplicate warnings.
    pub fn write_report<W: Write>(&self, out: &mut W) -> RouteResult<()> {
        writeln!(
            out,
            "Found {} layers, of which {} contain day routes.",
            self.layer_count, self.day_layer_count
        )?;
        for day in &self.day_reports {
            writeln!(out, "Processing {}... {} pixels.", day.layer_name, day.pixels)?;
        }
        for px in &self.route.duplicates {
            writeln!(out, "WARNING: Duplicate pixel {px}")?;
        }
        Ok(())
    }

    /// Emit the tables, declaring `declared` lengths or, when `None`, the extracted ones.
    ///
    /// Declared lengths are checked against the extraction first.
    pub fn write_tables<W: Write>(
        &self,
        out: &mut W,
        declared: Option<TableLengths>,
    ) -> RouteResult<()> {
        let tables = self.tables();
        let lengths = match declared {
            Some(lengths) => {
                tables.check_lengths(lengths)?;
                lengths
            }
            None => tables.actual_lengths(),
        };
        tables.write(out, lengths)
    }
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;

//! Route table extraction for pixel-map artwork.
//!
//! A layered GIMP document holds one layer per walking day (`Day <n>`), each painting that day's
//! stretch of the route with the stroke order encoded in the red channel, plus a `Temples` layer
//! marking landmarks. This crate turns such a document into static Rust tables:
//!
//! - Load a [`Document`] (from `.xcf` or from decoded [`Layer`]s)
//! - Run [`extract`] to build the route, day boundaries and temple order
//! - Emit the tables with [`Extraction::write_tables`]
#![forbid(unsafe_code)]

pub mod document;
pub mod emit;
mod foundation;
pub mod pipeline;
pub mod route;
pub mod temples;

pub use crate::document::{Document, Layer};
pub use crate::emit::{TableLengths, Tables};
pub use crate::foundation::core::{Coord, GRID_SIZE, Rgba, TEMPLE_MARKER};
pub use crate::foundation::error::{RouteError, RouteResult};
pub use crate::pipeline::{Extraction, extract};
pub use crate::route::{DayReport, DayRoutes, Route};

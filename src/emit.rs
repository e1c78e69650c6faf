//! Rendering of the extracted tables as Rust `static` array literals.

use std::io::Write;

use crate::foundation::core::Coord;
use crate::foundation::error::{RouteError, RouteResult};

/// Coordinates per line in wrapped tables.
pub const COORDS_PER_LINE: usize = 8;

/// Declared lengths of the emitted arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableLengths {
    pub route: usize,
    /// Day boundaries including the leading `0`; also the length of `N_TEMPLES`.
    pub days: usize,
    pub temples: usize,
}

impl Default for TableLengths {
    /// Lengths of the Shikoku walk the tables were first drawn for.
    fn default() -> Self {
        Self {
            route: 292,
            days: 52,
            temples: 88,
        }
    }
}

/// Borrowed view of everything that gets emitted.
#[derive(Clone, Copy, Debug)]
pub struct Tables<'a> {
    pub route: &'a [Coord],
    pub day_index: &'a [usize],
    pub temples: &'a [Coord],
    pub temple_arrivals: &'a [usize],
}

impl Tables<'_> {
    /// Lengths as extracted.
    pub fn actual_lengths(&self) -> TableLengths {
        TableLengths {
            route: self.route.len(),
            days: self.day_index.len(),
            temples: self.temples.len(),
        }
    }

    /// Fail with the first table whose extracted length differs from `declared`.
    pub fn check_lengths(&self, declared: TableLengths) -> RouteResult<()> {
        let actual = self.actual_lengths();
        let pairs = [
            ("ROUTE", declared.route, actual.route),
            ("DAYS", declared.days, actual.days),
            ("TEMPLES", declared.temples, actual.temples),
        ];
        for (table, declared, actual) in pairs {
            if declared != actual {
                return Err(RouteError::LengthMismatch {
                    table,
                    declared,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Write `ROUTE`, `DAYS`, `TEMPLES` and `N_TEMPLES` declared with `lengths`.
    ///
    /// Nothing is written unless every value fits its element type.
    pub fn write<W: Write>(&self, out: &mut W, lengths: TableLengths) -> RouteResult<()> {
        let days = narrow::<u16>("DAYS", self.day_index)?;
        let arrivals = narrow::<u8>("N_TEMPLES", self.temple_arrivals)?;

        write_coords(out, "ROUTE", lengths.route, self.route)?;
        write_scalars(out, "DAYS", "u16", lengths.days, &days)?;
        write_coords(out, "TEMPLES", lengths.temples, self.temples)?;
        write_scalars(out, "N_TEMPLES", "u8", lengths.days, &arrivals)?;
        Ok(())
    }
}

fn narrow<T: TryFrom<usize>>(table: &str, values: &[usize]) -> RouteResult<Vec<T>> {
    values
        .iter()
        .map(|&v| {
            T::try_from(v).map_err(|_| {
                RouteError::format(format!(
                    "{table} entry {v} does not fit {}",
                    std::any::type_name::<T>()
                ))
            })
        })
        .collect()
}

/// A `[(u8, u8); len]` table, `COORDS_PER_LINE` tuples per comma-terminated line.
pub fn write_coords<W: Write>(
    out: &mut W,
    name: &str,
    len: usize,
    coords: &[Coord],
) -> RouteResult<()> {
    writeln!(out, "pub static {name}: [(u8, u8); {len}] = [")?;
    for line in coords.chunks(COORDS_PER_LINE) {
        let joined = line
            .iter()
            .map(Coord::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "    {joined},")?;
    }
    writeln!(out, "];")?;
    Ok(())
}

/// A single-line `[ty; len]` table.
pub fn write_scalars<W: Write, T: std::fmt::Display>(
    out: &mut W,
    name: &str,
    ty: &str,
    len: usize,
    values: &[T],
) -> RouteResult<()> {
    writeln!(out, "pub static {name}: [{ty}; {len}] = [")?;
    if !values.is_empty() {
        let joined = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "    {joined}")?;
    }
    writeln!(out, "];")?;
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/emit.rs"]
mod tests;

//! Layered source documents.
//!
//! A [`Document`] is an ordered stack of named [`Layer`]s, each holding an RGBA pixel grid. The
//! only on-disk container understood here is GIMP's XCF (see [`xcf`]); callers with their own
//! decoder can assemble a document with [`Document::from_layers`].

use std::path::{Path, PathBuf};

use anyhow::Context;
use image::RgbaImage;

use crate::foundation::core::{Coord, Rgba, TRANSPARENT};
use crate::foundation::error::{RouteError, RouteResult};

pub mod xcf;

/// File extension accepted by [`Document::load`].
pub const DOCUMENT_EXTENSION: &str = "xcf";

/// One named pixel grid of a document.
#[derive(Clone, Debug)]
pub struct Layer {
    /// Layer name as stored in the document.
    pub name: String,
    /// Position of the layer's top-left corner on the canvas.
    pub offset: (i32, i32),
    /// Straight-alpha pixels in layer-local coordinates.
    pub image: RgbaImage,
}

impl Layer {
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            name: name.into(),
            offset: (0, 0),
            image,
        }
    }

    /// Pixel at a layer-local cell, or fully transparent outside the layer's extent.
    pub fn pixel(&self, at: Coord) -> Rgba<u8> {
        let (x, y) = (u32::from(at.x), u32::from(at.y));
        if x < self.image.width() && y < self.image.height() {
            *self.image.get_pixel(x, y)
        } else {
            TRANSPARENT
        }
    }
}

/// An ordered stack of layers, top of the stack first.
#[derive(Clone, Debug, Default)]
pub struct Document {
    pub width: u32,
    pub height: u32,
    pub layers: Vec<Layer>,
}

impl Document {
    /// Build a document directly from decoded layers.
    ///
    /// The canvas size is the extent of the largest layer.
    pub fn from_layers(layers: Vec<Layer>) -> Self {
        let width = layers.iter().map(|l| l.image.width()).max().unwrap_or(0);
        let height = layers.iter().map(|l| l.image.height()).max().unwrap_or(0);
        Self {
            width,
            height,
            layers,
        }
    }

    /// Parse an in-memory XCF document.
    pub fn from_bytes(bytes: &[u8]) -> RouteResult<Self> {
        xcf::parse(bytes)
    }

    /// Read and parse an XCF document from disk.
    ///
    /// Paths that do not carry the `.xcf` extension are rejected as a usage error before any I/O.
    #[tracing::instrument]
    pub fn load(path: &Path) -> RouteResult<Self> {
        if !has_document_extension(path) {
            return Err(RouteError::usage(format!(
                "'{}' is not a .{DOCUMENT_EXTENSION} document",
                path.display()
            )));
        }
        let bytes = std::fs::read(path)
            .with_context(|| format!("read document '{}'", path.display()))?;
        let doc = Self::from_bytes(&bytes)?;
        tracing::debug!(
            width = doc.width,
            height = doc.height,
            layers = doc.layers.len(),
            "loaded document"
        );
        Ok(doc)
    }

    /// Iterate over every layer carrying exactly `name`.
    pub fn layers_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Layer> + 'a {
        self.layers.iter().filter(move |l| l.name == name)
    }

    /// Write every layer to `dir` as `<index>-<name>.png`, returning the written paths.
    pub fn dump_layers(&self, dir: &Path) -> RouteResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create layer dump dir '{}'", dir.display()))?;

        let mut written = Vec::with_capacity(self.layers.len());
        for (idx, layer) in self.layers.iter().enumerate() {
            let path = dir.join(format!("{idx:03}-{}.png", sanitize_file_stem(&layer.name)));
            layer
                .image
                .save_with_format(&path, image::ImageFormat::Png)
                .with_context(|| format!("write layer png '{}'", path.display()))?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Case-sensitive check for the `.xcf` suffix on the final path component.
pub fn has_document_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == DOCUMENT_EXTENSION)
}

fn sanitize_file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "layer".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
#[path = "../tests/unit/document.rs"]
mod tests;

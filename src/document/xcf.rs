//! Reader for GIMP's native XCF container.
//!
//! Only what the route tables need is decoded: 8-bit integer documents, uncompressed, RLE or
//! zlib tiles, and the first (full resolution) level of every layer. Channels, masks, paths and
//! parasites are skipped.

use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;
use image::RgbaImage;

use crate::document::{Document, Layer};
use crate::foundation::error::{RouteError, RouteResult};

const MAGIC: &[u8; 9] = b"gimp xcf ";

/// Edge length of the square tiles pixel data is stored in.
pub const TILE_SIZE: u32 = 64;

/// Largest layer (in pixels) accepted before allocating its buffer.
const MAX_LAYER_PIXELS: u64 = 1 << 26;

/// First version storing 64-bit file pointers.
const WIDE_POINTER_VERSION: u32 = 11;

mod prop {
    pub const END: u32 = 0;
    pub const COLORMAP: u32 = 1;
    pub const OFFSETS: u32 = 15;
    pub const COMPRESSION: u32 = 17;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    None,
    Rle,
    Zlib,
}

impl Compression {
    fn from_code(code: u8) -> RouteResult<Self> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Rle),
            2 => Ok(Self::Zlib),
            3 => Err(RouteError::format("fractal-compressed tiles are not supported")),
            other => Err(RouteError::format(format!("unknown compression code {other}"))),
        }
    }
}

/// Pixel layout of a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    Rgb,
    Rgba,
    Gray,
    GrayA,
    Indexed,
    IndexedA,
}

impl LayerKind {
    fn from_code(code: u32) -> RouteResult<Self> {
        Ok(match code {
            0 => Self::Rgb,
            1 => Self::Rgba,
            2 => Self::Gray,
            3 => Self::GrayA,
            4 => Self::Indexed,
            5 => Self::IndexedA,
            other => return Err(RouteError::format(format!("unknown layer type {other}"))),
        })
    }

    /// Bytes per pixel at 8-bit precision.
    pub fn bpp(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
            Self::Gray | Self::Indexed => 1,
            Self::GrayA | Self::IndexedA => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// `0` for the legacy `file` tag, otherwise the number after `v`.
    pub version: u32,
    pub width: u32,
    pub height: u32,
    pub base_type: u32,
    pub precision: Option<u32>,
}

/// Image-wide settings every layer decode depends on.
struct DecodeCtx<'a> {
    compression: Compression,
    colormap: Option<&'a [[u8; 3]]>,
}

/// Parse a complete XCF buffer into a [`Document`].
pub fn parse(bytes: &[u8]) -> RouteResult<Document> {
    let mut r = Reader::new(bytes);
    let header = r.header()?;
    tracing::debug!(
        version = header.version,
        width = header.width,
        height = header.height,
        base_type = header.base_type,
        "xcf header"
    );

    let mut compression = Compression::None;
    let mut colormap = None;
    for (id, payload) in r.properties()? {
        match id {
            prop::COMPRESSION => {
                let code = *payload
                    .first()
                    .ok_or_else(|| RouteError::format("empty compression property"))?;
                compression = Compression::from_code(code)?;
            }
            prop::COLORMAP => colormap = Some(parse_colormap(payload)?),
            _ => {}
        }
    }

    let layer_ptrs = r.pointer_list()?;
    let ctx = DecodeCtx {
        compression,
        colormap: colormap.as_deref(),
    };

    let layers = layer_ptrs
        .into_iter()
        .map(|ptr| r.layer(ptr, &ctx))
        .collect::<RouteResult<Vec<_>>>()?;

    Ok(Document {
        width: header.width,
        height: header.height,
        layers,
    })
}

/// Parse only the fixed header at the start of `bytes`.
pub fn parse_header(bytes: &[u8]) -> RouteResult<Header> {
    Reader::new(bytes).header()
}

fn parse_colormap(payload: &[u8]) -> RouteResult<Vec<[u8; 3]>> {
    let mut cur = payload;
    let n = cur
        .read_u32::<BigEndian>()
        .map_err(|_| RouteError::format("truncated colormap property"))? as usize;
    if cur.len() < n * 3 {
        return Err(RouteError::format(format!(
            "colormap declares {n} colors but carries {} bytes",
            cur.len()
        )));
    }
    Ok(cur[..n * 3]
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect())
}

struct Reader<'a> {
    cur: Cursor<&'a [u8]>,
    version: u32,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            cur: Cursor::new(bytes),
            version: 0,
        }
    }

    fn truncated(&self, what: &str) -> RouteError {
        RouteError::format(format!(
            "unexpected end of file reading {what} at offset {}",
            self.cur.position()
        ))
    }

    fn u8(&mut self, what: &str) -> RouteResult<u8> {
        self.cur.read_u8().map_err(|_| self.truncated(what))
    }

    fn u16(&mut self, what: &str) -> RouteResult<u16> {
        self.cur
            .read_u16::<BigEndian>()
            .map_err(|_| self.truncated(what))
    }

    fn u32(&mut self, what: &str) -> RouteResult<u32> {
        self.cur
            .read_u32::<BigEndian>()
            .map_err(|_| self.truncated(what))
    }

    fn pointer(&mut self) -> RouteResult<u64> {
        if self.version >= WIDE_POINTER_VERSION {
            self.cur
                .read_u64::<BigEndian>()
                .map_err(|_| self.truncated("pointer"))
        } else {
            self.u32("pointer").map(u64::from)
        }
    }

    fn bytes(&mut self, n: usize, what: &str) -> RouteResult<&'a [u8]> {
        let data: &'a [u8] = *self.cur.get_ref();
        let start = self.cur.position() as usize;
        let end = start
            .checked_add(n)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| self.truncated(what))?;
        self.cur.set_position(end as u64);
        Ok(&data[start..end])
    }

    fn seek(&mut self, ptr: u64) -> RouteResult<()> {
        if ptr >= self.cur.get_ref().len() as u64 {
            return Err(RouteError::format(format!(
                "pointer {ptr} lies beyond the end of the file"
            )));
        }
        self.cur.set_position(ptr);
        Ok(())
    }

    fn header(&mut self) -> RouteResult<Header> {
        let magic = self.bytes(MAGIC.len(), "magic")?;
        if magic != &MAGIC[..] {
            return Err(RouteError::format("missing 'gimp xcf' signature"));
        }
        let tag = self.bytes(4, "version tag")?;
        let version = match tag {
            b"file" => 0,
            [b'v', digits @ ..] => std::str::from_utf8(digits)
                .ok()
                .and_then(|s| s.parse::<u32>().ok())
                .ok_or_else(|| RouteError::format("malformed version tag"))?,
            _ => return Err(RouteError::format("malformed version tag")),
        };
        if self.u8("version terminator")? != 0 {
            return Err(RouteError::format("version tag is not NUL-terminated"));
        }
        self.version = version;

        let width = self.u32("canvas width")?;
        let height = self.u32("canvas height")?;
        let base_type = self.u32("base type")?;
        let precision = if version >= 4 {
            Some(self.u32("precision")?)
        } else {
            None
        };
        match (version, precision) {
            (_, None) | (4, Some(0)) => {}
            (v, Some(100 | 150 | 175)) if v >= 5 => {}
            (_, Some(p)) => {
                return Err(RouteError::format(format!(
                    "precision {p} is not supported, only 8-bit integer documents are"
                )));
            }
        }

        Ok(Header {
            version,
            width,
            height,
            base_type,
            precision,
        })
    }

    fn properties(&mut self) -> RouteResult<Vec<(u32, &'a [u8])>> {
        let mut props = Vec::new();
        loop {
            let id = self.u32("property id")?;
            let len = self.u32("property length")? as usize;
            if id == prop::END {
                return Ok(props);
            }
            let payload = self.bytes(len, "property payload")?;
            props.push((id, payload));
        }
    }

    fn pointer_list(&mut self) -> RouteResult<Vec<u64>> {
        let mut ptrs = Vec::new();
        loop {
            match self.pointer()? {
                0 => return Ok(ptrs),
                ptr => ptrs.push(ptr),
            }
        }
    }

    fn string(&mut self, what: &str) -> RouteResult<String> {
        let len = self.u32(what)? as usize;
        if len == 0 {
            return Ok(String::new());
        }
        let raw = self.bytes(len, what)?;
        let raw = raw.strip_suffix(&[0]).unwrap_or(raw);
        Ok(String::from_utf8_lossy(raw).into_owned())
    }

    fn layer(&mut self, ptr: u64, ctx: &DecodeCtx<'_>) -> RouteResult<Layer> {
        self.seek(ptr)?;
        let width = self.u32("layer width")?;
        let height = self.u32("layer height")?;
        let kind = LayerKind::from_code(self.u32("layer type")?)?;
        let name = self.string("layer name")?;

        let mut offset = (0, 0);
        for (id, payload) in self.properties()? {
            if id == prop::OFFSETS {
                let mut cur = payload;
                let x = cur.read_i32::<BigEndian>();
                let y = cur.read_i32::<BigEndian>();
                match (x, y) {
                    (Ok(x), Ok(y)) => offset = (x, y),
                    _ => return Err(RouteError::format(format!("layer '{name}' has short offsets"))),
                }
            }
        }

        let hierarchy = self.pointer()?;
        let _mask = self.pointer()?;

        tracing::debug!(name = %name, width, height, ?kind, ?offset, "decoding layer");

        let raw = self
            .hierarchy(hierarchy, width, height, kind, ctx)
            .map_err(|e| match e {
                RouteError::Format(msg) => RouteError::format(format!("layer '{name}': {msg}")),
                other => other,
            })?;
        let image = to_rgba(width, height, kind, &raw, ctx.colormap)?;

        Ok(Layer {
            name,
            offset,
            image,
        })
    }

    /// Decode the first level of a hierarchy into an interleaved `width * height * bpp` buffer.
    fn hierarchy(
        &mut self,
        ptr: u64,
        width: u32,
        height: u32,
        kind: LayerKind,
        ctx: &DecodeCtx<'_>,
    ) -> RouteResult<Vec<u8>> {
        if u64::from(width) * u64::from(height) > MAX_LAYER_PIXELS {
            return Err(RouteError::format(format!("{width}x{height} is too large")));
        }

        self.seek(ptr)?;
        let h_width = self.u32("hierarchy width")?;
        let h_height = self.u32("hierarchy height")?;
        let bpp = self.u32("hierarchy bpp")? as usize;
        if (h_width, h_height) != (width, height) {
            return Err(RouteError::format(format!(
                "hierarchy is {h_width}x{h_height}, layer is {width}x{height}"
            )));
        }
        if bpp != kind.bpp() {
            return Err(RouteError::format(format!(
                "{bpp} bytes per pixel do not match {kind:?}"
            )));
        }
        let level = self.pointer()?;

        self.seek(level)?;
        let l_width = self.u32("level width")?;
        let l_height = self.u32("level height")?;
        if (l_width, l_height) != (width, height) {
            return Err(RouteError::format(format!(
                "level is {l_width}x{l_height}, layer is {width}x{height}"
            )));
        }
        let tiles = self.pointer_list()?;

        let cols = width.div_ceil(TILE_SIZE);
        let rows = height.div_ceil(TILE_SIZE);
        let expected = (cols * rows) as usize;
        if tiles.len() < expected {
            return Err(RouteError::format(format!(
                "expected {expected} tiles, found {}",
                tiles.len()
            )));
        }

        let stride = width as usize * bpp;
        let mut raw = vec![0u8; stride * height as usize];
        for (idx, &tile_ptr) in tiles.iter().take(expected).enumerate() {
            let tx = idx as u32 % cols;
            let ty = idx as u32 / cols;
            let tw = (width - tx * TILE_SIZE).min(TILE_SIZE) as usize;
            let th = (height - ty * TILE_SIZE).min(TILE_SIZE) as usize;

            self.seek(tile_ptr)?;
            let tile = match ctx.compression {
                Compression::None => self.bytes(tw * th * bpp, "tile")?.to_vec(),
                Compression::Rle => self.rle_tile(tw * th, bpp)?,
                Compression::Zlib => self.zlib_tile(tw * th * bpp)?,
            };

            let x0 = (tx * TILE_SIZE) as usize * bpp;
            for row in 0..th {
                let dst = (ty as usize * TILE_SIZE as usize + row) * stride + x0;
                let src = row * tw * bpp;
                raw[dst..dst + tw * bpp].copy_from_slice(&tile[src..src + tw * bpp]);
            }
        }
        Ok(raw)
    }

    /// Decode one RLE tile. Channels are stored planar and interleaved on output.
    fn rle_tile(&mut self, pixels: usize, bpp: usize) -> RouteResult<Vec<u8>> {
        let mut out = vec![0u8; pixels * bpp];
        for channel in 0..bpp {
            let mut idx = 0;
            while idx < pixels {
                let op = self.u8("rle opcode")?;
                if op >= 128 {
                    let mut len = 256 - usize::from(op);
                    if len == 128 {
                        len = usize::from(self.u16("rle length")?);
                    }
                    if idx + len > pixels {
                        return Err(RouteError::format("rle literal overruns tile"));
                    }
                    for &v in self.bytes(len, "rle literal")? {
                        out[idx * bpp + channel] = v;
                        idx += 1;
                    }
                } else {
                    let mut len = usize::from(op) + 1;
                    if len == 128 {
                        len = usize::from(self.u16("rle length")?);
                    }
                    if idx + len > pixels {
                        return Err(RouteError::format("rle run overruns tile"));
                    }
                    let v = self.u8("rle value")?;
                    for _ in 0..len {
                        out[idx * bpp + channel] = v;
                        idx += 1;
                    }
                }
            }
        }
        Ok(out)
    }

    /// Inflate one zlib tile. The stream holds interleaved pixels, unlike RLE.
    fn zlib_tile(&mut self, len: usize) -> RouteResult<Vec<u8>> {
        let data: &'a [u8] = *self.cur.get_ref();
        let start = self.cur.position() as usize;
        let mut out = vec![0u8; len];
        ZlibDecoder::new(&data[start..])
            .read_exact(&mut out)
            .map_err(|e| RouteError::format(format!("zlib tile at offset {start}: {e}")))?;
        Ok(out)
    }
}

/// Expand an interleaved buffer of any [`LayerKind`] into straight RGBA.
fn to_rgba(
    width: u32,
    height: u32,
    kind: LayerKind,
    raw: &[u8],
    colormap: Option<&[[u8; 3]]>,
) -> RouteResult<RgbaImage> {
    let lookup = |i: u8| -> RouteResult<[u8; 3]> {
        let map = colormap.ok_or_else(|| RouteError::format("indexed layer without colormap"))?;
        map.get(usize::from(i)).copied().ok_or_else(|| {
            RouteError::format(format!("color index {i} outside {}-entry colormap", map.len()))
        })
    };

    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    for px in raw.chunks_exact(kind.bpp()) {
        let out = match kind {
            LayerKind::Rgb => [px[0], px[1], px[2], 255],
            LayerKind::Rgba => [px[0], px[1], px[2], px[3]],
            LayerKind::Gray => [px[0], px[0], px[0], 255],
            LayerKind::GrayA => [px[0], px[0], px[0], px[1]],
            LayerKind::Indexed => {
                let [r, g, b] = lookup(px[0])?;
                [r, g, b, 255]
            }
            LayerKind::IndexedA => {
                let [r, g, b] = lookup(px[0])?;
                [r, g, b, px[1]]
            }
        };
        rgba.extend_from_slice(&out);
    }

    RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| RouteError::format("decoded pixel buffer has the wrong size"))
}

#[cfg(test)]
#[path = "../../tests/unit/document/xcf.rs"]
mod tests;

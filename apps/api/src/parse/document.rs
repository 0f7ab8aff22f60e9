//! Paged document access — page text and embedded raster images.
//!
//! `PagedDocument` keeps the extractor independent of the PDF library;
//! `PdfDocument` is the lopdf/pdf-extract implementation used in production.

use std::fmt;
use std::panic::{self, UnwindSafe};
use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use lopdf::{Dictionary, Object, ObjectId, Stream};
use tracing::{debug, warn};

use crate::ocr::OcrError;
use crate::parse::ParseError;

/// Guards against cyclic `Parent` chains in malformed page trees.
const MAX_PAGE_TREE_DEPTH: usize = 32;

// ────────────────────────────────────────────────────────────────────────────
// Page images
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Rgb,
    Rgba,
}

impl ColorMode {
    pub fn channels(self) -> usize {
        match self {
            ColorMode::Rgb => 3,
            ColorMode::Rgba => 4,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::Rgb => f.write_str("RGB"),
            ColorMode::Rgba => f.write_str("RGBA"),
        }
    }
}

/// A raw, interleaved 8-bit pixel buffer lifted out of a page.
///
/// Owned and short-lived: the extractor consumes it for OCR and it is freed
/// before the next image on the page is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    pub width: u32,
    pub height: u32,
    pub mode: ColorMode,
    pub samples: Vec<u8>,
}

impl PageImage {
    /// Interprets the samples using the declared width, height and mode.
    pub fn into_dynamic(self) -> Result<DynamicImage, OcrError> {
        let PageImage {
            width,
            height,
            mode,
            samples,
        } = self;
        let image = match mode {
            ColorMode::Rgb => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
            ColorMode::Rgba => {
                RgbaImage::from_raw(width, height, samples).map(DynamicImage::ImageRgba8)
            }
        };
        image.ok_or_else(|| {
            OcrError::Decode(format!(
                "pixel buffer does not fill a {width}x{height} {mode} image"
            ))
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait
// ────────────────────────────────────────────────────────────────────────────

/// Read-only view of a paged document. Pages are numbered from 1 and images
/// within a page from 1, both in document order.
pub trait PagedDocument {
    fn page_count(&self) -> u32;

    /// Selectable text of a page; empty when the page has none.
    fn page_text(&self, page: u32) -> String;

    fn image_count(&self, page: u32) -> usize;

    /// Decodes one image. Loading images one at a time keeps at most a single
    /// pixel buffer alive per call.
    fn load_image(&self, page: u32, index: usize) -> Result<PageImage, OcrError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PDF implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct PdfDocument {
    doc: lopdf::Document,
    pages: Vec<ObjectId>,
    texts: Vec<String>,
}

impl PdfDocument {
    pub fn open(path: &Path) -> Result<Self, ParseError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let doc = lopdf::Document::load_mem(bytes)?;
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

        let texts = page_texts(&doc, pages.len(), || {
            pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| e.to_string())
        });

        debug!(pages = pages.len(), "PDF opened");
        Ok(Self { doc, pages, texts })
    }

    fn page_id(&self, page: u32) -> Option<ObjectId> {
        let index = usize::try_from(page).ok()?.checked_sub(1)?;
        self.pages.get(index).copied()
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        self.resolve(obj).and_then(|o| o.as_dict().ok())
    }

    /// Page resources, inherited from the nearest ancestor that declares them.
    fn page_resources(&self, page_id: ObjectId) -> Option<&Dictionary> {
        let mut node = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_PAGE_TREE_DEPTH {
            if let Ok(resources) = node.get(b"Resources") {
                return self.resolve_dict(resources);
            }
            let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
            node = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    /// Image XObjects referenced by a page, in resource dictionary order.
    fn image_ids(&self, page: u32) -> Vec<ObjectId> {
        let xobjects = self
            .page_id(page)
            .and_then(|id| self.page_resources(id))
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|obj| self.resolve_dict(obj));

        let Some(xobjects) = xobjects else {
            return Vec::new();
        };

        xobjects
            .iter()
            .filter_map(|(_, obj)| obj.as_reference().ok())
            .filter(|id| self.image_stream(*id).is_some())
            .collect()
    }

    fn image_stream(&self, id: ObjectId) -> Option<&Stream> {
        let stream = self.doc.get_object(id).ok()?.as_stream().ok()?;
        let subtype = stream.dict.get(b"Subtype").and_then(Object::as_name).ok()?;
        (subtype == b"Image").then_some(stream)
    }

    fn decode_image(&self, stream: &Stream) -> Result<PageImage, OcrError> {
        let dict = &stream.dict;
        let width = dimension(dict, b"Width")?;
        let height = dimension(dict, b"Height")?;
        let pixels = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| OcrError::Decode(format!("image too large: {width}x{height}")))?;

        let filters = stream_filters(dict);
        let rgb = if filters.last().map(Vec::as_slice) == Some(b"DCTDecode".as_slice()) {
            if filters.len() > 1 {
                return Err(OcrError::Decode(
                    "chained filters before DCTDecode are not supported".to_string(),
                ));
            }
            image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)?
                .to_rgb8()
                .into_raw()
        } else {
            let space = self.color_space(dict)?;
            let samples = self.samples(stream, &filters, width, height, &space)?;
            samples_to_rgb(&samples, &space, pixels)?
        };

        match self.soft_mask(dict, width, height, pixels) {
            Some(alpha) => {
                let mut samples = Vec::with_capacity(pixels * ColorMode::Rgba.channels());
                for (pixel, a) in rgb.chunks_exact(3).zip(alpha) {
                    samples.extend_from_slice(pixel);
                    samples.push(a);
                }
                Ok(PageImage {
                    width,
                    height,
                    mode: ColorMode::Rgba,
                    samples,
                })
            }
            None => Ok(PageImage {
                width,
                height,
                mode: ColorMode::Rgb,
                samples: rgb,
            }),
        }
    }

    /// One byte per sample for a non-JPEG image stream: colour values scaled
    /// to 0..=255 with `/Decode` inversion applied, palette indices as-is.
    fn samples(
        &self,
        stream: &Stream,
        filters: &[Vec<u8>],
        width: u32,
        height: u32,
        space: &ColorSpace,
    ) -> Result<Vec<u8>, OcrError> {
        let dict = &stream.dict;
        let bits = bits_per_component(dict)?;
        let packed = self.packed_samples(stream, filters, width, height)?;

        let indexed = matches!(space, ColorSpace::Indexed { .. });
        let per_row = width as usize * space.components();
        let mut samples = unpack_samples(&packed, bits, per_row, height as usize, !indexed)?;
        if !indexed && decode_inverted(dict) {
            for sample in &mut samples {
                *sample = 255 - *sample;
            }
        }
        Ok(samples)
    }

    /// Decompressed sample rows, still packed at `/BitsPerComponent`.
    fn packed_samples(
        &self,
        stream: &Stream,
        filters: &[Vec<u8>],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, OcrError> {
        if let [only] = filters {
            if only.as_slice() == b"CCITTFaxDecode" {
                let params = CcittParams::from_dict(self.decode_params(&stream.dict), width);
                return decode_ccitt(&stream.content, &params, height);
            }
        }

        if let Some(unsupported) = filters
            .iter()
            .find(|f| !matches!(f.as_slice(), b"FlateDecode" | b"LZWDecode"))
        {
            return Err(OcrError::Decode(format!(
                "unsupported image filter {}",
                String::from_utf8_lossy(unsupported)
            )));
        }

        if filters.is_empty() {
            Ok(stream.content.clone())
        } else {
            stream
                .decompressed_content()
                .map_err(|e| OcrError::Decode(e.to_string()))
        }
    }

    /// `/DecodeParms` as a dictionary; the first entry when given as an array.
    fn decode_params<'a>(&'a self, dict: &'a Dictionary) -> Option<&'a Dictionary> {
        match self.resolve(dict.get(b"DecodeParms").ok()?)? {
            Object::Dictionary(params) => Some(params),
            Object::Array(items) => items.first().and_then(|o| self.resolve_dict(o)),
            _ => None,
        }
    }

    fn color_space(&self, dict: &Dictionary) -> Result<ColorSpace, OcrError> {
        if is_image_mask(dict) {
            return Ok(ColorSpace::Gray);
        }
        let obj = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| self.resolve(o))
            .ok_or_else(|| OcrError::Decode("image has no color space".to_string()))?;
        self.parse_color_space(obj)
    }

    fn parse_color_space(&self, obj: &Object) -> Result<ColorSpace, OcrError> {
        match obj {
            Object::Name(name) => device_space(name),
            Object::Array(items) => {
                let family = items
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .ok_or_else(|| OcrError::Decode("malformed color space array".to_string()))?;
                match family {
                    b"ICCBased" => {
                        let n = items
                            .get(1)
                            .and_then(|o| self.resolve(o))
                            .and_then(|o| o.as_stream().ok())
                            .and_then(|s| s.dict.get(b"N").and_then(Object::as_i64).ok())
                            .unwrap_or(3);
                        match n {
                            1 => Ok(ColorSpace::Gray),
                            3 => Ok(ColorSpace::Rgb),
                            4 => Ok(ColorSpace::Cmyk),
                            other => Err(OcrError::Decode(format!(
                                "unsupported ICC component count: {other}"
                            ))),
                        }
                    }
                    b"Indexed" | b"I" => self.indexed_space(items),
                    b"CalGray" => Ok(ColorSpace::Gray),
                    b"CalRGB" => Ok(ColorSpace::Rgb),
                    other => device_space(other),
                }
            }
            _ => Err(OcrError::Decode("malformed color space".to_string())),
        }
    }

    /// `[/Indexed base hival lookup]`
    fn indexed_space(&self, items: &[Object]) -> Result<ColorSpace, OcrError> {
        let base = items
            .get(1)
            .and_then(|o| self.resolve(o))
            .ok_or_else(|| OcrError::Decode("indexed color space without base".to_string()))
            .and_then(|o| self.parse_color_space(o))?;
        if matches!(base, ColorSpace::Indexed { .. }) {
            return Err(OcrError::Decode("nested indexed color space".to_string()));
        }

        let palette = match items.get(3).and_then(|o| self.resolve(o)) {
            Some(Object::String(bytes, _)) => bytes.clone(),
            Some(Object::Stream(stream)) => {
                if stream.dict.has(b"Filter") {
                    stream
                        .decompressed_content()
                        .map_err(|e| OcrError::Decode(e.to_string()))?
                } else {
                    stream.content.clone()
                }
            }
            _ => {
                return Err(OcrError::Decode(
                    "indexed color space without lookup table".to_string(),
                ))
            }
        };

        Ok(ColorSpace::Indexed {
            base: Box::new(base),
            palette,
        })
    }

    /// Alpha channel from an `/SMask`, when one exists and matches the image.
    fn soft_mask(&self, dict: &Dictionary, width: u32, height: u32, pixels: usize) -> Option<Vec<u8>> {
        let mask_id = dict.get(b"SMask").and_then(Object::as_reference).ok()?;
        let mask = self.image_stream(mask_id)?;

        let (mask_width, mask_height) = (
            dimension(&mask.dict, b"Width").ok()?,
            dimension(&mask.dict, b"Height").ok()?,
        );
        if (mask_width, mask_height) != (width, height) {
            debug!(width, height, mask_width, mask_height, "soft mask size differs, ignoring");
            return None;
        }

        let samples = self
            .samples(mask, &stream_filters(&mask.dict), width, height, &ColorSpace::Gray)
            .ok()?;
        (samples.len() >= pixels).then(|| samples[..pixels].to_vec())
    }
}

impl PagedDocument for PdfDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&self, page: u32) -> String {
        usize::try_from(page)
            .ok()
            .and_then(|p| p.checked_sub(1))
            .and_then(|i| self.texts.get(i))
            .cloned()
            .unwrap_or_default()
    }

    fn image_count(&self, page: u32) -> usize {
        self.image_ids(page).len()
    }

    fn load_image(&self, page: u32, index: usize) -> Result<PageImage, OcrError> {
        let id = index
            .checked_sub(1)
            .and_then(|i| self.image_ids(page).get(i).copied())
            .ok_or_else(|| OcrError::Decode(format!("page {page} has no image {index}")))?;
        let stream = self
            .image_stream(id)
            .ok_or_else(|| OcrError::Decode(format!("object {} {} is not an image", id.0, id.1)))?;
        self.decode_image(stream)
    }
}

/// Per-page text from `primary`, or from lopdf when `primary` fails, panics
/// or disagrees with the page count.
fn page_texts<F>(doc: &lopdf::Document, page_count: usize, primary: F) -> Vec<String>
where
    F: FnOnce() -> Result<Vec<String>, String> + UnwindSafe,
{
    match panic::catch_unwind(primary) {
        Ok(Ok(texts)) if texts.len() == page_count => texts,
        Ok(Ok(texts)) => {
            warn!(
                extracted = texts.len(),
                pages = page_count,
                "pdf-extract page count mismatch, using lopdf text extraction"
            );
            lopdf_page_texts(doc)
        }
        Ok(Err(e)) => {
            warn!(error = %e, "pdf-extract failed, using lopdf text extraction");
            lopdf_page_texts(doc)
        }
        Err(_) => {
            warn!("pdf-extract panicked, using lopdf text extraction");
            lopdf_page_texts(doc)
        }
    }
}

fn lopdf_page_texts(doc: &lopdf::Document) -> Vec<String> {
    doc.get_pages()
        .keys()
        .map(|&number| {
            doc.extract_text(&[number]).unwrap_or_else(|e| {
                warn!(page = number, error = %e, "page text extraction failed");
                String::new()
            })
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Sample conversion
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
    Indexed { base: Box<ColorSpace>, palette: Vec<u8> },
}

impl ColorSpace {
    fn components(&self) -> usize {
        match self {
            ColorSpace::Gray | ColorSpace::Indexed { .. } => 1,
            ColorSpace::Rgb => 3,
            ColorSpace::Cmyk => 4,
        }
    }
}

fn device_space(name: &[u8]) -> Result<ColorSpace, OcrError> {
    match name {
        b"DeviceGray" | b"G" => Ok(ColorSpace::Gray),
        b"DeviceRGB" | b"RGB" => Ok(ColorSpace::Rgb),
        b"DeviceCMYK" | b"CMYK" => Ok(ColorSpace::Cmyk),
        other => Err(OcrError::Decode(format!(
            "unsupported color space {}",
            String::from_utf8_lossy(other)
        ))),
    }
}

fn dimension(dict: &Dictionary, key: &[u8]) -> Result<u32, OcrError> {
    dict.get(key)
        .and_then(Object::as_i64)
        .ok()
        .and_then(|v| u32::try_from(v).ok())
        .filter(|v| *v > 0)
        .ok_or_else(|| {
            OcrError::Decode(format!(
                "image has no valid {}",
                String::from_utf8_lossy(key)
            ))
        })
}

/// `/Filter` as a list, whether declared as a single name or an array.
fn stream_filters(dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|o| o.as_name().ok().map(<[u8]>::to_vec))
            .collect(),
        _ => Vec::new(),
    }
}

fn is_image_mask(dict: &Dictionary) -> bool {
    matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true)))
}

fn bits_per_component(dict: &Dictionary) -> Result<u8, OcrError> {
    if is_image_mask(dict) {
        return Ok(1);
    }
    match dict.get(b"BitsPerComponent").and_then(Object::as_i64) {
        Ok(bits @ (1 | 2 | 4 | 8 | 16)) => Ok(bits as u8),
        Ok(bits) => Err(OcrError::Decode(format!(
            "unsupported bits per component: {bits}"
        ))),
        Err(_) => Ok(8),
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// True when `/Decode` maps samples high-to-low, e.g. `[1 0]`.
fn decode_inverted(dict: &Dictionary) -> bool {
    let Ok(Object::Array(range)) = dict.get(b"Decode") else {
        return false;
    };
    match (range.first().and_then(number), range.get(1).and_then(number)) {
        (Some(min), Some(max)) => min > max,
        _ => false,
    }
}

/// Expands byte-aligned rows of `bits`-wide samples to one byte per sample.
/// `scale` stretches values to 0..=255; palette indices are kept raw. 16-bit
/// samples keep their high byte. A short final row is dropped, which
/// `samples_to_rgb` then reports as truncated data.
fn unpack_samples(
    data: &[u8],
    bits: u8,
    per_row: usize,
    rows: usize,
    scale: bool,
) -> Result<Vec<u8>, OcrError> {
    match bits {
        8 => return Ok(data.to_vec()),
        16 => return Ok(data.chunks_exact(2).map(|pair| pair[0]).collect()),
        1 | 2 | 4 => {}
        other => {
            return Err(OcrError::Decode(format!(
                "unsupported bits per component: {other}"
            )))
        }
    }

    let bits = usize::from(bits);
    let row_bytes = (per_row * bits).div_ceil(8);
    let max = (1u16 << bits) - 1;
    let mask = max as u8;

    let mut out = Vec::with_capacity(per_row * rows);
    for row in data.chunks_exact(row_bytes).take(rows) {
        for i in 0..per_row {
            let bit = i * bits;
            let shift = 8 - bits - bit % 8;
            let value = (row[bit / 8] >> shift) & mask;
            out.push(if scale {
                (u16::from(value) * 255 / max) as u8
            } else {
                value
            });
        }
    }
    Ok(out)
}

/// CCITT fax parameters from `/DecodeParms`, defaulting per the PDF filter.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CcittParams {
    k: i64,
    columns: u32,
    rows: Option<u32>,
    black_is_1: bool,
}

impl CcittParams {
    fn from_dict(params: Option<&Dictionary>, width: u32) -> Self {
        let int = |key: &[u8]| params.and_then(|p| p.get(key).and_then(Object::as_i64).ok());
        Self {
            k: int(b"K").unwrap_or(0),
            columns: int(b"Columns")
                .and_then(|v| u32::try_from(v).ok())
                .filter(|v| *v > 0)
                .unwrap_or(width),
            rows: int(b"Rows")
                .and_then(|v| u32::try_from(v).ok())
                .filter(|v| *v > 0),
            black_is_1: params
                .map(|p| matches!(p.get(b"BlackIs1"), Ok(Object::Boolean(true))))
                .unwrap_or(false),
        }
    }
}

/// Decodes a CCITT Group 3/4 stream into packed 1-bit rows. Black pixels are
/// 0 unless `BlackIs1`, so a DeviceGray reading gives white = 255.
fn decode_ccitt(data: &[u8], params: &CcittParams, height: u32) -> Result<Vec<u8>, OcrError> {
    let columns = u16::try_from(params.columns)
        .map_err(|_| OcrError::Decode(format!("CCITT width {} too large", params.columns)))?;
    let rows = params.rows.unwrap_or(height) as usize;
    let row_bytes = usize::from(columns).div_ceil(8);
    let white_row = vec![if params.black_is_1 { 0x00 } else { 0xFF }; row_bytes];

    let mut out = Vec::with_capacity(row_bytes * rows);
    let mut decoded = 0usize;
    let mut push_line = |transitions: &[u16]| {
        if decoded < rows {
            out.extend(transitions_to_row(transitions, columns, params.black_is_1));
            decoded += 1;
        }
    };

    let finished = if params.k < 0 {
        let height = u16::try_from(rows).ok();
        fax::decoder::decode_g4(data.iter().copied(), columns, height, &mut push_line)
    } else {
        fax::decoder::decode_g3(data.iter().copied(), &mut push_line)
    };

    if decoded == 0 {
        return Err(OcrError::Decode("CCITT stream has no decodable rows".to_string()));
    }
    if finished.is_none() {
        debug!(decoded, rows, "CCITT stream ended early, padding with white rows");
    }
    for _ in decoded..rows {
        out.extend_from_slice(&white_row);
    }
    Ok(out)
}

/// Packs one fax line into bits. `transitions` lists the columns where the
/// colour flips, starting from white.
fn transitions_to_row(transitions: &[u16], columns: u16, black_is_1: bool) -> Vec<u8> {
    let width = usize::from(columns);
    let mut row = vec![0u8; width.div_ceil(8)];
    let mut black = false;
    let mut start = 0usize;

    let mut runs = transitions
        .iter()
        .map(|t| usize::from(*t).min(width))
        .chain(std::iter::once(width));
    while start < width {
        let end = runs.next().unwrap_or(width).max(start);
        let set = black == black_is_1;
        if set {
            for x in start..end {
                row[x / 8] |= 0x80 >> (x % 8);
            }
        }
        start = end;
        black = !black;
    }
    row
}

fn samples_to_rgb(samples: &[u8], space: &ColorSpace, pixels: usize) -> Result<Vec<u8>, OcrError> {
    let needed = pixels * space.components();
    if samples.len() < needed {
        return Err(OcrError::Decode(format!(
            "truncated sample data: expected {needed} bytes, found {}",
            samples.len()
        )));
    }
    let samples = &samples[..needed];

    let mut rgb = Vec::with_capacity(pixels * 3);
    match space {
        ColorSpace::Gray => {
            for &g in samples {
                rgb.extend_from_slice(&[g, g, g]);
            }
        }
        ColorSpace::Rgb => rgb.extend_from_slice(samples),
        ColorSpace::Cmyk => {
            for px in samples.chunks_exact(4) {
                rgb.extend_from_slice(&cmyk_to_rgb(px[0], px[1], px[2], px[3]));
            }
        }
        ColorSpace::Indexed { base, palette } => {
            let width = base.components();
            for &index in samples {
                let start = index as usize * width;
                let entry = palette.get(start..start + width).ok_or_else(|| {
                    OcrError::Decode(format!("palette index {index} out of range"))
                })?;
                rgb.extend(samples_to_rgb(entry, base, 1)?);
            }
        }
    }
    Ok(rgb)
}

fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    let channel = |v: u8| ((255 - v as u16) * (255 - k as u16) / 255) as u8;
    [channel(c), channel(m), channel(y)]
}


#[cfg(test)]
mod tests {
    use super::fixtures::{build_pdf, build_pdf_with, courier, packed_image, raw_image};
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn test_into_dynamic_rgb() {
        let image = PageImage {
            width: 2,
            height: 1,
            mode: ColorMode::Rgb,
            samples: vec![255, 0, 0, 0, 255, 0],
        };
        let dynamic = image.into_dynamic().unwrap();
        assert_eq!(dynamic.width(), 2);
        assert_eq!(dynamic.height(), 1);
        assert!(matches!(dynamic, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn test_into_dynamic_rgba() {
        let image = PageImage {
            width: 1,
            height: 1,
            mode: ColorMode::Rgba,
            samples: vec![1, 2, 3, 4],
        };
        assert!(matches!(
            image.into_dynamic().unwrap(),
            DynamicImage::ImageRgba8(_)
        ));
    }

    #[test]
    fn test_into_dynamic_rejects_short_buffer() {
        let image = PageImage {
            width: 4,
            height: 4,
            mode: ColorMode::Rgb,
            samples: vec![0; 10],
        };
        let err = image.into_dynamic().unwrap_err();
        assert!(err.to_string().contains("4x4 RGB"), "{err}");
    }

    #[test]
    fn test_color_mode_channels() {
        assert_eq!(ColorMode::Rgb.channels(), 3);
        assert_eq!(ColorMode::Rgba.channels(), 4);
    }

    #[test]
    fn test_gray_expands_to_rgb() {
        let rgb = samples_to_rgb(&[10, 200], &ColorSpace::Gray, 2).unwrap();
        assert_eq!(rgb, vec![10, 10, 10, 200, 200, 200]);
    }

    #[test]
    fn test_cmyk_converts_to_rgb() {
        assert_eq!(cmyk_to_rgb(0, 0, 0, 0), [255, 255, 255]);
        assert_eq!(cmyk_to_rgb(0, 0, 0, 255), [0, 0, 0]);
        assert_eq!(cmyk_to_rgb(255, 0, 0, 0), [0, 255, 255]);
    }

    #[test]
    fn test_indexed_looks_up_palette() {
        let space = ColorSpace::Indexed {
            base: Box::new(ColorSpace::Rgb),
            palette: vec![0, 0, 0, 255, 128, 0],
        };
        let rgb = samples_to_rgb(&[1, 0], &space, 2).unwrap();
        assert_eq!(rgb, vec![255, 128, 0, 0, 0, 0]);
    }

    #[test]
    fn test_indexed_out_of_range_is_error() {
        let space = ColorSpace::Indexed {
            base: Box::new(ColorSpace::Gray),
            palette: vec![0, 255],
        };
        assert!(samples_to_rgb(&[7], &space, 1).is_err());
    }

    #[test]
    fn test_truncated_samples_is_error() {
        let err = samples_to_rgb(&[1, 2, 3], &ColorSpace::Rgb, 2).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_stream_filters_accepts_name_or_array() {
        let single = dictionary! { "Filter" => "FlateDecode" };
        assert_eq!(stream_filters(&single), vec![b"FlateDecode".to_vec()]);

        let chained = dictionary! {
            "Filter" => vec![Object::Name(b"LZWDecode".to_vec()), Object::Name(b"FlateDecode".to_vec())],
        };
        assert_eq!(stream_filters(&chained).len(), 2);

        assert!(stream_filters(&Dictionary::new()).is_empty());
    }

    #[test]
    fn test_pdf_without_images_reports_single_page() {
        let bytes = build_pdf("Skills", vec![]);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();
        assert_eq!(pdf.page_count(), 1);
        assert_eq!(pdf.image_count(1), 0);
        assert!(pdf.page_text(1).contains("Skills"));
        assert_eq!(pdf.page_text(2), "");
    }

    #[test]
    fn test_pdf_raw_rgb_image_is_decoded() {
        let samples = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let bytes = build_pdf("Contact", vec![raw_image(2, 2, "DeviceRGB", samples.clone())]);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();

        assert_eq!(pdf.image_count(1), 1);
        let image = pdf.load_image(1, 1).unwrap();
        assert_eq!(image.width, 2);
        assert_eq!(image.height, 2);
        assert_eq!(image.mode, ColorMode::Rgb);
        assert_eq!(image.samples, samples);
    }

    #[test]
    fn test_pdf_gray_image_is_expanded() {
        let bytes = build_pdf("Contact", vec![raw_image(2, 1, "DeviceGray", vec![0, 255])]);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();
        let image = pdf.load_image(1, 1).unwrap();
        assert_eq!(image.samples, vec![0, 0, 0, 255, 255, 255]);
    }

    #[test]
    fn test_pdf_images_keep_resource_order() {
        let bytes = build_pdf(
            "Projects",
            vec![
                raw_image(1, 1, "DeviceGray", vec![10]),
                raw_image(1, 1, "DeviceGray", vec![20]),
            ],
        );
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();
        assert_eq!(pdf.image_count(1), 2);
        assert_eq!(pdf.load_image(1, 1).unwrap().samples, vec![10, 10, 10]);
        assert_eq!(pdf.load_image(1, 2).unwrap().samples, vec![20, 20, 20]);
    }

    #[test]
    fn test_pdf_unsupported_filter_is_decode_error() {
        let mut stream = raw_image(1, 1, "DeviceRGB", vec![0, 0, 0]);
        stream.dict.set("Filter", "JBIG2Decode");
        let bytes = build_pdf("Skills", vec![stream]);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();

        let err = pdf.load_image(1, 1).unwrap_err();
        assert!(err.to_string().contains("JBIG2Decode"), "{err}");
    }

    #[test]
    fn test_pdf_missing_image_index_is_error() {
        let bytes = build_pdf("Skills", vec![]);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();
        assert!(pdf.load_image(1, 1).is_err());
        assert!(pdf.load_image(1, 0).is_err());
    }

    fn gray_rgb(values: &[u8]) -> Vec<u8> {
        values.iter().flat_map(|&g| [g, g, g]).collect()
    }

    #[test]
    fn test_font_without_subtype_falls_back_to_lopdf_text() {
        let mut font = courier();
        font.remove(b"Subtype");
        let bytes = build_pdf_with("Skills", font, vec![]);

        let pdf = PdfDocument::from_bytes(&bytes).unwrap();
        assert_eq!(pdf.page_count(), 1);
        assert_eq!(pdf.image_count(1), 0);
    }

    #[test]
    fn test_page_texts_recovers_from_panicking_extractor() {
        let bytes = build_pdf("Skills", vec![]);
        let doc = lopdf::Document::load_mem(&bytes).unwrap();

        let texts = page_texts(&doc, 1, || panic!("font has no subtype"));
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("Skills"), "{texts:?}");
    }

    #[test]
    fn test_page_texts_falls_back_on_error_or_page_mismatch() {
        let bytes = build_pdf("Skills", vec![]);
        let doc = lopdf::Document::load_mem(&bytes).unwrap();

        let failed = page_texts(&doc, 1, || Err("bad font".to_string()));
        assert!(failed[0].contains("Skills"), "{failed:?}");

        let mismatched = page_texts(&doc, 1, || Ok(vec!["a".into(), "b".into()]));
        assert_eq!(mismatched.len(), 1);

        let primary = page_texts(&doc, 1, || Ok(vec!["from pdf-extract".into()]));
        assert_eq!(primary, vec!["from pdf-extract".to_string()]);
    }

    #[test]
    fn test_pdf_one_bit_gray_image_is_unpacked() {
        // 3x2: rows are padded to a byte each.
        let stream = packed_image(3, 2, "DeviceGray", 1, vec![0b1010_0000, 0b0100_0000]);
        let bytes = build_pdf("Skills", vec![stream]);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();

        let image = pdf.load_image(1, 1).unwrap();
        assert_eq!(image.samples, gray_rgb(&[255, 0, 255, 0, 255, 0]));
    }

    #[test]
    fn test_pdf_decode_array_inverts_samples() {
        let mut stream = packed_image(3, 1, "DeviceGray", 1, vec![0b1010_0000]);
        stream
            .dict
            .set("Decode", vec![Object::Integer(1), Object::Integer(0)]);
        let bytes = build_pdf("Skills", vec![stream]);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();

        let image = pdf.load_image(1, 1).unwrap();
        assert_eq!(image.samples, gray_rgb(&[0, 255, 0]));
    }

    #[test]
    fn test_pdf_four_bit_gray_image_is_scaled() {
        let stream = packed_image(3, 1, "DeviceGray", 4, vec![0x0F, 0x80]);
        let bytes = build_pdf("Skills", vec![stream]);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();

        let image = pdf.load_image(1, 1).unwrap();
        assert_eq!(image.samples, gray_rgb(&[0, 255, 136]));
    }

    #[test]
    fn test_pdf_sixteen_bit_image_keeps_high_byte() {
        let stream = packed_image(2, 1, "DeviceGray", 16, vec![0x12, 0x34, 0xAB, 0xCD]);
        let bytes = build_pdf("Skills", vec![stream]);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();

        let image = pdf.load_image(1, 1).unwrap();
        assert_eq!(image.samples, gray_rgb(&[0x12, 0xAB]));
    }

    #[test]
    fn test_pdf_unsupported_bit_depth_is_decode_error() {
        let stream = packed_image(1, 1, "DeviceGray", 3, vec![0]);
        let bytes = build_pdf("Skills", vec![stream]);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();

        let err = pdf.load_image(1, 1).unwrap_err();
        assert!(err.to_string().contains("bits per component: 3"), "{err}");
    }

    #[test]
    fn test_unpack_keeps_palette_indices_raw() {
        let indices = unpack_samples(&[0x12, 0x30], 4, 3, 1, false).unwrap();
        assert_eq!(indices, vec![1, 2, 3]);

        let two_bit = unpack_samples(&[0b1110_0100], 2, 4, 1, true).unwrap();
        assert_eq!(two_bit, vec![255, 170, 85, 0]);
    }

    #[test]
    fn test_unpack_drops_short_rows() {
        let samples = unpack_samples(&[0xFF], 1, 9, 1, true).unwrap();
        assert!(samples.is_empty());
    }

    #[test]
    fn test_transitions_to_row_packs_black_runs() {
        // white 0..4, black 4..8, white 8..10
        let row = transitions_to_row(&[4, 8], 10, false);
        assert_eq!(row, vec![0b1111_0000, 0b1100_0000]);

        let inverted = transitions_to_row(&[4, 8], 10, true);
        assert_eq!(inverted, vec![0b0000_1111, 0b0000_0000]);

        assert_eq!(transitions_to_row(&[], 8, false), vec![0xFF]);
    }

    #[test]
    fn test_ccitt_params_defaults_and_overrides() {
        let defaults = CcittParams::from_dict(None, 640);
        assert_eq!(
            defaults,
            CcittParams {
                k: 0,
                columns: 640,
                rows: None,
                black_is_1: false,
            }
        );

        let params = dictionary! {
            "K" => -1,
            "Columns" => 8,
            "Rows" => 2,
            "BlackIs1" => true,
        };
        let parsed = CcittParams::from_dict(Some(&params), 640);
        assert_eq!(parsed.k, -1);
        assert_eq!(parsed.columns, 8);
        assert_eq!(parsed.rows, Some(2));
        assert!(parsed.black_is_1);
    }

    #[test]
    fn test_pdf_ccitt_group4_image_is_decoded() {
        // 8x2 Group 4: each row is four white then four black pixels.
        // Row 1: horizontal mode (001, white 4 = 1011, black 4 = 011).
        // Row 2: V0 V0. Then EOFB.
        let data = vec![0x36, 0xF0, 0x01, 0x00, 0x10];
        let mut stream = packed_image(8, 2, "DeviceGray", 1, data);
        stream.dict.set("Filter", "CCITTFaxDecode");
        stream.dict.set(
            "DecodeParms",
            dictionary! { "K" => -1, "Columns" => 8, "Rows" => 2 },
        );
        let bytes = build_pdf("Skills", vec![stream]);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();

        let image = pdf.load_image(1, 1).unwrap();
        let row = [255, 255, 255, 255, 0, 0, 0, 0];
        assert_eq!(image.samples, gray_rgb(&[row, row].concat()));
    }

    #[test]
    fn test_pdf_soft_mask_adds_alpha_channel() {
        let image = raw_image(2, 1, "DeviceGray", vec![10, 20]);
        let mask = raw_image(2, 1, "DeviceGray", vec![0, 255]);
        let bytes = build_pdf_with("Skills", courier(), vec![(image, Some(mask))]);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();

        assert_eq!(pdf.image_count(1), 1);
        let image = pdf.load_image(1, 1).unwrap();
        assert_eq!(image.mode, ColorMode::Rgba);
        assert_eq!(image.samples, vec![10, 10, 10, 0, 20, 20, 20, 255]);
    }

    #[test]
    fn test_pdf_soft_mask_of_other_size_is_ignored() {
        let image = raw_image(2, 1, "DeviceGray", vec![10, 20]);
        let mask = raw_image(1, 1, "DeviceGray", vec![255]);
        let bytes = build_pdf_with("Skills", courier(), vec![(image, Some(mask))]);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();

        let image = pdf.load_image(1, 1).unwrap();
        assert_eq!(image.mode, ColorMode::Rgb);
        assert_eq!(image.samples, gray_rgb(&[10, 20]));
    }

    #[test]
    fn test_pdf_jpeg_image_is_decoded() {
        let pixels = vec![200u8; 4 * 4 * 3];
        let mut jpeg = Vec::new();
        image::codecs::jpeg::JpegEncoder::new(&mut jpeg)
            .encode(&pixels, 4, 4, image::ColorType::Rgb8)
            .unwrap();

        let mut stream = raw_image(4, 4, "DeviceRGB", jpeg);
        stream.dict.set("Filter", "DCTDecode");
        let bytes = build_pdf("Skills", vec![stream]);
        let pdf = PdfDocument::from_bytes(&bytes).unwrap();

        let image = pdf.load_image(1, 1).unwrap();
        assert_eq!((image.width, image.height), (4, 4));
        assert_eq!(image.mode, ColorMode::Rgb);
        assert_eq!(image.samples.len(), 4 * 4 * 3);
        assert!(image.into_dynamic().is_ok());
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let err = PdfDocument::from_bytes(b"not a pdf at all").err().unwrap();
        assert!(matches!(err, ParseError::Pdf(_)), "{err:?}");
    }
}

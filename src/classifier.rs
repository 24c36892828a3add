//! # Classifier Module
//!
//! Decides, without touching the network, whether an image already went
//! through Tinify.
//!
//! Tinify always re-encodes to palette-indexed storage and strips EXIF, so:
//!
//! | Pixel mode | EXIF support | EXIF data | Verdict |
//! |------------|--------------|-----------|---------|
//! | not palette | any | any | needs optimization |
//! | palette | none (GIF) | - | already optimized |
//! | palette | yes | at least one tag | needs optimization |
//! | palette | yes | absent, or no tags | already optimized |
//!
//! EXIF is "empty" when its first IFD holds no entries. A payload that is not
//! a TIFF structure at all still counts as metadata when it has any bytes.
//! PNG EXIF comes from the `eXIf` chunk, or failing that from the hex-encoded
//! `Raw profile type exif` text chunk ImageMagick writes.
//!
//! Each format has its own `ImageInspector`, picked from the file signature
//! (or the extension when the signature is unknown). Decoding is blocking and
//! must run on the worker pool.

use crate::error::{Result, TinifyError};
use image::codecs::gif::GifDecoder;
use image::codecs::jpeg::JpegDecoder;
use image::{ExtendedColorType, ImageDecoder, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

/// Header that prefixes EXIF payloads in APP1 segments
const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Keyword of the ImageMagick text chunk carrying hex-encoded EXIF
const RAW_PROFILE_EXIF: &str = "Raw profile type exif";

/// Native pixel storage of a decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelMode {
    Palette,
    Grayscale,
    GrayscaleAlpha,
    Rgb,
    Rgba,
    Other,
}

impl From<ExtendedColorType> for PixelMode {
    fn from(color: ExtendedColorType) -> Self {
        use ExtendedColorType::*;
        match color {
            L1 | L2 | L4 | L8 | L16 => PixelMode::Grayscale,
            La1 | La2 | La4 | La8 | La16 => PixelMode::GrayscaleAlpha,
            Rgb1 | Rgb2 | Rgb4 | Rgb8 | Rgb16 | Rgb32F => PixelMode::Rgb,
            Rgba1 | Rgba2 | Rgba4 | Rgba8 | Rgba16 | Rgba32F => PixelMode::Rgba,
            _ => PixelMode::Other,
        }
    }
}

/// Classification result for one image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    AlreadyOptimized,
    NeedsOptimization,
}

/// What an inspector learned about an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub mode: PixelMode,
    pub exif: Option<Vec<u8>>,
}

/// Format-specific decoder front-end
pub trait ImageInspector {
    /// Whether the format can carry EXIF metadata at all
    fn supports_exif(&self) -> bool;

    /// Decode `data` and report pixel mode and raw EXIF payload
    fn inspect(&self, data: &[u8]) -> Result<Inspection>;
}

/// PNG: full decode so chunks after the image data are seen too
pub struct PngInspector;

impl ImageInspector for PngInspector {
    fn supports_exif(&self) -> bool {
        true
    }

    fn inspect(&self, data: &[u8]) -> Result<Inspection> {
        let mut decoder = png::Decoder::new_with_limits(Cursor::new(data), png::Limits { bytes: 1 << 30 });
        decoder.set_ignore_text_chunk(false);
        let mut reader = decoder.read_info()?;

        let mode = match reader.info().color_type {
            png::ColorType::Indexed => PixelMode::Palette,
            png::ColorType::Grayscale => PixelMode::Grayscale,
            png::ColorType::GrayscaleAlpha => PixelMode::GrayscaleAlpha,
            png::ColorType::Rgb => PixelMode::Rgb,
            png::ColorType::Rgba => PixelMode::Rgba,
        };

        let size = reader
            .output_buffer_size()
            .ok_or(TinifyError::Png(png::DecodingError::LimitsExceeded))?;
        let mut frame = vec![0; size];
        reader.next_frame(&mut frame)?;
        reader.finish()?;

        let info = reader.info();
        let exif = match &info.exif_metadata {
            Some(exif) => Some(exif.to_vec()),
            None => raw_profile_text(info)?.map(|text| decode_raw_profile(&text)),
        };

        Ok(Inspection { mode, exif })
    }
}

/// Text of the first `Raw profile type exif` chunk, in any of the text chunk kinds
fn raw_profile_text(info: &png::Info) -> Result<Option<String>> {
    if let Some(chunk) = info
        .uncompressed_latin1_text
        .iter()
        .find(|chunk| chunk.keyword == RAW_PROFILE_EXIF)
    {
        return Ok(Some(chunk.text.clone()));
    }
    if let Some(chunk) = info
        .compressed_latin1_text
        .iter()
        .find(|chunk| chunk.keyword == RAW_PROFILE_EXIF)
    {
        return Ok(Some(chunk.get_text()?));
    }
    if let Some(chunk) = info
        .utf8_text
        .iter()
        .find(|chunk| chunk.keyword == RAW_PROFILE_EXIF)
    {
        return Ok(Some(chunk.get_text()?));
    }
    Ok(None)
}

/// Decode an ImageMagick raw profile: `\n{name}\n{length}\n{hex lines}`.
///
/// A profile whose hex body does not decode is kept as opaque bytes, so it
/// still counts as metadata.
fn decode_raw_profile(text: &str) -> Vec<u8> {
    let hex: String = text
        .split('\n')
        .skip(3)
        .flat_map(str::chars)
        .filter(|c| !c.is_whitespace())
        .collect();

    hex::decode(&hex).unwrap_or_else(|e| {
        warn!("Undecodable raw EXIF profile: {}", e);
        text.as_bytes().to_vec()
    })
}

/// JPEG: header decode only, never palette-indexed
pub struct JpegInspector;

impl ImageInspector for JpegInspector {
    fn supports_exif(&self) -> bool {
        true
    }

    fn inspect(&self, data: &[u8]) -> Result<Inspection> {
        let mut decoder = JpegDecoder::new(Cursor::new(data))?;
        let mode = PixelMode::from(decoder.original_color_type());
        let exif = decoder.exif_metadata()?;
        Ok(Inspection { mode, exif })
    }
}

/// GIF: always palette-indexed, no EXIF concept
pub struct GifInspector;

impl ImageInspector for GifInspector {
    fn supports_exif(&self) -> bool {
        false
    }

    fn inspect(&self, data: &[u8]) -> Result<Inspection> {
        GifDecoder::new(Cursor::new(data))?;
        Ok(Inspection {
            mode: PixelMode::Palette,
            exif: None,
        })
    }
}

/// Any other format the `image` crate decodes, for direct file arguments.
///
/// Only WebP is compiled in besides PNG, JPEG and GIF. `original_color_type`
/// reports the expanded colour type, so these images are never `Palette`.
pub struct GenericInspector {
    format: ImageFormat,
}

impl ImageInspector for GenericInspector {
    fn supports_exif(&self) -> bool {
        true
    }

    fn inspect(&self, data: &[u8]) -> Result<Inspection> {
        let mut decoder = ImageReader::with_format(Cursor::new(data), self.format).into_decoder()?;
        let mode = PixelMode::from(decoder.original_color_type());
        let exif = decoder.exif_metadata()?;
        Ok(Inspection { mode, exif })
    }
}

/// Select the inspector for a file from its signature, falling back to its extension
pub fn inspector_for(path: &Path, data: &[u8]) -> Result<Box<dyn ImageInspector>> {
    let format = image::guess_format(data)
        .or_else(|_| ImageFormat::from_path(path))
        .map_err(|_| TinifyError::UnsupportedFormat(path.to_path_buf()))?;

    debug!("Detected {:?} for {}", format, path.display());

    Ok(match format {
        ImageFormat::Png => Box::new(PngInspector),
        ImageFormat::Jpeg => Box::new(JpegInspector),
        ImageFormat::Gif => Box::new(GifInspector),
        other => Box::new(GenericInspector { format: other }),
    })
}

/// Apply the Tinify signature rules to an inspection
pub fn verdict_for(inspection: &Inspection, supports_exif: bool) -> Verdict {
    if inspection.mode != PixelMode::Palette {
        return Verdict::NeedsOptimization;
    }

    if !supports_exif {
        return Verdict::AlreadyOptimized;
    }

    match inspection.exif.as_deref() {
        Some(exif) if has_exif_tags(exif) => Verdict::NeedsOptimization,
        _ => Verdict::AlreadyOptimized,
    }
}

fn has_exif_tags(exif: &[u8]) -> bool {
    let tiff = exif.strip_prefix(EXIF_HEADER).unwrap_or(exif);
    match ifd0_entry_count(tiff) {
        Some(count) => count > 0,
        None => !tiff.is_empty(),
    }
}

/// Number of entries in the first IFD of a TIFF structure, `None` if malformed
fn ifd0_entry_count(tiff: &[u8]) -> Option<u16> {
    let little_endian = match tiff.get(..2)? {
        [b'I', b'I'] => true,
        [b'M', b'M'] => false,
        _ => return None,
    };

    let u16_at = |at: usize| -> Option<u16> {
        let bytes: [u8; 2] = tiff.get(at..at.checked_add(2)?)?.try_into().ok()?;
        Some(if little_endian {
            u16::from_le_bytes(bytes)
        } else {
            u16::from_be_bytes(bytes)
        })
    };
    let u32_at = |at: usize| -> Option<u32> {
        let bytes: [u8; 4] = tiff.get(at..at.checked_add(4)?)?.try_into().ok()?;
        Some(if little_endian {
            u32::from_le_bytes(bytes)
        } else {
            u32::from_be_bytes(bytes)
        })
    };

    if u16_at(2)? != 42 {
        return None;
    }
    let ifd0 = usize::try_from(u32_at(4)?).ok()?;
    u16_at(ifd0)
}

/// Classify the image stored at `path`. Blocking.
pub fn classify(path: &Path) -> Result<Verdict> {
    let data = std::fs::read(path)?;
    let inspector = inspector_for(path, &data)?;
    let inspection = inspector.inspect(&data)?;
    let verdict = verdict_for(&inspection, inspector.supports_exif());

    debug!(
        "{}: mode {:?}, exif {} bytes -> {:?}",
        path.display(),
        inspection.mode,
        inspection.exif.as_ref().map_or(0, Vec::len),
        verdict
    );

    Ok(verdict)
}

//! Image fixtures generated on the fly for unit tests

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Big-endian TIFF with a single Orientation tag in IFD0
pub const EXIF_PAYLOAD: &[u8] = b"MM\0*\0\0\0\x08\0\x01\x01\x12\0\x03\0\0\0\x01\0\x01\0\0\0\0\0\0";

/// Little-endian TIFF whose IFD0 has no entries
pub const EMPTY_EXIF_PAYLOAD: &[u8] = b"II*\0\x08\0\0\0\0\0\0\0\0\0";

/// 4x4 palette-indexed PNG, optionally carrying an `eXIf` chunk
pub fn palette_png(dir: &Path, name: &str, exif: Option<&[u8]>) -> PathBuf {
    let path = dir.join(name);
    write_palette_png(&path, exif);
    path
}

pub fn write_palette_png(path: &Path, exif: Option<&[u8]>) {
    write_palette_png_with(path, exif, |_| ());
}

/// Palette PNG carrying EXIF the way ImageMagick stores it, in a
/// `Raw profile type exif` tEXt (or zTXt when `compressed`) chunk
pub fn palette_png_with_raw_profile(dir: &Path, name: &str, exif: &[u8], compressed: bool) -> PathBuf {
    let path = dir.join(name);
    let profile = raw_profile(exif);
    write_palette_png_with(&path, None, |encoder| {
        let keyword = "Raw profile type exif".to_string();
        if compressed {
            encoder.add_ztxt_chunk(keyword, profile).unwrap();
        } else {
            encoder.add_text_chunk(keyword, profile).unwrap();
        }
    });
    path
}

/// ImageMagick raw profile layout: name, length, then 72-column hex lines
pub fn raw_profile(exif: &[u8]) -> String {
    let hex = hex::encode(exif);
    let lines: Vec<&str> = hex
        .as_bytes()
        .chunks(72)
        .map(|line| std::str::from_utf8(line).unwrap())
        .collect();
    format!("\nexif\n{:8}\n{}\n", exif.len(), lines.join("\n"))
}

fn write_palette_png_with<F>(path: &Path, exif: Option<&[u8]>, configure: F)
where
    F: FnOnce(&mut png::Encoder<'static, BufWriter<File>>),
{
    let file = File::create(path).unwrap();
    let mut encoder = png::Encoder::new(BufWriter::new(file), 4, 4);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(vec![0, 0, 0, 255, 255, 255]);
    configure(&mut encoder);

    let mut writer = encoder.write_header().unwrap();
    if let Some(exif) = exif {
        writer
            .write_chunk(png::chunk::ChunkType(*b"eXIf"), exif)
            .unwrap();
    }
    let pixels: Vec<u8> = (0..16).map(|i| (i % 2) as u8).collect();
    writer.write_image_data(&pixels).unwrap();
    writer.finish().unwrap();
}

/// Bytes of a palette PNG without metadata, as Tinify would return them
pub fn tinified_png_bytes() -> Vec<u8> {
    let dir = tempfile::TempDir::new().unwrap();
    let path = palette_png(dir.path(), "tinified.png", None);
    std::fs::read(path).unwrap()
}

pub fn rgb_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(4, 4, Rgb([200, 30, 30])).save(&path).unwrap();
    path
}

pub fn jpeg(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(8, 8, Rgb([30, 200, 30])).save(&path).unwrap();
    path
}

pub fn gif(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(4, 4, Rgba([30, 30, 200, 255])).save(&path).unwrap();
    path
}

pub fn webp(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(4, 4, Rgb([30, 30, 200])).save(&path).unwrap();
    path
}

pub fn corrupt(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"definitely not an image").unwrap();
    path
}

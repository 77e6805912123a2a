// src/pipeline/images.rs

//! Raster image optimization.
//!
//! PNGs are re-encoded with the strongest lossless compression settings,
//! JPEGs are re-encoded at a fixed quality, and anything else (GIFs) is
//! copied through untouched. Change-filtering works the same way as the
//! plain copy tasks.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use tracing::debug;

use crate::config::PathEntry;
use crate::errors::Result;
use crate::pipeline::{freshness, sources};

const JPEG_QUALITY: u8 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSummary {
    /// Files re-encoded through the compressor.
    pub optimized: usize,
    /// Files copied through without re-encoding.
    pub copied: usize,
    /// Files whose destination was already up to date.
    pub skipped: usize,
}

pub fn run(entry: &PathEntry) -> Result<ImageSummary> {
    let files = sources::matching_files(&entry.src)?;

    fs::create_dir_all(&entry.dest)
        .with_context(|| format!("creating destination {}", entry.dest.display()))?;

    let mut summary = ImageSummary {
        optimized: 0,
        copied: 0,
        skipped: 0,
    };

    for src in files {
        let Some(file_name) = src.file_name() else {
            continue;
        };
        let dest = entry.dest.join(file_name);

        if freshness::up_to_date(&src, &dest) {
            summary.skipped += 1;
            continue;
        }

        let ext = src
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("png") => {
                recompress_png(&src, &dest)?;
                summary.optimized += 1;
            }
            Some("jpg") | Some("jpeg") => {
                recompress_jpeg(&src, &dest)?;
                summary.optimized += 1;
            }
            _ => {
                fs::copy(&src, &dest)
                    .with_context(|| format!("copying {}", src.display()))?;
                summary.copied += 1;
            }
        }

        debug!(src = %src.display(), dest = %dest.display(), "processed image");
    }

    Ok(summary)
}

fn recompress_png(src: &Path, dest: &Path) -> Result<()> {
    let img = image::open(src).with_context(|| format!("decoding {}", src.display()))?;
    let writer = BufWriter::new(
        File::create(dest).with_context(|| format!("creating {}", dest.display()))?,
    );
    let encoder = PngEncoder::new_with_quality(writer, CompressionType::Best, FilterType::Adaptive);
    img.write_with_encoder(encoder)
        .with_context(|| format!("encoding {}", dest.display()))?;
    Ok(())
}

fn recompress_jpeg(src: &Path, dest: &Path) -> Result<()> {
    let img = image::open(src).with_context(|| format!("decoding {}", src.display()))?;
    let writer = BufWriter::new(
        File::create(dest).with_context(|| format!("creating {}", dest.display()))?,
    );
    let encoder = JpegEncoder::new_with_quality(writer, JPEG_QUALITY);
    img.write_with_encoder(encoder)
        .with_context(|| format!("encoding {}", dest.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    #[test]
    fn png_is_reencoded_and_then_skipped() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let src_dir = tmp.path().join("images");
        let dest_dir = tmp.path().join("out");
        fs::create_dir_all(&src_dir)?;

        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(8, 8, Rgba([200, 10, 10, 255]));
        img.save(src_dir.join("dot.png"))?;

        let entry: PathEntry = toml::from_str(&format!(
            "src = \"{}/*.png\"\ndest = \"{}\"",
            src_dir.display(),
            dest_dir.display()
        ))?;

        let first = run(&entry)?;
        assert_eq!(first.optimized, 1);
        assert!(dest_dir.join("dot.png").exists());

        let second = run(&entry)?;
        assert_eq!(second.skipped, 1);
        assert_eq!(second.optimized, 0);
        Ok(())
    }
}

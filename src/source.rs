//! Image acquisition: load from a path or URL, downsize, and flatten into
//! RGB samples for the palette engine.

use std::io::Read;
use std::path::PathBuf;

use image::{ColorType, DynamicImage, GenericImageView, ImageFormat, imageops::FilterType};
use log::{debug, info};
use thiserror::Error;

use crate::color::Rgb;

/// Longest side, in pixels, of the image fed to clustering.
pub const DEFAULT_MAX_SIDE: u32 = 200;

/// Downloads larger than this are cut off and will fail to decode.
const MAX_DOWNLOAD_BYTES: u64 = 32 * 1024 * 1024;

/// Failures while obtaining or decoding an image.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not download {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("could not read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// A decoded image and what was known about it before any processing.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub image: DynamicImage,
    pub format: Option<ImageFormat>,
    pub original_size: (u32, u32),
    pub color_type: ColorType,
}

/// True for `http://` and `https://` locations.
pub fn is_url(location: &str) -> bool {
    location.starts_with("https://") || location.starts_with("http://")
}

/// Reads and decodes the image at a file path or http(s) URL.
pub fn load(location: &str) -> Result<LoadedImage, SourceError> {
    let location = location.trim();
    let bytes = if is_url(location) {
        fetch(location)?
    } else {
        let path = PathBuf::from(location);
        std::fs::read(&path).map_err(|source| SourceError::Io { path, source })?
    };
    decode(&bytes)
}

/// Decodes an in-memory image.
pub fn decode(bytes: &[u8]) -> Result<LoadedImage, SourceError> {
    let format = image::guess_format(bytes).ok();
    let image = image::load_from_memory(bytes)?;
    let loaded = LoadedImage {
        original_size: image.dimensions(),
        color_type: image.color(),
        format,
        image,
    };
    info!(
        "decoded {:?} image {}x{} ({:?})",
        loaded.format, loaded.original_size.0, loaded.original_size.1, loaded.color_type
    );
    Ok(loaded)
}

fn fetch(url: &str) -> Result<Vec<u8>, SourceError> {
    debug!("downloading {url}");
    let response = ureq::get(url).call().map_err(|e| SourceError::Http {
        url: url.to_string(),
        source: Box::new(e),
    })?;
    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(MAX_DOWNLOAD_BYTES)
        .read_to_end(&mut bytes)
        .map_err(|source| SourceError::Body {
            url: url.to_string(),
            source,
        })?;
    debug!("downloaded {} bytes", bytes.len());
    Ok(bytes)
}

/// Target dimensions with the longest side at most `max_side`, aspect kept.
/// Images already within bounds keep their size.
pub fn downsized_dimensions(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_side || max_side == 0 {
        return (width, height);
    }
    let ratio = max_side as f32 / longest as f32;
    let w = ((width as f32) * ratio).round().max(1.0) as u32;
    let h = ((height as f32) * ratio).round().max(1.0) as u32;
    (w.min(max_side), h.min(max_side))
}

/// Nearest-neighbour downscale so the longest side is at most `max_side`.
///
/// Nearest sampling keeps only colors that occur in the source image.
pub fn downsize(img: &DynamicImage, max_side: u32) -> DynamicImage {
    let (orig_w, orig_h) = img.dimensions();
    let (w, h) = downsized_dimensions(orig_w, orig_h, max_side);
    if (w, h) == (orig_w, orig_h) {
        return img.clone();
    }
    debug!("downsizing {orig_w}x{orig_h} -> {w}x{h}");
    DynamicImage::ImageRgba8(image::imageops::resize(img, w, h, FilterType::Nearest))
}

/// Row-major RGB samples of every pixel that is not fully transparent.
pub fn pixels(img: &DynamicImage) -> Vec<Rgb> {
    img.to_rgba8()
        .pixels()
        .filter(|p| p[3] != 0)
        .map(|p| Rgb::new(p[0], p[1], p[2]))
        .collect()
}

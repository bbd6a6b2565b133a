//! Extract a small palette of dominant colors from an image and reshape it:
//! sort, reverse, filter out extremes, flip to complementary colors, export.
//!
//! ```no_run
//! use palette_picker::{PaletteEngine, SortKey, source};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loaded = source::load("photo.jpg")?;
//! let small = source::downsize(&loaded.image, source::DEFAULT_MAX_SIDE);
//! let mut engine = PaletteEngine::new(source::pixels(&small), 6)?;
//! engine.sort_by(SortKey::Brightness);
//! println!("{:?}", engine.hex_list());
//! # Ok(())
//! # }
//! ```

pub mod cluster;
pub mod color;
pub mod engine;
pub mod error;
pub mod export;
pub mod source;

pub use cluster::{Clusterer, KmeansClusterer, KmeansConfig};
pub use color::{Rgb, SortKey};
pub use engine::{BrightnessFilter, MAX_COLORS, MIN_COLORS, MIN_FILTER_SAMPLES, PaletteEngine};
pub use error::{PaletteError, Result};

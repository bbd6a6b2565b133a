mod clipboard;
mod menu;
mod preview;
mod prompt;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use image::{ColorType, GenericImageView};
use palette_picker::source::{self, LoadedImage};
use palette_picker::{KmeansClusterer, KmeansConfig, PaletteEngine, PaletteError, Rgb};

use clipboard::SystemClipboard;
use menu::{Menu, clear_screen};
use preview::TerminalPreview;
use prompt::Prompter;

/// Extract a color palette from an image and explore it interactively.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Image file path or http(s) URL. Prompted for when omitted.
    image: Option<String>,

    /// Number of colors to extract (1-20). Prompted for when omitted.
    #[arg(short = 'k', long, value_parser = clap::value_parser!(u8).range(1..=20))]
    colors: Option<u8>,

    /// Seed of the first k-means run
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Iteration cap per k-means run
    #[arg(long, default_value_t = 20)]
    max_iter: usize,

    /// k-means convergence threshold
    #[arg(long, default_value_t = 1e-4)]
    converge: f32,

    /// Number of k-means runs; the best one is kept
    #[arg(long, default_value_t = 3)]
    runs: u64,

    /// Longest side the image is downsized to before clustering
    #[arg(long, default_value_t = source::DEFAULT_MAX_SIDE)]
    max_side: u32,

    /// Do not draw the image preview in the terminal
    #[arg(long)]
    no_preview: bool,
}

impl Args {
    fn kmeans_config(&self) -> KmeansConfig {
        KmeansConfig {
            max_iter: self.max_iter,
            converge: self.converge,
            runs: self.runs,
            seed: self.seed,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    let preview = TerminalPreview::detect(!args.no_preview);
    let mut clipboard = SystemClipboard::detect();
    let clusterer = KmeansClusterer::new(args.kmeans_config());

    let mut pending_image = args.image.clone();
    let mut pending_colors = args.colors.map(usize::from);

    loop {
        clear_screen(prompter.out())?;
        writeln!(prompter.out(), "=== Image Color Extractor ===")?;

        let Some(loaded) = acquire_image(&mut prompter, pending_image.take())? else {
            break;
        };
        let Some(pixels) = prepare_pixels(&mut prompter, &preview, &loaded, args.max_side)? else {
            break;
        };

        match build_engine(&mut prompter, pixels, pending_colors.take(), &clusterer)? {
            Step::Ready(mut engine) => {
                Menu::new(&mut prompter, &mut clipboard)
                    .run(&mut engine)
                    .context("palette menu failed")?;
            }
            Step::Skip => {}
            Step::Quit => break,
        }

        match prompter.yes_no("\nProcess another image? (y/n): ")? {
            Some(true) => continue,
            _ => break,
        }
    }

    writeln!(prompter.out(), "\nExiting the program. Goodbye!")?;
    Ok(())
}

/// Loads the image named on the command line, falling back to prompting until
/// one loads. `None` means input ended.
fn acquire_image<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    mut location: Option<String>,
) -> Result<Option<LoadedImage>> {
    loop {
        let target = match location.take() {
            Some(target) => target,
            None => match prompter.line("\nEnter image file path or URL: ")? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => line,
                None => return Ok(None),
            },
        };
        if source::is_url(target.trim()) {
            writeln!(prompter.out(), "\nDownloading image from URL...")?;
        }
        match source::load(&target) {
            Ok(loaded) => return Ok(Some(loaded)),
            Err(e) => writeln!(prompter.out(), "{e}. Please try again.")?,
        }
    }
}

/// Prints what was loaded, downsizes it, shows the preview, and flattens it
/// into samples.
fn prepare_pixels<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    preview: &TerminalPreview,
    loaded: &LoadedImage,
    max_side: u32,
) -> Result<Option<Vec<Rgb>>> {
    let out = prompter.out();
    let format = loaded
        .format
        .map(|f| format!("{f:?}"))
        .unwrap_or_else(|| "unknown".into());
    let (w, h) = loaded.original_size;
    writeln!(out, "\nFile type: {format}")?;
    writeln!(out, "Image size: {w}x{h}")?;
    writeln!(out, "Image mode: {:?}", loaded.color_type)?;

    let small = source::downsize(&loaded.image, max_side);
    let (sw, sh) = small.dimensions();
    writeln!(out, "Resized image size: {sw}x{sh}\n")?;
    if !matches!(loaded.color_type, ColorType::Rgb8) {
        writeln!(out, "Converting image from {:?} to RGB for processing...\n", loaded.color_type)?;
    }

    if preview.available() {
        writeln!(out, "Resized image preview:\n{}", preview.render(&small))?;
    }
    if prompter.pause()?.is_none() {
        return Ok(None);
    }
    Ok(Some(source::pixels(&small)))
}

enum Step {
    Ready(PaletteEngine),
    /// The image cannot produce a palette; go on to the next one.
    Skip,
    Quit,
}

fn build_engine<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    pixels: Vec<Rgb>,
    mut colors: Option<usize>,
    clusterer: &KmeansClusterer,
) -> Result<Step> {
    if pixels.is_empty() {
        writeln!(prompter.out(), "The image has no visible pixels. Please choose a different image.")?;
        return Ok(Step::Skip);
    }
    loop {
        let k = match colors.take() {
            Some(k) => k,
            None => match prompter.color_count("Enter number of colors to extract (1-20): ")? {
                Some(k) => k,
                None => return Ok(Step::Quit),
            },
        };
        match PaletteEngine::with_clusterer(pixels.clone(), k, clusterer.clone()) {
            Ok(engine) => return Ok(Step::Ready(engine)),
            Err(PaletteError::InsufficientData { distinct, .. }) => writeln!(
                prompter.out(),
                "This image only has {distinct} distinct colors. Please choose a smaller number."
            )?,
            Err(e) => writeln!(prompter.out(), "{e}")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_library_config() {
        let args = Args::try_parse_from(["palette-picker"]).unwrap();
        assert_eq!(args.kmeans_config(), KmeansConfig::default());
        assert_eq!(args.max_side, source::DEFAULT_MAX_SIDE);
        assert!(args.image.is_none());
        assert!(args.colors.is_none());
    }

    #[test]
    fn color_count_is_range_checked() {
        assert!(Args::try_parse_from(["palette-picker", "-k", "0"]).is_err());
        assert!(Args::try_parse_from(["palette-picker", "-k", "21"]).is_err());
        let args = Args::try_parse_from(["palette-picker", "photo.png", "-k", "8", "--seed", "3"]).unwrap();
        assert_eq!(args.colors, Some(8));
        assert_eq!(args.kmeans_config().seed, 3);
        assert_eq!(args.image.as_deref(), Some("photo.png"));
    }
}

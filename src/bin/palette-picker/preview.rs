//! Truecolor image preview drawn with half-block characters.

use std::io::IsTerminal;

use image::{DynamicImage, GenericImageView, imageops::FilterType};

/// Preview width in terminal columns.
pub const PREVIEW_COLUMNS: u32 = 60;

pub struct TerminalPreview {
    available: bool,
    columns: u32,
}

impl TerminalPreview {
    /// Available only when enabled and stdout is a terminal.
    pub fn detect(enabled: bool) -> Self {
        let available = enabled && std::io::stdout().is_terminal();
        if !available {
            log::debug!("terminal preview disabled");
        }
        Self {
            available,
            columns: PREVIEW_COLUMNS,
        }
    }

    pub fn available(&self) -> bool {
        self.available
    }

    pub fn render(&self, img: &DynamicImage) -> String {
        render_half_blocks(img, self.columns)
    }
}

/// Each character cell shows two vertically stacked pixels: the upper one as
/// foreground of `▀`, the lower one as background.
pub fn render_half_blocks(img: &DynamicImage, columns: u32) -> String {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 || columns == 0 {
        return String::new();
    }
    let cols = columns.min(w);
    let rows = ((h as f32) * (cols as f32) / (w as f32)).round().max(1.0) as u32;
    let scaled = image::imageops::resize(img, cols, rows, FilterType::Triangle);

    let mut out = String::new();
    for y in (0..rows).step_by(2) {
        for x in 0..cols {
            let top = scaled.get_pixel(x, y);
            out.push_str(&format!("\x1b[38;2;{};{};{}m", top[0], top[1], top[2]));
            if y + 1 < rows {
                let bottom = scaled.get_pixel(x, y + 1);
                out.push_str(&format!("\x1b[48;2;{};{};{}m", bottom[0], bottom[1], bottom[2]));
            }
            out.push('▀');
            out.push_str("\x1b[0m");
        }
        out.push('\n');
    }
    out
}

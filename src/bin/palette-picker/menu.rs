//! The palette options menu. Labels are derived from the engine's state on
//! every pass, so they always describe what the next choice will do.

use std::io::{self, BufRead, Write};

use palette_picker::{BrightnessFilter, Clusterer, PaletteEngine, PaletteError, SortKey, export};

use crate::clipboard::TextClipboard;
use crate::prompt::Prompter;

const BOLD: &str = "\x1b[1m";
const GREEN: &str = "\x1b[92m";
const RED: &str = "\x1b[91m";
const CYAN: &str = "\x1b[96m";
const RESET: &str = "\x1b[0m";

pub fn clear_screen(out: &mut impl Write) -> io::Result<()> {
    write!(out, "\x1b[2J\x1b[H")
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Reverse,
    Sort(SortKey),
    Filter,
    RemoveFilter,
    ToggleComplementary,
    CopyRgb,
    CopyHex,
    RgbaJson,
    ChangeCount,
    ToggleHsv,
    Done,
}

/// The two sort orders offered besides the current one, in menu order.
pub fn alternative_sorts(current: SortKey) -> [SortKey; 2] {
    match current {
        SortKey::Hue => [SortKey::Saturation, SortKey::Brightness],
        SortKey::Saturation => [SortKey::Hue, SortKey::Brightness],
        SortKey::Brightness => [SortKey::Saturation, SortKey::Hue],
    }
}

/// Menu choices in the order they are numbered, starting at 1.
pub fn actions(current: SortKey, is_filtered: bool) -> [Action; 10] {
    let [first, second] = alternative_sorts(current);
    [
        Action::Reverse,
        Action::Sort(first),
        Action::Sort(second),
        if is_filtered {
            Action::RemoveFilter
        } else {
            Action::Filter
        },
        Action::ToggleComplementary,
        Action::CopyRgb,
        Action::CopyHex,
        Action::RgbaJson,
        Action::ChangeCount,
        Action::ToggleHsv,
    ]
}

/// Maps a typed answer to an action. An empty answer finishes the menu.
pub fn parse_choice(answer: &str, current: SortKey, is_filtered: bool) -> Option<Action> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Some(Action::Done);
    }
    let n: usize = answer.parse().ok()?;
    actions(current, is_filtered).get(n.checked_sub(1)?).copied()
}

fn label(action: Action, is_complementary: bool, show_hsv: bool, clipboard: bool) -> String {
    let inactive = if clipboard {
        String::new()
    } else {
        format!(" {RED}(not active){RESET}")
    };
    match action {
        Action::Reverse => "Reverse color order".into(),
        Action::Sort(key) => format!("Sort by {key}"),
        Action::Filter => "Filter out dark/light colors".into(),
        Action::RemoveFilter => "Remove filter".into(),
        Action::ToggleComplementary if is_complementary => "Show original colors".into(),
        Action::ToggleComplementary => "Show complementary colors".into(),
        Action::CopyRgb => format!("Copy RGB values to clipboard{inactive}"),
        Action::CopyHex => format!("Copy Hex values to clipboard{inactive}"),
        Action::RgbaJson => "Convert to RGBA JSON format".into(),
        Action::ChangeCount => "Change number of colors".into(),
        Action::ToggleHsv if show_hsv => "Hide HSV values".into(),
        Action::ToggleHsv => "Show HSV values".into(),
        Action::Done => String::new(),
    }
}

pub struct Menu<'a, R, W> {
    prompter: &'a mut Prompter<R, W>,
    clipboard: &'a mut dyn TextClipboard,
    show_hsv: bool,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(prompter: &'a mut Prompter<R, W>, clipboard: &'a mut dyn TextClipboard) -> Self {
        Self {
            prompter,
            clipboard,
            show_hsv: false,
        }
    }

    /// Runs until the user finishes with an empty answer or input ends.
    pub fn run<C: Clusterer>(&mut self, engine: &mut PaletteEngine<C>) -> io::Result<()> {
        clear_screen(self.prompter.out())?;
        loop {
            self.show_palette(engine)?;
            let prompt = self.menu_text(engine);
            let Some(answer) = self.prompter.line(&prompt)? else {
                return Ok(());
            };
            let Some(action) = parse_choice(&answer, engine.current_sort(), engine.is_filtered())
            else {
                clear_screen(self.prompter.out())?;
                writeln!(
                    self.prompter.out(),
                    "Invalid choice. Please enter 1-10 or press enter to finish."
                )?;
                continue;
            };
            if action == Action::Done {
                return Ok(());
            }
            if !self.apply(action, engine)? {
                return Ok(());
            }
        }
    }

    fn show_palette<C: Clusterer>(&mut self, engine: &PaletteEngine<C>) -> io::Result<()> {
        let mut title = format!(
            "\nExtracted {} colors (sorted by {}",
            engine.num_colors(),
            engine.current_sort()
        );
        if engine.is_filtered() {
            title.push_str(", filtered");
        }
        if engine.is_complementary() {
            title.push_str(", complementary");
        }
        title.push_str("):");

        let out = self.prompter.out();
        writeln!(out, "{title}")?;
        for (color, hex) in engine.colors().iter().zip(engine.hex_list()) {
            write!(
                out,
                "\x1b[48;2;{};{};{}m    {RESET} {color} | Hex: {hex}",
                color.r, color.g, color.b
            )?;
            if self.show_hsv {
                let (h, s, v) = color.hsv();
                write!(
                    out,
                    " | HSV({:.0}°, {:.0}%, {:.0}%)",
                    h * 360.0,
                    s * 100.0,
                    v * 100.0
                )?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    fn menu_text<C: Clusterer>(&self, engine: &PaletteEngine<C>) -> String {
        let clip = self.clipboard.available();
        let entries = actions(engine.current_sort(), engine.is_filtered());
        let line = |i: usize| {
            format!(
                "{}. {}\n",
                i + 1,
                label(entries[i], engine.is_complementary(), self.show_hsv, clip)
            )
        };

        let mut text = format!("\nOptions:\n\n{BOLD}--- Color Manipulation ---{RESET}\n");
        (0..5).for_each(|i| text.push_str(&line(i)));
        text.push_str(&format!("\n{BOLD}--- Export/Copy ---{RESET}\n"));
        (5..8).for_each(|i| text.push_str(&line(i)));
        text.push_str(&format!("\n{BOLD}--- Modify Extraction ---{RESET}\n"));
        (8..10).for_each(|i| text.push_str(&line(i)));
        text.push_str("\nEnter choice (1-10) or press enter to finish: ");
        text
    }

    fn success(&mut self, msg: &str) -> io::Result<()> {
        writeln!(self.prompter.out(), "{GREEN}\n{msg}{RESET}")
    }

    fn failure(&mut self, msg: &str) -> io::Result<()> {
        writeln!(self.prompter.out(), "{RED}\n{msg}{RESET}")
    }

    fn copy(&mut self, text: &str, what: &str) -> io::Result<()> {
        if !self.clipboard.available() {
            return self.failure("Clipboard not available on this system.");
        }
        match self.clipboard.copy(text) {
            Ok(()) => self.success(&format!("{what} values copied to clipboard.")),
            Err(e) => self.failure(&format!("Failed to copy {what} values to clipboard: {e}")),
        }
    }

    /// Applies one action. Returns `false` when input ended mid-action.
    fn apply<C: Clusterer>(&mut self, action: Action, engine: &mut PaletteEngine<C>) -> io::Result<bool> {
        match action {
            Action::Reverse => {
                engine.reverse();
                clear_screen(self.prompter.out())?;
                self.success("Color order reversed.")?;
            }
            Action::Sort(key) => {
                engine.sort_by(key);
                clear_screen(self.prompter.out())?;
                self.success(&format!("Colors sorted by {key}."))?;
            }
            Action::Filter => {
                let Some(settings) = self.ask_filter()? else {
                    return Ok(false);
                };
                clear_screen(self.prompter.out())?;
                match engine.filter_colors(settings) {
                    Ok(()) => self.success("Filter applied.")?,
                    Err(PaletteError::InsufficientSamples { remaining, .. }) => self.failure(
                        &format!(
                            "Filtering would leave only {remaining} pixels. Filter skipped, original colors kept."
                        ),
                    )?,
                    Err(e) => self.failure(&format!("Filter skipped: {e}"))?,
                }
            }
            Action::RemoveFilter => {
                engine.remove_filter();
                clear_screen(self.prompter.out())?;
                self.success("Filter removed.")?;
            }
            Action::ToggleComplementary => {
                engine.toggle_complementary();
                clear_screen(self.prompter.out())?;
                if engine.is_complementary() {
                    self.success("Showing complementary colors.")?;
                } else {
                    self.success("Showing original colors.")?;
                }
            }
            Action::CopyRgb => {
                clear_screen(self.prompter.out())?;
                self.copy(&export::rgb_clipboard_text(engine.colors()), "RGB")?;
            }
            Action::CopyHex => {
                clear_screen(self.prompter.out())?;
                self.copy(&export::hex_clipboard_text(engine.colors()), "Hex")?;
            }
            Action::RgbaJson => {
                let Some(opacity) = self.prompter.opacity()? else {
                    return Ok(false);
                };
                clear_screen(self.prompter.out())?;
                let rgba = export::rgba_json(engine.colors(), opacity).map_err(io::Error::other)?;
                let rgb = export::rgb_json(engine.colors()).map_err(io::Error::other)?;
                writeln!(
                    self.prompter.out(),
                    "\n{CYAN}Extracted colors (RGBA):\n{rgba}\n\nRaw RGB: {rgb}{RESET}"
                )?;
            }
            Action::ChangeCount => {
                let Some(k) = self
                    .prompter
                    .color_count("\nEnter new number of colors to extract from the image (1-20): ")?
                else {
                    return Ok(false);
                };
                clear_screen(self.prompter.out())?;
                match engine.re_extract(k) {
                    Ok(()) => self.success("Number of colors updated.")?,
                    Err(e) => self.failure(&format!("Could not change number of colors: {e}"))?,
                }
            }
            Action::ToggleHsv => {
                self.show_hsv = !self.show_hsv;
                clear_screen(self.prompter.out())?;
            }
            Action::Done => {}
        }
        Ok(true)
    }

    /// Asks which extremes to drop and the thresholds to use.
    fn ask_filter(&mut self) -> io::Result<Option<BrightnessFilter>> {
        let defaults = BrightnessFilter::default();
        let Some(mode) = self.prompter.number_in_range(
            "\nFilter: 1. dark colors  2. light colors  3. both (default 3): ",
            1u8..=3,
            Some(3),
        )?
        else {
            return Ok(None);
        };

        loop {
            let mut settings = BrightnessFilter {
                filter_dark: mode != 2,
                filter_light: mode != 1,
                ..defaults
            };
            if settings.filter_dark {
                let Some(min) = self.prompter.brightness("minimum", defaults.min_brightness)? else {
                    return Ok(None);
                };
                settings.min_brightness = min;
            }
            if settings.filter_light {
                let Some(max) = self.prompter.brightness("maximum", defaults.max_brightness)? else {
                    return Ok(None);
                };
                settings.max_brightness = max;
            }
            if settings.filter_dark && settings.filter_light && settings.min_brightness >= settings.max_brightness {
                writeln!(
                    self.prompter.out(),
                    "Minimum brightness must be lower than maximum brightness."
                )?;
                continue;
            }
            return Ok(Some(settings));
        }
    }
}

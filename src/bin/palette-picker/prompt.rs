//! Line-oriented prompts that re-ask until the answer is usable.
//!
//! Every prompt returns `Ok(None)` once input is exhausted, which the caller
//! treats as a request to quit.

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::ops::RangeInclusive;
use std::str::FromStr;

use palette_picker::{MAX_COLORS, MIN_COLORS};

pub const DEFAULT_OPACITY: f64 = 0.15;

pub struct Prompter<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    /// Prints `prompt` and reads one line without its line ending.
    pub fn line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Reads a number within `range`. An empty answer yields `default` when one is given.
    pub fn number_in_range<T>(
        &mut self,
        prompt: &str,
        range: RangeInclusive<T>,
        default: Option<T>,
    ) -> io::Result<Option<T>>
    where
        T: FromStr + PartialOrd + Display + Copy,
    {
        loop {
            let Some(answer) = self.line(prompt)? else {
                return Ok(None);
            };
            let answer = answer.trim();
            if answer.is_empty() {
                if let Some(default) = default {
                    return Ok(Some(default));
                }
            }
            match answer.parse::<T>() {
                Ok(value) if range.contains(&value) => return Ok(Some(value)),
                _ => writeln!(
                    self.out,
                    "Please enter a number between {} and {}.",
                    range.start(),
                    range.end()
                )?,
            }
        }
    }

    pub fn color_count(&mut self, prompt: &str) -> io::Result<Option<usize>> {
        self.number_in_range(prompt, MIN_COLORS..=MAX_COLORS, None)
    }

    pub fn opacity(&mut self) -> io::Result<Option<f64>> {
        self.number_in_range(
            &format!("\nEnter opacity value (0.0 to 1.0, default {DEFAULT_OPACITY}): "),
            0.0..=1.0,
            Some(DEFAULT_OPACITY),
        )
    }

    pub fn brightness(&mut self, what: &str, default: f64) -> io::Result<Option<f64>> {
        self.number_in_range(
            &format!("Enter {what} brightness threshold (0.0 to 1.0, default {default}): "),
            0.0..=1.0,
            Some(default),
        )
    }

    /// `y`/`yes` is true, anything else false.
    pub fn yes_no(&mut self, prompt: &str) -> io::Result<Option<bool>> {
        Ok(self
            .line(prompt)?
            .map(|a| matches!(a.trim().to_ascii_lowercase().as_str(), "y" | "yes")))
    }

    /// Waits for the user to press Enter.
    pub fn pause(&mut self) -> io::Result<Option<()>> {
        Ok(self.line("Press Enter to continue...")?.map(|_| ()))
    }
}

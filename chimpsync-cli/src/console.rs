//! Terminal [`Reporter`]: title, text, an `indicatif` progress bar, error and
//! success blocks.
//!
//! Lines go to `out`. The bar draws on its own target and is only visible on
//! a terminal; lines printed while it is active are written through
//! [`ProgressBar::suspend`] so they never land on the bar's row.

use std::io::{self, Write};

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use chimpsync_sync::Reporter;

const BAR_TEMPLATE: &str = "{pos}/{len} [{bar:28}] {percent:>3}%";

pub struct ConsoleReporter<W: Write> {
    out: W,
    bar: Option<ProgressBar>,
    draw_target: fn() -> ProgressDrawTarget,
    /// Set after the first failed write; later failures are not logged again.
    write_failed: bool,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            draw_target: ProgressDrawTarget::stdout,
            ..Self::new(io::stdout())
        }
    }
}

impl<W: Write> ConsoleReporter<W> {
    /// Reporter writing lines to `out` with the progress bar hidden.
    pub fn new(out: W) -> Self {
        Self {
            out,
            bar: None,
            draw_target: ProgressDrawTarget::hidden,
            write_failed: false,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, line: &str) {
        let out = &mut self.out;
        let write = |out: &mut W| -> io::Result<()> {
            writeln!(out, "{line}")?;
            out.flush()
        };
        let result = match &self.bar {
            Some(bar) => bar.suspend(|| write(out)),
            None => write(out),
        };
        if let Err(err) = result {
            if !self.write_failed {
                self.write_failed = true;
                tracing::debug!(error = %err, "console write failed; further output may be lost");
            }
        }
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .map(|style| style.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn title(&mut self, message: &str) {
        self.line("");
        self.line(&message.green().bold().to_string());
        self.line(&"=".repeat(message.chars().count()).green().bold().to_string());
        self.line("");
    }

    fn text(&mut self, message: &str) {
        self.line(&format!(" {message}"));
    }

    fn progress_start(&mut self, total: usize) {
        if let Some(previous) = self.bar.take() {
            previous.finish();
        }
        let bar = ProgressBar::with_draw_target(Some(total as u64), (self.draw_target)());
        bar.set_style(bar_style());
        self.bar = Some(bar);
    }

    fn progress_advance(&mut self, step: usize) {
        if let Some(bar) = &self.bar {
            bar.inc(step as u64);
        }
    }

    fn progress_finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }

    fn error(&mut self, message: &str) {
        self.line(&format!(" [ERROR] {message}").red().bold().to_string());
    }

    fn success(&mut self, message: &str) {
        self.line("");
        self.line(&format!(" [OK] {message}").green().bold().to_string());
        self.line("");
    }
}

use std::io::IsTerminal;
use std::time::Duration;

use anstyle::{AnsiColor, Effects, Style};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use vg_registry::DownloadObserver;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn current_output_style() -> OutputStyle {
    if std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty()) {
        return OutputStyle::Plain;
    }
    resolve_output_style(std::io::stdout().is_terminal(), std::io::stderr().is_terminal())
}

pub(crate) fn resolve_output_style(stdout_is_tty: bool, _stderr_is_tty: bool) -> OutputStyle {
    if stdout_is_tty {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

/// One status line. Plain output is unadorned except for warnings and
/// errors; rich output carries an ASCII badge.
pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => match status {
            "warn" => format!("warning: {message}"),
            "err" => format!("error: {message}"),
            _ => message.to_string(),
        },
        OutputStyle::Rich => format!("{} {message}", status_badge(status)),
    }
}

fn status_badge(status: &str) -> &'static str {
    match status {
        "ok" => "[OK]",
        "warn" => "[WARN]",
        "err" => "[ERR]",
        _ => "[..]",
    }
}

fn badge_style(status: &str) -> Style {
    let color = match status {
        "ok" => AnsiColor::BrightGreen,
        "warn" => AnsiColor::BrightYellow,
        "err" => AnsiColor::BrightRed,
        _ => AnsiColor::BrightBlue,
    };
    Style::new().fg_color(Some(color.into())).effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct TerminalRenderer {
    style: OutputStyle,
}

impl TerminalRenderer {
    pub(crate) fn from_style(style: OutputStyle) -> Self {
        Self { style }
    }

    pub(crate) fn current() -> Self {
        Self::from_style(current_output_style())
    }

    pub(crate) fn style(self) -> OutputStyle {
        self.style
    }

    pub(crate) fn print_status(self, status: &str, message: &str) {
        let line = render_status_line(self.style, status, message);
        match self.style {
            OutputStyle::Plain => println!("{line}"),
            OutputStyle::Rich => {
                let badge = status_badge(status);
                let rest = line.strip_prefix(badge).unwrap_or(&line);
                println!("{}{rest}", colorize(badge_style(status), badge));
            }
        }
    }

    pub(crate) fn print_lines(self, lines: &[String]) {
        for line in lines {
            println!("{line}");
        }
    }

    /// Cosmetic spinner for long filesystem work; nothing is drawn in plain mode.
    pub(crate) fn start_spinner(self, message: &str) -> Spinner {
        if self.style == OutputStyle::Plain {
            return Spinner { progress_bar: None };
        }

        let progress_bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan.bold} {msg}") {
            progress_bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }
        progress_bar.set_message(message.to_string());
        progress_bar.enable_steady_tick(Duration::from_millis(80));
        Spinner {
            progress_bar: Some(progress_bar),
        }
    }
}

pub(crate) struct Spinner {
    progress_bar: Option<ProgressBar>,
}

impl Spinner {
    pub(crate) fn finish(mut self) {
        if let Some(progress_bar) = self.progress_bar.take() {
            progress_bar.finish_and_clear();
        }
    }
}

/// Byte progress for archive downloads, drawn on stderr.
pub(crate) struct DownloadProgress {
    progress_bar: ProgressBar,
}

impl DownloadProgress {
    pub(crate) fn new() -> Self {
        let progress_bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden());
        if let Ok(style) = ProgressStyle::with_template(
            "{msg} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})",
        ) {
            progress_bar.set_style(style.progress_chars("=>-"));
        }
        Self { progress_bar }
    }
}

impl DownloadObserver for DownloadProgress {
    fn started(&self, filename: &str, total_bytes: Option<u64>) {
        self.progress_bar.set_draw_target(ProgressDrawTarget::stderr());
        self.progress_bar.set_position(0);
        if let Some(total) = total_bytes {
            self.progress_bar.set_length(total);
        }
        self.progress_bar.set_message(filename.to_string());
    }

    fn advanced(&self, bytes: u64) {
        self.progress_bar.inc(bytes);
    }

    fn finished(&self) {
        self.progress_bar.finish_and_clear();
    }
}

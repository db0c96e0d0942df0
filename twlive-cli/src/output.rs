use std::error::Error;

#[cfg(feature = "colored-output")]
use colored::*;
use twitch_live::{ProbeResult, StatusSource};

pub enum Color {
    Green,
    Yellow,
    Red,
}

/// Renders the final report. Progress lines go through `tracing` instead.
pub struct OutputManager {
    colored: bool,
}

impl OutputManager {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn format_result(&self, url: &str, result: &ProbeResult) -> String {
        match result {
            ProbeResult::Live {
                status, source, ..
            } => {
                let mut line = format!("{url} is {}", self.colorize("live", &Color::Green, true));
                match result.start_time() {
                    Some(started) => line.push_str(&format!(" (since {})", started.to_rfc3339())),
                    None => {
                        if let Some(raw) = result.started_at() {
                            line.push_str(&format!(" (since {raw})"));
                        }
                    }
                }
                if *source == StatusSource::Legacy {
                    line.push_str(&format!(" [playability status: {status}]"));
                }
                line
            }
            ProbeResult::Offline => {
                format!("{url} is {}", self.colorize("offline", &Color::Yellow, true))
            }
            ProbeResult::Unknown => format!(
                "{url}: {}",
                self.colorize("status unknown", &Color::Yellow, true)
            ),
        }
    }

    pub fn format_error(&self, error: &(dyn Error + 'static)) -> String {
        let mut output = format!("{}\n{error}", self.colorize("Terminating", &Color::Red, true));
        let mut source = error.source();
        while let Some(cause) = source {
            output.push_str(&format!("\n  caused by: {cause}"));
            source = cause.source();
        }
        output
    }

    #[cfg(feature = "colored-output")]
    fn colorize(&self, text: &str, color: &Color, bold: bool) -> String {
        if !self.colored {
            return text.to_string();
        }
        let colored = match color {
            Color::Green => text.green(),
            Color::Yellow => text.yellow(),
            Color::Red => text.red(),
        };
        if bold {
            colored.bold().to_string()
        } else {
            colored.to_string()
        }
    }

    #[cfg(not(feature = "colored-output"))]
    fn colorize(&self, text: &str, _color: &Color, _bold: bool) -> String {
        text.to_string()
    }
}

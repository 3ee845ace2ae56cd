//! Command output: human-readable lines or JSON.

use serde::Serialize;

/// Where command results go.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` as pretty JSON, or the lines `render` produces.
    pub fn show<T, F>(&self, value: &T, render: F) -> Result<(), serde_json::Error>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T) -> Vec<String>,
    {
        if self.json {
            emit(&serde_json::to_string_pretty(value)?);
        } else {
            for line in render(value) {
                emit(&line);
            }
        }
        Ok(())
    }

    /// Print a status message. Suppressed in JSON mode.
    pub fn say(&self, message: impl std::fmt::Display) {
        if !self.json {
            emit(&message.to_string());
        }
    }
}

#[allow(clippy::print_stdout)]
fn emit(line: &str) {
    println!("{line}");
}

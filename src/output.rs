use std::error::Error;
use std::io::{self, Write};

use crate::errors::{AppError, AppResult};

/// Enrollment token prefix; the value part is the committed index, or 0.
pub const ENROLL_PREFIX: &str = "Security_pic_index";
/// Confirmation token prefix; the value part is 1 (admit) or 0 (deny).
pub const CONFIRM_PREFIX: &str = "Enable";

pub fn format_token(prefix: &str, value: u32) -> String {
    format!("{prefix}{value}")
}

/// Writes the single decision token to stdout, with no trailing newline.
/// stdout carries nothing else; the admission-control caller parses it as
/// one token, so every diagnostic goes to stderr instead.
pub fn emit_token(prefix: &str, value: u32) -> AppResult<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(format_token(prefix, value).as_bytes())?;
    handle.flush()?;
    Ok(())
}

pub fn render_error(err: &AppError) {
    eprintln!("error: {}", err.human_message());
    if let Some(source) = err.source() {
        eprintln!("cause: {}", source);
    }
}

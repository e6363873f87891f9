use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;

/// Renames a consumed request file with a timestamp suffix so the caller
/// can never re-feed it, while keeping it around for audit and debugging.
pub fn archive_request(path: &Path) -> io::Result<PathBuf> {
    let mut target = path.as_os_str().to_owned();
    target.push(format!(".{}", Local::now().format("%Y%m%d%H%M%S")));
    let target = PathBuf::from(target);
    fs::rename(path, &target)?;
    Ok(target)
}

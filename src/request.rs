use std::fs;
use std::path::Path;

use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::store::PictureIndex;

/// Descriptive context shown while the user picks a picture. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentRequest {
    pub product: String,
    pub manufacturer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    User,
    Privileged,
}

/// One confirmation request, read exactly once per invocation. The backing
/// file is archived after the decision so it is never reprocessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub mode: RequestMode,
    pub config_num: String,
    pub interface_total_num: String,
    pub product: String,
    pub manufacturer: String,
    pub limited_hid_driver: String,
    pub claimed_index: PictureIndex,
    pub description: String,
    pub interfaces: Vec<String>,
}

fn read_lines(path: &Path) -> AppResult<String> {
    fs::read_to_string(path).map_err(|source| AppError::RequestRead {
        path: path.to_path_buf(),
        source,
    })
}

fn split_entry<'a>(path: &Path, line_no: usize, line: &'a str) -> AppResult<(&'a str, &'a str)> {
    line.split_once('=').ok_or_else(|| AppError::RequestParse {
        path: path.to_path_buf(),
        line: line_no + 1,
        message: format!("expected key=value, found '{line}'"),
    })
}

pub fn load_enrollment(path: &Path) -> AppResult<EnrollmentRequest> {
    let contents = read_lines(path)?;
    let mut request = EnrollmentRequest::default();

    for (line_no, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = split_entry(path, line_no, line)?;
        match key {
            "product" => request.product = value.to_string(),
            "manufacturer" => request.manufacturer = value.to_string(),
            other => debug!(key = other, "ignoring unknown enrollment request key"),
        }
    }

    Ok(request)
}

/// Parses a confirmation request and range-checks the claimed index against
/// the pool. A claimed index outside `[0, pool_size]` (stale config after a
/// pool resize, for instance) is rejected rather than clamped.
pub fn load_confirmation(path: &Path, pool_size: u32) -> AppResult<ConfirmationRequest> {
    let contents = read_lines(path)?;

    let mut mode = RequestMode::User;
    let mut config_num = String::new();
    let mut interface_total_num = String::new();
    let mut product = String::new();
    let mut manufacturer = String::new();
    let mut limited_hid_driver = String::new();
    let mut claimed_index: Option<PictureIndex> = None;
    let mut description = String::new();
    let mut interfaces = Vec::new();

    for (line_no, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = split_entry(path, line_no, line)?;
        // `interfaceTotalNum` must be matched before the `interface` prefix
        // rule that collects the per-interface entries.
        match key {
            "pro" => {
                if value == "true" {
                    mode = RequestMode::Privileged;
                }
            }
            "configNum" => config_num = value.to_string(),
            "interfaceTotalNum" => interface_total_num = value.to_string(),
            "product" => product = value.to_string(),
            "manufacturer" => manufacturer = value.to_string(),
            "limitedHidDriver" => limited_hid_driver = value.to_string(),
            "securityPicIndex" => {
                let parsed = value.parse().map_err(|err| AppError::RequestParse {
                    path: path.to_path_buf(),
                    line: line_no + 1,
                    message: format!("invalid securityPicIndex '{value}': {err}"),
                })?;
                claimed_index = Some(parsed);
            }
            "description" => description = value.to_string(),
            other if other.starts_with("interface") => interfaces.push(value.to_string()),
            other => debug!(key = other, "ignoring unknown confirmation request key"),
        }
    }

    let claimed_index = claimed_index.ok_or_else(|| AppError::RequestParse {
        path: path.to_path_buf(),
        line: 0,
        message: "missing required key 'securityPicIndex'".into(),
    })?;

    if claimed_index.get() > pool_size {
        return Err(AppError::RequestOutOfRange {
            path: path.to_path_buf(),
            index: claimed_index.get(),
            pool_size,
        });
    }

    Ok(ConfirmationRequest {
        mode,
        config_num,
        interface_total_num,
        product,
        manufacturer,
        limited_hid_driver,
        claimed_index,
        description,
        interfaces,
    })
}

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::store::PictureIndex;

const KEY_TOTAL_NUM: &str = "totalNum";
const KEY_PIC_DIR: &str = "picDir";
const KEY_PIC_FORMAT: &str = "picFormat";
const KEY_INDEX_CONF: &str = "picIndexConf";

/// Immutable settings shared by both dialogs. Loaded once per invocation;
/// a `pool_size` of zero is legal and means there is nothing to enroll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub pool_size: u32,
    pub pool_dir: PathBuf,
    pub pool_ext: String,
    pub index_store_path: PathBuf,
}

impl Settings {
    /// Path of one pool picture: `<picDir>/<index>.<picFormat>`.
    pub fn picture_path(&self, index: PictureIndex) -> PathBuf {
        self.pool_dir.join(format!("{}.{}", index, self.pool_ext))
    }
}

pub fn load(path: &Path) -> AppResult<Settings> {
    let contents = fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut pool_size: Option<u32> = None;
    let mut pool_dir: Option<PathBuf> = None;
    let mut pool_ext: Option<String> = None;
    let mut index_store_path: Option<PathBuf> = None;

    for (line_no, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line.split_once('=').ok_or_else(|| AppError::ConfigParse {
            path: path.to_path_buf(),
            line: line_no + 1,
            message: format!("expected key=value, found '{line}'"),
        })?;
        match key {
            KEY_TOTAL_NUM => {
                let parsed = value.parse::<u32>().map_err(|err| AppError::ConfigParse {
                    path: path.to_path_buf(),
                    line: line_no + 1,
                    message: format!("invalid {KEY_TOTAL_NUM} '{value}': {err}"),
                })?;
                pool_size = Some(parsed);
            }
            KEY_PIC_DIR => pool_dir = Some(PathBuf::from(value)),
            KEY_PIC_FORMAT => pool_ext = Some(value.to_string()),
            KEY_INDEX_CONF => index_store_path = Some(PathBuf::from(value)),
            other => debug!(key = other, "ignoring unknown config key"),
        }
    }

    let require = |key: &'static str| AppError::ConfigMissingKey {
        path: path.to_path_buf(),
        key,
    };

    Ok(Settings {
        pool_size: pool_size.ok_or_else(|| require(KEY_TOTAL_NUM))?,
        pool_dir: pool_dir.ok_or_else(|| require(KEY_PIC_DIR))?,
        pool_ext: pool_ext.ok_or_else(|| require(KEY_PIC_FORMAT))?,
        index_store_path: index_store_path.ok_or_else(|| require(KEY_INDEX_CONF))?,
    })
}

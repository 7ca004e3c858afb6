//! Log file checks done by the host around a recording session.

use crate::{AppError, AppResult};

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    panic::Location,
    path::Path,
};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Checks that `path` can be appended to before a session is started.
///
/// Creates the parent directory when missing. The file itself is created
/// empty if it does not exist yet.
#[track_caller]
#[instrument]
pub fn validate_log_path(path: &Path) -> AppResult<()> {
    if path.is_dir() {
        return Err(AppError::LogFileUnusable {
            reason: format!("{:?} is a directory", path),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| AppError::LogFileUnusable {
                reason: format!("Failed to create directory {:?}: {}", parent, e),
                location: ErrorLocation::from(Location::caller()),
            })?;
            debug!(dir = ?parent, "Created log directory");
        }
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::LogFileUnusable {
            reason: format!("Cannot write to {:?}: {}", path, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(())
}

/// Deletes an existing log so the next session starts a fresh file.
#[track_caller]
#[instrument]
pub fn remove_existing(path: &Path) -> AppResult<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!(path = ?path, "Existing log file deleted");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Copies the log file unchanged to `out` for review.
#[track_caller]
#[instrument(skip(out))]
pub fn show(path: &Path, out: &mut impl Write) -> AppResult<()> {
    let contents = fs::read(path).map_err(|e| {
        warn!(path = ?path, error = %e, "Cannot read log file");
        AppError::LogFileUnusable {
            reason: format!("Cannot read {:?}: {}", path, e),
            location: ErrorLocation::from(Location::caller()),
        }
    })?;

    out.write_all(&contents)?;
    out.flush()?;

    Ok(())
}

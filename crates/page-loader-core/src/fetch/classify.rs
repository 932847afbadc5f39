//! Classify curl outcomes and HTTP status codes into load errors.

use crate::error::LoadError;
use url::Url;

/// Maps a final HTTP status to `Ok` (2xx) or [`LoadError::HttpStatus`].
///
/// Redirects are followed by curl before we get here, so a 3xx that still
/// shows up is a failure like any other non-2xx.
pub fn check_status(url: &Url, status: u32) -> Result<(), LoadError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(LoadError::HttpStatus {
            url: url.to_string(),
            status,
        })
    }
}

/// Maps a failed `perform()` to either cancellation or a transport error.
///
/// A transfer aborted from the progress callback while the cancel flag is up
/// is a cancellation; everything else means the server never answered.
pub fn classify_perform_error(url: &Url, err: curl::Error, cancelled: bool) -> LoadError {
    if cancelled && err.is_aborted_by_callback() {
        return LoadError::Cancelled {
            url: url.to_string(),
        };
    }
    LoadError::Transport {
        url: url.to_string(),
        source: err,
    }
}

//! Common helper functions for Vault responses and paths.

use crate::vault::VaultError;
use reqwest::{Response, StatusCode};
use serde_json::Value;

/// Mount used by Vault's database secrets engine when none is given.
pub const DEFAULT_DATABASE_MOUNT: &str = "database";

/// Checks the HTTP response from Vault. If successful, returns the JSON body;
/// otherwise, classifies the status and extracts Vault's error messages.
pub async fn check_response(resp: Response) -> Result<Value, VaultError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| VaultError::Network(format!("Failed to read response: {}", e)))?;

    if status.is_success() {
        if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
            return Ok(serde_json::json!({}));
        }
        return serde_json::from_str(&body)
            .map_err(|e| VaultError::Parse(format!("Failed to parse response: {}", e)));
    }

    Err(VaultError::from_status(
        status.as_u16(),
        error_message(status, &body),
    ))
}

/// Pulls the `errors` list out of a Vault error body, falling back to the raw
/// body or the status reason.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(val) = serde_json::from_str::<Value>(body) {
        if let Some(errors) = val.get("errors").and_then(|v| v.as_array()) {
            let messages: Vec<&str> = errors.iter().filter_map(|e| e.as_str()).collect();
            if !messages.is_empty() {
                return messages.join(", ");
            }
        }
    }
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}

/// Percent-encodes one path segment. Empty and dot segments are rejected so
/// user-supplied names can never climb out of their mount.
pub fn path_segment(segment: &str) -> Result<String, VaultError> {
    if segment.is_empty() || segment == "." || segment == ".." {
        return Err(VaultError::InvalidPath(format!(
            "invalid path segment '{}'",
            segment
        )));
    }
    Ok(urlencoding::encode(segment).into_owned())
}

/// Encodes a possibly multi-segment mount such as `path/1`.
pub fn mount_segments(mount: &str) -> Result<Vec<String>, VaultError> {
    mount
        .split('/')
        .filter(|s| !s.is_empty())
        .map(path_segment)
        .collect()
}

/// Normalizes a mount point, falling back to `default` when absent or blank.
pub fn mount_or_default<'a>(mount: Option<&'a str>, default: &'a str) -> &'a str {
    match mount.map(|m| m.trim_matches('/')) {
        Some(m) if !m.is_empty() => m,
        _ => default,
    }
}

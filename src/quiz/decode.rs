//! Pulls a JSON object out of free-form provider output.
//!
//! Providers like to wrap the payload in markdown fences or surround it with a
//! sentence or two of prose. We strip the first fenced block (preferring a
//! ```` ```json ```` fence) and then take everything between the first `{` and
//! the last `}` as the best-effort JSON region.

use serde_json::Value;

use super::DecodeError;

pub fn decode(raw: &str) -> Result<Value, DecodeError> {
    let region = json_region(raw).ok_or(DecodeError::NoJsonObject)?;
    Ok(serde_json::from_str(region)?)
}

pub fn json_region(raw: &str) -> Option<&str> {
    let body = strip_fences(raw);
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&body[start..=end])
}

fn strip_fences(raw: &str) -> &str {
    let raw = raw.trim();
    let body = if let Some((_, rest)) = raw.split_once("```json") {
        rest
    } else if let Some((_, rest)) = raw.split_once("```") {
        rest
    } else {
        return raw;
    };

    // An unterminated fence still counts, the closing one is often cut off
    body.split_once("```").map_or(body, |(inner, _)| inner).trim()
}

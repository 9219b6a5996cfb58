// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Custom `validator` rules shared by request types.

use validator::ValidationError;

/// Reject strings that are empty once trimmed. Stored names are trimmed, so a
/// whitespace-only value would otherwise be saved as "".
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Metadata columns hold JSON objects only.
pub fn json_object(value: &serde_json::Value) -> Result<(), ValidationError> {
    if !value.is_object() {
        let mut err = ValidationError::new("json_object");
        err.message = Some("must be a JSON object".into());
        return Err(err);
    }
    Ok(())
}

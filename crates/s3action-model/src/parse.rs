//! Action parser.
//!
//! Decoding happens in two steps so the two protocol failures stay distinct:
//! the body is first read as a generic JSON object to find the `@type`
//! discriminator, and only a recognized discriminator is decoded into a
//! [`SemanticAction`]. Business fields (credentials, keys, paths) are not
//! checked here.

use crate::action::SemanticAction;
use crate::error::ActionError;
use crate::operations::ActionType;

/// Parse a JSON-LD action from raw bytes.
///
/// # Errors
///
/// - `MalformedPayload` if the bytes are not a JSON object, `@type` is
///   missing or not a string, or a known field has the wrong shape.
/// - `UnsupportedActionType` if `@type` names an unknown action.
pub fn parse_action(body: &[u8]) -> Result<SemanticAction, ActionError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ActionError::malformed_payload(format!("Failed to parse action: {e}")))?;
    parse_action_value(value)
}

/// Parse a JSON-LD action from an already decoded JSON value.
///
/// # Errors
///
/// Same as [`parse_action`].
pub fn parse_action_value(value: serde_json::Value) -> Result<SemanticAction, ActionError> {
    let Some(fields) = value.as_object() else {
        return Err(ActionError::malformed_payload(
            "Failed to parse action: expected a JSON object",
        ));
    };

    let type_name = match fields.get("@type") {
        Some(serde_json::Value::String(name)) => name,
        Some(_) => {
            return Err(ActionError::malformed_payload(
                "Failed to parse action: @type must be a string",
            ));
        }
        None => {
            return Err(ActionError::malformed_payload(
                "Failed to parse action: missing @type",
            ));
        }
    };

    if ActionType::from_name(type_name).is_none() {
        return Err(ActionError::unsupported_action_type(type_name));
    }

    serde_json::from_value(value)
        .map_err(|e| ActionError::malformed_payload(format!("Failed to parse action: {e}")))
}

//! URL-encoded form bodies

use crate::Error;
use std::collections::HashMap;

/// Parse URL-encoded form data into a HashMap
///
/// Repeated keys keep their last value.
pub fn parse_form_map(body: &[u8]) -> Result<HashMap<String, String>, Error> {
    let form_data: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
        .map_err(|e| Error::BadRequest(format!("Failed to parse form data: {}", e)))?;

    Ok(form_data.into_iter().collect())
}

use serde_json::Value;

use super::error::ApiError;
use crate::pipeline::{BatchRequest, FileInput};

/// Turn a raw JSON body into a [`BatchRequest`].
///
/// `files` that is missing, not an array, or empty is [`ApiError::NoFiles`].
/// Anything else malformed is [`ApiError::InvalidPayload`].
pub fn parse_batch_request(body: &[u8]) -> Result<BatchRequest, ApiError> {
    let value: Value = serde_json::from_slice(body)?;
    let Value::Object(mut fields) = value else {
        return Err(ApiError::InvalidPayload(
            "request body must be a JSON object".to_string(),
        ));
    };

    let entries = match fields.remove("files") {
        Some(Value::Array(entries)) if !entries.is_empty() => entries,
        _ => return Err(ApiError::NoFiles),
    };

    let username = match fields.remove("username") {
        None | Some(Value::Null) => None,
        Some(Value::String(name)) => Some(name),
        Some(_) => {
            return Err(ApiError::InvalidPayload(
                "username must be a string".to_string(),
            ));
        }
    };

    let files = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value::<FileInput>(entry)
                .map_err(|err| ApiError::InvalidPayload(format!("files[{index}]: {err}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BatchRequest { username, files })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<BatchRequest, ApiError> {
        parse_batch_request(body.as_bytes())
    }

    #[test]
    fn missing_or_empty_files() {
        assert!(matches!(parse(r#"{}"#), Err(ApiError::NoFiles)));
        assert!(matches!(parse(r#"{"files": []}"#), Err(ApiError::NoFiles)));
        assert!(matches!(parse(r#"{"files": "a.jpg"}"#), Err(ApiError::NoFiles)));
        assert!(matches!(parse(r#"{"files": null}"#), Err(ApiError::NoFiles)));
    }

    #[test]
    fn missing_files_wins_over_bad_username() {
        assert!(matches!(parse(r#"{"username": 5}"#), Err(ApiError::NoFiles)));
        assert!(matches!(
            parse(r#"{"username": ["bob"], "files": []}"#),
            Err(ApiError::NoFiles)
        ));
    }

    #[test]
    fn malformed_bodies() {
        assert!(matches!(parse("not json"), Err(ApiError::InvalidPayload(_))));
        assert!(matches!(parse("[]"), Err(ApiError::InvalidPayload(_))));
        assert!(matches!(
            parse(r#"{"username": 5, "files": [{"fileBase64": "aGk="}]}"#),
            Err(ApiError::InvalidPayload(_))
        ));
    }

    #[test]
    fn entry_without_payload_names_its_index() {
        let err = parse(r#"{"files": [{"fileBase64": "aGk="}, {"fileName": "b.jpg"}]}"#)
            .unwrap_err();
        assert!(matches!(&err, ApiError::InvalidPayload(msg) if msg.starts_with("files[1]")));
    }

    #[test]
    fn well_formed_request() {
        let request = parse(
            r#"{
                "username": "alice",
                "files": [
                    {"fileBase64": "aGk=", "fileName": "a.jpg", "mimeType": "image/jpeg"},
                    {"fileBase64": "aGk=", "config": {"format": "png"}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(request.username.as_deref(), Some("alice"));
        assert_eq!(request.files.len(), 2);
        assert_eq!(request.files[0].file_name, "a.jpg");
        assert_eq!(
            request.files[1].config.as_ref().and_then(|c| c.format.as_deref()),
            Some("png")
        );
    }
}

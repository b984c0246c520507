//! Canonical JSON encoding of signable documents.
//!
//! The canonical form is the exact byte sequence that is Ed25519-signed and
//! verified: the top-level `signature`/`signatures` fields are removed, and
//! the remaining document is re-encoded compactly with object keys sorted in
//! ascending lexicographic byte order *at every nesting level*. Recursive
//! sorting (rather than top-level only) is the documented signing contract;
//! it is the only ordering that survives a round trip through conforming
//! JSON libraries.

use serde_json::Value;
use thiserror::Error;

/// Error returned when a document cannot be canonically encoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CanonicalError {
    /// The input is not a JSON object (or not parseable as one).
    #[error("signable document must be a JSON object")]
    MalformedDocument,
}

/// Top-level fields stripped before signing. Both spellings occur on the
/// wire: key manifests and revocation lists use `signature`, file-manifest
/// hash entries use `signatures`.
const SIGNATURE_FIELDS: [&str; 2] = ["signature", "signatures"];

/// Canonically encode a signable JSON document.
///
/// # Errors
///
/// Returns [`CanonicalError::MalformedDocument`] if `document` is not a
/// JSON object.
pub fn canonical_encode(document: &Value) -> Result<Vec<u8>, CanonicalError> {
    let Value::Object(map) = document else {
        return Err(CanonicalError::MalformedDocument);
    };

    let mut out = Vec::new();
    out.push(b'{');
    let mut keys: Vec<&String> = map
        .keys()
        .filter(|k| !SIGNATURE_FIELDS.contains(&k.as_str()))
        .collect();
    keys.sort_unstable_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            out.push(b',');
        }
        write_string(key, &mut out);
        out.push(b':');
        if let Some(value) = map.get(key.as_str()) {
            write_value(value, &mut out);
        }
    }
    out.push(b'}');
    Ok(out)
}

/// Parse JSON text and canonically encode it.
///
/// # Errors
///
/// Returns [`CanonicalError::MalformedDocument`] if the text is not valid
/// JSON or not an object.
pub fn canonical_encode_str(text: &str) -> Result<Vec<u8>, CanonicalError> {
    let value: Value =
        serde_json::from_str(text).map_err(|_| CanonicalError::MalformedDocument)?;
    canonical_encode(&value)
}

fn write_value(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Object(map) => {
            out.push(b'{');
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_string(key, out);
                out.push(b':');
                if let Some(value) = map.get(key.as_str()) {
                    write_value(value, out);
                }
            }
            out.push(b'}');
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(item, out);
            }
            out.push(b']');
        }
        // Scalars already have a single compact JSON rendering.
        scalar => {
            // Serializing a scalar Value cannot fail.
            let rendered = serde_json::to_string(scalar).unwrap_or_default();
            out.extend_from_slice(rendered.as_bytes());
        }
    }
}

fn write_string(s: &str, out: &mut Vec<u8>) {
    let rendered = serde_json::to_string(s).unwrap_or_default();
    out.extend_from_slice(rendered.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_signature_and_sorts_top_level() {
        let doc = json!({
            "key": "abc",
            "date": "2024-01-01T00:00:00Z",
            "signature": { "deadbeef": "ff" },
        });
        let bytes = canonical_encode(&doc).unwrap();
        assert_eq!(bytes, br#"{"date":"2024-01-01T00:00:00Z","key":"abc"}"#);
    }

    #[test]
    fn strips_signatures_plural() {
        let doc = json!({ "hash": "aa", "signatures": { "k": "s" } });
        let bytes = canonical_encode(&doc).unwrap();
        assert_eq!(bytes, br#"{"hash":"aa"}"#);
    }

    #[test]
    fn sorts_nested_objects() {
        let doc = json!({ "outer": { "b": 2, "a": 1 }, "list": [{ "z": 0, "a": 0 }] });
        let bytes = canonical_encode(&doc).unwrap();
        assert_eq!(
            bytes,
            br#"{"list":[{"a":0,"z":0}],"outer":{"a":1,"b":2}}"#
        );
    }

    #[test]
    fn output_has_no_insignificant_whitespace() {
        let bytes = canonical_encode_str("{\n  \"b\": [1, 2],\n  \"a\": \"x y\"\n}").unwrap();
        assert_eq!(bytes, br#"{"a":"x y","b":[1,2]}"#);
    }

    #[test]
    fn rejects_non_objects() {
        assert_eq!(
            canonical_encode(&json!([1, 2])),
            Err(CanonicalError::MalformedDocument)
        );
        assert_eq!(
            canonical_encode(&json!("text")),
            Err(CanonicalError::MalformedDocument)
        );
        assert_eq!(
            canonical_encode_str("not json"),
            Err(CanonicalError::MalformedDocument)
        );
    }

    #[test]
    fn encoding_is_stable_across_input_orderings() {
        let a = canonical_encode_str(r#"{"x":1,"y":{"n":[true,null]},"signature":{}}"#).unwrap();
        let b = canonical_encode_str(r#"{"y":{"n":[true,null]},"x":1}"#).unwrap();
        assert_eq!(a, b);
    }
}

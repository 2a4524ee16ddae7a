//! Payload encodings that don't fit plain `serde_json::to_vec`.
//!
//! The backend stores medical conditions and medication as a JSON array
//! serialized into a string field, and the add-food endpoint wants the
//! nutrition object the same way. Image uploads use a one-part
//! `multipart/form-data` body.

use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;

/// Serialize `value` to JSON text, for fields that carry JSON inside a string.
pub fn encode_json_string<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::InvalidData(e.to_string()))
}

pub fn encode_string_list(items: &[String]) -> Result<String, ApiError> {
    encode_json_string(items)
}

/// Decode a string field holding a JSON array of strings. `None` and the
/// empty string both mean an empty list.
pub fn decode_string_list(raw: Option<&str>) -> Result<Vec<String>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(text) => {
            serde_json::from_str(text).map_err(|e| ApiError::DecodingFailure(e.to_string()))
        }
    }
}

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// A `multipart/form-data` body carrying one JPEG under the field `file`.
#[derive(Debug, Clone)]
pub struct MultipartImage {
    pub boundary: String,
    pub body: Vec<u8>,
}

impl MultipartImage {
    /// Wrap already-encoded JPEG bytes. Hosts encode at quality 0.8.
    pub fn jpeg(image: &[u8]) -> Result<Self, ApiError> {
        if image.is_empty() {
            return Err(ApiError::InvalidData("image is empty".to_string()));
        }
        if !image.starts_with(&JPEG_SOI) {
            return Err(ApiError::InvalidData("image is not JPEG encoded".to_string()));
        }
        Ok(Self::with_boundary(Uuid::new_v4().to_string(), image))
    }

    fn with_boundary(boundary: String, image: &[u8]) -> Self {
        let mut body = Vec::with_capacity(image.len() + 256);
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"file\"; filename=\"image.jpg\"\r\n",
        );
        body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
        body.extend_from_slice(image);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        Self { boundary, body }
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

//! `data:<mime>;base64,<payload>` 解码（imghost 模式）

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// 解码后的二进制内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBlob {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DataUriError {
    MissingBase64Marker,
    MissingContentType,
    InvalidPayload(String),
}

impl std::fmt::Display for DataUriError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBase64Marker => write!(f, "value is not a base64 data URI"),
            Self::MissingContentType => write!(f, "data URI has no content type"),
            Self::InvalidPayload(msg) => write!(f, "invalid base64 payload: {}", msg),
        }
    }
}

impl std::error::Error for DataUriError {}

pub fn decode_data_uri(value: &str) -> Result<DecodedBlob, DataUriError> {
    let (header, payload) = value
        .split_once(";base64,")
        .ok_or(DataUriError::MissingBase64Marker)?;

    let content_type = header
        .split_once(':')
        .map(|(_, mime)| mime.trim())
        .filter(|mime| !mime.is_empty())
        .ok_or(DataUriError::MissingContentType)?;

    // 转发的 query string 会被拼接在值后面，解码前去掉
    let payload = payload.split('?').next().unwrap_or_default();

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| DataUriError::InvalidPayload(e.to_string()))?;

    Ok(DecodedBlob {
        content_type: content_type.to_string(),
        bytes,
    })
}

//! Content-related types for the Gemini API.
//!
//! Two layers live here: the wire [`Part`]/[`Content`] shapes serialized to
//! `generateContent`, and the gateway's own [`ContentPart`] which carries raw
//! bytes until the request is sent.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A part of a content message on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Part {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
    /// Inline binary data.
    InlineData {
        /// The inline data blob.
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    /// Any part kind the gateway does not interpret (function calls,
    /// executable code, ...). Kept so responses still deserialize.
    Other(serde_json::Value),
}

impl Part {
    /// Creates a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    /// Returns the text of a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Binary data blob with MIME type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    /// The MIME type of the data.
    pub mime_type: String,
    /// Base64-encoded binary data.
    pub data: String,
}

/// A content message with a role and parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// The role of the content author.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<Role>,
    /// The parts of the content.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Creates a content turn for the given role.
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self {
            role: Some(role),
            parts,
        }
    }
}

/// The role of a message author.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User role.
    User,
    /// Model role.
    Model,
}

/// One unit of request content as composed by the gateway.
///
/// Order within a sequence is the order the model sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// Plain text.
    Text(String),
    /// Raw document bytes with their MIME type.
    InlineBinary {
        /// MIME type of `data`.
        mime_type: String,
        /// Unencoded bytes.
        data: Bytes,
    },
}

impl ContentPart {
    /// Creates a text part.
    pub fn text(value: impl Into<String>) -> Self {
        ContentPart::Text(value.into())
    }

    /// Returns the text of a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text(value) => Some(value),
            ContentPart::InlineBinary { .. } => None,
        }
    }
}

impl From<ContentPart> for Part {
    fn from(part: ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => Part::Text { text },
            ContentPart::InlineBinary { mime_type, data } => Part::InlineData {
                inline_data: Blob {
                    mime_type,
                    data: STANDARD.encode(&data),
                },
            },
        }
    }
}

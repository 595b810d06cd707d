// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scenario file encoding and decoding.
//!
//! A scenario file is a single line of text: the format tag `SCENv1:`
//! followed by the base64 encoding of the document's UTF-8 JSON.

use crate::models::project::{Document, IdOutOfRange};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Literal tag identifying the format and its version.
pub const FORMAT_TAG: &str = "SCENv1:";

/// File extension of scenario files.
pub const FILE_EXTENSION: &str = "scen";

/// Failure to decode a scenario payload.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("not a scenario file (missing SCENv1: tag)")]
    MissingTag,
    #[error("corrupt scenario body: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("scenario body is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("malformed scenario document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed scenario document: {0}")]
    Ids(#[from] IdOutOfRange),
}

/// Encode a document into scenario file text.
pub fn encode(document: &Document) -> Result<String, FormatError> {
    let json = serde_json::to_string(document)?;
    Ok(format!("{}{}", FORMAT_TAG, STANDARD.encode(json)))
}

/// Decode scenario file text into a document.
///
/// The tag is checked before anything else is parsed. Documents whose ids
/// leave no room for new ones are rejected.
pub fn decode(raw: &str) -> Result<Document, FormatError> {
    let body = raw.strip_prefix(FORMAT_TAG).ok_or(FormatError::MissingTag)?;
    let bytes = STANDARD.decode(body.trim_end())?;
    let json = String::from_utf8(bytes)?;
    let document: Document = serde_json::from_str(&json)?;
    document.next_ids()?;
    Ok(document)
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Document Text Extractor Domain Interface
//
// Converts uploaded binary formats to plain text ahead of extraction.

pub trait DocumentExtractor: Send + Sync {
    fn extract_text(&self, content: &[u8]) -> Result<String, DocumentError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("document is not valid UTF-8 text")]
    InvalidEncoding,
}

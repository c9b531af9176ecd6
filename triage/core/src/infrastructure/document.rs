// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Document Extractor
//
// Sniffs the uploaded bytes (content-based, not extension-based) and
// converts what it can to plain text. Binary medical-document formats are
// recognized and rejected with their MIME type so callers can answer with
// a precise unsupported-media error.

use infer::Infer;

use crate::domain::document::{DocumentError, DocumentExtractor};

pub struct SniffingExtractor {
    sniffer: Infer,
}

impl SniffingExtractor {
    pub fn new() -> Self {
        Self {
            sniffer: Infer::new(),
        }
    }
}

impl Default for SniffingExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentExtractor for SniffingExtractor {
    fn extract_text(&self, content: &[u8]) -> Result<String, DocumentError> {
        if let Some(kind) = self.sniffer.get(content) {
            // Any recognized binary container (pdf, docx, images, ...) is
            // out of scope for the plain-text path.
            return Err(DocumentError::UnsupportedFormat(
                kind.mime_type().to_string(),
            ));
        }

        match std::str::from_utf8(content) {
            Ok(text) => Ok(text.to_string()),
            Err(_) => Err(DocumentError::InvalidEncoding),
        }
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod document;
pub mod model;
pub mod notify;
pub mod report;

pub use document::SniffingExtractor;
pub use report::PdfReportRenderer;

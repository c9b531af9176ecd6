// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// PDF Report Renderer
//
// Renders one triage result to a letter-format PDF under the reports
// directory. Layout is a simple line cursor with page breaks; reports are
// archival artifacts, not typeset documents.

use chrono::Utc;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::domain::clinical::{ClinicalSnapshot, RiskAssessment};
use crate::domain::report::{ReportError, ReportRenderer};

const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 7.0;
const WRAP_COLUMNS: usize = 95;

pub struct PdfReportRenderer {
    reports_dir: PathBuf,
}

impl PdfReportRenderer {
    /// Creates the reports directory if it does not exist yet.
    pub fn new(reports_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let reports_dir = reports_dir.into();
        std::fs::create_dir_all(&reports_dir)?;
        Ok(Self { reports_dir })
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }
}

impl ReportRenderer for PdfReportRenderer {
    fn render(
        &self,
        snapshot: &ClinicalSnapshot,
        assessment: &RiskAssessment,
    ) -> Result<PathBuf, ReportError> {
        let (doc, page, layer) =
            PdfDocument::new("Medical Triage Report", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "report");
        let body_font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Render(e.to_string()))?;
        let heading_font = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Render(e.to_string()))?;

        let mut cursor = Cursor {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            y: PAGE_HEIGHT - MARGIN,
        };

        cursor.heading(&heading_font, 16.0, "Medical Triage Report");
        cursor.line(&body_font, &format!("Generated: {}", Utc::now().format("%Y-%m-%d %H:%M UTC")));
        cursor.gap();

        cursor.heading(&heading_font, 13.0, "Risk Assessment");
        cursor.line(&body_font, &format!("Risk Level: {}", assessment.risk_level));
        cursor.wrapped(&body_font, &format!("Explanation: {}", assessment.explanation));
        cursor.gap();

        cursor.heading(&heading_font, 13.0, "Symptoms");
        if snapshot.symptoms.is_empty() {
            cursor.line(&body_font, "None reported");
        }
        for symptom in &snapshot.symptoms {
            cursor.line(
                &body_font,
                &format!("- {} ({:?})", symptom.description, symptom.severity),
            );
        }
        cursor.gap();

        cursor.heading(&heading_font, 13.0, "Vital Signs");
        cursor.line(&body_font, &snapshot.vital_signs.to_string());
        cursor.gap();

        cursor.heading(&heading_font, 13.0, "Medical History");
        if snapshot.medical_history.is_empty() {
            cursor.line(&body_font, "None reported");
        }
        for item in &snapshot.medical_history {
            cursor.line(&body_font, &format!("- {}", item));
        }

        let filename = format!(
            "medical_triage_report_{}_{}.pdf",
            Utc::now().format("%Y%m%d_%H%M%S"),
            &Uuid::new_v4().simple().to_string()[..8]
        );
        let path = self.reports_dir.join(filename);
        let file = File::create(&path)?;
        doc.save(&mut BufWriter::new(file))
            .map_err(|e| ReportError::Render(e.to_string()))?;

        Ok(path)
    }
}

struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl Cursor<'_> {
    fn advance(&mut self) {
        self.y -= LINE_HEIGHT;
        if self.y < MARGIN {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "report");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn heading(&mut self, font: &IndirectFontRef, size: f32, text: &str) {
        self.layer.use_text(text, size, Mm(MARGIN), Mm(self.y), font);
        self.advance();
    }

    fn line(&mut self, font: &IndirectFontRef, text: &str) {
        self.layer.use_text(text, 11.0, Mm(MARGIN), Mm(self.y), font);
        self.advance();
    }

    fn wrapped(&mut self, font: &IndirectFontRef, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        for chunk in chars.chunks(WRAP_COLUMNS) {
            let line: String = chunk.iter().collect();
            self.line(font, &line);
        }
    }

    fn gap(&mut self) {
        self.advance();
    }
}

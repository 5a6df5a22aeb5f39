use std::io::Write;

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::document::{keys, Attributes, Document, Interval, Tier};
use crate::errors::{CollectionKind, ExportError};

// @module: Flattening of parsed documents into two tab-separated tables

/// Column headers of the one-row-per-document table
pub const DOCUMENT_COLUMNS: [&str; 8] = [
    "directory",
    "filename",
    "annotatorId",
    "fileType",
    "objectClass",
    "xmin",
    "xmax",
    "size",
];

/// Column headers of the one-row-per-interval table
pub const INTERVAL_COLUMNS: [&str; 10] = [
    "directory",
    "filename",
    "annotatorId",
    "fileType",
    "tierName",
    "tierIndex",
    "intervalIndex",
    "xmin",
    "xmax",
    "text",
];

/// Caller-supplied identity of the file a document came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub directory: String,
    pub filename: String,
    pub annotator_id: String,
}

impl Identity {
    pub fn new(
        directory: impl Into<String>,
        filename: impl Into<String>,
        annotator_id: impl Into<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            filename: filename.into(),
            annotator_id: annotator_id.into(),
        }
    }
}

/// One row of the document table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRow {
    pub directory: String,
    pub filename: String,
    pub annotator_id: String,
    pub file_type: String,
    pub object_class: String,
    pub xmin: String,
    pub xmax: String,
    pub size: String,
}

impl DocumentRow {
    /// Fields in `DOCUMENT_COLUMNS` order
    pub fn to_fields(&self) -> [&str; 8] {
        [
            self.directory.as_str(),
            self.filename.as_str(),
            self.annotator_id.as_str(),
            self.file_type.as_str(),
            self.object_class.as_str(),
            self.xmin.as_str(),
            self.xmax.as_str(),
            self.size.as_str(),
        ]
    }
}

/// One row of the interval table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalRow {
    pub directory: String,
    pub filename: String,
    pub annotator_id: String,
    /// Taken from the document, not the tier
    pub file_type: String,
    pub tier_name: String,
    pub tier_index: usize,
    pub interval_index: usize,
    pub xmin: String,
    pub xmax: String,
    pub text: String,
}

impl IntervalRow {
    /// Fields in `INTERVAL_COLUMNS` order
    pub fn to_fields(&self) -> [String; 10] {
        [
            self.directory.clone(),
            self.filename.clone(),
            self.annotator_id.clone(),
            self.file_type.clone(),
            self.tier_name.clone(),
            self.tier_index.to_string(),
            self.interval_index.to_string(),
            self.xmin.clone(),
            self.xmax.clone(),
            self.text.clone(),
        ]
    }
}

/// Pure row builders over a parsed `Document`
pub struct TableExporter;

impl TableExporter {
    /// Build the single document-table row
    pub fn document_row(doc: &Document, identity: &Identity) -> Result<DocumentRow, ExportError> {
        let attrs = &doc.attributes;
        Ok(DocumentRow {
            directory: identity.directory.clone(),
            filename: identity.filename.clone(),
            annotator_id: identity.annotator_id.clone(),
            file_type: require(attrs, keys::FILE_TYPE, "document")?,
            object_class: require(attrs, keys::OBJECT_CLASS, "document")?,
            xmin: require(attrs, keys::XMIN, "document")?,
            xmax: require(attrs, keys::XMAX, "document")?,
            size: require(attrs, keys::SIZE, "document")?,
        })
    }

    /// Build one row per interval, tiers 1..=count then intervals 1..=count
    pub fn interval_rows(doc: &Document, identity: &Identity) -> Result<Vec<IntervalRow>, ExportError> {
        let file_type = require(&doc.attributes, keys::FILE_TYPE, "document")?;
        let mut rows = Vec::with_capacity(doc.interval_count());

        for tier_index in 1..=doc.tier_count() {
            let tier = indexed_tier(doc, tier_index)?;
            let tier_name = require(&tier.attributes, keys::NAME, &format!("tier {}", tier_index))?;

            for interval_index in 1..=tier.interval_count() {
                let interval = indexed_interval(tier, tier_index, interval_index)?;
                let context = format!("tier {}, interval {}", tier_index, interval_index);
                rows.push(IntervalRow {
                    directory: identity.directory.clone(),
                    filename: identity.filename.clone(),
                    annotator_id: identity.annotator_id.clone(),
                    file_type: file_type.clone(),
                    tier_name: tier_name.clone(),
                    tier_index,
                    interval_index,
                    xmin: require(&interval.attributes, keys::XMIN, &context)?,
                    xmax: require(&interval.attributes, keys::XMAX, &context)?,
                    text: require(&interval.attributes, keys::TEXT, &context)?,
                });
            }
        }

        Ok(rows)
    }

    /// Log declared counts that disagree with what was parsed
    pub fn check_declared_counts(doc: &Document) {
        if let Some(declared) = doc.attributes.get(keys::SIZE) {
            if declared.parse::<usize>().ok() != Some(doc.tier_count()) {
                warn!("Document declares size = {} but has {} tiers", declared, doc.tier_count());
            }
        }
        for (index, tier) in &doc.tiers {
            if let Some(declared) = tier.declared_interval_count {
                if declared != tier.interval_count() {
                    warn!(
                        "Tier {} declares {} intervals but has {}",
                        index,
                        declared,
                        tier.interval_count()
                    );
                }
            }
        }
    }
}

fn require(attrs: &Attributes, field: &str, context: &str) -> Result<String, ExportError> {
    attrs
        .get(field)
        .map(str::to_string)
        .ok_or_else(|| ExportError::MissingField {
            field: field.to_string(),
            context: context.to_string(),
        })
}

fn indexed_tier(doc: &Document, index: usize) -> Result<&Tier, ExportError> {
    doc.tier(index).ok_or(ExportError::MissingIndex {
        collection: CollectionKind::Tiers,
        index,
    })
}

fn indexed_interval(tier: &Tier, tier_index: usize, index: usize) -> Result<&Interval, ExportError> {
    tier.interval(index).ok_or(ExportError::MissingIndex {
        collection: CollectionKind::Intervals { tier: tier_index },
        index,
    })
}

/// The two growing output tables
#[derive(Debug, Default, Clone)]
pub struct TableSet {
    pub documents: Vec<DocumentRow>,
    pub intervals: Vec<IntervalRow>,
}

impl TableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append all rows for one document. Nothing is appended if any row fails.
    pub fn append(&mut self, doc: &Document, identity: &Identity) -> Result<(), ExportError> {
        TableExporter::check_declared_counts(doc);
        let document_row = TableExporter::document_row(doc, identity)?;
        let mut interval_rows = TableExporter::interval_rows(doc, identity)?;

        debug!(
            "Appending {} with {} interval rows",
            identity.filename,
            interval_rows.len()
        );
        self.documents.push(document_row);
        self.intervals.append(&mut interval_rows);
        Ok(())
    }

    /// Write the document table with its header row
    pub fn write_documents_tsv<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_record(writer, &DOCUMENT_COLUMNS)?;
        for row in &self.documents {
            write_record(writer, &row.to_fields())?;
        }
        writer.flush().context("Failed to flush document table")?;
        Ok(())
    }

    /// Write the interval table with its header row
    pub fn write_intervals_tsv<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_record(writer, &INTERVAL_COLUMNS)?;
        for row in &self.intervals {
            write_record(writer, &row.to_fields())?;
        }
        writer.flush().context("Failed to flush interval table")?;
        Ok(())
    }
}

/// Replace characters that would break a tab-separated record
pub fn sanitize_field(field: &str) -> String {
    field.replace("\r\n", " ").replace(['\t', '\r', '\n'], " ")
}

fn write_record<W: Write, S: AsRef<str>>(writer: &mut W, fields: &[S]) -> Result<()> {
    let line = fields
        .iter()
        .map(|f| sanitize_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join("\t");
    writeln!(writer, "{}", line).context("Failed to write table record")?;
    Ok(())
}

//! Quote/invoice documents.
//!
//! Builds the payload a document service consumes and renders it through a
//! template. Turning the rendered page into a PDF is left to whatever opens it.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use slug::slugify;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use thiserror::Error;
use tracing::info;

use crate::model::Quote;
use crate::store::{EntityId, Record};

// Embed template at compile time so rendering never depends on the working directory
const DEFAULT_TEMPLATE: &str = include_str!("../templates/quote.html.tera");
const TEMPLATE_NAME: &str = "quote.html";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Quote,
    Invoice,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Quote, DocumentKind::Invoice];

    fn prefix(self) -> &'static str {
        match self {
            DocumentKind::Quote => "DEV",
            DocumentKind::Invoice => "INV",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            DocumentKind::Quote => "Quote",
            DocumentKind::Invoice => "Invoice",
        }
    }

    /// `DEV-007` / `INV-007`.
    pub fn number(self, id: EntityId) -> String {
        format!("{}-{:03}", self.prefix(), id)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteDocument {
    pub number: String,
    pub kind: DocumentKind,
    pub client: String,
    pub date: NaiveDate,
    pub currency: String,
    pub items: Vec<LineItem>,
    pub subtotal: i64,
    pub total: i64,
}

impl QuoteDocument {
    /// One line carrying the whole amount. Prices are whole currency units;
    /// cents are dropped.
    pub fn from_quote(record: &Record<Quote>, kind: DocumentKind, currency: &str) -> Self {
        let price = record.data.amount.trunc() as i64;
        QuoteDocument {
            number: kind.number(record.id),
            kind,
            client: record.data.client.clone(),
            date: record.data.date,
            currency: currency.to_string(),
            items: vec![LineItem {
                description: record.data.description.clone(),
                quantity: 1,
                unit_price: price,
                total: price,
            }],
            subtotal: price,
            total: price,
        }
    }
}

pub trait DocumentRenderer {
    fn render(&self, document: &QuoteDocument) -> Result<String, DocumentError>;

    fn extension(&self) -> &'static str;
}

pub struct TeraRenderer {
    tera: Tera,
}

impl TeraRenderer {
    pub fn new() -> Result<Self, DocumentError> {
        Self::with_template(DEFAULT_TEMPLATE)
    }

    pub fn with_template(source: &str) -> Result<Self, DocumentError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, source)?;
        Ok(TeraRenderer { tera })
    }
}

impl DocumentRenderer for TeraRenderer {
    fn render(&self, document: &QuoteDocument) -> Result<String, DocumentError> {
        let mut context = Context::from_serialize(document)?;
        context.insert("title", document.kind.title());
        context.insert("date_display", &document.date.format("%d/%m/%Y").to_string());
        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }

    fn extension(&self) -> &'static str {
        "html"
    }
}

/// Renders `document` to `<root>/<year>/<client-slug>/<number>.<ext>`.
pub fn write_document(
    root: &Path,
    document: &QuoteDocument,
    renderer: &dyn DocumentRenderer,
) -> Result<PathBuf, DocumentError> {
    let rendered = renderer.render(document)?;

    let output_dir = root
        .join(document.date.year().to_string())
        .join(slugify(&document.client));
    fs::create_dir_all(&output_dir).map_err(|source| DocumentError::Io {
        path: output_dir.clone(),
        source,
    })?;

    let path = output_dir.join(format!("{}.{}", document.number, renderer.extension()));
    fs::write(&path, rendered).map_err(|source| DocumentError::Io {
        path: path.clone(),
        source,
    })?;

    info!(number = %document.number, path = %path.display(), "document written");
    Ok(path)
}

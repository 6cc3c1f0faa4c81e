//! Publication domain model.
//!
//! # Responsibility
//! - Define the publication record and its type enumeration.
//! - Validate bibliographic identifiers (DOI, ISSN, ISBN) and per-type
//!   required fields.
//!
//! # Invariants
//! - `owner_id` names the author-of-record and never changes.
//! - Content edits keep `id`, `created_at` and `validation`.

use crate::model::form::FormErrors;
use crate::model::record::{non_blank, Collection, Record, RecordId, WorkRecord};
use crate::model::user::Actor;
use crate::model::validation::ValidationFlag;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

static DOI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^10\.\d{4,}/").expect("valid doi regex"));
static ISSN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{3}[\dX]$").expect("valid issn regex"));
static ISBN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(978|979)\d{2,18}$").expect("valid isbn regex"));

const MIN_YEAR: i32 = 1900;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationType {
    Article,
    Book,
    BookChapter,
    ConferencePaper,
    JournalArticle,
    Editorial,
    Review,
}

impl PublicationType {
    pub const ALL: [PublicationType; 7] = [
        Self::Article,
        Self::Book,
        Self::BookChapter,
        Self::ConferencePaper,
        Self::JournalArticle,
        Self::Editorial,
        Self::Review,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Book => "book",
            Self::BookChapter => "book_chapter",
            Self::ConferencePaper => "conference_paper",
            Self::JournalArticle => "journal_article",
            Self::Editorial => "editorial",
            Self::Review => "review",
        }
    }
}

impl FromStr for PublicationType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value.trim())
            .ok_or_else(|| format!("unknown publication type `{value}`"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub id: RecordId,
    pub owner_id: RecordId,
    pub owner_name: String,
    pub title: String,
    /// Comma-separated author list as typed by the owner.
    pub authors: String,
    #[serde(rename = "type")]
    pub kind: PublicationType,
    pub year: i32,
    pub journal: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub doi: Option<String>,
    pub issn: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub indexing: Option<String>,
    pub quartile: Option<String>,
    pub impact_factor: Option<f64>,
    pub abstract_text: Option<String>,
    pub keywords: Option<String>,
    pub language: String,
    pub country: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub validation: ValidationFlag,
}

impl Record for Publication {
    const COLLECTION: Collection = Collection::Publications;

    fn id(&self) -> RecordId {
        self.id
    }
}

impl WorkRecord for Publication {
    fn owner_id(&self) -> RecordId {
        self.owner_id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn validation(&self) -> &ValidationFlag {
        &self.validation
    }

    fn validation_mut(&mut self) -> &mut ValidationFlag {
        &mut self.validation
    }
}

impl Publication {
    /// Creates an unvalidated publication owned by `owner`.
    pub fn from_draft(id: RecordId, owner: &Actor, draft: PublicationDraft, now_ms: i64) -> Self {
        let mut publication = Self {
            id,
            owner_id: owner.user_id,
            owner_name: owner.display_name.clone(),
            title: String::new(),
            authors: String::new(),
            kind: draft.kind,
            year: draft.year,
            journal: None,
            volume: None,
            issue: None,
            pages: None,
            doi: None,
            issn: None,
            isbn: None,
            publisher: None,
            indexing: None,
            quartile: None,
            impact_factor: None,
            abstract_text: None,
            keywords: None,
            language: String::new(),
            country: None,
            created_at: now_ms,
            updated_at: now_ms,
            validation: ValidationFlag::Unset,
        };
        publication.apply_draft(draft, now_ms);
        publication
    }

    /// Replaces all content fields. Identity, ownership, creation time and
    /// validation are kept.
    pub fn apply_draft(&mut self, draft: PublicationDraft, now_ms: i64) {
        self.title = draft.title.trim().to_string();
        self.authors = draft.authors.trim().to_string();
        self.kind = draft.kind;
        self.year = draft.year;
        self.journal = non_blank(draft.journal);
        self.volume = non_blank(draft.volume);
        self.issue = non_blank(draft.issue);
        self.pages = non_blank(draft.pages);
        self.doi = non_blank(draft.doi);
        self.issn = non_blank(draft.issn);
        self.isbn = non_blank(draft.isbn);
        self.publisher = non_blank(draft.publisher);
        self.indexing = non_blank(draft.indexing);
        self.quartile = non_blank(draft.quartile);
        self.impact_factor = draft.impact_factor;
        self.abstract_text = non_blank(draft.abstract_text);
        self.keywords = non_blank(draft.keywords);
        self.language = draft.language.trim().to_string();
        self.country = non_blank(draft.country);
        self.updated_at = now_ms;
    }
}

/// Owner-editable publication content.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicationDraft {
    pub title: String,
    pub authors: String,
    pub kind: PublicationType,
    pub year: i32,
    pub journal: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub doi: Option<String>,
    pub issn: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub indexing: Option<String>,
    pub quartile: Option<String>,
    pub impact_factor: Option<f64>,
    pub abstract_text: Option<String>,
    pub keywords: Option<String>,
    pub language: String,
    pub country: Option<String>,
}

impl PublicationDraft {
    /// Minimal draft with every optional field empty.
    pub fn new(
        title: impl Into<String>,
        authors: impl Into<String>,
        kind: PublicationType,
        year: i32,
        language: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            authors: authors.into(),
            kind,
            year,
            journal: None,
            volume: None,
            issue: None,
            pages: None,
            doi: None,
            issn: None,
            isbn: None,
            publisher: None,
            indexing: None,
            quartile: None,
            impact_factor: None,
            abstract_text: None,
            keywords: None,
            language: language.into(),
            country: None,
        }
    }

    /// Checks required fields and identifier formats.
    ///
    /// `current_year` bounds the accepted year range (`1900..=current_year + 1`).
    pub fn validate(&self, current_year: i32) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        errors.require("title", &self.title, "title is required");
        errors.require("authors", &self.authors, "authors are required");
        errors.require("language", &self.language, "language is required");

        if self.year < MIN_YEAR || self.year > current_year + 1 {
            errors.add(
                "year",
                format!("year must be between {MIN_YEAR} and {}", current_year + 1),
            );
        }

        let blank = |value: &Option<String>| value.as_deref().map_or(true, |v| v.trim().is_empty());
        if self.kind == PublicationType::Article && blank(&self.journal) {
            errors.add("journal", "journal is required for articles");
        }
        if self.kind == PublicationType::Book && blank(&self.publisher) {
            errors.add("publisher", "publisher is required for books");
        }

        if let Some(doi) = self.doi.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            if !DOI_RE.is_match(doi) {
                errors.add("doi", "DOI must start with `10.` followed by a registrant code");
            }
        }
        if let Some(issn) = self.issn.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            if !ISSN_RE.is_match(issn) {
                errors.add("issn", "ISSN must follow the XXXX-XXXX format");
            }
        }
        if let Some(isbn) = self.isbn.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            if !ISBN_RE.is_match(&isbn.replace('-', "")) {
                errors.add("isbn", "ISBN must start with 978 or 979");
            }
        }
        if let Some(factor) = self.impact_factor {
            if !factor.is_finite() || factor < 0.0 {
                errors.add("impact_factor", "impact factor must be a non-negative number");
            }
        }

        errors.into_result()
    }
}

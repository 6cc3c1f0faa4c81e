//! Linear-scan filter engine.
//!
//! # Responsibility
//! - Compile `FilterCriteria` against a record type's declared fields.
//! - Apply compiled criteria to a slice, keeping relative order.
//!
//! # Invariants
//! - Text matching is case-insensitive substring; enum matching is exact.
//! - Date fields match a `Year` criterion on their year component.
//! - A record whose field is absent never matches a non-blank criterion.
//! - Unknown fields and criterion/field kind mismatches are rejected up
//!   front, before any record is inspected.

use crate::model::date::CalendarDate;
use std::borrow::Cow;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// How a field may be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text: `Contains` and `Equals`.
    Text,
    /// Snake_case enumeration value: `Equals`.
    Enum,
    /// Calendar date: `Year`.
    Date,
    /// Integer year: `Year` and `Equals`.
    Year,
    /// Integer (ids): `Equals`.
    Number,
}

impl FieldKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Enum => "enum",
            Self::Date => "date",
            Self::Year => "year",
            Self::Number => "number",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// Field value as seen by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Enum(&'a str),
    Date(CalendarDate),
    Year(i32),
    Number(i64),
}

/// Record types the engine can filter.
pub trait Filterable {
    /// Every field addressable by name in `FilterCriteria`.
    const FIELDS: &'static [FieldSpec];
    /// Text fields covered by the free-text search term.
    const SEARCH_FIELDS: &'static [&'static str];

    /// Returns the value of a declared field, or `None` when unset.
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Case-insensitive substring.
    Contains(String),
    /// Exact match against the field's wire value.
    Equals(String),
    /// Year equality; dates are reduced to their year.
    Year(i32),
}

impl Criterion {
    fn name(&self) -> &'static str {
        match self {
            Self::Contains(_) => "contains",
            Self::Equals(_) => "equals",
            Self::Year(_) => "year",
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            Self::Contains(value) | Self::Equals(value) => value.trim().is_empty(),
            Self::Year(_) => false,
        }
    }
}

/// Field criteria plus an optional free-text search term.
///
/// A field may appear once; setting it again replaces the previous
/// criterion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    search: Option<String>,
    fields: Vec<(String, Criterion)>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn contains(self, field: impl Into<String>, text: impl Into<String>) -> Self {
        self.with(field, Criterion::Contains(text.into()))
    }

    pub fn equals(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(field, Criterion::Equals(value.into()))
    }

    pub fn year(self, field: impl Into<String>, year: i32) -> Self {
        self.with(field, Criterion::Year(year))
    }

    pub fn with(mut self, field: impl Into<String>, criterion: Criterion) -> Self {
        let field = field.into();
        self.fields.retain(|(name, _)| *name != field);
        self.fields.push((field, criterion));
        self
    }

    /// True when no criterion would exclude any record.
    pub fn is_empty(&self) -> bool {
        self.search
            .as_deref()
            .map_or(true, |text| text.trim().is_empty())
            && self.fields.iter().all(|(_, criterion)| criterion.is_blank())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    UnknownField(String),
    UnsupportedCriterion {
        field: String,
        kind: &'static str,
        criterion: &'static str,
    },
    InvalidValue {
        field: String,
        value: String,
    },
}

impl Display for FilterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownField(field) => write!(f, "unknown filter field `{field}`"),
            Self::UnsupportedCriterion {
                field,
                kind,
                criterion,
            } => write!(
                f,
                "criterion `{criterion}` is not supported on {kind} field `{field}`"
            ),
            Self::InvalidValue { field, value } => {
                write!(f, "invalid value `{value}` for field `{field}`")
            }
        }
    }
}

impl Error for FilterError {}

enum Matcher {
    Contains(String),
    EqualsText(String),
    EqualsNumber(i64),
    Year(i32),
}

struct CompiledCriteria {
    search: Option<String>,
    fields: Vec<(&'static str, Matcher)>,
}

/// Returns references to matching records, in input order.
pub fn filter_records<'a, T: Filterable>(
    records: &'a [T],
    criteria: &FilterCriteria,
) -> Result<Vec<&'a T>, FilterError> {
    let compiled = compile::<T>(criteria)?;
    Ok(records
        .iter()
        .filter(|record| compiled.matches(*record))
        .collect())
}

/// Owned variant of [`filter_records`].
pub fn filter_owned<T: Filterable>(
    mut records: Vec<T>,
    criteria: &FilterCriteria,
) -> Result<Vec<T>, FilterError> {
    let compiled = compile::<T>(criteria)?;
    records.retain(|record| compiled.matches(record));
    Ok(records)
}

fn compile<T: Filterable>(criteria: &FilterCriteria) -> Result<CompiledCriteria, FilterError> {
    let search = criteria
        .search
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_lowercase);

    let mut fields = Vec::with_capacity(criteria.fields.len());
    for (name, criterion) in &criteria.fields {
        let spec = T::FIELDS
            .iter()
            .find(|spec| spec.name == name.as_str())
            .ok_or_else(|| FilterError::UnknownField(name.clone()))?;
        if criterion.is_blank() {
            continue;
        }
        fields.push((spec.name, compile_criterion(spec, criterion)?));
    }

    Ok(CompiledCriteria { search, fields })
}

fn compile_criterion(spec: &FieldSpec, criterion: &Criterion) -> Result<Matcher, FilterError> {
    let unsupported = || FilterError::UnsupportedCriterion {
        field: spec.name.to_string(),
        kind: spec.kind.as_str(),
        criterion: criterion.name(),
    };
    let parse_number = |value: &str| {
        value
            .trim()
            .parse::<i64>()
            .map_err(|_| FilterError::InvalidValue {
                field: spec.name.to_string(),
                value: value.to_string(),
            })
    };

    match (criterion, spec.kind) {
        (Criterion::Contains(text), FieldKind::Text) => {
            Ok(Matcher::Contains(text.trim().to_lowercase()))
        }
        (Criterion::Equals(value), FieldKind::Text | FieldKind::Enum) => {
            Ok(Matcher::EqualsText(value.trim().to_string()))
        }
        (Criterion::Equals(value), FieldKind::Number | FieldKind::Year) => {
            Ok(Matcher::EqualsNumber(parse_number(value)?))
        }
        (Criterion::Year(year), FieldKind::Date | FieldKind::Year) => Ok(Matcher::Year(*year)),
        _ => Err(unsupported()),
    }
}

impl CompiledCriteria {
    fn matches<T: Filterable>(&self, record: &T) -> bool {
        if let Some(needle) = self.search.as_deref() {
            let hit = T::SEARCH_FIELDS.iter().any(|name| match record.field(name) {
                Some(FieldValue::Text(text)) => text.to_lowercase().contains(needle),
                _ => false,
            });
            if !hit {
                return false;
            }
        }

        self.fields
            .iter()
            .all(|(name, matcher)| match record.field(name) {
                Some(value) => matcher.matches(&value),
                None => false,
            })
    }
}

impl Matcher {
    fn matches(&self, value: &FieldValue<'_>) -> bool {
        match (self, value) {
            (Self::Contains(needle), FieldValue::Text(text)) => {
                text.to_lowercase().contains(needle.as_str())
            }
            (Self::EqualsText(expected), FieldValue::Text(text)) => text.trim() == expected.as_str(),
            (Self::EqualsText(expected), FieldValue::Enum(value)) => *value == expected.as_str(),
            (Self::EqualsNumber(expected), FieldValue::Number(value)) => value == expected,
            (Self::EqualsNumber(expected), FieldValue::Year(year)) => i64::from(*year) == *expected,
            (Self::Year(expected), FieldValue::Date(date)) => date.year() == *expected,
            (Self::Year(expected), FieldValue::Year(year)) => year == expected,
            _ => false,
        }
    }
}

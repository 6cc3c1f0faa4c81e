//! Filterable field declarations for users, publications and projects.

use crate::model::project::Project;
use crate::model::publication::Publication;
use crate::model::user::User;
use crate::search::filter::{FieldKind, FieldSpec, FieldValue, Filterable};
use std::borrow::Cow;

fn text(value: &str) -> Option<FieldValue<'_>> {
    Some(FieldValue::Text(Cow::Borrowed(value)))
}

fn optional_text(value: &Option<String>) -> Option<FieldValue<'_>> {
    value.as_deref().and_then(text)
}

fn flag(value: bool) -> Option<FieldValue<'static>> {
    Some(FieldValue::Enum(if value { "true" } else { "false" }))
}

impl Filterable for User {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", FieldKind::Number),
        FieldSpec::new("name", FieldKind::Text),
        FieldSpec::new("first_names", FieldKind::Text),
        FieldSpec::new("last_names", FieldKind::Text),
        FieldSpec::new("national_id", FieldKind::Text),
        FieldSpec::new("email", FieldKind::Text),
        FieldSpec::new("role", FieldKind::Enum),
        FieldSpec::new("faculty", FieldKind::Text),
        FieldSpec::new("specialty", FieldKind::Text),
        FieldSpec::new("research_line", FieldKind::Text),
        FieldSpec::new("active", FieldKind::Enum),
    ];
    const SEARCH_FIELDS: &'static [&'static str] = &["first_names", "last_names", "email"];

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Number(self.id)),
            "name" => Some(FieldValue::Text(Cow::Owned(self.full_name()))),
            "first_names" => text(&self.first_names),
            "last_names" => text(&self.last_names),
            "national_id" => text(&self.national_id),
            "email" => text(&self.email),
            "role" => Some(FieldValue::Enum(self.role.as_str())),
            "faculty" => text(&self.faculty),
            "specialty" => optional_text(&self.specialty),
            "research_line" => optional_text(&self.research_line),
            "active" => flag(self.active),
            _ => None,
        }
    }
}

impl Filterable for Publication {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", FieldKind::Number),
        FieldSpec::new("owner_id", FieldKind::Number),
        FieldSpec::new("owner_name", FieldKind::Text),
        FieldSpec::new("title", FieldKind::Text),
        FieldSpec::new("authors", FieldKind::Text),
        FieldSpec::new("type", FieldKind::Enum),
        FieldSpec::new("year", FieldKind::Year),
        FieldSpec::new("journal", FieldKind::Text),
        FieldSpec::new("doi", FieldKind::Text),
        FieldSpec::new("indexing", FieldKind::Text),
        FieldSpec::new("quartile", FieldKind::Text),
        FieldSpec::new("keywords", FieldKind::Text),
        FieldSpec::new("language", FieldKind::Text),
        FieldSpec::new("country", FieldKind::Text),
        FieldSpec::new("validation", FieldKind::Enum),
    ];
    const SEARCH_FIELDS: &'static [&'static str] =
        &["title", "authors", "owner_name", "journal", "doi", "keywords"];

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Number(self.id)),
            "owner_id" => Some(FieldValue::Number(self.owner_id)),
            "owner_name" => text(&self.owner_name),
            "title" => text(&self.title),
            "authors" => text(&self.authors),
            "type" => Some(FieldValue::Enum(self.kind.as_str())),
            "year" => Some(FieldValue::Year(self.year)),
            "journal" => optional_text(&self.journal),
            "doi" => optional_text(&self.doi),
            "indexing" => optional_text(&self.indexing),
            "quartile" => optional_text(&self.quartile),
            "keywords" => optional_text(&self.keywords),
            "language" => text(&self.language),
            "country" => optional_text(&self.country),
            "validation" => Some(FieldValue::Enum(self.validation.status())),
            _ => None,
        }
    }
}

impl Filterable for Project {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", FieldKind::Number),
        FieldSpec::new("owner_id", FieldKind::Number),
        FieldSpec::new("owner_name", FieldKind::Text),
        FieldSpec::new("owner_role", FieldKind::Enum),
        FieldSpec::new("name", FieldKind::Text),
        FieldSpec::new("type", FieldKind::Enum),
        FieldSpec::new("status", FieldKind::Enum),
        FieldSpec::new("lead_author", FieldKind::Text),
        FieldSpec::new("tutor", FieldKind::Text),
        FieldSpec::new("keywords", FieldKind::Text),
        FieldSpec::new("faculty", FieldKind::Text),
        FieldSpec::new("start_date", FieldKind::Date),
        FieldSpec::new("end_date", FieldKind::Date),
        FieldSpec::new("validation", FieldKind::Enum),
    ];
    const SEARCH_FIELDS: &'static [&'static str] =
        &["name", "lead_author", "owner_name", "tutor", "keywords"];

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => Some(FieldValue::Number(self.id)),
            "owner_id" => Some(FieldValue::Number(self.owner_id)),
            "owner_name" => text(&self.owner_name),
            "owner_role" => Some(FieldValue::Enum(self.owner_role.as_str())),
            "name" => text(&self.name),
            "type" => Some(FieldValue::Enum(self.kind.as_str())),
            "status" => Some(FieldValue::Enum(self.status.as_str())),
            "lead_author" => text(&self.lead_author),
            "tutor" => optional_text(&self.tutor),
            "keywords" => optional_text(&self.keywords),
            "faculty" => optional_text(&self.faculty),
            "start_date" => Some(FieldValue::Date(self.start_date)),
            "end_date" => self.end_date.map(FieldValue::Date),
            "validation" => Some(FieldValue::Enum(self.validation.status())),
            _ => None,
        }
    }
}

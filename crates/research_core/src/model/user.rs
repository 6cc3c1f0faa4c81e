//! User domain model.
//!
//! # Responsibility
//! - Define user identity, role and profile attributes.
//! - Own registration field rules (names, national id, email, phone).
//!
//! # Invariants
//! - `email` is stored trimmed and lowercased.
//! - `national_id` is exactly ten ASCII digits.
//! - `id` and `registered_at` never change after creation.

use crate::model::form::FormErrors;
use crate::model::record::{non_blank, Collection, Record, RecordId};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{L}\s]+$").expect("valid name regex"));
static NATIONAL_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{10}$").expect("valid national id regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^09\d{8}$").expect("valid phone regex"));
static ORCID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{4}-\d{4}-\d{3}[\dX]$").expect("valid orcid regex"));

/// Fixed role enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Lecturer,
    Researcher,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Self::Student, Self::Lecturer, Self::Researcher, Self::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Lecturer => "lecturer",
            Self::Researcher => "researcher",
            Self::Admin => "admin",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == value.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown role `{value}`"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub first_names: String,
    pub last_names: String,
    /// Ten-digit national identity number.
    pub national_id: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub faculty: String,
    pub specialty: Option<String>,
    pub academic_degree: Option<String>,
    pub research_line: Option<String>,
    pub biography: Option<String>,
    pub orcid: Option<String>,
    /// Inactive users are kept but hidden from directories.
    #[serde(default = "default_active")]
    pub active: bool,
    pub registered_at: i64,
    pub updated_at: i64,
}

fn default_active() -> bool {
    true
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;

    fn id(&self) -> RecordId {
        self.id
    }
}

impl User {
    /// Builds a new user from validated draft input.
    pub fn from_draft(id: RecordId, draft: UserDraft, now_ms: i64) -> Self {
        Self {
            id,
            first_names: draft.first_names.trim().to_string(),
            last_names: draft.last_names.trim().to_string(),
            national_id: draft.national_id.trim().to_string(),
            email: normalize_email(&draft.email),
            phone: draft.phone.trim().to_string(),
            role: draft.role,
            faculty: draft.faculty.trim().to_string(),
            specialty: non_blank(draft.specialty),
            academic_degree: None,
            research_line: None,
            biography: None,
            orcid: None,
            active: true,
            registered_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Overwrites identity fields from an admin edit, keeping id, profile
    /// extras and `registered_at`.
    pub fn apply_draft(&mut self, draft: UserDraft, now_ms: i64) {
        self.first_names = draft.first_names.trim().to_string();
        self.last_names = draft.last_names.trim().to_string();
        self.national_id = draft.national_id.trim().to_string();
        self.email = normalize_email(&draft.email);
        self.phone = draft.phone.trim().to_string();
        self.role = draft.role;
        self.faculty = draft.faculty.trim().to_string();
        self.specialty = non_blank(draft.specialty);
        self.updated_at = now_ms;
    }

    /// Applies self-service profile edits. Fields left `None` are unchanged;
    /// `Some("")` clears an optional attribute.
    pub fn apply_profile(&mut self, patch: ProfilePatch, now_ms: i64) {
        if let Some(first_names) = patch.first_names {
            self.first_names = first_names.trim().to_string();
        }
        if let Some(last_names) = patch.last_names {
            self.last_names = last_names.trim().to_string();
        }
        if let Some(phone) = patch.phone {
            self.phone = phone.trim().to_string();
        }
        if let Some(faculty) = patch.faculty {
            self.faculty = faculty.trim().to_string();
        }
        if patch.specialty.is_some() {
            self.specialty = non_blank(patch.specialty);
        }
        if patch.academic_degree.is_some() {
            self.academic_degree = non_blank(patch.academic_degree);
        }
        if patch.research_line.is_some() {
            self.research_line = non_blank(patch.research_line);
        }
        if patch.biography.is_some() {
            self.biography = non_blank(patch.biography);
        }
        if patch.orcid.is_some() {
            self.orcid = non_blank(patch.orcid);
        }
        self.updated_at = now_ms;
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_names, self.last_names)
    }

    /// Checks stored fields against registration rules plus profile extras.
    pub fn validate(&self, institutional_domains: &[String]) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        check_identity_fields(
            &mut errors,
            &IdentityFields {
                first_names: &self.first_names,
                last_names: &self.last_names,
                national_id: &self.national_id,
                email: &self.email,
                phone: &self.phone,
                faculty: &self.faculty,
            },
            institutional_domains,
        );
        if let Some(orcid) = self.orcid.as_deref() {
            if !ORCID_RE.is_match(orcid) {
                errors.add("orcid", "ORCID must look like 0000-0000-0000-000X");
            }
        }
        errors.into_result()
    }
}

/// Input for registration and admin create/update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub first_names: String,
    pub last_names: String,
    pub national_id: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub faculty: String,
    pub specialty: Option<String>,
}

impl UserDraft {
    pub fn validate(&self, institutional_domains: &[String]) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        check_identity_fields(
            &mut errors,
            &IdentityFields {
                first_names: &self.first_names,
                last_names: &self.last_names,
                national_id: &self.national_id,
                email: &self.email,
                phone: &self.phone,
                faculty: &self.faculty,
            },
            institutional_domains,
        );
        errors.into_result()
    }
}

/// Self-service profile edit. Email, national id and role are not editable
/// here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub first_names: Option<String>,
    pub last_names: Option<String>,
    pub phone: Option<String>,
    pub faculty: Option<String>,
    pub specialty: Option<String>,
    pub academic_degree: Option<String>,
    pub research_line: Option<String>,
    pub biography: Option<String>,
    pub orcid: Option<String>,
}

/// Identity of whoever performs an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: RecordId,
    pub display_name: String,
    pub role: Role,
}

impl Actor {
    /// Local operator with direct database access (id `0`, admin role).
    pub fn operator(display_name: impl Into<String>) -> Self {
        Self {
            user_id: 0,
            display_name: display_name.into(),
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            display_name: user.full_name(),
            role: user.role,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

struct IdentityFields<'a> {
    first_names: &'a str,
    last_names: &'a str,
    national_id: &'a str,
    email: &'a str,
    phone: &'a str,
    faculty: &'a str,
}

fn check_identity_fields(
    errors: &mut FormErrors,
    fields: &IdentityFields<'_>,
    institutional_domains: &[String],
) {
    check_name(errors, "first_names", fields.first_names);
    check_name(errors, "last_names", fields.last_names);

    let national_id = fields.national_id.trim();
    if national_id.is_empty() {
        errors.add("national_id", "national id is required");
    } else if !NATIONAL_ID_RE.is_match(national_id) {
        errors.add("national_id", "national id must have exactly 10 digits");
    }

    let email = normalize_email(fields.email);
    if email.is_empty() {
        errors.add("email", "email is required");
    } else if !EMAIL_RE.is_match(&email) {
        errors.add("email", "email is not valid");
    } else if !is_institutional(&email, institutional_domains) {
        errors.add(
            "email",
            format!(
                "email must use an institutional domain ({})",
                institutional_domains.join(", ")
            ),
        );
    }

    let phone = fields.phone.trim();
    if phone.is_empty() {
        errors.add("phone", "phone is required");
    } else if !PHONE_RE.is_match(phone) {
        errors.add("phone", "phone must follow the 09xxxxxxxx format");
    }

    errors.require("faculty", fields.faculty, "faculty is required");
}

fn check_name(errors: &mut FormErrors, field: &'static str, value: &str) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, "name is required");
    } else if trimmed.chars().count() < 2 {
        errors.add(field, "name must have at least 2 characters");
    } else if !NAME_RE.is_match(trimmed) {
        errors.add(field, "name may only contain letters and spaces");
    }
}

/// An empty domain list accepts any well-formed email.
fn is_institutional(email: &str, domains: &[String]) -> bool {
    if domains.is_empty() {
        return true;
    }
    let Some((_, host)) = email.rsplit_once('@') else {
        return false;
    };
    domains
        .iter()
        .any(|domain| host.eq_ignore_ascii_case(domain.trim()))
}

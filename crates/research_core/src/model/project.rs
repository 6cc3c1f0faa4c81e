//! Project domain model.
//!
//! # Responsibility
//! - Define the project record with its date range and funding data.
//! - Own the role-dependent type and status enumerations.
//!
//! # Invariants
//! - Students own academic projects; every other role owns research
//!   projects. `owner_role` records which set applied at creation.
//! - `end_date`, when set, is strictly after `start_date`.

use crate::model::date::CalendarDate;
use crate::model::form::FormErrors;
use crate::model::record::{non_blank, Collection, Record, RecordId, WorkRecord};
use crate::model::user::{Actor, Role};
use crate::model::validation::ValidationFlag;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    // Academic (student) projects.
    Thesis,
    DegreeWork,
    InternshipReport,
    OutreachProject,
    Essay,
    Monograph,
    // Research projects.
    Research,
    Development,
    Innovation,
    Extension,
    Outreach,
    Consultancy,
}

const ACADEMIC_TYPES: &[ProjectType] = &[
    ProjectType::Thesis,
    ProjectType::DegreeWork,
    ProjectType::InternshipReport,
    ProjectType::OutreachProject,
    ProjectType::Essay,
    ProjectType::Monograph,
];

const RESEARCH_TYPES: &[ProjectType] = &[
    ProjectType::Research,
    ProjectType::Development,
    ProjectType::Innovation,
    ProjectType::Extension,
    ProjectType::Outreach,
    ProjectType::Consultancy,
];

impl ProjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Thesis => "thesis",
            Self::DegreeWork => "degree_work",
            Self::InternshipReport => "internship_report",
            Self::OutreachProject => "outreach_project",
            Self::Essay => "essay",
            Self::Monograph => "monograph",
            Self::Research => "research",
            Self::Development => "development",
            Self::Innovation => "innovation",
            Self::Extension => "extension",
            Self::Outreach => "outreach",
            Self::Consultancy => "consultancy",
        }
    }

    /// Types an owner with `role` may register.
    pub fn allowed_for(role: Role) -> &'static [ProjectType] {
        match role {
            Role::Student => ACADEMIC_TYPES,
            Role::Lecturer | Role::Researcher | Role::Admin => RESEARCH_TYPES,
        }
    }

    fn requires_tutor(self) -> bool {
        matches!(self, Self::Thesis | Self::DegreeWork)
    }
}

impl FromStr for ProjectType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ACADEMIC_TYPES
            .iter()
            .chain(RESEARCH_TYPES)
            .copied()
            .find(|kind| kind.as_str() == value.trim())
            .ok_or_else(|| format!("unknown project type `{value}`"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    InDevelopment,
    InReview,
    ReadyForDefense,
    InExecution,
    Finished,
    Suspended,
}

const ACADEMIC_STATUSES: &[ProjectStatus] = &[
    ProjectStatus::Planning,
    ProjectStatus::InDevelopment,
    ProjectStatus::InReview,
    ProjectStatus::ReadyForDefense,
    ProjectStatus::Finished,
    ProjectStatus::Suspended,
];

const RESEARCH_STATUSES: &[ProjectStatus] = &[
    ProjectStatus::Planning,
    ProjectStatus::InExecution,
    ProjectStatus::Finished,
    ProjectStatus::Suspended,
];

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::InDevelopment => "in_development",
            Self::InReview => "in_review",
            Self::ReadyForDefense => "ready_for_defense",
            Self::InExecution => "in_execution",
            Self::Finished => "finished",
            Self::Suspended => "suspended",
        }
    }

    pub fn allowed_for(role: Role) -> &'static [ProjectStatus] {
        match role {
            Role::Student => ACADEMIC_STATUSES,
            Role::Lecturer | Role::Researcher | Role::Admin => RESEARCH_STATUSES,
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ACADEMIC_STATUSES
            .iter()
            .chain(RESEARCH_STATUSES)
            .copied()
            .find(|status| status.as_str() == value.trim())
            .ok_or_else(|| format!("unknown project status `{value}`"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: RecordId,
    pub owner_id: RecordId,
    pub owner_name: String,
    pub owner_role: Role,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProjectType,
    pub lead_author: String,
    pub coauthors: Option<String>,
    pub tutor: Option<String>,
    pub start_date: CalendarDate,
    pub end_date: Option<CalendarDate>,
    pub funding_type: Option<String>,
    pub funding_amount: Option<f64>,
    pub status: ProjectStatus,
    pub objectives: Option<String>,
    pub keywords: Option<String>,
    pub faculty: Option<String>,
    pub degree_program: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub validation: ValidationFlag,
}

impl Record for Project {
    const COLLECTION: Collection = Collection::Projects;

    fn id(&self) -> RecordId {
        self.id
    }
}

impl WorkRecord for Project {
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

impl Project {
    pub fn from_draft(id: RecordId, owner: &Actor, draft: ProjectDraft, now_ms: i64) -> Self {
        let mut project = Self {
            id,
            owner_id: owner.user_id,
            owner_name: owner.display_name.clone(),
            owner_role: owner.role,
            name: String::new(),
            kind: draft.kind,
            lead_author: String::new(),
            coauthors: None,
            tutor: None,
            start_date: draft.start_date,
            end_date: None,
            funding_type: None,
            funding_amount: None,
            status: draft.status,
            objectives: None,
            keywords: None,
            faculty: None,
            degree_program: None,
            created_at: now_ms,
            updated_at: now_ms,
            validation: ValidationFlag::Unset,
        };
        project.apply_draft(draft, now_ms);
        project
    }

    /// Replaces all content fields; ownership, creation time and validation
    /// are kept.
    pub fn apply_draft(&mut self, draft: ProjectDraft, now_ms: i64) {
        self.name = draft.name.trim().to_string();
        self.kind = draft.kind;
        self.lead_author = draft.lead_author.trim().to_string();
        self.coauthors = non_blank(draft.coauthors);
        self.tutor = non_blank(draft.tutor);
        self.start_date = draft.start_date;
        self.end_date = draft.end_date;
        self.funding_type = non_blank(draft.funding_type);
        self.funding_amount = draft.funding_amount;
        self.status = draft.status;
        self.objectives = non_blank(draft.objectives);
        self.keywords = non_blank(draft.keywords);
        self.faculty = non_blank(draft.faculty);
        self.degree_program = non_blank(draft.degree_program);
        self.updated_at = now_ms;
    }
}

/// Owner-editable project content.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub name: String,
    pub kind: ProjectType,
    pub lead_author: String,
    pub coauthors: Option<String>,
    pub tutor: Option<String>,
    pub start_date: CalendarDate,
    pub end_date: Option<CalendarDate>,
    pub funding_type: Option<String>,
    pub funding_amount: Option<f64>,
    pub status: ProjectStatus,
    pub objectives: Option<String>,
    pub keywords: Option<String>,
    pub faculty: Option<String>,
    pub degree_program: Option<String>,
}

impl ProjectDraft {
    pub fn new(
        name: impl Into<String>,
        kind: ProjectType,
        lead_author: impl Into<String>,
        start_date: CalendarDate,
        status: ProjectStatus,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            lead_author: lead_author.into(),
            coauthors: None,
            tutor: None,
            start_date,
            end_date: None,
            funding_type: None,
            funding_amount: None,
            status,
            objectives: None,
            keywords: None,
            faculty: None,
            degree_program: None,
        }
    }

    /// Checks required fields and role-dependent enumerations for an owner
    /// with `owner_role`.
    pub fn validate(&self, owner_role: Role) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        errors.require("name", &self.name, "project name is required");
        errors.require("lead_author", &self.lead_author, "lead author is required");

        if !ProjectType::allowed_for(owner_role).contains(&self.kind) {
            errors.add(
                "type",
                format!(
                    "project type `{}` is not available for role `{owner_role}`",
                    self.kind.as_str()
                ),
            );
        }
        if !ProjectStatus::allowed_for(owner_role).contains(&self.status) {
            errors.add(
                "status",
                format!(
                    "status `{}` is not available for role `{owner_role}`",
                    self.status.as_str()
                ),
            );
        }

        if owner_role == Role::Student {
            let blank = |value: &Option<String>| value.as_deref().map_or(true, |v| v.trim().is_empty());
            if self.kind.requires_tutor() && blank(&self.tutor) {
                errors.add("tutor", "tutor is required for theses and degree works");
            }
            if blank(&self.degree_program) {
                errors.add("degree_program", "degree program is required for students");
            }
        }

        if let Some(end) = self.end_date {
            if end <= self.start_date {
                errors.add("end_date", "end date must be after the start date");
            }
        }
        if let Some(amount) = self.funding_amount {
            if !amount.is_finite() || amount < 0.0 {
                errors.add("funding_amount", "funding amount must be a non-negative number");
            }
        }

        errors.into_result()
    }
}

//! Aggregate reports over the stored collections.
//!
//! # Responsibility
//! - Produce the admin system report.
//! - Produce per-user profile statistics.
//!
//! # Invariants
//! - Reports are read-only; nothing is written.
//! - Author names are compared trimmed and case-insensitively.

use crate::model::project::Project;
use crate::model::publication::Publication;
use crate::model::record::{now_epoch_ms, RecordId, WorkRecord};
use crate::model::user::User;
use crate::repo::record_store::{RecordStore, RepoResult};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

const TOP_AUTHORS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationCounts {
    pub total: usize,
    pub validated: usize,
    pub rejected: usize,
    pub pending: usize,
}

impl ValidationCounts {
    fn tally<'a, T: WorkRecord + 'a>(records: impl IntoIterator<Item = &'a T>) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |mut counts, record| {
                counts.total += 1;
                let flag = record.validation();
                if flag.is_validated() {
                    counts.validated += 1;
                } else if flag.is_rejected() {
                    counts.rejected += 1;
                } else {
                    counts.pending += 1;
                }
                counts
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorCount {
    pub owner_id: RecordId,
    pub name: String,
    pub publications: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemReport {
    pub generated_at: i64,
    pub users_total: usize,
    pub active_users: usize,
    pub users_by_role: BTreeMap<String, usize>,
    pub publications: ValidationCounts,
    pub projects: ValidationCounts,
    pub publications_by_type: BTreeMap<String, usize>,
    pub projects_by_status: BTreeMap<String, usize>,
    /// Most prolific publication owners, ties broken by name.
    pub top_authors: Vec<AuthorCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileStats {
    pub user_id: RecordId,
    pub publications: usize,
    pub validated_publications: usize,
    pub projects: usize,
    /// Distinct co-authors named in the user's publications.
    pub collaborators: usize,
}

pub struct ReportService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> ReportService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn system_report(&self) -> RepoResult<SystemReport> {
        let users = self.store.load::<User>()?;
        let publications = self.store.load::<Publication>()?;
        let projects = self.store.load::<Project>()?;

        let mut users_by_role = BTreeMap::new();
        for user in &users {
            *users_by_role.entry(user.role.as_str().to_string()).or_insert(0) += 1;
        }
        let mut publications_by_type = BTreeMap::new();
        for publication in &publications {
            *publications_by_type
                .entry(publication.kind.as_str().to_string())
                .or_insert(0) += 1;
        }
        let mut projects_by_status = BTreeMap::new();
        for project in &projects {
            *projects_by_status
                .entry(project.status.as_str().to_string())
                .or_insert(0) += 1;
        }

        Ok(SystemReport {
            generated_at: now_epoch_ms(),
            users_total: users.len(),
            active_users: users.iter().filter(|user| user.active).count(),
            users_by_role,
            publications: ValidationCounts::tally(&publications),
            projects: ValidationCounts::tally(&projects),
            publications_by_type,
            projects_by_status,
            top_authors: top_authors(&publications),
        })
    }

    /// Statistics for one user; an unknown id yields `None`.
    pub fn profile_stats(&self, user_id: RecordId) -> RepoResult<Option<ProfileStats>> {
        let users = self.store.load::<User>()?;
        let Some(user) = users.iter().find(|user| user.id == user_id) else {
            return Ok(None);
        };
        let publications: Vec<Publication> = self
            .store
            .load::<Publication>()?
            .into_iter()
            .filter(|publication| publication.owner_id == user_id)
            .collect();
        let projects = self
            .store
            .load::<Project>()?
            .iter()
            .filter(|project| project.owner_id == user_id)
            .count();

        let own_name = author_key(&user.full_name());
        let collaborators: BTreeSet<String> = publications
            .iter()
            .flat_map(|publication| publication.authors.split(','))
            .map(author_key)
            .filter(|name| !name.is_empty() && *name != own_name)
            .collect();

        Ok(Some(ProfileStats {
            user_id,
            publications: publications.len(),
            validated_publications: publications
                .iter()
                .filter(|publication| publication.validation.is_validated())
                .count(),
            projects,
            collaborators: collaborators.len(),
        }))
    }
}

fn author_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn top_authors(publications: &[Publication]) -> Vec<AuthorCount> {
    let mut counts: HashMap<RecordId, AuthorCount> = HashMap::new();
    for publication in publications {
        counts
            .entry(publication.owner_id)
            .or_insert_with(|| AuthorCount {
                owner_id: publication.owner_id,
                name: publication.owner_name.clone(),
                publications: 0,
            })
            .publications += 1;
    }
    let mut ranked: Vec<AuthorCount> = counts.into_values().collect();
    ranked.sort_by(|left, right| {
        right
            .publications
            .cmp(&left.publications)
            .then_with(|| left.name.cmp(&right.name))
            .then_with(|| left.owner_id.cmp(&right.owner_id))
    });
    ranked.truncate(TOP_AUTHORS);
    ranked
}

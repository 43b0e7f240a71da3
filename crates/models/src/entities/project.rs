use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::errors::ModelError;
use crate::kind::ContentKind;
use crate::record::{Record, RecordInput};
use crate::validate::{clean_list, clean_optional, clean_text, lenient_timestamp, null_as_default, optional_url, require};

/// Category entry that selects every project.
pub const ALL_CATEGORIES: &str = "Alle";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub year: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenges: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInput {
    pub title: String,
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub image: String,
    pub category: String,
    pub year: String,
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default)]
    pub challenges: Option<String>,
    #[serde(default)]
    pub solution: Option<String>,
}

impl RecordInput for ProjectInput {
    fn prepare(self) -> Result<Self, ModelError> {
        let input = Self {
            title: clean_text(self.title),
            location: clean_text(self.location),
            description: clean_text(self.description),
            image: clean_text(self.image),
            category: clean_text(self.category),
            year: clean_text(self.year),
            details: clean_list(self.details),
            challenges: clean_optional(self.challenges),
            solution: clean_optional(self.solution),
        };
        require("title", &input.title)?;
        require("location", &input.location)?;
        require("description", &input.description)?;
        optional_url("image", &input.image)?;
        require("category", &input.category)?;
        require("year", &input.year)?;
        Ok(input)
    }
}

impl Record for Project {
    const KIND: ContentKind = ContentKind::Projects;
    type Input = ProjectInput;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn defaults() -> Vec<Self> {
        defaults::projects()
    }

    fn to_input(&self) -> ProjectInput {
        ProjectInput {
            title: self.title.clone(),
            location: self.location.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
            category: self.category.clone(),
            year: self.year.clone(),
            details: self.details.clone(),
            challenges: self.challenges.clone(),
            solution: self.solution.clone(),
        }
    }
}

/// `"Alle"` followed by each distinct category in first-seen order.
pub fn categories(projects: &[Project]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for p in projects {
        if !out.iter().any(|c| c == &p.category) {
            out.push(p.category.clone());
        }
    }
    out
}

/// Keep projects of one category; `"Alle"` keeps everything.
pub fn filter_by_category(projects: Vec<Project>, category: &str) -> Vec<Project> {
    if category == ALL_CATEGORIES {
        return projects;
    }
    projects.into_iter().filter(|p| p.category == category).collect()
}

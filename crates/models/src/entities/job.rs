use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::errors::ModelError;
use crate::kind::ContentKind;
use crate::record::{Record, RecordInput};
use crate::validate::{clean_list, clean_optional, clean_text, lenient_timestamp, null_as_default, require};

/// An open position on the careers page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosition {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    /// Employment type label, e.g. `Vollzeit` or `Ausbildung`
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub employment_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub responsibilities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub requirements: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub benefits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(rename = "startDate", default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPositionInput {
    pub title: String,
    pub location: String,
    #[serde(rename = "type")]
    pub employment_type: String,
    pub description: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(rename = "startDate", default)]
    pub start_date: Option<String>,
}

impl RecordInput for JobPositionInput {
    fn prepare(self) -> Result<Self, ModelError> {
        let input = Self {
            title: clean_text(self.title),
            location: clean_text(self.location),
            employment_type: clean_text(self.employment_type),
            description: clean_text(self.description),
            responsibilities: clean_list(self.responsibilities),
            requirements: clean_list(self.requirements),
            benefits: clean_list(self.benefits),
            salary: clean_optional(self.salary),
            start_date: clean_optional(self.start_date),
        };
        require("title", &input.title)?;
        require("location", &input.location)?;
        require("type", &input.employment_type)?;
        require("description", &input.description)?;
        Ok(input)
    }
}

impl Record for JobPosition {
    const KIND: ContentKind = ContentKind::Jobs;
    type Input = JobPositionInput;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn defaults() -> Vec<Self> {
        defaults::job_positions()
    }

    fn to_input(&self) -> JobPositionInput {
        JobPositionInput {
            title: self.title.clone(),
            location: self.location.clone(),
            employment_type: self.employment_type.clone(),
            description: self.description.clone(),
            responsibilities: self.responsibilities.clone(),
            requirements: self.requirements.clone(),
            benefits: self.benefits.clone(),
            salary: self.salary.clone(),
            start_date: self.start_date.clone(),
        }
    }
}

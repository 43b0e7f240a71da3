use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::errors::ModelError;
use crate::kind::ContentKind;
use crate::record::{Record, RecordInput};
use crate::validate::{clean_optional, clean_text, lenient_timestamp, null_as_default, optional_url, require};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub position: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMemberInput {
    pub name: String,
    pub position: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub bio: Option<String>,
}

impl RecordInput for TeamMemberInput {
    fn prepare(self) -> Result<Self, ModelError> {
        let input = Self {
            name: clean_text(self.name),
            position: clean_text(self.position),
            image: clean_text(self.image),
            bio: clean_optional(self.bio),
        };
        require("name", &input.name)?;
        require("position", &input.position)?;
        optional_url("image", &input.image)?;
        Ok(input)
    }
}

impl Record for TeamMember {
    const KIND: ContentKind = ContentKind::Team;
    type Input = TeamMemberInput;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn defaults() -> Vec<Self> {
        defaults::team_members()
    }

    fn to_input(&self) -> TeamMemberInput {
        TeamMemberInput {
            name: self.name.clone(),
            position: self.position.clone(),
            image: self.image.clone(),
            bio: self.bio.clone(),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::errors::ModelError;
use crate::kind::ContentKind;
use crate::record::{Record, RecordInput};
use crate::validate::{clean_list, clean_text, lenient_timestamp, null_as_default, optional_url, require};

/// Icon shown next to a service. Unknown names read back as `Flame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceIcon {
    #[default]
    Flame,
    Wind,
    Droplet,
    Zap,
}

impl ServiceIcon {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceIcon::Flame => "Flame",
            ServiceIcon::Wind => "Wind",
            ServiceIcon::Droplet => "Droplet",
            ServiceIcon::Zap => "Zap",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Flame" => Some(ServiceIcon::Flame),
            "Wind" => Some(ServiceIcon::Wind),
            "Droplet" => Some(ServiceIcon::Droplet),
            "Zap" => Some(ServiceIcon::Zap),
            _ => None,
        }
    }
}

impl From<String> for ServiceIcon {
    fn from(name: String) -> Self {
        Self::parse(&name).unwrap_or_default()
    }
}

impl From<ServiceIcon> for String {
    fn from(icon: ServiceIcon) -> Self {
        icon.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub icon: ServiceIcon,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: Vec<String>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInput {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub icon: ServiceIcon,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub details: Vec<String>,
}

impl RecordInput for ServiceInput {
    fn prepare(self) -> Result<Self, ModelError> {
        let input = Self {
            title: clean_text(self.title),
            description: clean_text(self.description),
            icon: self.icon,
            image: clean_text(self.image),
            details: clean_list(self.details),
        };
        require("title", &input.title)?;
        require("description", &input.description)?;
        optional_url("image", &input.image)?;
        Ok(input)
    }
}

impl Record for Service {
    const KIND: ContentKind = ContentKind::Services;
    type Input = ServiceInput;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn defaults() -> Vec<Self> {
        defaults::services()
    }

    fn to_input(&self) -> ServiceInput {
        ServiceInput {
            title: self.title.clone(),
            description: self.description.clone(),
            icon: self.icon,
            image: self.image.clone(),
            details: self.details.clone(),
        }
    }
}

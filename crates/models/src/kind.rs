use std::fmt;

use serde::{Deserialize, Serialize};

/// The four content collections managed through the admin area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Services,
    Projects,
    Jobs,
    Team,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [
        ContentKind::Services,
        ContentKind::Projects,
        ContentKind::Jobs,
        ContentKind::Team,
    ];

    /// Table name in the hosted store.
    pub fn collection(self) -> &'static str {
        match self {
            ContentKind::Services => "services",
            ContentKind::Projects => "projects",
            ContentKind::Jobs => "job_positions",
            ContentKind::Team => "team_members",
        }
    }

    /// Path segment used by the HTTP API.
    pub fn slug(self) -> &'static str {
        match self {
            ContentKind::Services => "services",
            ContentKind::Projects => "projects",
            ContentKind::Jobs => "jobs",
            ContentKind::Team => "team",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collections_are_fixed() {
        let names: Vec<_> = ContentKind::ALL.iter().map(|k| k.collection()).collect();
        assert_eq!(names, ["services", "projects", "job_positions", "team_members"]);
    }

    #[test]
    fn slug_round_trips() {
        for kind in ContentKind::ALL {
            assert_eq!(ContentKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(ContentKind::from_slug("job_positions"), None);
    }
}

//! Built-in content served while the hosted tables are empty or unreachable.
//!
//! The catalog lives in `defaults/*.json` next to this crate and is parsed once.

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use tracing::error;

use crate::entities::{job::JobPosition, project::Project, service::Service, team::TeamMember};

static SERVICES: Lazy<Vec<Service>> =
    Lazy::new(|| parse("services", include_str!("../defaults/services.json")));

static PROJECTS: Lazy<Vec<Project>> =
    Lazy::new(|| parse("projects", include_str!("../defaults/projects.json")));

static JOB_POSITIONS: Lazy<Vec<JobPosition>> =
    Lazy::new(|| parse("job_positions", include_str!("../defaults/job_positions.json")));

fn parse<T: DeserializeOwned>(catalog: &str, raw: &str) -> Vec<T> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        error!(catalog, error = %e, "default catalog is malformed; serving nothing");
        Vec::new()
    })
}

pub fn services() -> Vec<Service> {
    SERVICES.clone()
}

pub fn projects() -> Vec<Project> {
    PROJECTS.clone()
}

pub fn job_positions() -> Vec<JobPosition> {
    JOB_POSITIONS.clone()
}

/// No team is shipped with the site.
pub fn team_members() -> Vec<TeamMember> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Record, RecordInput};

    #[test]
    fn catalog_sizes() {
        let ids: Vec<_> = services().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["heizung", "lueftung", "sanitaer", "energie"]);
        assert_eq!(projects().len(), 6);
        assert_eq!(job_positions().len(), 4);
        assert!(team_members().is_empty());
    }

    #[test]
    fn every_default_is_a_valid_input() {
        for s in services() {
            s.to_input().prepare().unwrap();
        }
        for p in projects() {
            p.to_input().prepare().unwrap();
        }
        for j in job_positions() {
            j.to_input().prepare().unwrap();
        }
    }

    #[test]
    fn defaults_carry_no_timestamp() {
        assert!(projects().iter().all(|p| p.created_at().is_none()));
    }
}

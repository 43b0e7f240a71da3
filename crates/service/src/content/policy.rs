//! What a read returns when the store has nothing usable.
//!
//! Every kind has one entry in [`fallback_for`]; the two resolve functions
//! apply it to the outcome of a store read.

use models::{ContentKind, Record};

/// Substitute for an empty or failed collection read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Serve the built-in content of the kind.
    Defaults,
    /// Serve an empty list.
    Empty,
}

/// Where the records of a read came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Store,
    Defaults,
    Empty,
}

pub fn fallback_for(kind: ContentKind) -> Fallback {
    match kind {
        ContentKind::Services | ContentKind::Projects | ContentKind::Jobs => Fallback::Defaults,
        // Team pages render nothing until members are entered.
        ContentKind::Team => Fallback::Empty,
    }
}

#[derive(Debug)]
pub struct Resolved<T> {
    pub records: Vec<T>,
    pub origin: Origin,
}

/// Non-empty store rows win; an empty result or an error falls back per kind.
pub fn resolve_collection<T, E>(kind: ContentKind, remote: Result<Vec<T>, E>, defaults: impl FnOnce() -> Vec<T>) -> Resolved<T> {
    match remote {
        Ok(rows) if !rows.is_empty() => Resolved { records: rows, origin: Origin::Store },
        _ => match fallback_for(kind) {
            Fallback::Defaults => Resolved { records: defaults(), origin: Origin::Defaults },
            Fallback::Empty => Resolved { records: Vec::new(), origin: Origin::Empty },
        },
    }
}

/// A found row wins; otherwise look the id up in the built-in content.
pub fn resolve_single<T, E>(remote: Result<Option<T>, E>, defaults: impl FnOnce() -> Vec<T>, id: &str) -> Option<T>
where
    T: Record,
{
    match remote {
        Ok(Some(record)) => Some(record),
        _ => defaults().into_iter().find(|r| r.id() == id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{JobPosition, Service, TeamMember};

    fn err<T>() -> Result<T, String> {
        Err("connection refused".into())
    }

    #[test]
    fn table_marks_team_as_empty() {
        assert_eq!(fallback_for(ContentKind::Services), Fallback::Defaults);
        assert_eq!(fallback_for(ContentKind::Projects), Fallback::Defaults);
        assert_eq!(fallback_for(ContentKind::Jobs), Fallback::Defaults);
        assert_eq!(fallback_for(ContentKind::Team), Fallback::Empty);
    }

    #[test]
    fn error_and_empty_fall_back_to_defaults() {
        let r = resolve_collection(ContentKind::Services, err::<Vec<Service>>(), Service::defaults);
        assert_eq!(r.origin, Origin::Defaults);
        assert_eq!(r.records.len(), 4);

        let r = resolve_collection(ContentKind::Services, Ok::<_, String>(vec![]), Service::defaults);
        assert_eq!(r.origin, Origin::Defaults);
        assert_eq!(r.records.len(), 4);
    }

    #[test]
    fn non_empty_rows_pass_through() {
        let mut job = JobPosition::defaults().remove(2);
        job.id = "remote-1".into();
        let r = resolve_collection(ContentKind::Jobs, Ok::<_, String>(vec![job.clone()]), JobPosition::defaults);
        assert_eq!(r.origin, Origin::Store);
        assert_eq!(r.records, vec![job]);
    }

    #[test]
    fn team_falls_back_to_empty() {
        let r = resolve_collection(ContentKind::Team, err::<Vec<TeamMember>>(), TeamMember::defaults);
        assert_eq!(r.origin, Origin::Empty);
        assert!(r.records.is_empty());
    }

    #[test]
    fn single_lookup_uses_default_ids() {
        let found = resolve_single(err::<Option<Service>>(), Service::defaults, "sanitaer");
        assert_eq!(found.map(|s| s.title), Some("Sanitärplanung".to_string()));
        assert!(resolve_single(Ok::<_, String>(None), Service::defaults, "nope").is_none());
    }
}

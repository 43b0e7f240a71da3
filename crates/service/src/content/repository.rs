use std::sync::Arc;

use models::entities::project;
use models::{ModelError, Project, Record, RecordInput};
use tracing::{debug, info, instrument, warn};

use crate::backend::{Caller, ContentStore, Row};
use crate::content::policy::{self, Origin};
use crate::errors::ServiceError;
use crate::metrics;

/// Typed access to the content collections.
///
/// Reads never fail: an unreachable store, an empty table or a table with no
/// decodable row is answered from the fallback policy. Single bad rows are
/// skipped. Writes go straight to the store as the given [`Caller`] and
/// report failure to the caller, who decides what to refresh.
#[derive(Clone)]
pub struct ContentRepository {
    store: Arc<dyn ContentStore>,
}

fn decode<T: Record>(row: Row) -> Result<T, ServiceError> {
    serde_json::from_value(row).map_err(|e| ModelError::Decode(format!("{} row: {e}", T::KIND)).into())
}

fn encode<I: RecordInput>(input: &I) -> Result<Row, ServiceError> {
    serde_json::to_value(input).map_err(|e| ModelError::Decode(e.to_string()).into())
}

fn record_write<T: Record, R>(op: &'static str, id: Option<&str>, res: &Result<R, ServiceError>) {
    metrics::CONTENT_WRITES_TOTAL
        .with_label_values(&[T::KIND.slug(), op, metrics::outcome(res)])
        .inc();
    match res {
        Ok(_) => info!(kind = %T::KIND, op, id = id.unwrap_or("-"), "content_written"),
        Err(e) => warn!(kind = %T::KIND, op, id = id.unwrap_or("-"), error = %e, "content write failed"),
    }
}

impl ContentRepository {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Decode row by row; fails only when rows came back and none decoded.
    async fn read_all<T: Record>(&self) -> Result<Vec<T>, ServiceError> {
        let rows = self.store.list(T::KIND.collection()).await?;
        let mut records = Vec::with_capacity(rows.len());
        let mut first_err = None;
        for row in rows {
            let id = row.get("id").and_then(Row::as_str).unwrap_or("-").to_string();
            match decode::<T>(row) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(kind = %T::KIND, %id, error = %e, "skipping undecodable row");
                    metrics::CONTENT_ROWS_SKIPPED_TOTAL.with_label_values(&[T::KIND.slug()]).inc();
                    first_err.get_or_insert(e);
                }
            }
        }
        match first_err {
            Some(e) if records.is_empty() => Err(e),
            _ => Ok(records),
        }
    }

    fn note_read_failure<T: Record>(e: &ServiceError) {
        warn!(kind = %T::KIND, error = %e, "content read failed; applying fallback");
        metrics::CONTENT_READ_FAILURES_TOTAL.with_label_values(&[T::KIND.slug()]).inc();
    }

    /// All records of a kind, newest first, with the fallback applied.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use models::Service;
    /// use service::backend::mock::UnreachableStore;
    /// use service::content::ContentRepository;
    ///
    /// let repo = ContentRepository::new(Arc::new(UnreachableStore));
    /// let services: Vec<Service> = tokio_test::block_on(repo.fetch_collection());
    /// assert_eq!(services[0].id, "heizung");
    /// ```
    #[instrument(skip(self), fields(kind = %T::KIND))]
    pub async fn fetch_collection<T: Record>(&self) -> Vec<T> {
        let remote = self.read_all::<T>().await;
        if let Err(e) = &remote {
            Self::note_read_failure::<T>(e);
        }
        let resolved = policy::resolve_collection(T::KIND, remote, T::defaults);
        if resolved.origin != Origin::Store {
            debug!(origin = ?resolved.origin, count = resolved.records.len(), "serving fallback content");
            metrics::CONTENT_FALLBACK_TOTAL.with_label_values(&[T::KIND.slug()]).inc();
        }
        resolved.records
    }

    /// One record by id; the built-in content is searched when the store has none.
    /// `None` means the id is unknown everywhere.
    #[instrument(skip(self), fields(kind = %T::KIND))]
    pub async fn fetch_by_id<T: Record>(&self, id: &str) -> Option<T> {
        let remote = match self.store.get(T::KIND.collection(), id).await {
            Ok(Some(row)) => decode::<T>(row).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(ServiceError::from(e)),
        };
        match &remote {
            Err(e) => Self::note_read_failure::<T>(e),
            Ok(None) => debug!(%id, "not in store; checking built-in content"),
            Ok(Some(_)) => {}
        }
        policy::resolve_single(remote, T::defaults, id)
    }

    /// What the store really holds, without fallback. Errors propagate.
    #[instrument(skip(self), fields(kind = %T::KIND))]
    pub async fn list_stored<T: Record>(&self) -> Result<Vec<T>, ServiceError> {
        self.read_all::<T>().await
    }

    #[instrument(skip(self, input, caller), fields(kind = %T::KIND))]
    pub async fn create_record<T: Record>(&self, input: T::Input, caller: Caller<'_>) -> Result<T, ServiceError> {
        let res = async {
            let row = encode(&input.prepare()?)?;
            let stored = self.store.insert(T::KIND.collection(), row, caller).await?;
            decode::<T>(stored)
        }
        .await;
        record_write::<T, _>("create", res.as_ref().ok().map(|r| r.id()), &res);
        res
    }

    /// Full-record update; every editable field is replaced.
    #[instrument(skip(self, input, caller), fields(kind = %T::KIND))]
    pub async fn update_record<T: Record>(
        &self,
        id: &str,
        input: T::Input,
        caller: Caller<'_>,
    ) -> Result<T, ServiceError> {
        let res = async {
            let row = encode(&input.prepare()?)?;
            match self.store.update(T::KIND.collection(), id, row, caller).await? {
                Some(stored) => decode::<T>(stored),
                None => Err(ServiceError::not_found(&format!("{} {id}", T::KIND))),
            }
        }
        .await;
        record_write::<T, _>("update", Some(id), &res);
        res
    }

    #[instrument(skip(self, caller), fields(kind = %T::KIND))]
    pub async fn delete_record<T: Record>(&self, id: &str, caller: Caller<'_>) -> Result<(), ServiceError> {
        let res = match self.store.delete(T::KIND.collection(), id, caller).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(ServiceError::not_found(&format!("{} {id}", T::KIND))),
            Err(e) => Err(e.into()),
        };
        record_write::<T, _>("delete", Some(id), &res);
        res
    }

    /// `"Alle"` followed by the distinct project categories.
    pub async fn fetch_project_categories(&self) -> Vec<String> {
        project::categories(&self.fetch_collection::<Project>().await)
    }

    /// Projects of one category; `None` or `"Alle"` returns all of them.
    pub async fn fetch_projects_in_category(&self, category: Option<&str>) -> Vec<Project> {
        let projects = self.fetch_collection::<Project>().await;
        match category {
            Some(c) => project::filter_by_category(projects, c),
            None => projects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{MemoryStore, UnreachableStore};
    use crate::backend::StoreError;
    use models::{ContentKind, JobPosition, Service, ServiceIcon, ServiceInput, TeamMember, TeamMemberInput};
    use serde_json::json;

    const ADMIN: Caller<'static> = Caller::User("admin-jwt");

    fn unreachable() -> ContentRepository {
        ContentRepository::new(Arc::new(UnreachableStore))
    }

    fn memory(store: MemoryStore) -> (ContentRepository, Arc<MemoryStore>) {
        let store = Arc::new(store);
        (ContentRepository::new(store.clone()), store)
    }

    fn service_input() -> ServiceInput {
        ServiceInput {
            title: "Kältetechnik".into(),
            description: "Kühlung für Gewerbe und Industrie".into(),
            icon: ServiceIcon::Zap,
            image: "https://cdn.example.com/kaelte.png".into(),
            details: vec!["Kaltwassersätze".into(), "Rückkühler".into()],
        }
    }

    #[tokio::test]
    async fn unreachable_store_serves_the_four_default_services() {
        let services = unreachable().fetch_collection::<Service>().await;
        let ids: Vec<_> = services.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["heizung", "lueftung", "sanitaer", "energie"]);
    }

    #[tokio::test]
    async fn empty_store_serves_defaults_for_projects_and_jobs() {
        let (repo, _) = memory(MemoryStore::default());
        assert_eq!(repo.fetch_collection::<Project>().await.len(), 6);
        assert_eq!(repo.fetch_collection::<JobPosition>().await.len(), 4);
    }

    #[tokio::test]
    async fn one_stored_job_replaces_the_defaults() {
        let row = json!({
            "id": "7d0c", "title": "Servicetechniker", "location": "Berlin", "type": "Teilzeit",
            "description": "Wartung", "responsibilities": [], "requirements": [], "benefits": [],
            "created_at": "2025-03-01T08:00:00Z"
        });
        let (repo, _) = memory(MemoryStore::with_rows("job_positions", vec![row]));
        let jobs = repo.fetch_collection::<JobPosition>().await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, "7d0c");
        assert_eq!(jobs[0].employment_type, "Teilzeit");
    }

    #[tokio::test]
    async fn team_never_falls_back_to_content() {
        assert!(unreachable().fetch_collection::<TeamMember>().await.is_empty());
        let (repo, _) = memory(MemoryStore::default());
        assert!(repo.fetch_collection::<TeamMember>().await.is_empty());

        let member = TeamMemberInput { name: "Anna Schmidt".into(), position: "Projektleiterin".into(), image: String::new(), bio: None };
        repo.create_record::<TeamMember>(member, ADMIN).await.unwrap();
        assert_eq!(repo.fetch_collection::<TeamMember>().await.len(), 1);
    }

    #[tokio::test]
    async fn undecodable_rows_count_as_a_failed_read() {
        let broken = json!({"title": "no id", "details": "not a list"});
        let (repo, _) = memory(MemoryStore::with_rows("services", vec![broken]));
        assert_eq!(repo.fetch_collection::<Service>().await.len(), 4);
        assert!(repo.list_stored::<Service>().await.is_err());
    }

    #[tokio::test]
    async fn bad_rows_are_skipped_when_others_decode() {
        let good = json!({
            "id": "p-good", "title": "Neubau Bürohaus", "location": "Hamburg", "description": "d",
            "image": "", "category": "Gewerbe", "year": "2024",
            "created_at": "2025-03-01T08:00:00.123456"
        });
        let null_year = json!({
            "id": "p-null", "title": "Sanierung", "location": "Kiel", "description": "d",
            "category": "Wohnbau", "year": null, "created_at": "2025-02-01T08:00:00+00:00"
        });
        let broken = json!({"id": "p-bad", "details": 42});
        let (repo, _) = memory(MemoryStore::with_rows("projects", vec![good, null_year, broken]));

        let projects = repo.fetch_collection::<Project>().await;
        let ids: Vec<_> = projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p-good", "p-null"]);
        assert!(projects[0].created_at.is_some());
        assert_eq!(projects[1].year, "");
        assert_eq!(repo.fetch_project_categories().await, vec!["Alle", "Gewerbe", "Wohnbau"]);
    }

    #[tokio::test]
    async fn fetch_by_id_falls_back_to_default_ids() {
        let repo = unreachable();
        let p = repo.fetch_by_id::<Project>("projekt-3").await.unwrap();
        assert_eq!(p.location, "München");
        assert!(repo.fetch_by_id::<Project>("projekt-99").await.is_none());
        assert!(repo.fetch_by_id::<TeamMember>("anyone").await.is_none());
    }

    #[tokio::test]
    async fn stored_row_wins_over_default_with_same_id() {
        let row = json!({"id": "heizung", "title": "Heizung & Kälte", "description": "d", "icon": "Flame",
                         "image": "https://cdn/x.png", "details": []});
        let (repo, _) = memory(MemoryStore::with_rows("services", vec![row]));
        let s = repo.fetch_by_id::<Service>("heizung").await.unwrap();
        assert_eq!(s.title, "Heizung & Kälte");
    }

    #[tokio::test]
    async fn created_record_reads_back_field_for_field() -> Result<(), ServiceError> {
        let (repo, _) = memory(MemoryStore::default());
        let input = service_input();
        let created = repo.create_record::<Service>(input.clone(), ADMIN).await?;
        assert!(created.created_at.is_some());

        let fetched = repo.fetch_by_id::<Service>(&created.id).await.expect("stored service");
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.to_input(), input);
        Ok(())
    }

    #[tokio::test]
    async fn writes_reach_the_store_as_the_signed_in_user() -> Result<(), ServiceError> {
        let (repo, store) = memory(MemoryStore::default());
        let created = repo.create_record::<Service>(service_input(), ADMIN).await?;
        assert_eq!(store.last_access_token().as_deref(), Some("admin-jwt"));
        repo.delete_record::<Service>(&created.id, Caller::Anonymous).await?;
        assert_eq!(store.last_access_token(), None);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_store() {
        let (repo, store) = memory(MemoryStore::default());
        let mut input = service_input();
        input.title = "  ".into();
        let err = repo.create_record::<Service>(input, ADMIN).await.unwrap_err();
        assert!(matches!(err, ServiceError::Model(ModelError::Validation(_))));
        assert!(store.list(ContentKind::Services.collection()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_replaces_fields_and_reports_missing_ids() -> Result<(), ServiceError> {
        let (repo, _) = memory(MemoryStore::default());
        let created = repo.create_record::<Service>(service_input(), ADMIN).await?;

        let mut edit = created.to_input();
        edit.details = vec!["Nur noch eins".into()];
        let updated = repo.update_record::<Service>(&created.id, edit, ADMIN).await?;
        assert_eq!(updated.details, vec!["Nur noch eins"]);
        assert_eq!(updated.created_at, created.created_at);

        let err = repo.update_record::<Service>("missing", service_input(), ADMIN).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn delete_then_delete_again_is_not_found() -> Result<(), ServiceError> {
        let (repo, _) = memory(MemoryStore::default());
        let created = repo.create_record::<Service>(service_input(), ADMIN).await?;
        repo.delete_record::<Service>(&created.id, ADMIN).await?;
        let err = repo.delete_record::<Service>(&created.id, ADMIN).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn writes_and_admin_listing_propagate_store_errors() {
        let repo = unreachable();
        let err = repo.create_record::<Service>(service_input(), ADMIN).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::Transport(_))));
        assert!(repo.list_stored::<Service>().await.is_err());
        assert!(repo.delete_record::<Service>("heizung", ADMIN).await.is_err());
    }

    #[tokio::test]
    async fn categories_and_filter_use_the_resolved_projects() {
        let repo = unreachable();
        let cats = repo.fetch_project_categories().await;
        assert_eq!(cats.first().map(String::as_str), Some("Alle"));
        assert_eq!(cats.len(), 5);
        let industrie = repo.fetch_projects_in_category(Some("Industrie")).await;
        assert_eq!(industrie.len(), 1);
        assert_eq!(repo.fetch_projects_in_category(None).await.len(), 6);
    }
}

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::ModelError;
use crate::kind::ContentKind;

/// A stored content record. Implemented by the four entity types.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: ContentKind;

    /// Fields accepted on create and full update.
    type Input: RecordInput;

    fn id(&self) -> &str;

    fn created_at(&self) -> Option<DateTime<Utc>>;

    /// Built-in content shipped with the site for this kind.
    fn defaults() -> Vec<Self>;

    /// Editable view of the record, as the admin form would submit it.
    fn to_input(&self) -> Self::Input;
}

pub trait RecordInput: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Trim and drop blank entries, then validate required fields.
    fn prepare(self) -> Result<Self, ModelError>;
}

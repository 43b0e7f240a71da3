//! Content records of the site: services, projects, job positions and team members.
//!
//! Records mirror the columns of the hosted tables. Every record has an input
//! type (no `id`, no `created_at`) that is cleaned and validated before it is
//! written anywhere.

pub mod errors;
pub mod kind;
pub mod record;
pub mod validate;
pub mod entities;
pub mod defaults;

pub use entities::job::{JobPosition, JobPositionInput};
pub use entities::project::{Project, ProjectInput};
pub use entities::service::{Service, ServiceIcon, ServiceInput};
pub use entities::team::{TeamMember, TeamMemberInput};
pub use errors::ModelError;
pub use kind::ContentKind;
pub use record::{Record, RecordInput};

//! Content collections as seen by the pages and the admin area.

pub mod policy;
pub mod repository;

pub use policy::{fallback_for, Fallback, Origin};
pub use repository::ContentRepository;

//! File-backed stores for running without the hosted backend.
//!
//! `JsonMapStore` persists one map per JSON file; `FileContentStore` and
//! `LocalObjectStorage` implement the backend traits on top of the filesystem.

pub mod json_map_store;
pub mod file_content_store;
pub mod local_objects;

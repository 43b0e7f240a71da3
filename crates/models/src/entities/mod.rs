pub mod service;
pub mod project;
pub mod job;
pub mod team;

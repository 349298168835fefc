//! HTTP route handlers

pub mod questions;
pub mod sessions;
pub mod skills;
pub mod stats;

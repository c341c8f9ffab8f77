//! Data models: pattern definitions, extraction results, records and configuration.

pub mod config;
pub mod extraction;
pub mod pattern;
pub mod record;

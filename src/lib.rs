// src/lib.rs

pub mod config;
pub mod core;
pub mod dictionary;
pub mod enrich;
pub mod error;
pub mod feedback;
pub mod fuzzy;
pub mod learning;
pub mod persistence;
pub mod profile;
pub use crate::core::engine::SuggestionEngine;
pub use crate::error::{Result, SpellerError};

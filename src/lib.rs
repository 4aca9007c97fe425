//! Shabdkosh - Multilingual Indic Dictionary
//!
//! Looks up English words in a shared dictionary covering the 22 scheduled
//! languages of India. Unknown words are translated through an ordered chain
//! of translation providers and saved when enough languages came back with an
//! acceptable translation.

pub mod batch;
pub mod chain;
pub mod cli;
pub mod config;
pub mod error;
pub mod language;
pub mod persistence;
pub mod provider;
pub mod quality;
pub mod record;
pub mod store;
pub mod workflow;

//! # fit-core
//!
//! Core types, ID prefixes, and pure domain logic for Stackfit.
//!
//! This crate provides the foundational types shared across all Stackfit crates:
//! - Entity structs for assessments, companies, config versions and feature flags
//! - Enums for company size, complexity tier and publish status
//! - ID prefix constants
//! - Cross-cutting error types
//! - The legacy sensor-category migration shim
//! - The URL share-token codec
//! - Scorecard computation
//! - An injectable clock for time-dependent components

pub mod clock;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod jobs;
pub mod migration;
pub mod scorecard;
pub mod share;

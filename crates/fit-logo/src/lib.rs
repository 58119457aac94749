//! # fit-logo
//!
//! Resolves logos for newly created companies.
//!
//! Saving an assessment enqueues a [`fit_core::jobs::LogoJob`]; the
//! [`LogoWorker`] drains that queue, asks a [`LogoFetcher`] (normally the
//! HTTP [`LogoClient`]) for a logo URL with retry, and writes the outcome
//! back to the company row. Nothing here ever fails an assessment save.

mod client;
mod error;
mod http;
mod worker;

pub use client::{LogoClient, LogoFetcher};
pub use error::LogoError;
pub use worker::{LogoWorker, WorkerStats};

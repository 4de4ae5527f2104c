//! Error types for character builds.
//!
//! Gate failures (over budget, wrong skill count, missing selection) are not
//! errors: they are reported as [`Blocked`](crate::gate::Blocked) values and
//! are always recoverable by further input. `BuildError` covers the faults
//! that are not: inconsistent reference data and misuse of the step machine.

use crate::wizard::Step;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The catalog table a lookup was made against.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum CatalogKind {
    Race,
    Class,
    ClassVariant,
    Origin,
}

/// Errors that can occur while building a character sheet.
///
/// # Examples
///
/// ```rust
/// use sheetsmith::{BuildError, CatalogKind};
///
/// let err = BuildError::CatalogMiss {
///     kind: CatalogKind::Race,
///     name: "Minotauro".to_string(),
/// };
/// assert_eq!(err.to_string(), "No race named 'Minotauro' in the catalog");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    /// A name was looked up that the catalog does not contain.
    ///
    /// This means the reference data and its caller disagree, so the build
    /// cannot continue.
    #[error("No {kind} named '{name}' in the catalog")]
    CatalogMiss { kind: CatalogKind, name: String },

    /// A patch was submitted for a step other than the current one.
    #[error("Patch for step {found} submitted while the build is at step {expected}")]
    StepMismatch { expected: Step, found: Step },

    /// The build was already completed; the sheet is frozen.
    #[error("The build is already completed")]
    AlreadyCompleted,

    /// A merge or recalculation needed data that an earlier step provides.
    #[error("Step {0} has not been completed")]
    MissingPrerequisite(Step),

    /// Catalog data could not be parsed.
    #[error("Invalid catalog data: {0}")]
    InvalidCatalog(String),

    /// A completed sheet could not be written to its store.
    #[error("Failed to store sheet: {0}")]
    Store(String),

    /// Rules configuration could not be parsed.
    #[error("Invalid rules configuration: {0}")]
    Config(String),
}

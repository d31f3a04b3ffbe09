//! Error types for template realization.

use thiserror::Error;

/// Errors raised while building, counting, or decoding template realizations.
#[derive(Error, Debug)]
pub enum RealizeError {
    /// A candidate set was built with no members.
    #[error("Empty candidate set: a placeholder needs at least one candidate value")]
    EmptyCandidateSet,

    /// The product of candidate set sizes does not fit in a `u128`.
    #[error("Realization count overflow after {bindings} bindings")]
    CountOverflow {
        /// Number of bindings multiplied before the overflow.
        bindings: usize,
    },

    /// A binding path did not resolve inside a template copy.
    #[error("Path not found in template copy: '{path}'")]
    PathNotFound { path: String },

    /// Invalid realize options.
    #[error("Invalid config: {0}")]
    Config(String),

    /// JSON conversion failed (typed decoding, specification export).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A template or options document could not be parsed from YAML.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RealizeError {
    /// Stable error code for this error type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyCandidateSet => "EMPTY_CANDIDATE_SET",
            Self::CountOverflow { .. } => "COUNT_OVERFLOW",
            Self::PathNotFound { .. } => "PATH_NOT_FOUND",
            Self::Config(_) => "INVALID_CONFIG",
            Self::Json(_) => "JSON_ERROR",
            Self::Yaml(_) => "YAML_ERROR",
        }
    }

    /// Check if this error comes from how the template or options were set up.
    ///
    /// Configuration errors are fatal to the operation in progress; the same
    /// template will fail the same way every time.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::EmptyCandidateSet | Self::Config(_))
    }
}

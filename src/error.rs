//! Error type shared by the loader, the assumption resolver and the projectors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectionError {
    /// A parameter the model needs is absent from the snapshot
    #[error("missing parameter `{name}`")]
    MissingParameter { name: String },

    /// A snapshot value or override falls outside its documented domain
    #[error("invalid value {value} for `{name}`: {reason}")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: String,
    },

    /// A parameter cell could not be read as a number
    #[error("parameter `{name}` has non-numeric value `{raw}`")]
    MalformedValue { name: String, raw: String },

    /// The requested value column is absent from the parameter file header
    #[error("column `{column}` not found in parameter file")]
    MissingColumn { column: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ProjectionError {
    pub(crate) fn missing(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    pub(crate) fn invalid(name: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProjectionError>;

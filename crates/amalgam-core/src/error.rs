use thiserror::Error;

pub type Result<T> = std::result::Result<T, AmalgamError>;

#[derive(Error, Debug)]
pub enum AmalgamError {
    #[error("no opening include guard found in module {module}")]
    MissingOpeningGuard { module: String },

    #[error("no closing guard found in module {module}")]
    MissingClosingGuard { module: String },

    #[error("no closing guard mentioning {identifier} found in module {module}")]
    MissingNamedClosingGuard { module: String, identifier: String },

    #[error("artifact {artifact} failed verification: {reason}")]
    VerificationFailed { artifact: String, reason: String },

    #[error("invalid include pattern: {0}")]
    Pattern(#[from] regex::Error),
}

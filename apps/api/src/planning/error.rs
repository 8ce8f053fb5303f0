use thiserror::Error;

/// Caller-correctable planning errors. Surfaced synchronously, never retried.
#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("template has no layouts")]
    EmptyCatalog,

    #[error("source has no pages")]
    EmptySource,

    #[error("layout '{0}' is not in the template catalog")]
    UnknownLayout(String),

    #[error("slide index {index} is out of range (plan has {len} slides)")]
    IndexOutOfRange { index: usize, len: usize },
}

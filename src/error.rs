//! Error taxonomy for the friction core
//!
//! Three failure classes cross component boundaries:
//! - `InvalidInput`: a caller violated a precondition. Loud, never swallowed.
//! - `Analysis`: the syntax provider failed mid-pass. The pass is abandoned
//!   at its boundary and the previous occurrence snapshot stays in place.
//! - `EditApplication`: exclusive edit access could not be obtained, or the
//!   sink rejected an insertion. Fatal for that keystroke; a half-applied
//!   friction edit could corrupt buffer state, so this is never recovered.
//!
//! Geometry lookups that find nothing are *not* errors; those surfaces
//! return `Option` and the annotator skips the occurrence.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrictionError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("syntax analysis failed: {0}")]
    Analysis(String),

    #[error("edit application failed: {0}")]
    EditApplication(String),
}

impl FrictionError {
    pub fn analysis(msg: impl Into<String>) -> Self {
        FrictionError::Analysis(msg.into())
    }

    pub fn edit(msg: impl Into<String>) -> Self {
        FrictionError::EditApplication(msg.into())
    }
}

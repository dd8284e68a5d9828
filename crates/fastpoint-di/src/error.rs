//! Errors from calling a handler.

use fastpoint_core::{Exception, PhaseResult, ResolutionError};
use thiserror::Error;

/// Why a handler call did not produce a value.
#[derive(Error, Debug)]
pub enum InvokeError {
    /// The argument list could not be built. Fatal for the current phase.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The handler body (or an injectable resolver it depends on) failed.
    #[error(transparent)]
    Thrown(#[from] Exception),

    /// An injectable resolver returned an early response or an error.
    #[error("injectable resolver ended the phase early")]
    Halted(PhaseResult),
}

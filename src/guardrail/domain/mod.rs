//! Domain types for guardrail evaluation.

mod descriptor;
mod error;
mod verdict;

pub use descriptor::{CheckDescriptor, Enforcement, GuardrailPhase};
pub use error::{CheckError, GuardrailError, ParseSeverityError};
pub use verdict::{GuardrailVerdict, Severity};

//! Built-in guardrail checks.
//!
//! Input phase: [`InputSafetyCheck`], [`SystemProtectionCheck`],
//! [`ContentFilterCheck`] and [`EthicalBoundariesCheck`]. Output phase:
//! [`OutputSafetyCheck`], [`OutputQualityCheck`] and [`OutputScopeCheck`].

mod content_filter;
mod ethical_boundaries;
mod input_safety;
mod output_quality;
mod output_safety;
mod output_scope;
mod patterns;
mod system_protection;

pub use content_filter::ContentFilterCheck;
pub use ethical_boundaries::EthicalBoundariesCheck;
pub use input_safety::InputSafetyCheck;
pub use output_quality::OutputQualityCheck;
pub use output_safety::OutputSafetyCheck;
pub use output_scope::OutputScopeCheck;
pub use system_protection::SystemProtectionCheck;

use super::{GuardrailCheck, GuardrailConfig, GuardrailError};
use crate::intent::IntentClassifier;
use std::sync::Arc;

/// Name of [`InputSafetyCheck`].
pub const INPUT_SAFETY: &str = "input_safety";
/// Name of [`SystemProtectionCheck`].
pub const SYSTEM_PROTECTION: &str = "system_protection";
/// Name of [`ContentFilterCheck`].
pub const CONTENT_FILTER: &str = "content_filter";
/// Name of [`EthicalBoundariesCheck`].
pub const ETHICAL_BOUNDARIES: &str = "ethical_boundaries";
/// Name of [`OutputSafetyCheck`].
pub const OUTPUT_SAFETY: &str = "output_safety";
/// Name of [`OutputQualityCheck`].
pub const OUTPUT_QUALITY: &str = "output_quality";
/// Name of [`OutputScopeCheck`].
pub const OUTPUT_SCOPE: &str = "output_scope";

/// Builds every built-in check in registration order.
///
/// # Errors
///
/// Returns [`GuardrailError::InvalidPattern`] when a configured pattern
/// fails to compile.
pub fn builtin_checks(
    config: &GuardrailConfig,
    classifier: &Arc<IntentClassifier>,
) -> Result<Vec<Arc<dyn GuardrailCheck>>, GuardrailError> {
    Ok(vec![
        Arc::new(InputSafetyCheck::new(config, Arc::clone(classifier))?),
        Arc::new(SystemProtectionCheck::new()?),
        Arc::new(ContentFilterCheck::new(&config.blocked_keywords)?),
        Arc::new(EthicalBoundariesCheck::new()?),
        Arc::new(OutputSafetyCheck::new(config)?),
        Arc::new(OutputQualityCheck::new(config)),
        Arc::new(OutputScopeCheck::new(config, Arc::clone(classifier))),
    ])
}

#[expect(
    clippy::cast_precision_loss,
    reason = "character and word counts stay far below 2^52"
)]
#[expect(clippy::float_arithmetic, reason = "ratios feed heuristic scores")]
pub(crate) fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64
}

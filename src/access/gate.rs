//! Authorization Gate

/// Decide whether `granted` satisfies `required`.
///
/// An empty requirement means no gate is configured.
pub fn authorize(required: &str, granted: &[String]) -> bool {
    required.is_empty() || granted.iter().any(|c| c == required)
}

/// Reason given to a caller that lacks the required capability
pub fn denial_reason(required: &str) -> String {
    format!("Missing capability {}", required)
}

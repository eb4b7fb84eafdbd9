/// Canned pause reasons offered by the front-end menu, keyed by the
/// short codes the legacy inline keyboards used. The core accepts
/// arbitrary reason text; these are only shortcuts.
pub const PAUSE_REASONS: &[(&str, &str)] = &[
    ("coffee", "Coffee break"),
    ("lunch", "Lunch"),
    ("call", "Call / meeting"),
    ("technical", "Technical break"),
    ("smoke", "Smoke break"),
    ("away", "Stepped away"),
];

pub fn reason_label(code: &str) -> Option<&'static str> {
    PAUSE_REASONS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, label)| *label)
}

pub fn reason_menu() -> String {
    let codes: Vec<&str> = PAUSE_REASONS.iter().map(|(code, _)| *code).collect();
    format!("Quick reasons: {}", codes.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_resolve_to_labels() {
        assert_eq!(reason_label("lunch"), Some("Lunch"));
        assert_eq!(reason_label("smoke"), Some("Smoke break"));
        assert_eq!(reason_label("nap"), None);
    }
}

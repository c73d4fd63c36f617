//! HUD text and class helpers shared by the DOM host

/// Network indicator shown in the HUD
pub fn signal_label(online: bool) -> &'static str {
    if online {
        "Signal: Encrypted"
    } else {
        "Signal: Offline Cache"
    }
}

/// Add or remove one whitespace-separated token from a `class` attribute,
/// leaving every other token (and its order) untouched.
pub fn toggle_class_token(class: &str, token: &str, present: bool) -> String {
    let mut tokens: Vec<&str> = class.split_whitespace().filter(|t| *t != token).collect();
    if present {
        tokens.push(token);
    }
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_showing_a_panel_keeps_its_base_class() {
        assert_eq!(toggle_class_token("panel hidden", "hidden", false), "panel");
        assert_eq!(toggle_class_token("panel", "hidden", true), "panel hidden");
    }

    #[test]
    fn test_toggle_is_idempotent() {
        let shown = toggle_class_token("panel", "hidden", false);
        assert_eq!(shown, "panel");
        let hidden = toggle_class_token("panel hidden", "hidden", true);
        assert_eq!(hidden, "panel hidden");
        assert_eq!(toggle_class_token("", "hidden", false), "");
        assert_eq!(toggle_class_token("  a   hidden b ", "hidden", false), "a b");
    }

    #[test]
    fn test_signal_label_follows_connectivity() {
        assert_eq!(signal_label(true), "Signal: Encrypted");
        assert_eq!(signal_label(false), "Signal: Offline Cache");
    }
}

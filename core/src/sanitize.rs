use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("script block pattern"));

static EVENT_HANDLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)on\w+\s*=\s*["'][^"']*["']"#).expect("event handler pattern")
});

static JAVASCRIPT_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)javascript:").expect("javascript scheme pattern"));

pub fn sanitize_input(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub fn sanitize_selector(selector: &str) -> String {
    let stripped = SCRIPT_BLOCK.replace_all(selector, "");
    let stripped = EVENT_HANDLER.replace_all(&stripped, "");
    let stripped = JAVASCRIPT_SCHEME.replace_all(&stripped, "");
    stripped.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn input_escapes_markup_characters() {
        assert_eq!(
            sanitize_input(r#"<a href="/x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;&#x2F;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;&#x2F;a&gt;"
        );
        assert_eq!(sanitize_input("plain text"), "plain text");
    }

    #[test]
    fn selector_loses_script_content() {
        assert_eq!(
            sanitize_selector("#login<script type=\"x\">alert(1)</script>"),
            "#login"
        );
        assert_eq!(
            sanitize_selector("<SCRIPT>\nsteal()\n</script>//div"),
            "//div"
        );
        assert_eq!(
            sanitize_selector(r#"//img[@src='a' onerror="boom()"]"#),
            "//img[@src='a' ]"
        );
        assert_eq!(sanitize_selector("  JavaScript:void(0) "), "void(0)");
    }

    #[test]
    fn clean_selectors_are_untouched() {
        for selector in ["#submit", "//div[@id='main']", "input[name='q']"] {
            assert_eq!(sanitize_selector(selector), selector);
        }
    }

    proptest! {
        #[test]
        fn sanitized_input_has_no_angle_brackets(input in "\\PC{0,64}") {
            let sanitized = sanitize_input(&input);
            prop_assert!(!sanitized.contains('<'));
            prop_assert!(!sanitized.contains('>'));
            prop_assert!(!sanitized.contains('"'));
        }

        #[test]
        fn sanitizing_a_selector_twice_is_stable(prefix in "[a-z#.]{0,8}", body in "[a-z()]{0,8}") {
            let selector = format!("{prefix}<script>{body}</script>");
            let once = sanitize_selector(&selector);
            prop_assert!(!once.to_ascii_lowercase().contains("<script"));
            prop_assert_eq!(sanitize_selector(&once), once.clone());
        }
    }
}

//! Shape checks for captured contact details.
//!
//! These are hints only. The dialogue accepts any non-empty answer for the phone and
//! e-mail questions; the results here end up in logs and in the lead summary.

use std::sync::LazyLock;

use regex::Regex;

static PHONE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s().-]+$").expect("Invalid regex"));

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

/// Brazilian numbers with area code are 10 or 11 digits, 12 or 13 with the country code.
pub fn looks_like_phone(input: &str) -> bool {
    let input = input.trim();
    if !PHONE_CHARS.is_match(input) {
        return false;
    }
    let digits = input.chars().filter(char::is_ascii_digit).count();
    (10..=13).contains(&digits)
}

pub fn looks_like_email(input: &str) -> bool {
    EMAIL.is_match(input.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_shapes() {
        assert!(looks_like_phone("47999998888"));
        assert!(looks_like_phone("(47) 99999-8888"));
        assert!(looks_like_phone("+55 47 99999 8888"));
        assert!(!looks_like_phone("9999"));
        assert!(!looks_like_phone("call me maybe"));
    }

    #[test]
    fn test_email_shapes() {
        assert!(looks_like_email("maria@ex.com"));
        assert!(looks_like_email("  joao.silva@empresa.com.br "));
        assert!(!looks_like_email("maria@ex"));
        assert!(!looks_like_email("maria ex.com"));
    }
}

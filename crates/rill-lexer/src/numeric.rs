//! Numeric literal translation.
//!
//! Digit token images carry their surface form (`0x1f`, `0b1010`, `2.5e+3`)
//! and are translated to `f64` when the parser builds a number literal.

/// Translate a digit token image into its numeric value.
///
/// `0b` is binary, `0t` base-3, `0c` octal and `0x` hexadecimal; anything
/// else is decimal with an optional fraction and signed exponent. Returns
/// `None` when the image does not fit its base.
pub fn translate_digit(image: &str) -> Option<f64> {
    if let Some(rest) = image.strip_prefix("0b") {
        return parse_radix(rest, 2);
    }
    if let Some(rest) = image.strip_prefix("0t") {
        return parse_radix(rest, 3);
    }
    if let Some(rest) = image.strip_prefix("0c") {
        return parse_radix(rest, 8);
    }
    if let Some(rest) = image.strip_prefix("0x") {
        return parse_radix(rest, 16);
    }

    image.parse::<f64>().ok()
}

fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    i64::from_str_radix(digits, radix).ok().map(|value| value as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal() {
        assert_eq!(translate_digit("42"), Some(42.0));
        assert_eq!(translate_digit("3.25"), Some(3.25));
    }

    #[test]
    fn test_exponent() {
        assert_eq!(translate_digit("2e+3"), Some(2000.0));
        assert_eq!(translate_digit("25e-1"), Some(2.5));
    }

    #[test]
    fn test_alternate_bases() {
        assert_eq!(translate_digit("0b1010"), Some(10.0));
        assert_eq!(translate_digit("0t12"), Some(5.0));
        assert_eq!(translate_digit("0c17"), Some(15.0));
        assert_eq!(translate_digit("0xff"), Some(255.0));
    }

    #[test]
    fn test_bare_base_prefix_is_invalid() {
        assert_eq!(translate_digit("0b"), None);
        assert_eq!(translate_digit("0x"), None);
    }

    #[test]
    fn test_digits_outside_base_are_invalid() {
        assert_eq!(translate_digit("0b12"), None);
        assert_eq!(translate_digit("0t3"), None);
        assert_eq!(translate_digit("0c9"), None);
    }
}

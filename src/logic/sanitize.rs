//! EXP value sanitizer: undo the OCR corruption that glues extra digits onto an EXP reading.

/// Readings with more digits than this are considered corrupted.
pub const MAX_EXP_DIGITS: usize = 10;

/// Number of spurious leading digits a corrupted reading carries.
pub const CORRUPT_PREFIX_LEN: usize = 5;

/// Correct one EXP value read by OCR.
///
/// A value whose base-10 rendering is longer than [`MAX_EXP_DIGITS`] lost a merge with a
/// neighbouring screen region: the first [`CORRUPT_PREFIX_LEN`] digits are dropped and the rest is
/// re-parsed. Shorter values are returned unchanged.
///
/// Not idempotent for every input (a 16+ digit value still has 11+ digits after one pass), so
/// callers apply it exactly once per value.
pub fn sanitize_exp(n: u64) -> u64 {
    let digits = n.to_string();
    match sanitize_digits(&digits) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("EXP value {} could not be corrected ({}); keeping it as read", n, err);
            n
        }
    }
}

/// Same rule applied to a digit string (EXP values that arrive as JSON strings).
pub fn sanitize_digits(digits: &str) -> Result<u64, std::num::ParseIntError> {
    if digits.len() <= MAX_EXP_DIGITS {
        return digits.parse();
    }
    let corrected = digits
        .get(CORRUPT_PREFIX_LEN..)
        .unwrap_or_default()
        .parse::<u64>()?;
    log::debug!("Sanitized EXP {} -> {}", digits, corrected);
    Ok(corrected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_values_pass_through() {
        assert_eq!(sanitize_exp(0), 0);
        assert_eq!(sanitize_exp(500), 500);
        assert_eq!(sanitize_exp(9_999_999_999), 9_999_999_999);
    }

    #[test]
    fn eleven_digits_lose_five_leading() {
        assert_eq!(sanitize_exp(12_345_678_901), 678_901);
    }

    #[test]
    fn leading_zeros_after_cut_are_dropped() {
        // "10000" is cut, "00006000" remains
        assert_eq!(sanitize_exp(1_000_000_006_000), 6_000);
    }

    #[test]
    fn twelve_digit_reading_keeps_seven_trailing() {
        assert_eq!(sanitize_exp(999_991_234_567), 1_234_567);
    }

    #[test]
    fn non_numeric_digit_string_is_an_error() {
        assert!(sanitize_digits("12345abcdefgh").is_err());
        assert!(sanitize_digits("").is_err());
    }

    #[test]
    fn digit_strings_follow_the_same_rule() {
        assert_eq!(sanitize_digits("42").unwrap(), 42);
        assert_eq!(sanitize_digits("999991234567").unwrap(), 1_234_567);
    }
}

//! Contact-field validation predicates.

/// Returns whether `phone` is an accepted mobile number.
///
/// Accepted forms: a 10-digit local mobile starting `05`, or the
/// international form `972` followed by a 9-digit mobile number starting
/// `5`, with or without a leading `+`.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    let trimmed = phone.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    if let Some(national) = digits.strip_prefix("972") {
        return national.len() == 9 && national.starts_with('5');
    }

    digits.len() == 10 && digits.starts_with("05")
}

/// Returns whether `email` has the basic `local@domain.tld` shape.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let trimmed = email.trim();

    let Some((local, domain)) = trimmed.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') || trimmed.contains(char::is_whitespace) {
        return false;
    }

    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };

    !host.is_empty() && tld.len() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_local_mobile_numbers() {
        assert!(is_valid_phone("0501234567"), "10-digit local mobile");
    }

    #[test]
    fn accepts_international_mobile_numbers() {
        assert!(is_valid_phone("+972501234567"), "with plus");
        assert!(is_valid_phone("972501234567"), "without plus");
    }

    #[test]
    fn rejects_short_and_non_mobile_numbers() {
        assert!(!is_valid_phone("1234567"), "too short");
        assert!(!is_valid_phone("050123456"), "nine digits");
        assert!(!is_valid_phone("+97212345678"), "non-mobile prefix");
    }

    #[test]
    fn rejects_non_digit_input() {
        assert!(!is_valid_phone("05o1234567"), "letter in number");
        assert!(!is_valid_phone(""), "empty");
        assert!(!is_valid_phone("+"), "bare plus");
    }

    #[test]
    fn accepts_basic_emails() {
        assert!(is_valid_email("dana@example.com"), "plain address");
        assert!(is_valid_email("a.b+tag@mail.example.co.il"), "dotted local");
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(!is_valid_email("not-an-email"), "no at sign");
        assert!(!is_valid_email("@example.com"), "empty local part");
        assert!(!is_valid_email("dana@example"), "no tld");
        assert!(!is_valid_email("dana@exam ple.com"), "whitespace");
        assert!(!is_valid_email("dana@@example.com"), "double at");
        assert!(!is_valid_email("dana@.com"), "empty host");
    }
}

use rand::Rng;

/// Generate a CSRF token for the double-submit cookie/header pair.
pub fn generate_csrf_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}

/// Constant-time byte equality, used for the CSRF double-submit check and
/// the username echo in authentication.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Verify a CSRF token from the request header against the cookie value.
pub fn verify_csrf_token(cookie_value: &str, header_value: &str) -> bool {
    constant_time_eq(cookie_value.as_bytes(), header_value.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_unique_and_printable() {
        let a = generate_csrf_token();
        let b = generate_csrf_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.bytes().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn equal_pair_verifies() {
        let token = generate_csrf_token();
        assert!(verify_csrf_token(&token, &token.clone()));
    }

    #[test]
    fn unequal_or_truncated_pair_fails() {
        assert!(!verify_csrf_token("abcdef", "abcdee"));
        assert!(!verify_csrf_token("abcdef", "abcde"));
        assert!(!verify_csrf_token("", "abcdef"));
    }
}

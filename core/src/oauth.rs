//! PKCE and OAuth random-string helpers (RFC 7636).

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::Rng;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::url_helper::base64_url_encode;

/// Length used when the caller has no preference.
pub const DEFAULT_PKCE_LENGTH: usize = 43;

const PKCE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";
const HEX_CHARSET: &[u8] = b"0123456789abcdef";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OAuthError {
    #[error(
        "The length of the code verifier must be between 43 and 128. \
         See https://tools.ietf.org/html/rfc7636#section-4.1"
    )]
    InvalidLength(usize),
}

/// S256 challenge: `BASE64URL(SHA256(verifier))` without padding.
pub fn compute_code_challenge(verifier: &str) -> String {
    base64_url_encode(Sha256::digest(verifier.as_bytes()))
}

pub fn generate_code_verifier(length: usize) -> Result<String, OAuthError> {
    generate_random_pkce_string(length)
}

/// Random string of `length` (43..=128) unreserved characters.
pub fn generate_random_pkce_string(length: usize) -> Result<String, OAuthError> {
    if !(43..=128).contains(&length) {
        return Err(OAuthError::InvalidLength(length));
    }
    Ok(random_from(PKCE_CHARSET, length))
}

/// Random lowercase hex string of exactly `length` characters.
pub fn generate_random_hex_string(length: usize) -> String {
    random_from(HEX_CHARSET, length)
}

/// Standard base64 of a random PKCE string.
pub fn generate_nonce(length: usize) -> Result<String, OAuthError> {
    Ok(STANDARD.encode(generate_random_pkce_string(length)?))
}

/// Standard base64 of a random PKCE string.
pub fn generate_state(length: usize) -> Result<String, OAuthError> {
    Ok(STANDARD.encode(generate_random_pkce_string(length)?))
}

fn random_from(charset: &[u8], length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| char::from(charset[rng.random_range(0..charset.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_challenge_vectors() {
        assert_eq!(
            compute_code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
        assert_eq!(
            compute_code_challenge("wS-Ed-me0tTq4sROIzqp0Mm00BNRtF4Bxd_3sOySqGR"),
            "7U72YtL4Z3Q_prqWyfm5UBZaXG4Q52HTimlRN9dnaPk"
        );
    }

    #[test]
    fn pkce_string_length_and_alphabet() {
        for length in [DEFAULT_PKCE_LENGTH, 64, 128] {
            let value = generate_random_pkce_string(length).unwrap();
            assert_eq!(value.len(), length);
            assert!(value.bytes().all(|b| PKCE_CHARSET.contains(&b)), "{value}");
        }
        assert_eq!(generate_code_verifier(DEFAULT_PKCE_LENGTH).unwrap().len(), 43);
    }

    #[test]
    fn pkce_length_bounds() {
        assert_eq!(generate_random_pkce_string(42), Err(OAuthError::InvalidLength(42)));
        assert_eq!(generate_random_pkce_string(129), Err(OAuthError::InvalidLength(129)));
        assert!(generate_nonce(0).is_err());
        assert!(OAuthError::InvalidLength(1).to_string().contains("between 43 and 128"));
    }

    #[test]
    fn hex_string_any_length() {
        for length in [0, 1, 7, 32] {
            let value = generate_random_hex_string(length);
            assert_eq!(value.len(), length);
            assert!(value.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
        }
    }

    #[test]
    fn nonce_and_state_are_base64_of_pkce() {
        let nonce = generate_nonce(DEFAULT_PKCE_LENGTH).unwrap();
        let state = generate_state(DEFAULT_PKCE_LENGTH).unwrap();
        assert_eq!(nonce.len(), 60);
        assert_eq!(state.len(), 60);

        let decoded = STANDARD.decode(&nonce).unwrap();
        assert_eq!(decoded.len(), 43);
        assert!(decoded.iter().all(|b| PKCE_CHARSET.contains(b)));
        assert_ne!(nonce, state);
    }
}

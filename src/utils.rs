use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
use url::form_urlencoded;

pub const CODE_VERIFIER_LENGTH: usize = 128;
pub const STATE_LENGTH: usize = 16;

/// Random string of `length` characters drawn from `[A-Za-z0-9]`.
pub fn generate_random_string(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

pub fn generate_code_verifier() -> String {
    generate_random_string(CODE_VERIFIER_LENGTH)
}

pub fn generate_state() -> String {
    generate_random_string(STATE_LENGTH)
}

/// S256 challenge: base64url without padding of the SHA-256 of the verifier.
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Encodes free text into the `q=...` query string the search endpoint expects.
pub fn encode_search_query(terms: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("q", terms.trim())
        .finish()
}

//! Opaque invitation token generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Generate a cryptographically random opaque invitation token
/// (32 bytes → base64url-encoded, no padding).
pub fn generate_invitation_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_url_safe() {
        let a = generate_invitation_token();
        let b = generate_invitation_token();
        assert_ne!(a, b);
        // 32 bytes → 43 base64url characters, no padding.
        assert_eq!(a.len(), 43);
        assert!(!a.contains('='));
        assert!(!a.contains('+'));
        assert!(!a.contains('/'));
    }
}

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the `X-Line-Signature` value for a raw request body.
pub fn sign(channel_secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(channel_secret.as_bytes()).expect("hmac accepts any key size");
    mac.update(body);
    BASE64.encode(mac.finalize().into_bytes())
}

/// Verify the `X-Line-Signature` header against the raw request body.
/// Comparison happens inside the mac (constant time).
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = BASE64.decode(signature) else {
        return false;
    };
    let mut mac =
        HmacSha256::new_from_slice(channel_secret.as_bytes()).expect("hmac accepts any key size");
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

//! Billing ledger webhook signing.
//!
//! The ledger signs each delivery with HMAC-SHA256 over the raw request
//! body and sends the lowercase hex digest in `x-billing-signature`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::CoreError;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "x-billing-signature";

/// Maximum length of an external billing reference.
pub const MAX_BILLING_REFERENCE_LEN: usize = 128;

type HmacSha256 = Hmac<Sha256>;

/// Compute the hex signature of a webhook payload.
pub fn sign_payload(secret: &str, payload: &[u8]) -> Result<String, CoreError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CoreError::Internal(format!("Invalid webhook secret: {e}")))?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a hex signature in constant time.
pub fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> Result<(), CoreError> {
    let expected = hex::decode(signature.trim())
        .ok_or_else(|| CoreError::Unauthenticated("Malformed billing signature".into()))?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CoreError::Internal(format!("Invalid webhook secret: {e}")))?;
    mac.update(payload);
    mac.verify_slice(&expected)
        .map_err(|_| CoreError::Unauthenticated("Billing signature mismatch".into()))
}

/// Validate an external billing reference.
pub fn validate_billing_reference(reference: &str) -> Result<(), CoreError> {
    if reference.trim().is_empty() || reference.len() > MAX_BILLING_REFERENCE_LEN {
        return Err(CoreError::Invalid(format!(
            "billing_reference must be 1 to {MAX_BILLING_REFERENCE_LEN} characters"
        )));
    }
    Ok(())
}

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Decode a hex string; `None` on odd length or any byte that is not
    /// an ASCII hex digit (signs and whitespace included).
    pub fn decode(s: &str) -> Option<Vec<u8>> {
        let digits = s.as_bytes();
        if digits.len() % 2 != 0 {
            return None;
        }
        digits
            .chunks_exact(2)
            .map(|pair| Some((nibble(pair[0])? << 4) | nibble(pair[1])?))
            .collect()
    }

    fn nibble(digit: u8) -> Option<u8> {
        char::from(digit).to_digit(16).map(|d| d as u8)
    }
}

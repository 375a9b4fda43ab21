//! `X-Hub-Signature-256` verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::WebhookError;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PREFIX: &str = "sha256=";

/// The shared secret configured on the GitHub App or repository webhook.
///
/// Holds the keyed HMAC state; each verification works on a clone of it.
#[derive(Clone)]
pub struct WebhookSecret {
    keyed: HmacSha256,
}

impl WebhookSecret {
    /// Wraps a secret, returning `None` if it is empty.
    pub fn new(secret: impl AsRef<[u8]>) -> Option<Self> {
        let bytes = secret.as_ref();
        if bytes.is_empty() {
            return None;
        }
        HmacSha256::new_from_slice(bytes)
            .ok()
            .map(|keyed| Self { keyed })
    }

    fn mac(&self) -> HmacSha256 {
        self.keyed.clone()
    }

    /// Returns the `sha256=<hex>` header value GitHub would send for `body`.
    pub fn sign(&self, body: &[u8]) -> String {
        let mut mac = self.mac();
        mac.update(body);
        format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
    }

    /// Checks `header` against the HMAC of `body` in constant time.
    pub fn verify(&self, header: &str, body: &[u8]) -> Result<(), WebhookError> {
        let encoded = header
            .strip_prefix(SIGNATURE_PREFIX)
            .ok_or_else(|| WebhookError::InvalidSignatureFormat("missing sha256= prefix".into()))?;
        let expected = hex::decode(encoded)
            .map_err(|e| WebhookError::InvalidSignatureFormat(e.to_string()))?;

        let mut mac = self.mac();
        mac.update(body);
        let actual = mac.finalize().into_bytes();

        if expected.len() != actual.len() {
            return Err(WebhookError::InvalidSignature);
        }
        if bool::from(expected.ct_eq(actual.as_slice())) {
            Ok(())
        } else {
            Err(WebhookError::InvalidSignature)
        }
    }
}

impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret(<redacted>)")
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook signature verification.
//!
//! Providers sign the canonical event serialization (signature field
//! excluded) with HMAC-SHA256 over their registered shared secret and
//! send the hex digest as the `signature` field.

use crate::error::AppError;
use crate::models::ProviderEvent;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Re-serialize an event into the exact bytes the provider signed.
///
/// The `signature` field is skipped during serialization and fields
/// keep their declared order, so this is deterministic regardless of
/// how the transport re-encoded the original JSON.
pub fn canonical_payload(event: &ProviderEvent) -> Result<Vec<u8>, AppError> {
    serde_json::to_vec(event).map_err(|e| AppError::Internal(anyhow::anyhow!(e)))
}

/// Verify an HMAC-SHA256 hex signature over `payload`.
///
/// The comparison is constant-time in the digest contents; a
/// wrong-length claim fails without leaking anything.
pub fn verify(payload: &[u8], claimed_signature: &str, secret: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        // HMAC accepts keys of any length; this cannot fail in practice.
        Err(_) => return false,
    };
    mac.update(payload);
    let expected = hex::encode(mac.finalize().into_bytes());

    expected
        .as_bytes()
        .ct_eq(claimed_signature.as_bytes())
        .into()
}

/// Sign a payload the way a provider would. Test and tooling helper.
pub fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

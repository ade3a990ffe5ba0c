//! Webhook signature checks.

use hmac::{Hmac, Mac};
use jiff::Timestamp;
use sha2::Sha256;

use super::GatewayError;

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of the concatenated `parts`.
pub(crate) fn sign_hex(secret: &[u8], parts: &[&[u8]]) -> Result<String, GatewayError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| GatewayError::InvalidSignature)?;

    for part in parts {
        mac.update(part);
    }

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a hex signature over the concatenated `parts`.
pub(crate) fn verify_hex(
    secret: &[u8],
    parts: &[&[u8]],
    signature: &str,
) -> Result<(), GatewayError> {
    let expected = hex::decode(signature.trim()).map_err(|_| GatewayError::InvalidSignature)?;
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| GatewayError::InvalidSignature)?;

    for part in parts {
        mac.update(part);
    }

    mac.verify_slice(&expected)
        .map_err(|_| GatewayError::InvalidSignature)
}

/// Verifies a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=<hex>]`).
///
/// The signed message is `{t}.{body}`; any `v1` entry may match. The
/// timestamp must lie within `tolerance_seconds` of `now`.
pub(crate) fn verify_stripe(
    secret: &[u8],
    header: &str,
    body: &[u8],
    now: Timestamp,
    tolerance_seconds: i64,
) -> Result<(), GatewayError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for element in header.split(',') {
        match element.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(GatewayError::InvalidSignature)?;
    let sent_at: i64 = timestamp
        .parse()
        .map_err(|_| GatewayError::InvalidSignature)?;

    if now.as_second().abs_diff(sent_at) > tolerance_seconds.unsigned_abs() {
        return Err(GatewayError::InvalidSignature);
    }

    let parts: [&[u8]; 3] = [timestamp.as_bytes(), b".", body];

    if signatures
        .iter()
        .any(|signature| verify_hex(secret, &parts, signature).is_ok())
    {
        Ok(())
    } else {
        Err(GatewayError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    const SECRET: &[u8] = b"whsec_test";
    const BODY: &[u8] = br#"{"type":"payment_intent.succeeded"}"#;

    fn stripe_header(at: i64, body: &[u8]) -> Result<String, GatewayError> {
        let t = at.to_string();
        let v1 = sign_hex(SECRET, &[t.as_bytes(), b".", body])?;

        Ok(format!("t={t},v1={v1}"))
    }

    #[test]
    fn hex_signature_round_trips() -> TestResult {
        let signature = sign_hex(SECRET, &[BODY])?;

        verify_hex(SECRET, &[BODY], &signature)?;

        assert!(matches!(
            verify_hex(b"other", &[BODY], &signature),
            Err(GatewayError::InvalidSignature)
        ));
        assert!(matches!(
            verify_hex(SECRET, &[BODY], "not hex"),
            Err(GatewayError::InvalidSignature)
        ));

        Ok(())
    }

    #[test]
    fn stripe_header_within_tolerance_verifies() -> TestResult {
        let now = Timestamp::from_second(1_700_000_000)?;
        let header = stripe_header(1_700_000_000 - 30, BODY)?;

        verify_stripe(SECRET, &header, BODY, now, 300)?;

        Ok(())
    }

    #[test]
    fn stripe_accepts_any_matching_v1() -> TestResult {
        let now = Timestamp::from_second(1_700_000_000)?;
        let header = stripe_header(1_700_000_000, BODY)?;
        let header = header.replacen("v1=", "v1=00ff,v1=", 1);

        verify_stripe(SECRET, &header, BODY, now, 300)?;

        Ok(())
    }

    #[test]
    fn stripe_rejects_old_timestamp() -> TestResult {
        let now = Timestamp::from_second(1_700_000_000)?;
        let header = stripe_header(1_700_000_000 - 301, BODY)?;

        let result = verify_stripe(SECRET, &header, BODY, now, 300);

        assert!(
            matches!(result, Err(GatewayError::InvalidSignature)),
            "expected InvalidSignature, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn stripe_rejects_tampered_body() -> TestResult {
        let now = Timestamp::from_second(1_700_000_000)?;
        let header = stripe_header(1_700_000_000, BODY)?;

        let result = verify_stripe(SECRET, &header, b"{}", now, 300);

        assert!(matches!(result, Err(GatewayError::InvalidSignature)));

        Ok(())
    }

    #[test]
    fn stripe_rejects_header_without_timestamp() -> TestResult {
        let now = Timestamp::from_second(1_700_000_000)?;

        let result = verify_stripe(SECRET, "v1=abcd", BODY, now, 300);

        assert!(matches!(result, Err(GatewayError::InvalidSignature)));

        Ok(())
    }
}

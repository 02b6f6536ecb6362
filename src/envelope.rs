use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::Result;
use crate::error::Error;
use crate::types::{Document, SubmissionEnvelope};

/// Fixed `document_format` of every submission.
pub const DOCUMENT_FORMAT: &str = "MANUAL";
/// Fixed `type` of every submission.
pub const DOCUMENT_TYPE: &str = "LP_INTRODUCE_GOODS";

/// Checks that the signature and product group were supplied.
///
/// A blank string counts as absent.
pub(crate) fn ensure_present(signature: &str, product_group: &str) -> Result<()> {
    if signature.trim().is_empty() {
        return Err(Error::validation("signature is required"));
    }
    if product_group.trim().is_empty() {
        return Err(Error::validation("product group is required"));
    }
    Ok(())
}

/// Wraps `document` into the envelope expected by the creation endpoint.
///
/// Pure: no network or shared state is touched, and the same inputs always
/// produce the same envelope.
pub fn build_envelope(
    document: &Document,
    signature: &str,
    product_group: &str,
) -> Result<SubmissionEnvelope> {
    ensure_present(signature, product_group)?;

    let json = serde_json::to_vec(document)?;

    Ok(SubmissionEnvelope {
        document_format: DOCUMENT_FORMAT.to_owned(),
        product_document: STANDARD.encode(json),
        product_group: product_group.to_owned(),
        signature: signature.to_owned(),
        kind: DOCUMENT_TYPE.to_owned(),
    })
}

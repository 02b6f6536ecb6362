//! Client for submitting goods introduction documents to the CRPT labeling
//! registry.
//!
//! Every [`CrptClient`] owns a fixed-window [`RateLimiter`]: at most
//! `capacity` submissions may begin per `period`, and the budget is reset to
//! full at each period boundary by a background task that lives as long as
//! the client (or until [`CrptClient::shutdown`]).
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use crpt_client::{ClientConfig, CrptClient, Document};
//! use secrecy::SecretString;
//!
//! # async fn run() -> crpt_client::Result<()> {
//! let config = ClientConfig::new(SecretString::from("token"), Duration::from_secs(1), 10)?;
//! let client = CrptClient::new(config)?;
//!
//! let document = Document::builder().participant_inn("7701234567").build();
//! let reply = client.submit(&document, "signature", "shoes").await?;
//! if reply.is_failure_status() {
//!     // inspect reply.code / reply.error_message
//! }
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
pub mod envelope;
pub mod error;
mod limiter;
mod refill;
pub mod transport;
pub mod types;

use serde::de::DeserializeOwned;

pub use client::CrptClient;
pub use config::ClientConfig;
pub use error::Error;
pub use limiter::RateLimiter;
pub use tokio_util::sync::CancellationToken;
pub use types::{ApiReply, Document, DocumentMeta, ProductItem, SubmissionEnvelope};

pub type Result<T> = std::result::Result<T, Error>;

/// Decodes a registry reply body.
///
/// With the `tracing` feature, fields the model does not know about are
/// logged and decode failures carry the path of the offending field.
#[cfg(feature = "tracing")]
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    use crate::error::Kind;

    let mut de = serde_json::Deserializer::from_str(body);
    let mut unknown = Vec::new();
    let value = {
        let de = serde_ignored::Deserializer::new(&mut de, |path| {
            unknown.push(path.to_string());
        });
        serde_path_to_error::deserialize(de).map_err(|e| Error::with_source(Kind::Internal, e))?
    };
    de.end()?;

    if !unknown.is_empty() {
        tracing::warn!(
            fields = ?unknown,
            "registry reply contained fields not present in the model"
        );
    }

    Ok(value)
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}

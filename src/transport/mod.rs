//! Transport adapter seam
//!
//! One blocking POST per call. Implementations own connection handling,
//! TLS and timeouts; the rest of the crate only sees status and body bytes.

pub mod client;
pub mod mock;

pub use client::HttpTransport;
pub use mock::{MockTransport, RecordedRequest};

use crate::Result;

/// A fully encoded request ready to be sent.
#[derive(Debug)]
pub struct TransportRequest<'a> {
    pub url: String,
    pub api_key: &'a str,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Raw reply as received from the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport: Send + Sync {
    /// Performs the round trip. `Err` means no reply body was received.
    fn post(&self, request: TransportRequest<'_>) -> Result<TransportResponse>;
}

//! Error types for the indexing core

use alloy::primitives::B256;
use thiserror::Error;

/// Errors raised by the chain client capability set.
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("rpc transport failure: {0}")]
    Transport(String),

    #[error("head subscription failed: {0}")]
    Subscription(String),

    #[error("no header for block hash {0}")]
    MissingHeader(B256),
}

/// A log whose payload does not match the event it claims to be.
///
/// Never fatal: the offending log is skipped and scanning continues, so a
/// contract upgrade emitting wider events cannot stall indexing.
#[derive(Error, Debug)]
#[error("cannot decode {event} log in tx {tx_hash} (selector {selector}): {reason}")]
pub struct DecodeError {
    pub event: &'static str,
    pub selector: B256,
    pub tx_hash: B256,
    pub reason: String,
}

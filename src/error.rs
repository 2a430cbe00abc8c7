//! # Error Types
//!
//! Every failure is recovered at the boundary that produced it and surfaced
//! as a single user-visible message. None of these are process-fatal.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

/// Message shown to the user for every transport failure.
pub const PRINTER_OFFLINE_MESSAGE: &str = "Printer offline or out of range";

/// Platform-level GATT failure.
#[derive(Debug, Error)]
pub enum GattError {
    /// The requested service or characteristic does not exist on the device
    #[error("GATT attribute {0} not found")]
    NotFound(Uuid),

    /// The link dropped
    #[error("Device disconnected")]
    Disconnected,

    /// Anything else reported by the Bluetooth stack
    #[error("Bluetooth error: {0}")]
    Platform(String),
}

/// Failure to discover or pair a printer.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The user dismissed the device chooser
    #[error("Device selection cancelled")]
    Cancelled,

    /// No matching device answered the scan
    #[error("No printer found matching {0}")]
    NotFound(String),

    /// The OS refused Bluetooth access
    #[error("Bluetooth permission denied")]
    PermissionDenied,

    /// No adapter, adapter off, or another platform failure
    #[error("Bluetooth unavailable: {0}")]
    Unavailable(String),
}

/// Failure while delivering a byte stream to the printer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No device handle and no remembered printer name
    #[error("No printer linked")]
    NotLinked,

    /// Re-finding the remembered printer failed
    #[error("Could not find the linked printer: {0}")]
    Relink(#[source] LinkError),

    #[error("Connection failed: {0}")]
    Connect(#[source] GattError),

    #[error("Printer service {0} not found")]
    ServiceNotFound(Uuid),

    #[error("Write characteristic {0} not found")]
    CharacteristicNotFound(Uuid),

    /// A chunk write failed; later chunks were not attempted
    #[error("Write failed at chunk {chunk} of {total}: {source}")]
    Write {
        chunk: usize,
        total: usize,
        #[source]
        source: GattError,
    },

    #[error("Timed out after {timeout:?} while {stage}")]
    Timeout {
        stage: &'static str,
        timeout: Duration,
    },
}

impl TransportError {
    /// The message shown to the user. Details stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            TransportError::NotLinked => "No printer linked. Link a Bluetooth printer first.",
            _ => PRINTER_OFFLINE_MESSAGE,
        }
    }
}

/// Failure of the AI text-transform collaborator. Never fatal: callers
/// substitute a fallback.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("No API key configured")]
    MissingCredential,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Empty response from model")]
    EmptyResponse,
}

/// Failure reading or writing the persisted configuration.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main error type for recibo operations
#[derive(Debug, Error)]
pub enum ReciboError {
    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    /// The OS print surface could not be written
    #[error("Print surface error: {0}")]
    Surface(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReciboError {
    /// The single message surfaced to the user.
    pub fn user_message(&self) -> String {
        match self {
            ReciboError::Transport(e) => e.user_message().to_string(),
            other => other.to_string(),
        }
    }
}

//! Persistent session sequence counter
//!
//! A single rolling number in non-volatile storage, advanced once per boot
//! so that several sessions on the same day get distinct log files.
//!
//! The value is kept as a postcard-encoded `u16` under
//! [`StorageKey::SessionSequence`]. Storing it wider than its valid range
//! means a corrupted record shows up as an out-of-range value instead of
//! silently aliasing a valid one.

use kinelog_hal::{FlashError, FlashStorage, StorageKey};
use serde::{Deserialize, Serialize};

use crate::config::OverflowPolicy;

/// Largest stored record
const MAX_RECORD_SIZE: usize = 8;

/// Highest valid counter value
pub const SEQUENCE_MAX: u8 = u8::MAX;

/// Counter record as stored in flash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub value: u16,
}

/// Where the loaded counter value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadSource {
    /// Valid value read from storage
    Stored,
    /// No record yet (first boot or erased flash)
    Missing,
    /// Record decoded but held a value above [`SEQUENCE_MAX`]
    OutOfRange(u16),
    /// Record could not be read or decoded
    Unreadable,
}

impl LoadSource {
    /// Check if the default was substituted for the stored value
    pub fn is_reset(&self) -> bool {
        !matches!(self, LoadSource::Stored)
    }
}

/// Counter write-back errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    /// Flash operation failed
    Flash(FlashError),
    /// Serialization failed
    Serialize,
}

impl From<FlashError> for PersistError {
    fn from(e: FlashError) -> Self {
        PersistError::Flash(e)
    }
}

/// Result of advancing the counter at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Advance {
    /// Value loaded before advancing (0 if reset)
    pub previous: u8,
    /// Where `previous` came from
    pub source: LoadSource,
    /// New session sequence number
    pub value: u8,
    /// Whether the new value reached storage
    pub persisted: Result<(), PersistError>,
}

/// Range-check a raw stored value
///
/// Anything outside `0..=255` is corrupt and yields `None`.
pub fn validate_stored(raw: u16) -> Option<u8> {
    u8::try_from(raw).ok()
}

/// Next counter value under the given overflow policy
///
/// Zero is never produced: it means "never booted or corrupt".
pub const fn next_sequence(value: u8, policy: OverflowPolicy) -> u8 {
    match (value, policy) {
        (SEQUENCE_MAX, OverflowPolicy::Wrap) => 1,
        (SEQUENCE_MAX, OverflowPolicy::Saturate) => SEQUENCE_MAX,
        (v, _) => v + 1,
    }
}

/// Sequence counter backed by flash storage
pub struct PersistentCounter<F> {
    storage: F,
    policy: OverflowPolicy,
}

impl<F: FlashStorage> PersistentCounter<F> {
    /// Create a counter over the given storage
    pub fn new(storage: F, policy: OverflowPolicy) -> Self {
        Self { storage, policy }
    }

    /// Overflow policy in use
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Read the stored value
    ///
    /// Missing, undecodable and out-of-range records all load as 0.
    pub async fn load(&mut self) -> (u8, LoadSource) {
        let mut buffer = [0u8; MAX_RECORD_SIZE];
        let len = match self
            .storage
            .read(StorageKey::SessionSequence, &mut buffer)
            .await
        {
            Ok(len) => len,
            Err(FlashError::NotFound) => return (0, LoadSource::Missing),
            Err(_) => return (0, LoadSource::Unreadable),
        };

        let record: SequenceRecord = match postcard::from_bytes(&buffer[..len]) {
            Ok(record) => record,
            Err(_) => return (0, LoadSource::Unreadable),
        };

        match validate_stored(record.value) {
            Some(value) => (value, LoadSource::Stored),
            None => (0, LoadSource::OutOfRange(record.value)),
        }
    }

    /// Write a value to storage
    pub async fn store(&mut self, value: u8) -> Result<(), PersistError> {
        let record = SequenceRecord {
            value: u16::from(value),
        };
        let mut buffer = [0u8; MAX_RECORD_SIZE];
        let bytes = postcard::to_slice(&record, &mut buffer).map_err(|_| PersistError::Serialize)?;

        self.storage
            .write(StorageKey::SessionSequence, bytes)
            .await?;

        Ok(())
    }

    /// Load, advance and persist the counter for a new session
    ///
    /// A failed write-back is returned in [`Advance::persisted`]; the new
    /// value is still used for this session.
    pub async fn advance(&mut self) -> Advance {
        let (previous, source) = self.load().await;
        let value = next_sequence(previous, self.policy);
        let persisted = self.store(value).await;

        Advance {
            previous,
            source,
            value,
            persisted,
        }
    }

    /// Release the underlying storage
    pub fn into_storage(self) -> F {
        self.storage
    }
}

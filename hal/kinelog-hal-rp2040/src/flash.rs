//! Session counter partition on the RP2040's program flash
//!
//! The RP2040 has no EEPROM. The top 64 KiB of the Pico's 2 MiB flash is
//! left out of `memory.x` and handed to a sequential-storage map, which
//! spreads rewrites of the counter record across its sectors.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

use kinelog_hal::flash::{FlashError, FlashStorage, StorageKey};

/// Flash fitted to the Pico
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Bytes reserved for the counter map, at the end of flash
pub const COUNTER_PARTITION_SIZE: usize = 64 * 1024;

/// Address range of the counter map, relative to the start of flash
pub const COUNTER_RANGE: core::ops::Range<u32> =
    ((FLASH_SIZE - COUNTER_PARTITION_SIZE) as u32)..(FLASH_SIZE as u32);

// sequential-storage works in whole erase sectors
const _: () = assert!(COUNTER_PARTITION_SIZE % ERASE_SIZE == 0);
const _: () = assert!(COUNTER_PARTITION_SIZE / ERASE_SIZE >= 2);

/// Map item scratch: key byte plus a postcard record of a few bytes
const ITEM_SCRATCH: usize = 64;

/// Counter storage backed by the last flash sectors
pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
    scratch: [u8; ITEM_SCRATCH],
}

impl<'d> Rp2040FlashStorage<'d> {
    /// Take the flash peripheral, using `dma` for reads
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
            scratch: [0; ITEM_SCRATCH],
        }
    }
}

fn fetch_error<E>(error: sequential_storage::Error<E>) -> FlashError {
    match error {
        sequential_storage::Error::Corrupted { .. } => FlashError::Corrupted,
        _ => FlashError::Storage,
    }
}

fn store_error<E>(error: sequential_storage::Error<E>) -> FlashError {
    match error {
        sequential_storage::Error::FullStorage => FlashError::Full,
        other => fetch_error(other),
    }
}

impl<'d> FlashStorage for Rp2040FlashStorage<'d> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let item = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            COUNTER_RANGE,
            &mut NoCache::new(),
            &mut self.scratch,
            &key,
        )
        .await
        .map_err(fetch_error)?
        .ok_or(FlashError::NotFound)?;

        let target = buffer
            .get_mut(..item.len())
            .ok_or(FlashError::BufferTooSmall)?;
        target.copy_from_slice(item);
        Ok(item.len())
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        map::store_item(
            &mut self.flash,
            COUNTER_RANGE,
            &mut NoCache::new(),
            &mut self.scratch,
            &key,
            &data,
        )
        .await
        .map_err(store_error)
    }
}

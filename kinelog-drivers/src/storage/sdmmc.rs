//! SD card log volume (FAT via embedded-sdmmc)
//!
//! embedded-sdmmc only handles 8.3 short names, so a session file
//! `record_YYYYMMDD_SSS.csv` is stored as `YYYYMMDD/REC_SSS.CSV`. The day
//! directory is created on first use.
//!
//! The volume and root directory stay open once mounted. Day directories
//! and files are opened and closed around every operation, so a card pulled
//! between samples loses at most the row being written.

use core::cell::Cell;
use core::fmt::Debug;

use embedded_sdmmc::{
    BlockDevice, Error, Mode, RawDirectory, TimeSource, Timestamp, VolumeIdx, VolumeManager,
};
use kinelog_core::clock::DateTime;
use kinelog_core::session::SessionIdentity;
use kinelog_core::traits::LogVolume;

/// SD volume errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SdError {
    /// Card did not respond or a block transfer failed
    Device,
    /// No usable partition on the card
    NoVolume,
    /// Partition is not FAT16/FAT32
    Format,
    /// Operation attempted before a successful mount
    NotMounted,
    /// File or directory missing
    NotFound,
    /// Name rejected by the filesystem
    BadName,
    /// Name already taken
    AlreadyExists,
    /// No free clusters
    DiskFull,
    /// Handle table exhausted
    TooManyOpen,
    /// Any other filesystem error
    Filesystem,
}

impl<E: Debug> From<Error<E>> for SdError {
    fn from(e: Error<E>) -> Self {
        match e {
            Error::DeviceError(_) => SdError::Device,
            Error::NoSuchVolume => SdError::NoVolume,
            Error::FormatError(_) => SdError::Format,
            Error::NotFound => SdError::NotFound,
            Error::FilenameError(_) => SdError::BadName,
            Error::FileAlreadyExists | Error::DirAlreadyExists => SdError::AlreadyExists,
            Error::NotEnoughSpace | Error::DiskFull => SdError::DiskFull,
            Error::TooManyOpenFiles | Error::TooManyOpenDirs | Error::TooManyOpenVolumes => {
                SdError::TooManyOpen
            }
            _ => SdError::Filesystem,
        }
    }
}

/// Earliest FAT timestamp, 1980-01-01T00:00:00
const FAT_EPOCH: Timestamp = Timestamp {
    year_since_1970: 10,
    zero_indexed_month: 0,
    zero_indexed_day: 0,
    hours: 0,
    minutes: 0,
    seconds: 0,
};

/// Years a FAT directory entry can hold
const FAT_YEARS: core::ops::RangeInclusive<u16> = 1980..=2107;

/// FAT timestamp for a clock reading
///
/// Readings outside 1980-2107 clamp to [`FAT_EPOCH`].
pub fn fat_timestamp(time: &DateTime) -> Timestamp {
    if !FAT_YEARS.contains(&time.year()) {
        return FAT_EPOCH;
    }
    Timestamp::from_calendar(
        time.year(),
        time.month(),
        time.day(),
        time.hour(),
        time.minute(),
        time.second(),
    )
    .unwrap_or(FAT_EPOCH)
}

/// File timestamp source fixed to the session start
///
/// Created before boot with a placeholder (the build time) and updated
/// once the clock has been read.
pub struct SessionTimeSource {
    stamp: Cell<Timestamp>,
}

impl SessionTimeSource {
    pub fn new(time: &DateTime) -> Self {
        Self {
            stamp: Cell::new(fat_timestamp(time)),
        }
    }

    /// Stamp files with `time` from now on
    pub fn set(&self, time: &DateTime) {
        self.stamp.set(fat_timestamp(time));
    }
}

impl TimeSource for &SessionTimeSource {
    fn get_timestamp(&self) -> Timestamp {
        self.stamp.get()
    }
}

/// Session logs on the first FAT partition of an SD card
pub struct SdLogVolume<D, T>
where
    D: BlockDevice,
    T: TimeSource,
    D::Error: Debug,
{
    manager: VolumeManager<D, T>,
    root: Option<RawDirectory>,
}

impl<D, T> SdLogVolume<D, T>
where
    D: BlockDevice,
    T: TimeSource,
    D::Error: Debug,
{
    pub fn new(manager: VolumeManager<D, T>) -> Self {
        Self {
            manager,
            root: None,
        }
    }

    fn root(&self) -> Result<RawDirectory, SdError> {
        self.root.ok_or(SdError::NotMounted)
    }

    /// Open the session's day directory, optionally creating it
    fn open_day_dir(
        &self,
        session: &SessionIdentity,
        create: bool,
    ) -> Result<RawDirectory, Error<D::Error>> {
        let root = self.root.ok_or(Error::NotFound)?;
        let name = session.day_directory();

        match self.manager.open_dir(root, name.as_str()) {
            Err(Error::NotFound) if create => {
                self.manager.make_dir_in_dir(root, name.as_str())?;
                self.manager.open_dir(root, name.as_str())
            }
            other => other,
        }
    }

    /// Run `op` on the session file name inside its day directory
    ///
    /// The directory is closed whether or not `op` succeeds.
    fn in_day_dir<R>(
        &self,
        session: &SessionIdentity,
        create: bool,
        op: impl FnOnce(&VolumeManager<D, T>, RawDirectory, &str) -> Result<R, Error<D::Error>>,
    ) -> Result<R, SdError> {
        self.root()?;
        let dir = self.open_day_dir(session, create)?;
        let name = session.short_file_name();

        let result = op(&self.manager, dir, name.as_str());
        let closed = self.manager.close_dir(dir);

        let value = result?;
        closed?;
        Ok(value)
    }

    /// Open `name` with `mode`, write `data`, close
    fn write_file(
        manager: &VolumeManager<D, T>,
        dir: RawDirectory,
        name: &str,
        mode: Mode,
        data: &[u8],
    ) -> Result<(), Error<D::Error>> {
        let file = manager.open_file_in_dir(dir, name, mode)?;
        let written = manager.write(file, data);
        let closed = manager.close_file(file);
        written?;
        closed
    }
}

impl<D, T> LogVolume for SdLogVolume<D, T>
where
    D: BlockDevice,
    T: TimeSource,
    D::Error: Debug,
{
    type Error = SdError;

    fn mount(&mut self) -> Result<(), SdError> {
        if self.root.is_some() {
            return Ok(());
        }
        let volume = self.manager.open_raw_volume(VolumeIdx(0))?;
        let root = self.manager.open_root_dir(volume)?;
        self.root = Some(root);
        Ok(())
    }

    fn exists(&mut self, session: &SessionIdentity) -> Result<bool, SdError> {
        self.root()?;
        let dir = match self.open_day_dir(session, false) {
            Ok(dir) => dir,
            Err(Error::NotFound) => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let name = session.short_file_name();
        let found = match self.manager.find_directory_entry(dir, name.as_str()) {
            Ok(_) => Ok(true),
            Err(Error::NotFound) => Ok(false),
            Err(e) => Err(SdError::from(e)),
        };
        let closed = self.manager.close_dir(dir);

        let found = found?;
        closed?;
        Ok(found)
    }

    fn create(&mut self, session: &SessionIdentity, header: &[u8]) -> Result<(), SdError> {
        self.in_day_dir(session, true, |manager, dir, name| {
            Self::write_file(manager, dir, name, Mode::ReadWriteCreate, header)
        })
    }

    fn append(&mut self, session: &SessionIdentity, line: &[u8]) -> Result<(), SdError> {
        self.in_day_dir(session, false, |manager, dir, name| {
            Self::write_file(manager, dir, name, Mode::ReadWriteAppend, line)
        })
    }
}

//! Log volume trait

use core::fmt::Debug;

use crate::session::SessionIdentity;

/// Append-only file storage for session logs
///
/// A volume knows how to map a session to a file on its medium. Every
/// operation is a complete open/write/close cycle; implementations hold no
/// open file between calls.
pub trait LogVolume {
    /// Backend error type
    type Error: Copy + Debug;

    /// Bring the medium up (card init, volume and root directory open)
    fn mount(&mut self) -> Result<(), Self::Error>;

    /// Check whether the session file already exists
    fn exists(&mut self, session: &SessionIdentity) -> Result<bool, Self::Error>;

    /// Create the session file containing only `header`
    fn create(&mut self, session: &SessionIdentity, header: &[u8]) -> Result<(), Self::Error>;

    /// Append `line` to the end of an existing session file
    fn append(&mut self, session: &SessionIdentity, line: &[u8]) -> Result<(), Self::Error>;
}

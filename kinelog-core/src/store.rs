//! Append-only CSV log store
//!
//! Each append is a complete cycle against the volume: probe for the
//! session file, create it with the header if absent, then append the row.
//! Nothing is kept open between samples and nothing is retried.

use crate::sample::{header_line, CsvRow};
use crate::session::SessionIdentity;
use crate::traits::LogVolume;

/// Log store errors, tagged by the step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError<E> {
    /// Existence check failed
    Probe(E),
    /// File could not be created or the header not written
    Create(E),
    /// File could not be opened for append or the row not written
    Append(E),
}

/// Outcome of a successful append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppendOutcome {
    /// The file was created (with header) by this append
    pub created: bool,
}

/// Session log writer over a [`LogVolume`]
pub struct LogStore<V> {
    volume: V,
}

impl<V: LogVolume> LogStore<V> {
    pub fn new(volume: V) -> Self {
        Self { volume }
    }

    /// Append one row to the session file, creating it first if needed
    pub fn append(
        &mut self,
        session: &SessionIdentity,
        row: &CsvRow,
    ) -> Result<AppendOutcome, StoreError<V::Error>> {
        let exists = self.volume.exists(session).map_err(StoreError::Probe)?;

        if !exists {
            self.volume
                .create(session, header_line().as_bytes())
                .map_err(StoreError::Create)?;
        }

        self.volume
            .append(session, row.as_bytes())
            .map_err(StoreError::Append)?;

        Ok(AppendOutcome { created: !exists })
    }

    pub fn volume(&self) -> &V {
        &self.volume
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::clock::Date;
    use crate::sample::CSV_HEADER;
    use std::collections::BTreeMap;
    use std::string::String;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) enum MemError {
        Unmounted,
        Full,
        Missing,
    }

    /// In-memory volume keyed by logical filename
    #[derive(Default)]
    pub(crate) struct MemVolume {
        pub files: BTreeMap<String, String>,
        pub mounted: bool,
        pub fail_mount: bool,
        pub fail_create: bool,
        pub fail_append: bool,
    }

    impl MemVolume {
        pub(crate) fn contents(&self, session: &SessionIdentity) -> Option<&str> {
            self.files
                .get(session.filename().as_str())
                .map(|s| s.as_str())
        }
    }

    impl LogVolume for MemVolume {
        type Error = MemError;

        fn mount(&mut self) -> Result<(), MemError> {
            if self.fail_mount {
                return Err(MemError::Unmounted);
            }
            self.mounted = true;
            Ok(())
        }

        fn exists(&mut self, session: &SessionIdentity) -> Result<bool, MemError> {
            if !self.mounted {
                return Err(MemError::Unmounted);
            }
            Ok(self.files.contains_key(session.filename().as_str()))
        }

        fn create(&mut self, session: &SessionIdentity, header: &[u8]) -> Result<(), MemError> {
            if self.fail_create {
                return Err(MemError::Full);
            }
            let text = String::from_utf8(header.to_vec()).map_err(|_| MemError::Full)?;
            self.files.insert(session.filename().as_str().into(), text);
            Ok(())
        }

        fn append(&mut self, session: &SessionIdentity, line: &[u8]) -> Result<(), MemError> {
            if self.fail_append {
                return Err(MemError::Full);
            }
            let file = self
                .files
                .get_mut(session.filename().as_str())
                .ok_or(MemError::Missing)?;
            file.push_str(core::str::from_utf8(line).map_err(|_| MemError::Full)?);
            Ok(())
        }
    }

    pub(crate) fn mounted() -> MemVolume {
        MemVolume {
            mounted: true,
            ..Default::default()
        }
    }

    fn row(text: &str) -> CsvRow {
        let mut row = CsvRow::new();
        row.push_str(text).unwrap();
        row
    }

    fn session(sequence: u8) -> SessionIdentity {
        SessionIdentity::new(Date::new(2024, 6, 1).unwrap(), sequence)
    }

    #[test]
    fn test_first_append_writes_header() {
        let mut store = LogStore::new(mounted());
        let s = session(1);

        let outcome = store.append(&s, &row("a\r\n")).unwrap();
        assert!(outcome.created);
        assert_eq!(
            store.volume().contents(&s).unwrap(),
            std::format!("{}\r\na\r\n", CSV_HEADER)
        );
    }

    #[test]
    fn test_header_written_once_per_file() {
        let mut store = LogStore::new(mounted());
        let first = session(1);
        let second = session(2);

        assert!(store.append(&first, &row("a\r\n")).unwrap().created);
        assert!(!store.append(&first, &row("b\r\n")).unwrap().created);
        assert!(store.append(&second, &row("c\r\n")).unwrap().created);
        assert!(!store.append(&first, &row("d\r\n")).unwrap().created);

        let text = store.volume().contents(&first).unwrap();
        assert_eq!(text.matches(CSV_HEADER).count(), 1);
        assert!(text.ends_with("a\r\nb\r\nd\r\n"));
        assert_eq!(store.volume().contents(&second).unwrap().lines().count(), 2);
    }

    #[test]
    fn test_existing_file_is_appended_not_rewritten() {
        let mut volume = mounted();
        let s = session(9);
        volume
            .files
            .insert(s.filename().as_str().into(), "old\r\n".into());

        let mut store = LogStore::new(volume);
        assert!(!store.append(&s, &row("new\r\n")).unwrap().created);
        assert_eq!(store.volume().contents(&s).unwrap(), "old\r\nnew\r\n");
    }

    #[test]
    fn test_errors_are_tagged_by_step() {
        let s = session(1);

        let mut store = LogStore::new(MemVolume::default());
        assert_eq!(
            store.append(&s, &row("x")),
            Err(StoreError::Probe(MemError::Unmounted))
        );

        let mut store = LogStore::new(MemVolume {
            fail_create: true,
            ..mounted()
        });
        assert_eq!(
            store.append(&s, &row("x")),
            Err(StoreError::Create(MemError::Full))
        );
        assert!(store.volume().contents(&s).is_none());

        let mut store = LogStore::new(MemVolume {
            fail_append: true,
            ..mounted()
        });
        assert_eq!(
            store.append(&s, &row("x")),
            Err(StoreError::Append(MemError::Full))
        );
    }
}

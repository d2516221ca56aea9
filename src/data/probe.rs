use crate::error::AppError;
use crate::table::Table;
use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

/// Read access to the named data files of one session.
pub trait FileProbe {
    fn exists(&self, name: &str) -> bool;

    fn modified(&self, name: &str) -> Option<SystemTime>;

    fn read_table(&self, name: &str) -> Result<Table, AppError>;

    fn path_of(&self, name: &str) -> PathBuf;
}

/// Probes files inside a single data directory.
#[derive(Debug, Clone)]
pub struct DirProbe {
    root: PathBuf,
}

impl DirProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirProbe { root: root.into() }
    }
}

impl FileProbe for DirProbe {
    fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    fn modified(&self, name: &str) -> Option<SystemTime> {
        fs::metadata(self.path_of(name)).and_then(|m| m.modified()).ok()
    }

    fn read_table(&self, name: &str) -> Result<Table, AppError> {
        let path = self.path_of(name);
        let bytes = fs::read(&path).map_err(|source| AppError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Table::from_csv_bytes(&bytes, name)
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::time::Duration;

    /// In-memory probe for tests; every write bumps the modification time.
    #[derive(Debug, Default)]
    pub struct MemoryProbe {
        files: HashMap<String, (String, u64)>,
        clock: u64,
        reads: Cell<usize>,
    }

    impl MemoryProbe {
        pub fn new() -> Self {
            MemoryProbe::default()
        }

        pub fn with(mut self, name: &str, contents: &str) -> Self {
            self.write(name, contents);
            self
        }

        pub fn write(&mut self, name: &str, contents: &str) {
            self.clock += 1;
            self.files
                .insert(name.to_string(), (contents.to_string(), self.clock));
        }

        pub fn reads(&self) -> usize {
            self.reads.get()
        }
    }

    impl FileProbe for MemoryProbe {
        fn exists(&self, name: &str) -> bool {
            self.files.contains_key(name)
        }

        fn modified(&self, name: &str) -> Option<SystemTime> {
            self.files
                .get(name)
                .map(|(_, stamp)| SystemTime::UNIX_EPOCH + Duration::from_secs(*stamp))
        }

        fn read_table(&self, name: &str) -> Result<Table, AppError> {
            self.reads.set(self.reads.get() + 1);
            let (contents, _) = self.files.get(name).ok_or_else(|| AppError::Io {
                path: name.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })?;
            Table::from_csv_bytes(contents.as_bytes(), name)
        }

        fn path_of(&self, name: &str) -> PathBuf {
            PathBuf::from(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_probe_reads_files_from_its_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("spell_summary.csv"), "spell_combo,games\nFlash+Mark,12\n").unwrap();

        let probe = DirProbe::new(dir.path());
        assert!(probe.exists("spell_summary.csv"));
        assert!(!probe.exists("item_summary.csv"));
        assert!(probe.modified("spell_summary.csv").is_some());

        let table = probe.read_table("spell_summary.csv").unwrap();
        assert_eq!(table.len(), 1);
        assert!(matches!(
            probe.read_table("item_summary.csv"),
            Err(AppError::Io { .. })
        ));
    }
}

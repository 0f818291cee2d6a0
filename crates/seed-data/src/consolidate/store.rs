//! File access for the consolidator.
//!
//! [`SeedStore`] abstracts the two directories consolidation touches so the
//! merge logic can be exercised against an in-memory double.

use std::fmt;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;

use crate::error::ConsolidationError;

/// One of the two directories managed by the consolidator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {
    /// Directory receiving freshly exported `<table>_api_<ts>.csv` files.
    Staging,
    /// Directory holding canonical `<table>.csv` seeds and their backups.
    Canonical,
}

impl Location {
    /// Returns the lowercase role name used in messages.
    #[must_use]
    pub const fn role(self) -> &'static str {
        match self {
            Self::Staging => "staging",
            Self::Canonical => "canonical",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.role())
    }
}

/// Flat file operations on the staging and canonical directories.
///
/// Names are plain file names relative to the location; implementations
/// never descend into subdirectories.
pub trait SeedStore {
    /// Lists regular file names in `location`, sorted lexicographically.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while reading the directory.
    fn list(&self, location: Location) -> io::Result<Vec<String>>;

    /// Reports whether `name` exists as a file in `location`.
    ///
    /// # Errors
    ///
    /// Returns I/O errors other than "not found".
    fn exists(&self, location: Location, name: &str) -> io::Result<bool>;

    /// Reads `name` as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while reading.
    fn read_to_string(&self, location: Location, name: &str) -> io::Result<String>;

    /// Creates or truncates `name` with `contents`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while writing.
    fn write(&self, location: Location, name: &str, contents: &[u8]) -> io::Result<()>;

    /// Renames `from` to `to` within `location`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised by the rename.
    fn rename(&self, location: Location, from: &str, to: &str) -> io::Result<()>;

    /// Deletes `name`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised by the removal.
    fn remove(&self, location: Location, name: &str) -> io::Result<()>;

    /// Describes `location` for logs and listings, typically its path.
    fn describe(&self, location: Location) -> String;
}

/// A [`SeedStore`] over two capability-scoped directories.
#[derive(Debug)]
pub struct DirSeedStore {
    staging: Dir,
    staging_path: Utf8PathBuf,
    canonical: Dir,
    canonical_path: Utf8PathBuf,
}

impl DirSeedStore {
    /// Opens both directories; neither is created.
    ///
    /// # Errors
    ///
    /// Returns [`ConsolidationError::MissingDirectory`] naming the first
    /// directory that cannot be opened.
    pub fn open(staging: &Utf8Path, canonical: &Utf8Path) -> Result<Self, ConsolidationError> {
        Ok(Self {
            staging: open_dir(Location::Staging, staging)?,
            staging_path: staging.to_path_buf(),
            canonical: open_dir(Location::Canonical, canonical)?,
            canonical_path: canonical.to_path_buf(),
        })
    }

    const fn dir(&self, location: Location) -> &Dir {
        match location {
            Location::Staging => &self.staging,
            Location::Canonical => &self.canonical,
        }
    }

    /// Returns the path `location` was opened from.
    #[must_use]
    pub fn path(&self, location: Location) -> &Utf8Path {
        match location {
            Location::Staging => &self.staging_path,
            Location::Canonical => &self.canonical_path,
        }
    }
}

fn open_dir(location: Location, path: &Utf8Path) -> Result<Dir, ConsolidationError> {
    Dir::open_ambient_dir(path, ambient_authority()).map_err(|err| {
        ConsolidationError::MissingDirectory {
            role: location.role(),
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    })
}

impl SeedStore for DirSeedStore {
    fn list(&self, location: Location) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for item in self.dir(location).entries()? {
            let entry = item?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            // Non UTF-8 names can never match a seed file pattern.
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn exists(&self, location: Location, name: &str) -> io::Result<bool> {
        match self.dir(location).metadata(name) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn read_to_string(&self, location: Location, name: &str) -> io::Result<String> {
        self.dir(location).read_to_string(name)
    }

    fn write(&self, location: Location, name: &str, contents: &[u8]) -> io::Result<()> {
        self.dir(location).write(name, contents)
    }

    fn rename(&self, location: Location, from: &str, to: &str) -> io::Result<()> {
        let dir = self.dir(location);
        dir.rename(from, dir, to)
    }

    fn remove(&self, location: Location, name: &str) -> io::Result<()> {
        self.dir(location).remove_file(name)
    }

    fn describe(&self, location: Location) -> String {
        self.path(location).to_string()
    }
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory [`SeedStore`] double.

    use std::cell::RefCell;
    use std::collections::{BTreeMap, HashSet};
    use std::io;

    use super::{Location, SeedStore};

    /// Files keyed by location and name, with optional injected failures.
    #[derive(Debug, Default)]
    pub(crate) struct MemoryStore {
        files: RefCell<BTreeMap<(Location, String), Vec<u8>>>,
        failing_removals: RefCell<HashSet<String>>,
        failing_writes: RefCell<HashSet<String>>,
    }

    fn not_found(name: &str) -> io::Error {
        io::Error::new(io::ErrorKind::NotFound, format!("{name} not found"))
    }

    impl MemoryStore {
        pub(crate) fn with_file(self, location: Location, name: &str, contents: &str) -> Self {
            self.insert(location, name, contents);
            self
        }

        pub(crate) fn insert(&self, location: Location, name: &str, contents: &str) {
            self.files.borrow_mut().insert(
                (location, name.to_owned()),
                contents.as_bytes().to_vec(),
            );
        }

        pub(crate) fn fail_removal_of(self, name: &str) -> Self {
            self.failing_removals.borrow_mut().insert(name.to_owned());
            self
        }

        pub(crate) fn fail_writes_to(self, name: &str) -> Self {
            self.failing_writes.borrow_mut().insert(name.to_owned());
            self
        }

        pub(crate) fn contents(&self, location: Location, name: &str) -> Option<String> {
            self.files
                .borrow()
                .get(&(location, name.to_owned()))
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        }

        pub(crate) fn names(&self, location: Location) -> Vec<String> {
            self.list(location).unwrap_or_default()
        }
    }

    impl SeedStore for MemoryStore {
        fn list(&self, location: Location) -> io::Result<Vec<String>> {
            Ok(self
                .files
                .borrow()
                .keys()
                .filter(|(file_location, _)| *file_location == location)
                .map(|(_, name)| name.clone())
                .collect())
        }

        fn exists(&self, location: Location, name: &str) -> io::Result<bool> {
            Ok(self
                .files
                .borrow()
                .contains_key(&(location, name.to_owned())))
        }

        fn read_to_string(&self, location: Location, name: &str) -> io::Result<String> {
            let files = self.files.borrow();
            let bytes = files
                .get(&(location, name.to_owned()))
                .ok_or_else(|| not_found(name))?;
            String::from_utf8(bytes.clone())
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
        }

        fn write(&self, location: Location, name: &str, contents: &[u8]) -> io::Result<()> {
            if self.failing_writes.borrow().contains(name) {
                return Err(io::Error::other("injected write failure"));
            }
            self.files
                .borrow_mut()
                .insert((location, name.to_owned()), contents.to_vec());
            Ok(())
        }

        fn rename(&self, location: Location, from: &str, to: &str) -> io::Result<()> {
            let mut files = self.files.borrow_mut();
            let contents = files
                .remove(&(location, from.to_owned()))
                .ok_or_else(|| not_found(from))?;
            files.insert((location, to.to_owned()), contents);
            Ok(())
        }

        fn remove(&self, location: Location, name: &str) -> io::Result<()> {
            if self.failing_removals.borrow().contains(name) {
                return Err(io::Error::other("injected removal failure"));
            }
            self.files
                .borrow_mut()
                .remove(&(location, name.to_owned()))
                .map(drop)
                .ok_or_else(|| not_found(name))
        }

        fn describe(&self, location: Location) -> String {
            format!("memory:{location}")
        }
    }
}

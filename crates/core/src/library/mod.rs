//! File library - per-user metadata for uploaded and converted files.
//!
//! The library only stores metadata (name, type, size, processing state).
//! File bytes never leave the conversion request that carried them.

mod sqlite;
mod types;

pub use sqlite::SqliteLibrary;
pub use types::*;

/// Trait for file library storage.
///
/// Every operation is scoped to a user id. Looking up another user's
/// file behaves exactly like looking up a file that does not exist.
pub trait FileLibrary: Send + Sync {
    /// Add a new, unprocessed file for the user.
    fn add(&self, user_id: &str, file: NewFileObject) -> Result<FileObject, LibraryError>;

    /// Get a single file by id.
    fn get(&self, user_id: &str, id: &str) -> Result<FileObject, LibraryError>;

    /// List the user's files, filtered and sorted by the query.
    fn list(&self, user_id: &str, query: &LibraryQuery) -> Result<Vec<FileObject>, LibraryError>;

    /// Mark a file as processed into the given format.
    fn mark_processed(
        &self,
        user_id: &str,
        id: &str,
        converted_format: &str,
    ) -> Result<FileObject, LibraryError>;

    /// Remove a file from the library.
    fn remove(&self, user_id: &str, id: &str) -> Result<(), LibraryError>;

    /// Count the user's files.
    fn count(&self, user_id: &str) -> Result<u64, LibraryError>;
}

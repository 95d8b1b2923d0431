//! Error types for lookup table operations.

use thiserror::Error;

use crate::remote::RemoteError;
use crate::repository::ArtifactError;

/// Errors that can occur while reading or changing a lookup table.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The remote store failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Version listing or URL handling failed.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// No table version exists for the group.
    #[error(
        "no lookup tables available under group ID '{group_id}'\n  Suggestion: Create one with Lookup::create"
    )]
    NoTables {
        /// Searched group ID.
        group_id: String,
    },

    /// The requested table version does not exist.
    #[error("lookup table '{url}' does not exist yet")]
    TableNotFound {
        /// Table location.
        url: String,
    },

    /// `create` found an existing table.
    #[error(
        "lookup table '{url}' exists already\n  Suggestion: Pass force to overwrite it"
    )]
    TableExists {
        /// Table location.
        url: String,
    },

    /// Params do not name exactly the table columns.
    #[error("table columns {columns:?} do not match parameters {keys:?}")]
    ColumnMismatch {
        /// Columns of the table.
        columns: Vec<String>,
        /// Keys of the given params.
        keys: Vec<String>,
    },

    /// A row with the same values exists already.
    #[error("entry for {params} already exists")]
    DuplicateEntry {
        /// The rejected params.
        params: String,
    },

    /// No row matches the params.
    #[error("could not find requested entry {params} in version {version}")]
    EntryNotFound {
        /// The searched params.
        params: String,
        /// Table version searched.
        version: String,
    },

    /// A text value would read back as another type.
    #[error("'{value}' is forbidden, use the {kind} {value} instead")]
    ForbiddenValue {
        /// The rejected text.
        value: String,
        /// The type the text would read back as.
        kind: &'static str,
    },

    /// `delete` without force on a table with rows.
    #[error(
        "cannot remove lookup table '{url}' if it is not empty\n  Suggestion: Pass force to delete it anyway"
    )]
    NotEmpty {
        /// Table location.
        url: String,
    },

    /// The stored document is not a valid table.
    #[error("malformed lookup table at {url}: {reason}")]
    MalformedTable {
        /// Table location.
        url: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl LookupError {
    pub fn no_tables(group_id: impl Into<String>) -> Self {
        Self::NoTables {
            group_id: group_id.into(),
        }
    }

    pub fn table_not_found(url: impl Into<String>) -> Self {
        Self::TableNotFound { url: url.into() }
    }

    pub fn table_exists(url: impl Into<String>) -> Self {
        Self::TableExists { url: url.into() }
    }

    pub fn column_mismatch(columns: &[String], keys: Vec<String>) -> Self {
        Self::ColumnMismatch {
            columns: columns.to_vec(),
            keys,
        }
    }

    pub fn duplicate_entry(params: impl Into<String>) -> Self {
        Self::DuplicateEntry {
            params: params.into(),
        }
    }

    pub fn entry_not_found(params: impl Into<String>, version: impl Into<String>) -> Self {
        Self::EntryNotFound {
            params: params.into(),
            version: version.into(),
        }
    }

    pub fn forbidden_value(value: impl Into<String>, kind: &'static str) -> Self {
        Self::ForbiddenValue {
            value: value.into(),
            kind,
        }
    }

    pub fn not_empty(url: impl Into<String>) -> Self {
        Self::NotEmpty { url: url.into() }
    }

    pub fn malformed_table(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTable {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

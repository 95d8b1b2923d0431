//! Versioned lookup tables stored as CSV files in a repository.
//!
//! A lookup table assigns a generated ID to every distinct combination of
//! parameter values, e.g. one row per model flavor. Each table version is
//! a single CSV artifact:
//!
//! ```text
//! {root}/{repository}/{group/as/path}/{name}/{version}/{name}-{version}.csv
//! ```
//!
//! Every operation reads the whole document from the server, changes it in
//! memory and writes it back. There is no locking: two writers changing the
//! same table concurrently can lose an update (last writer wins).
//!
//! # Example
//!
//! ```no_run
//! use artifactory_client::config::RepositoryConfig;
//! use artifactory_client::lookup::{Lookup, LookupOptions, Value, params};
//! use artifactory_client::repository::Repository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = Repository::new(RepositoryConfig::default())?;
//! let options = LookupOptions::default();
//! Lookup::create(&repository, "com.audeering.models", "1.0.0", &["lr", "layers"], &options, false)
//!     .await?;
//! let lookup = Lookup::open(&repository, "com.audeering.models", None, &options).await?;
//! let id = lookup
//!     .append(&params([("layers", Value::from(3)), ("lr", Value::from(0.01))]))
//!     .await?;
//! println!("{id}");
//! # Ok(())
//! # }
//! ```

mod error;
mod table;
mod value;

pub use error::LookupError;
pub use table::{ID_COLUMN, Row, Table};
pub use value::{Columns, Params, Value, params};

use bytes::Bytes;
use tracing::{debug, info, instrument};

use crate::coordinates::artifact_base_url;
use crate::remote::parent_url;
use crate::repository::{ArtifactError, Repository};

/// File extension of lookup tables.
pub const LOOKUP_EXTENSION: &str = "csv";

/// Default artifact name of a lookup table.
pub const DEFAULT_LOOKUP_NAME: &str = "lookup";

/// Default repository holding lookup tables.
pub const DEFAULT_LOOKUP_REPOSITORY: &str = "models-public-local";

/// Where lookup tables of a group live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupOptions {
    /// Artifact name of the table.
    pub name: String,
    /// Repository holding the table.
    pub repository: String,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_LOOKUP_NAME.to_string(),
            repository: DEFAULT_LOOKUP_REPOSITORY.to_string(),
        }
    }
}

impl LookupOptions {
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = repository.into();
        self
    }
}

/// URL of the CSV document of a table version.
fn table_url(repository: &Repository, group_id: &str, version: &str, options: &LookupOptions) -> String {
    let folder = artifact_base_url(
        repository.root(),
        &options.repository,
        group_id,
        Some(&options.name),
        Some(version),
    );
    format!("{folder}/{}-{version}.{LOOKUP_EXTENSION}", options.name)
}

/// Handle on one existing table version.
///
/// The handle caches nothing; every read fetches the current document.
#[derive(Debug, Clone)]
pub struct Lookup {
    repository: Repository,
    group_id: String,
    version: String,
    options: LookupOptions,
    url: String,
}

impl Lookup {
    fn at(repository: &Repository, group_id: &str, version: &str, options: &LookupOptions) -> Self {
        Self {
            repository: repository.clone(),
            group_id: group_id.to_string(),
            version: version.to_string(),
            options: options.clone(),
            url: table_url(repository, group_id, version, options),
        }
    }

    /// Opens a table version, the latest one when `version` is `None`.
    ///
    /// # Errors
    ///
    /// - [`LookupError::NoTables`] if the group has no table at all
    /// - [`LookupError::TableNotFound`] if `version` does not exist
    #[instrument(skip(repository, options), fields(name = %options.name))]
    pub async fn open(
        repository: &Repository,
        group_id: &str,
        version: Option<&str>,
        options: &LookupOptions,
    ) -> Result<Self, LookupError> {
        let version = match version {
            Some(version) => version.to_string(),
            None => Self::latest_version(repository, group_id, None, options)
                .await?
                .ok_or_else(|| LookupError::no_tables(group_id))?,
        };
        if !Self::exists(repository, group_id, &version, options).await? {
            return Err(LookupError::table_not_found(table_url(
                repository, group_id, &version, options,
            )));
        }
        Ok(Self::at(repository, group_id, &version, options))
    }

    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.options.name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Repository holding the table.
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.options.repository
    }

    /// URL of the CSV document.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Downloads the current table.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Remote`] if the download fails and
    /// [`LookupError::MalformedTable`] if the document is not a table.
    pub async fn table(&self) -> Result<Table, LookupError> {
        let text = self.repository.remote().fetch_text(&self.url).await?;
        Table::parse(&text, &self.url)
    }

    /// Column names without `id`.
    ///
    /// # Errors
    ///
    /// See [`Lookup::table`].
    pub async fn columns(&self) -> Result<Vec<String>, LookupError> {
        Ok(self.table().await?.columns().to_vec())
    }

    /// Identifiers of all rows.
    ///
    /// # Errors
    ///
    /// See [`Lookup::table`].
    pub async fn ids(&self) -> Result<Vec<String>, LookupError> {
        let table = self.table().await?;
        Ok(table.ids().into_iter().map(ToString::to_string).collect())
    }

    /// Params of the row with identifier `id`, if present.
    ///
    /// # Errors
    ///
    /// See [`Lookup::table`].
    pub async fn get(&self, id: &str) -> Result<Option<Params>, LookupError> {
        Ok(self.table().await?.get(id))
    }

    /// Adds a row and returns its generated ID.
    ///
    /// # Errors
    ///
    /// - [`LookupError::ForbiddenValue`] before anything is fetched
    /// - [`LookupError::ColumnMismatch`] if `params` does not name exactly
    ///   the table columns
    /// - [`LookupError::DuplicateEntry`] if a row has the same values
    #[instrument(skip(self, params), fields(url = %self.url))]
    pub async fn append(&self, params: &Params) -> Result<String, LookupError> {
        params.values().try_for_each(Value::validate)?;
        let mut table = self.table().await?;
        let id = table.append(params)?;
        self.upload(&table).await?;
        debug!(id = %id, "entry appended");
        Ok(id)
    }

    /// Adds new columns and returns the resulting table.
    ///
    /// `columns` is a column name, a list of names, or `(name, value)`
    /// pairs. Existing rows are filled with the value (null for plain
    /// names). On a table without rows, a new column with a value starts a
    /// first row holding that value and nulls elsewhere. Columns that exist
    /// already are left untouched.
    ///
    /// # Errors
    ///
    /// [`LookupError::ForbiddenValue`] before anything is fetched, or any
    /// transfer error.
    #[instrument(skip(self, columns), fields(url = %self.url))]
    pub async fn extend(&self, columns: impl Into<Columns>) -> Result<Table, LookupError> {
        let columns = columns.into();
        columns.validate()?;
        let mut table = self.table().await?;
        table.extend(&columns);
        self.upload(&table).await?;
        debug!(columns = table.columns().len(), "columns extended");
        Ok(table)
    }

    /// ID of the row whose values equal `params`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::EntryNotFound`] if no row matches all columns.
    pub async fn find(&self, params: &Params) -> Result<String, LookupError> {
        let table = self.table().await?;
        table
            .find(params)
            .map(ToString::to_string)
            .ok_or_else(|| LookupError::entry_not_found(value::describe(params), &self.version))
    }

    /// True if a row matches `params`.
    ///
    /// # Errors
    ///
    /// See [`Lookup::table`].
    pub async fn contains(&self, params: &Params) -> Result<bool, LookupError> {
        match self.find(params).await {
            Ok(_) => Ok(true),
            Err(LookupError::EntryNotFound { .. }) => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Removes the row matching `params` and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::EntryNotFound`] if no row matches.
    #[instrument(skip(self, params), fields(url = %self.url))]
    pub async fn remove(&self, params: &Params) -> Result<String, LookupError> {
        let mut table = self.table().await?;
        let id = table
            .find(params)
            .map(ToString::to_string)
            .ok_or_else(|| LookupError::entry_not_found(value::describe(params), &self.version))?;
        table.remove(&id);
        self.upload(&table).await?;
        debug!(id = %id, "entry removed");
        Ok(id)
    }

    /// Drops all rows, keeping the columns.
    ///
    /// # Errors
    ///
    /// See [`Lookup::table`].
    pub async fn clear(&self) -> Result<(), LookupError> {
        let mut table = self.table().await?;
        table.clear();
        self.upload(&table).await
    }

    async fn upload(&self, table: &Table) -> Result<(), LookupError> {
        write_table(&self.repository, &self.url, table).await
    }

    /// Creates a table version with the given columns and returns its URL.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::TableExists`] if the version exists and
    /// `force` is not set.
    #[instrument(skip(repository, columns, options), fields(name = %options.name))]
    pub async fn create(
        repository: &Repository,
        group_id: &str,
        version: &str,
        columns: &[&str],
        options: &LookupOptions,
        force: bool,
    ) -> Result<String, LookupError> {
        let url = table_url(repository, group_id, version, options);
        if !force && Self::exists(repository, group_id, version, options).await? {
            return Err(LookupError::table_exists(url));
        }
        write_table(repository, &url, &Table::new(columns.iter().copied())).await?;
        info!(url = %url, "lookup table created");
        Ok(url)
    }

    /// Deletes a table version including its folder.
    ///
    /// # Errors
    ///
    /// - [`LookupError::TableNotFound`] if the version does not exist
    /// - [`LookupError::NotEmpty`] if it has rows and `force` is not set
    #[instrument(skip(repository, options), fields(name = %options.name))]
    pub async fn delete(
        repository: &Repository,
        group_id: &str,
        version: &str,
        options: &LookupOptions,
        force: bool,
    ) -> Result<(), LookupError> {
        let lookup = Self::open(repository, group_id, Some(version), options).await?;
        let table = lookup.table().await?;
        if !table.is_empty() {
            if !force {
                return Err(LookupError::not_empty(lookup.url));
            }
            lookup.clear().await?;
        }
        repository
            .remote()
            .remove_tree(parent_url(&lookup.url))
            .await?;
        info!(url = %lookup.url, "lookup table deleted");
        Ok(())
    }

    /// True if `version` of the table exists.
    ///
    /// # Errors
    ///
    /// Returns transfer errors other than a missing artifact.
    pub async fn exists(
        repository: &Repository,
        group_id: &str,
        version: &str,
        options: &LookupOptions,
    ) -> Result<bool, LookupError> {
        let versions = Self::versions(repository, group_id, None, options).await?;
        Ok(versions.iter().any(|available| available == version))
    }

    /// Available table versions in ascending order.
    ///
    /// With `params`, only versions containing a matching row are returned.
    /// A group without tables yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns transfer errors other than a missing artifact.
    #[instrument(skip(repository, params, options), fields(name = %options.name))]
    pub async fn versions(
        repository: &Repository,
        group_id: &str,
        params: Option<&Params>,
        options: &LookupOptions,
    ) -> Result<Vec<String>, LookupError> {
        let versions = match repository
            .versions_in(&options.repository, group_id, &options.name, None)
            .await
        {
            Ok(versions) => versions,
            Err(ArtifactError::NoVersions { .. }) => Vec::new(),
            Err(ArtifactError::Remote(error)) if error.is_not_found() => Vec::new(),
            Err(error) => return Err(error.into()),
        };
        let Some(params) = params else {
            return Ok(versions);
        };

        let mut matching = Vec::new();
        for version in versions {
            let lookup = Self::at(repository, group_id, &version, options);
            if lookup.contains(params).await? {
                matching.push(version);
            }
        }
        Ok(matching)
    }

    /// Latest table version, optionally containing a row matching `params`.
    ///
    /// # Errors
    ///
    /// See [`Lookup::versions`].
    pub async fn latest_version(
        repository: &Repository,
        group_id: &str,
        params: Option<&Params>,
        options: &LookupOptions,
    ) -> Result<Option<String>, LookupError> {
        let mut versions = Self::versions(repository, group_id, params, options).await?;
        Ok(versions.pop())
    }
}

async fn write_table(repository: &Repository, url: &str, table: &Table) -> Result<(), LookupError> {
    let body = table.to_csv(url)?;
    let remote = repository.remote();
    remote.ensure_parent(url).await?;
    remote.put_bytes(url, Bytes::from(body)).await?;
    debug!(url = %url, rows = table.rows().len(), "lookup table uploaded");
    Ok(())
}

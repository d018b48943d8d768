//! Package backend trait definition

use std::fmt;

use crate::core::{
    InstallPackageParams, InstallPatchesParams, ListPatchesParams, ModifyRepoParams,
    PackageRecord, PatchRecord, QueryMode, QueryResult, RemovePackageParams, RepoRecord, Result,
    SearchHit, SearchPackageParams, UpdatePackageParams,
};

/// Capability surface every backend implements.
///
/// A backend that lacks a capability returns
/// [`PkgError::Unsupported`](crate::core::PkgError::Unsupported) or
/// [`PkgError::NotImplemented`](crate::core::PkgError::NotImplemented), never an
/// empty success. Implementations hold only immutable configuration, so one
/// instance can serve concurrent calls.
pub trait PackageBackend: Send + Sync + fmt::Debug {
    /// Short name of the backend (`zypper`, `dnf`, `dpkg`, `none`)
    fn name(&self) -> &'static str;

    /// List installed packages matching `pattern`; empty lists everything.
    /// No match is an empty list, not an error.
    fn list_packages(&self, pattern: &str) -> Result<Vec<PackageRecord>>;

    /// Query one installed package
    fn query_package(&self, name: &str, mode: QueryMode, lines: i64) -> Result<QueryResult>;

    /// List configured repositories, optionally only `name`
    fn list_repos(&self, name: &str) -> Result<Vec<RepoRecord>>;

    /// Create or update a repository; `Ok(None)` after a removal
    fn modify_repo(&self, params: &ModifyRepoParams) -> Result<Option<RepoRecord>>;

    /// Refresh repository metadata, optionally only `name`
    fn refresh_repos(&self, name: &str) -> Result<()>;

    fn list_patches(&self, params: &ListPatchesParams) -> Result<Vec<PatchRecord>>;

    fn install_patches(&self, params: &InstallPatchesParams) -> Result<Vec<PatchRecord>>;

    fn search_packages(&self, params: &SearchPackageParams) -> Result<Vec<SearchHit>>;

    /// Install a package, returning the tool transcript
    fn install_package(&self, params: &InstallPackageParams) -> Result<String>;

    /// Remove a package, returning the tool transcript
    fn remove_package(&self, params: &RemovePackageParams) -> Result<String>;

    /// Update one package or the whole system, returning the tool transcript
    fn update_package(&self, params: &UpdatePackageParams) -> Result<String>;
}

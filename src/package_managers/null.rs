//! Fallback backend for hosts without a recognized package manager

use super::PackageBackend;
use crate::core::{
    InstallPackageParams, InstallPatchesParams, ListPatchesParams, ModifyRepoParams,
    PackageRecord, PatchRecord, PkgError, QueryMode, QueryResult, RemovePackageParams, RepoRecord,
    Result, SearchHit, SearchPackageParams, UpdatePackageParams,
};

/// Every operation fails; package reads report that no package manager was
/// found, everything else reports "not implemented".
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

const fn not_implemented(operation: &'static str) -> PkgError {
    PkgError::NotImplemented {
        operation,
        backend: "none",
    }
}

impl PackageBackend for NullBackend {
    fn name(&self) -> &'static str {
        "none"
    }

    fn list_packages(&self, _pattern: &str) -> Result<Vec<PackageRecord>> {
        Err(PkgError::NoPackageManager)
    }

    fn query_package(&self, _name: &str, _mode: QueryMode, _lines: i64) -> Result<QueryResult> {
        Err(PkgError::NoPackageManager)
    }

    fn list_repos(&self, _name: &str) -> Result<Vec<RepoRecord>> {
        Err(not_implemented("listing repositories"))
    }

    fn modify_repo(&self, _params: &ModifyRepoParams) -> Result<Option<RepoRecord>> {
        Err(not_implemented("modifying repositories"))
    }

    fn refresh_repos(&self, _name: &str) -> Result<()> {
        Err(not_implemented("refreshing repositories"))
    }

    fn list_patches(&self, _params: &ListPatchesParams) -> Result<Vec<PatchRecord>> {
        Err(not_implemented("listing patches"))
    }

    fn install_patches(&self, _params: &InstallPatchesParams) -> Result<Vec<PatchRecord>> {
        Err(not_implemented("installing patches"))
    }

    fn search_packages(&self, _params: &SearchPackageParams) -> Result<Vec<SearchHit>> {
        Err(not_implemented("searching packages"))
    }

    fn install_package(&self, _params: &InstallPackageParams) -> Result<String> {
        Err(not_implemented("installing packages"))
    }

    fn remove_package(&self, _params: &RemovePackageParams) -> Result<String> {
        Err(not_implemented("removing packages"))
    }

    fn update_package(&self, _params: &UpdatePackageParams) -> Result<String> {
        Err(not_implemented("updating packages"))
    }
}

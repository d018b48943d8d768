use std::sync::Arc;

use crate::core::validation::{
    validate_flag_value, validate_package_name, validate_pattern, validate_repo_name,
};
use crate::core::{
    InstallPackageParams, InstallPatchesParams, ListPackagesParams,
    ListPatchesParams, ListReposParams, ModifyRepoParams, PackageRecord, PatchRecord,
    QueryPackageParams, QueryResult, RefreshReposParams, RemovePackageParams, RepoRecord, Result,
    SearchHit, SearchPackageParams, UpdatePackageParams,
};
use crate::package_managers::PackageBackend;

/// Validating front door to the selected backend.
///
/// Built once at startup and cloned into every caller; the backend behind it
/// is never re-selected.
#[derive(Debug, Clone)]
pub struct PackageService {
    backend: Arc<dyn PackageBackend>,
    default_query_lines: i64,
}

impl PackageService {
    /// Create a new `PackageService` with the given backend
    pub fn new(backend: Arc<dyn PackageBackend>) -> Self {
        Self::builder(backend).build()
    }

    /// Create a builder for constructing `PackageService` with custom settings
    pub fn builder(backend: Arc<dyn PackageBackend>) -> PackageServiceBuilder {
        PackageServiceBuilder::new(backend)
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn list_packages(&self, params: &ListPackagesParams) -> Result<Vec<PackageRecord>> {
        validate_pattern(&params.name)?;
        self.backend.list_packages(&params.name)
    }

    /// Query one package; `lines == 0` falls back to the configured default
    pub fn query_package(&self, params: &QueryPackageParams) -> Result<QueryResult> {
        validate_package_name(&params.name)?;
        let lines = if params.lines == 0 {
            self.default_query_lines
        } else {
            params.lines
        };
        self.backend.query_package(&params.name, params.mode, lines)
    }

    pub fn list_repos(&self, params: &ListReposParams) -> Result<Vec<RepoRecord>> {
        if !params.name.is_empty() {
            validate_repo_name(&params.name)?;
        }
        self.backend.list_repos(&params.name)
    }

    pub fn modify_repo(&self, params: &ModifyRepoParams) -> Result<Option<RepoRecord>> {
        validate_repo_name(&params.name)?;
        validate_flag_value("url", &params.url)?;
        self.backend.modify_repo(params)
    }

    pub fn refresh_repos(&self, params: &RefreshReposParams) -> Result<()> {
        if !params.name.is_empty() {
            validate_repo_name(&params.name)?;
        }
        self.backend.refresh_repos(&params.name)
    }

    pub fn list_patches(&self, params: &ListPatchesParams) -> Result<Vec<PatchRecord>> {
        validate_flag_value("category", &params.category)?;
        validate_flag_value("severity", &params.severity)?;
        self.backend.list_patches(params)
    }

    pub fn install_patches(&self, params: &InstallPatchesParams) -> Result<Vec<PatchRecord>> {
        validate_flag_value("category", &params.category)?;
        validate_flag_value("severity", &params.severity)?;
        self.backend.install_patches(params)
    }

    pub fn search_packages(&self, params: &SearchPackageParams) -> Result<Vec<SearchHit>> {
        validate_package_name(&params.name)?;
        for repo in &params.repos {
            validate_repo_name(repo)?;
        }
        self.backend.search_packages(params)
    }

    pub fn install_package(&self, params: &InstallPackageParams) -> Result<String> {
        validate_package_name(&params.name)?;
        validate_flag_value("version", &params.version)?;
        if !params.from_repo.is_empty() {
            validate_repo_name(&params.from_repo)?;
        }
        self.backend.install_package(params)
    }

    pub fn remove_package(&self, params: &RemovePackageParams) -> Result<String> {
        validate_package_name(&params.name)?;
        self.backend.remove_package(params)
    }

    /// Update one package, or the whole system when `name` is empty
    pub fn update_package(&self, params: &UpdatePackageParams) -> Result<String> {
        validate_pattern(&params.name)?;
        for repo in &params.repos {
            validate_repo_name(repo)?;
        }
        self.backend.update_package(params)
    }
}

/// Builder for `PackageService`
pub struct PackageServiceBuilder {
    backend: Arc<dyn PackageBackend>,
    default_query_lines: i64,
}

impl PackageServiceBuilder {
    /// Create a new builder with the required backend
    pub fn new(backend: Arc<dyn PackageBackend>) -> Self {
        Self {
            backend,
            default_query_lines: 0,
        }
    }

    /// Line limit applied to queries that do not ask for one (0 = unlimited)
    #[must_use]
    pub fn default_query_lines(mut self, lines: i64) -> Self {
        self.default_query_lines = lines;
        self
    }

    /// Build the `PackageService`
    pub fn build(self) -> PackageService {
        PackageService {
            backend: self.backend,
            default_query_lines: self.default_query_lines,
        }
    }
}

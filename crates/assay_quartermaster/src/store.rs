//! Catalog access seam between the assembly pipeline and the database.

use assay_db::{AssayDb, PackageRecord, PlatformRecord, Result as DbResult, ToolRecord};

/// Read access to the platform store, package store and tool shed.
#[allow(async_fn_in_trait)]
pub trait CatalogStore {
    async fn platform_versions(&self, platform_version_uuid: &str)
        -> DbResult<Vec<PlatformRecord>>;

    async fn package_versions(&self, package_version_uuid: &str) -> DbResult<Vec<PackageRecord>>;

    async fn dependency_list(
        &self,
        package_version_uuid: &str,
        platform_version_uuid: &str,
    ) -> DbResult<String>;

    async fn tool_versions(
        &self,
        tool_version_uuid: &str,
        platform_version_uuid: &str,
        package_version_uuid: &str,
    ) -> DbResult<Vec<ToolRecord>>;
}

/// Database-backed catalog store.
#[derive(Clone)]
pub struct DbCatalogStore {
    db: AssayDb,
}

impl DbCatalogStore {
    pub fn new(db: AssayDb) -> Self {
        Self { db }
    }
}

impl CatalogStore for DbCatalogStore {
    async fn platform_versions(
        &self,
        platform_version_uuid: &str,
    ) -> DbResult<Vec<PlatformRecord>> {
        self.db.select_platform_version(platform_version_uuid).await
    }

    async fn package_versions(&self, package_version_uuid: &str) -> DbResult<Vec<PackageRecord>> {
        self.db.select_pkg_version(package_version_uuid).await
    }

    async fn dependency_list(
        &self,
        package_version_uuid: &str,
        platform_version_uuid: &str,
    ) -> DbResult<String> {
        self.db
            .fetch_pkg_dependency(package_version_uuid, platform_version_uuid)
            .await
    }

    async fn tool_versions(
        &self,
        tool_version_uuid: &str,
        platform_version_uuid: &str,
        package_version_uuid: &str,
    ) -> DbResult<Vec<ToolRecord>> {
        self.db
            .select_tool_version(tool_version_uuid, platform_version_uuid, package_version_uuid)
            .await
    }
}

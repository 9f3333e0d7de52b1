//! Catalog operations: platform store, package store and tool shed.

use crate::types::{text_or_empty, text_or_null};
use crate::{AssayDb, CatalogTable, DbError, PackageRecord, PlatformRecord, Result, ToolRecord};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

impl AssayDb {
    /// Fetch platform rows for a platform version uuid.
    pub async fn select_platform_version(
        &self,
        platform_version_uuid: &str,
    ) -> Result<Vec<PlatformRecord>> {
        let rows = sqlx::query(
            "SELECT platform_uuid, platform_version_uuid, platform_name,
                    version_string, platform_path
             FROM platform_version
             WHERE platform_version_uuid = ?1",
        )
        .bind(platform_version_uuid)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_platform).collect()
    }

    /// Fetch package rows for a package version uuid.
    pub async fn select_pkg_version(
        &self,
        package_version_uuid: &str,
    ) -> Result<Vec<PackageRecord>> {
        let rows = sqlx::query(
            "SELECT package_uuid, package_version_uuid, package_name, version_string,
                    package_path, checksum, build_system, build_target, source_path,
                    build_file, config_cmd, config_opt, config_dir, build_cmd,
                    build_opt, build_dir, bytecode_class_path, bytecode_aux_class_path,
                    bytecode_source_path, package_type, package_language,
                    android_sdk_target, android_redo_build, use_gradle_wrapper,
                    android_lint_target, language_version, maven_version,
                    android_maven_plugin
             FROM package_version
             WHERE package_version_uuid = ?1",
        )
        .bind(package_version_uuid)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_package).collect()
    }

    /// Fetch the dependency list for a package version on a platform
    /// version. No row means no dependencies: the empty string, not an
    /// error.
    pub async fn fetch_pkg_dependency(
        &self,
        package_version_uuid: &str,
        platform_version_uuid: &str,
    ) -> Result<String> {
        let row = sqlx::query(
            "SELECT dependency_list
             FROM package_dependency
             WHERE package_version_uuid = ?1 AND platform_version_uuid = ?2",
        )
        .bind(package_version_uuid)
        .bind(platform_version_uuid)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(text_or_empty(row.try_get("dependency_list")?)),
            None => Ok(String::new()),
        }
    }

    /// Fetch tool rows for a tool version uuid, filtered by platform and
    /// package compatibility. A NULL filter column on a row matches any
    /// platform or package.
    pub async fn select_tool_version(
        &self,
        tool_version_uuid: &str,
        platform_version_uuid: &str,
        package_version_uuid: &str,
    ) -> Result<Vec<ToolRecord>> {
        let rows = sqlx::query(
            "SELECT tool_uuid, tool_version_uuid, tool_name, version_string,
                    tool_path, checksum, tool_executable, tool_arguments,
                    tool_directory, is_build_needed
             FROM tool_version
             WHERE tool_version_uuid = ?1
               AND (platform_version_uuid IS NULL OR platform_version_uuid = ?2)
               AND (package_version_uuid IS NULL OR package_version_uuid = ?3)",
        )
        .bind(tool_version_uuid)
        .bind(platform_version_uuid)
        .bind(package_version_uuid)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_tool).collect()
    }

    /// Full tool shed listing for the catalog API.
    pub async fn select_all_tools(&self) -> Result<CatalogTable> {
        let rows = sqlx::query(
            "SELECT tool_name, version_string, tool_uuid, tool_version_uuid
             FROM tool_version
             ORDER BY tool_name, version_string",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(CatalogTable {
            header: label_vec(&["tool_name", "version_string", "tool_uuid", "tool_version_uuid"]),
            rows: rows.iter().map(|row| row_to_cells(row, 4)).collect::<Result<_>>()?,
        })
    }

    /// Full package store listing for the catalog API.
    pub async fn select_all_packages(&self) -> Result<CatalogTable> {
        let rows = sqlx::query(
            "SELECT package_name, version_string, package_type, package_uuid,
                    package_version_uuid
             FROM package_version
             ORDER BY package_name, version_string",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(CatalogTable {
            header: label_vec(&[
                "package_name",
                "version_string",
                "package_type",
                "package_uuid",
                "package_version_uuid",
            ]),
            rows: rows.iter().map(|row| row_to_cells(row, 5)).collect::<Result<_>>()?,
        })
    }

    /// Full platform store listing for the catalog API.
    pub async fn select_all_platforms(&self) -> Result<CatalogTable> {
        let rows = sqlx::query(
            "SELECT platform_name, version_string, platform_uuid, platform_version_uuid
             FROM platform_version
             ORDER BY platform_name, version_string",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(CatalogTable {
            header: label_vec(&[
                "platform_name",
                "version_string",
                "platform_uuid",
                "platform_version_uuid",
            ]),
            rows: rows.iter().map(|row| row_to_cells(row, 4)).collect::<Result<_>>()?,
        })
    }
}

fn label_vec(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

fn row_to_cells(row: &SqliteRow, columns: usize) -> Result<Vec<String>> {
    let mut cells = Vec::with_capacity(columns);
    for idx in 0..columns {
        cells.push(text_or_empty(row.try_get(idx)?));
    }
    Ok(cells)
}

fn row_to_platform(row: &SqliteRow) -> Result<PlatformRecord> {
    Ok(PlatformRecord {
        platform_uuid: text_or_empty(row.try_get("platform_uuid")?),
        platform_version_uuid: text_or_empty(row.try_get("platform_version_uuid")?),
        platform_name: text_or_null(row.try_get("platform_name")?),
        version_string: text_or_null(row.try_get("version_string")?),
        platform_path: text_or_null(row.try_get("platform_path")?),
    })
}

fn row_to_package(row: &SqliteRow) -> Result<PackageRecord> {
    let package_version_uuid: String = text_or_empty(row.try_get("package_version_uuid")?);
    let package_path = text_or_empty(row.try_get("package_path")?);
    let checksum = text_or_empty(row.try_get("checksum")?);
    if package_path.is_empty() || checksum.is_empty() {
        return Err(DbError::invalid_record(format!(
            "package version {} has an empty path or checksum",
            package_version_uuid
        )));
    }

    Ok(PackageRecord {
        package_uuid: text_or_empty(row.try_get("package_uuid")?),
        package_version_uuid,
        package_name: text_or_null(row.try_get("package_name")?),
        version_string: text_or_null(row.try_get("version_string")?),
        package_path,
        checksum,
        build_system: text_or_null(row.try_get("build_system")?),
        build_target: text_or_null(row.try_get("build_target")?),
        source_path: text_or_null(row.try_get("source_path")?),
        build_file: text_or_null(row.try_get("build_file")?),
        config_cmd: text_or_null(row.try_get("config_cmd")?),
        config_opt: text_or_null(row.try_get("config_opt")?),
        config_dir: text_or_null(row.try_get("config_dir")?),
        build_cmd: text_or_null(row.try_get("build_cmd")?),
        build_opt: text_or_null(row.try_get("build_opt")?),
        build_dir: text_or_null(row.try_get("build_dir")?),
        bytecode_class_path: text_or_null(row.try_get("bytecode_class_path")?),
        bytecode_aux_class_path: text_or_null(row.try_get("bytecode_aux_class_path")?),
        bytecode_source_path: text_or_null(row.try_get("bytecode_source_path")?),
        package_type: text_or_null(row.try_get("package_type")?),
        package_language: text_or_null(row.try_get("package_language")?),
        android_sdk_target: text_or_null(row.try_get("android_sdk_target")?),
        android_redo_build: row.try_get::<i64, _>("android_redo_build")? != 0,
        use_gradle_wrapper: row.try_get::<i64, _>("use_gradle_wrapper")? != 0,
        android_lint_target: text_or_null(row.try_get("android_lint_target")?),
        language_version: text_or_null(row.try_get("language_version")?),
        maven_version: text_or_null(row.try_get("maven_version")?),
        android_maven_plugin: text_or_null(row.try_get("android_maven_plugin")?),
    })
}

fn row_to_tool(row: &SqliteRow) -> Result<ToolRecord> {
    let tool_version_uuid: String = text_or_empty(row.try_get("tool_version_uuid")?);
    let tool_path = text_or_empty(row.try_get("tool_path")?);
    let checksum = text_or_empty(row.try_get("checksum")?);
    if tool_path.is_empty() || checksum.is_empty() {
        return Err(DbError::invalid_record(format!(
            "tool version {} has an empty path or checksum",
            tool_version_uuid
        )));
    }

    Ok(ToolRecord {
        tool_uuid: text_or_empty(row.try_get("tool_uuid")?),
        tool_version_uuid,
        tool_name: text_or_null(row.try_get("tool_name")?),
        version_string: text_or_null(row.try_get("version_string")?),
        tool_path,
        checksum,
        tool_executable: text_or_null(row.try_get("tool_executable")?),
        tool_arguments: text_or_null(row.try_get("tool_arguments")?),
        tool_directory: text_or_null(row.try_get("tool_directory")?),
        build_needed: row.try_get::<i64, _>("is_build_needed")? != 0,
    })
}

#[cfg(test)]
mod tests {
    use crate::test_support::test_db;
    use crate::DbError;

    async fn seed_platform(db: &crate::AssayDb, version_uuid: &str, name: &str) {
        sqlx::query(
            "INSERT INTO platform_version
                 (platform_uuid, platform_version_uuid, platform_name,
                  version_string, platform_path)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(format!("{}-plat", version_uuid))
        .bind(version_uuid)
        .bind(name)
        .bind("1.0")
        .bind(format!("/platforms/{}", name))
        .execute(db.pool())
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_select_platform_version() {
        let (_tmp, db) = test_db().await;
        seed_platform(&db, "pv-1", "ubuntu").await;
        seed_platform(&db, "pv-2", "fedora").await;

        let found = db.select_platform_version("pv-1").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].platform_name, "ubuntu");
        assert_eq!(found[0].platform_path, "/platforms/ubuntu");

        let missing = db.select_platform_version("pv-9").await.unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_package_row_normalization_and_invariant() {
        let (_tmp, db) = test_db().await;
        sqlx::query(
            "INSERT INTO package_version
                 (package_uuid, package_version_uuid, package_name, version_string,
                  package_path, checksum, build_target)
             VALUES ('p', 'pkg-1', 'zlib', '', '/pkg/zlib.tar', 'abc123', NULL)",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let found = db.select_pkg_version("pkg-1").await.unwrap();
        assert_eq!(found.len(), 1);
        // empty and NULL text columns come back as the literal "null"
        assert_eq!(found[0].version_string, "null");
        assert_eq!(found[0].build_target, "null");
        assert_eq!(found[0].package_path, "/pkg/zlib.tar");
        assert!(!found[0].android_redo_build);

        // a row with an empty checksum is rejected, not silently returned
        sqlx::query(
            "INSERT INTO package_version
                 (package_uuid, package_version_uuid, package_name, version_string,
                  package_path, checksum)
             VALUES ('p', 'pkg-2', 'bad', '1', '/pkg/bad.tar', '')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = db.select_pkg_version("pkg-2").await.unwrap_err();
        assert!(matches!(err, DbError::InvalidRecord(_)));
    }

    #[tokio::test]
    async fn test_dependency_list_missing_is_empty() {
        let (_tmp, db) = test_db().await;

        let deps = db.fetch_pkg_dependency("pkg-1", "pv-1").await.unwrap();
        assert_eq!(deps, "");

        sqlx::query(
            "INSERT INTO package_dependency
                 (package_version_uuid, platform_version_uuid, dependency_list)
             VALUES ('pkg-1', 'pv-1', 'libfoo libbar')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let deps = db.fetch_pkg_dependency("pkg-1", "pv-1").await.unwrap();
        assert_eq!(deps, "libfoo libbar");
    }

    #[tokio::test]
    async fn test_tool_compatibility_filters() {
        let (_tmp, db) = test_db().await;
        // one row compatible with anything, one pinned to a platform
        sqlx::query(
            "INSERT INTO tool_version
                 (tool_uuid, tool_version_uuid, tool_name, version_string, tool_path,
                  checksum, is_build_needed, platform_version_uuid, package_version_uuid)
             VALUES
                 ('t', 'tv-1', 'findbugs', '3.0', '/tools/fb.tar', 'c1', 0, NULL, NULL),
                 ('t', 'tv-1', 'findbugs', '3.0', '/tools/fb-rh.tar', 'c2', 1, 'pv-rh', NULL)",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let generic = db.select_tool_version("tv-1", "pv-deb", "pkg-1").await.unwrap();
        assert_eq!(generic.len(), 1);
        assert_eq!(generic[0].tool_path, "/tools/fb.tar");
        assert!(!generic[0].build_needed);

        let pinned = db.select_tool_version("tv-1", "pv-rh", "pkg-1").await.unwrap();
        assert_eq!(pinned.len(), 2);
    }

    #[tokio::test]
    async fn test_select_all_platforms_listing() {
        let (_tmp, db) = test_db().await;
        seed_platform(&db, "pv-1", "ubuntu").await;
        seed_platform(&db, "pv-2", "fedora").await;

        let table = db.select_all_platforms().await.unwrap();
        assert_eq!(table.header[0], "platform_name");
        assert_eq!(table.rows.len(), 2);
        // ordered by name
        assert_eq!(table.rows[0][0], "fedora");
        assert_eq!(table.rows[1][0], "ubuntu");
    }
}

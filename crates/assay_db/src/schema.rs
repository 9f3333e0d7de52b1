//! Schema creation for the AssayFlow database.

use crate::{AssayDb, Result};

/// Idempotent DDL; safe to run on every open.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS platform_version (
    platform_uuid TEXT NOT NULL,
    platform_version_uuid TEXT NOT NULL,
    platform_name TEXT,
    version_string TEXT,
    platform_path TEXT
);
CREATE INDEX IF NOT EXISTS idx_platform_version_uuid
    ON platform_version(platform_version_uuid);

CREATE TABLE IF NOT EXISTS package_version (
    package_uuid TEXT NOT NULL,
    package_version_uuid TEXT NOT NULL,
    package_name TEXT,
    version_string TEXT,
    package_path TEXT,
    checksum TEXT,
    build_system TEXT,
    build_target TEXT,
    source_path TEXT,
    build_file TEXT,
    config_cmd TEXT,
    config_opt TEXT,
    config_dir TEXT,
    build_cmd TEXT,
    build_opt TEXT,
    build_dir TEXT,
    bytecode_class_path TEXT,
    bytecode_aux_class_path TEXT,
    bytecode_source_path TEXT,
    package_type TEXT,
    package_language TEXT,
    android_sdk_target TEXT,
    android_redo_build INTEGER NOT NULL DEFAULT 0,
    use_gradle_wrapper INTEGER NOT NULL DEFAULT 0,
    android_lint_target TEXT,
    language_version TEXT,
    maven_version TEXT,
    android_maven_plugin TEXT
);
CREATE INDEX IF NOT EXISTS idx_package_version_uuid
    ON package_version(package_version_uuid);

CREATE TABLE IF NOT EXISTS package_dependency (
    package_version_uuid TEXT NOT NULL,
    platform_version_uuid TEXT NOT NULL,
    dependency_list TEXT
);
CREATE INDEX IF NOT EXISTS idx_package_dependency
    ON package_dependency(package_version_uuid, platform_version_uuid);

CREATE TABLE IF NOT EXISTS tool_version (
    tool_uuid TEXT NOT NULL,
    tool_version_uuid TEXT NOT NULL,
    tool_name TEXT,
    version_string TEXT,
    tool_path TEXT,
    checksum TEXT,
    tool_executable TEXT,
    tool_arguments TEXT,
    tool_directory TEXT,
    is_build_needed INTEGER NOT NULL DEFAULT 0,
    platform_version_uuid TEXT,
    package_version_uuid TEXT
);
CREATE INDEX IF NOT EXISTS idx_tool_version_uuid
    ON tool_version(tool_version_uuid);

CREATE TABLE IF NOT EXISTS execution_record (
    execution_record_uuid TEXT NOT NULL,
    platform_version_uuid TEXT,
    tool_version_uuid TEXT,
    package_version_uuid TEXT,
    project_uuid TEXT,
    user_uuid TEXT,
    status TEXT,
    run_date TEXT,
    completion_date TEXT,
    cpu_utilization TEXT,
    lines_of_code TEXT,
    execute_node_architecture_id TEXT,
    vm_hostname TEXT,
    vm_username TEXT,
    vm_password TEXT,
    vm_ip TEXT,
    vm_image TEXT,
    tool_filename TEXT
);
CREATE INDEX IF NOT EXISTS idx_execution_record_uuid
    ON execution_record(execution_record_uuid);

CREATE TABLE IF NOT EXISTS assessment_result (
    execution_record_uuid TEXT NOT NULL,
    result_path TEXT,
    result_checksum TEXT,
    source_path TEXT,
    source_checksum TEXT,
    log_path TEXT,
    log_checksum TEXT,
    weakness_count INTEGER NOT NULL DEFAULT -1,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS execution_event (
    execution_record_uuid TEXT NOT NULL,
    event_time TEXT NOT NULL,
    event_name TEXT NOT NULL,
    event_payload TEXT
);

CREATE TABLE IF NOT EXISTS system_status (
    status_key TEXT PRIMARY KEY,
    status_value TEXT,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS viewer_instance (
    viewer_uuid TEXT PRIMARY KEY,
    viewer_db_path TEXT,
    viewer_db_checksum TEXT,
    viewer_status TEXT,
    viewer_status_code TEXT,
    viewer_address TEXT,
    viewer_proxy_url TEXT,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl AssayDb {
    /// Create all tables if they don't exist.
    pub(crate) async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA).execute(self.pool()).await?;
        Ok(())
    }
}

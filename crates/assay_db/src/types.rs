//! Typed records returned by the gateway.
//!
//! Text columns other than association uuids are normalized at mapping time:
//! NULL or empty becomes the literal string `"null"`, which is what the
//! assessment frameworks expect to see for an absent value. Records are
//! fetched fresh for every request and never cached.

/// Literal stand-in for absent text values.
pub const NULL_STRING: &str = "null";

/// Normalize a nullable text column.
pub(crate) fn text_or_null(value: Option<String>) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => NULL_STRING.to_string(),
    }
}

/// Normalize a nullable text column to the empty string.
pub(crate) fn text_or_empty(value: Option<String>) -> String {
    value.unwrap_or_default()
}

/// One row of the platform store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformRecord {
    pub platform_uuid: String,
    pub platform_version_uuid: String,
    pub platform_name: String,
    pub version_string: String,
    pub platform_path: String,
}

/// One row of the package store.
///
/// `package_path` and `checksum` are guaranteed non-empty; the mapper
/// rejects rows that violate this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub package_uuid: String,
    pub package_version_uuid: String,
    pub package_name: String,
    pub version_string: String,
    pub package_path: String,
    pub checksum: String,
    pub build_system: String,
    pub build_target: String,
    pub source_path: String,
    pub build_file: String,
    pub config_cmd: String,
    pub config_opt: String,
    pub config_dir: String,
    pub build_cmd: String,
    pub build_opt: String,
    pub build_dir: String,
    pub bytecode_class_path: String,
    pub bytecode_aux_class_path: String,
    pub bytecode_source_path: String,
    pub package_type: String,
    pub package_language: String,
    pub android_sdk_target: String,
    pub android_redo_build: bool,
    pub use_gradle_wrapper: bool,
    pub android_lint_target: String,
    pub language_version: String,
    pub maven_version: String,
    pub android_maven_plugin: String,
}

/// One row of the tool shed.
///
/// Same non-empty guarantee for `tool_path` and `checksum` as packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRecord {
    pub tool_uuid: String,
    pub tool_version_uuid: String,
    pub tool_name: String,
    pub version_string: String,
    pub tool_path: String,
    pub checksum: String,
    pub tool_executable: String,
    pub tool_arguments: String,
    pub tool_directory: String,
    pub build_needed: bool,
}

/// One row of the assessment store's execution records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRecord {
    pub execution_record_uuid: String,
    pub platform_version_uuid: String,
    pub tool_version_uuid: String,
    pub package_version_uuid: String,
    pub project_uuid: String,
    pub user_uuid: String,
    pub status: String,
    pub run_date: String,
    pub completion_date: String,
    pub cpu_utilization: String,
    pub lines_of_code: String,
    pub execute_node_architecture_id: String,
}

/// Execution-status update written by the exec collector.
#[derive(Debug, Clone, Default)]
pub struct ExecStatusUpdate {
    pub execution_record_uuid: String,
    pub status: String,
    pub run_date: String,
    pub completion_date: String,
    pub execute_node_architecture_id: String,
    pub lines_of_code: i64,
    pub cpu_utilization: String,
    pub vm_hostname: String,
    pub vm_username: String,
    pub vm_password: String,
    pub vm_ip: String,
    pub vm_image: String,
    pub tool_filename: String,
}

/// Assessment result written by the results collector.
#[derive(Debug, Clone, Default)]
pub struct ResultRecord {
    pub execution_record_uuid: String,
    pub result_path: String,
    pub result_checksum: String,
    pub source_path: String,
    pub source_checksum: String,
    pub log_path: String,
    pub log_checksum: String,
    /// -1 means the count is unknown, not zero.
    pub weakness_count: i64,
}

/// Header plus data rows for a catalog listing. NULL cells arrive as
/// empty strings; presentation-level normalization happens in the caller.
#[derive(Debug, Clone, Default)]
pub struct CatalogTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_or_null() {
        assert_eq!(text_or_null(Some("x".to_string())), "x");
        assert_eq!(text_or_null(Some(String::new())), "null");
        assert_eq!(text_or_null(None), "null");
    }

    #[test]
    fn test_text_or_empty() {
        assert_eq!(text_or_empty(Some("x".to_string())), "x");
        assert_eq!(text_or_empty(None), "");
    }
}

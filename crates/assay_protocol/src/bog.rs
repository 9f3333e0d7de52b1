//! Bill of goods: the flat inventory of everything an assessment run needs.
//!
//! Assembled by the quartermaster, extended by the dispatcher, consumed by
//! the launch pad. The map always opens with the format version and the
//! execution-run id; on assembly failure it additionally carries the `error`
//! key beside whatever was written before the failure.

use crate::{put_error, RpcMap, ERROR_KEY};

/// Bill of goods format version.
pub const BOG_VERSION: &str = "2";

/// Well-known bill of goods keys.
pub mod keys {
    pub const VERSION: &str = "version";
    pub const EXEC_RUN_ID: &str = "execrunid";
    pub const PROJECT_ID: &str = "projectid";
    pub const USER_ID: &str = "userid";
    pub const PLATFORM: &str = "platform";
    pub const PACKAGE_NAME: &str = "packagename";
    pub const PACKAGE_BUILD_TARGET: &str = "packagebuild_target";
    pub const PACKAGE_BUILD_SYSTEM: &str = "packagebuild_system";
    pub const PACKAGE_BUILD_DIR: &str = "packagebuild_dir";
    pub const PACKAGE_BUILD_OPT: &str = "packagebuild_opt";
    pub const PACKAGE_BUILD_CMD: &str = "packagebuild_cmd";
    pub const PACKAGE_CONFIG_OPT: &str = "packageconfig_opt";
    pub const PACKAGE_CONFIG_DIR: &str = "packageconfig_dir";
    pub const PACKAGE_CONFIG_CMD: &str = "packageconfig_cmd";
    pub const PACKAGE_PATH: &str = "packagepath";
    pub const PACKAGE_SOURCE_PATH: &str = "packagesourcepath";
    pub const PACKAGE_BUILD_FILE: &str = "packagebuild_file";
    pub const PACKAGE_TYPE: &str = "packagetype";
    pub const PACKAGE_CLASS_PATH: &str = "packageclasspath";
    pub const PACKAGE_AUX_CLASS_PATH: &str = "packageauxclasspath";
    pub const PACKAGE_BYTECODE_SOURCE_PATH: &str = "packagebytecodesourcepath";
    pub const PACKAGE_LANGUAGE: &str = "package_language";
    pub const ANDROID_SDK_TARGET: &str = "android_sdk_target";
    pub const ANDROID_REDO_BUILD: &str = "android_redo_build";
    pub const USE_GRADLE_WRAPPER: &str = "use_gradle_wrapper";
    pub const ANDROID_LINT_TARGET: &str = "android_lint_target";
    pub const LANGUAGE_VERSION: &str = "language_version";
    pub const MAVEN_VERSION: &str = "maven_version";
    pub const ANDROID_MAVEN_PLUGIN: &str = "android_maven_plugin";
    pub const PACKAGE_DEPENDENCY_LIST: &str = "packagedependencylist";
    pub const TOOL_NAME: &str = "toolname";
    pub const TOOL_PATH: &str = "toolpath";
    pub const TOOL_ARGUMENTS: &str = "toolarguments";
    pub const TOOL_EXECUTABLE: &str = "toolexecutable";
    pub const TOOL_DIRECTORY: &str = "tooldirectory";
    pub const TOOL_VERSION: &str = "tool-version";
    pub const BUILD_NEEDED: &str = "buildneeded";
    pub const RESULTS_FOLDER: &str = "resultsfolder";
}

/// Ordered bill of goods under assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillOfGoods {
    entries: RpcMap,
}

impl BillOfGoods {
    /// Start a bill of goods carrying the format version.
    pub fn new() -> Self {
        let mut bog = Self::default();
        bog.put(keys::VERSION, BOG_VERSION);
        bog
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Record an assembly failure, keeping the partial inventory.
    pub fn set_error(&mut self, message: impl Into<String>) {
        put_error(&mut self.entries, message);
    }

    pub fn has_error(&self) -> bool {
        self.entries.contains_key(ERROR_KEY)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_map(self) -> RpcMap {
        self.entries
    }

    pub fn as_map(&self) -> &RpcMap {
        &self.entries
    }
}

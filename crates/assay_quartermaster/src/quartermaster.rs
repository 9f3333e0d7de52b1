//! Bill of goods assembly.
//!
//! One pass per request: validate the ids, then platform, package (with
//! archive checksum), dependency list and tool (with archive checksum), in
//! that order. Any failure records the `error` key beside whatever was
//! already assembled and stops; callers always get the partial inventory
//! back. All request context lives in locals, so a single assembler is safe
//! to share across requests.

use crate::checksum;
use crate::store::CatalogStore;
use assay_protocol::bog::{keys, BillOfGoods};
use assay_protocol::encoding::validate_string_argument;
use assay_protocol::RpcMap;
use assay_db::{PackageRecord, ToolRecord};
use tracing::{error, info, warn};

/// Assembles bills of goods from the catalog stores.
pub struct Quartermaster<S> {
    store: S,
    /// Skip archive checksum verification (integration environments).
    test_mode: bool,
}

impl<S: CatalogStore> Quartermaster<S> {
    pub fn new(store: S, test_mode: bool) -> Self {
        Self { store, test_mode }
    }

    /// Assemble the bill of goods for one assessment run.
    pub async fn get_bill_of_goods(&self, args: &RpcMap) -> RpcMap {
        let mut bog = BillOfGoods::new();

        let Some(exec_run_id) = required(args, keys::EXEC_RUN_ID) else {
            warn!("bill of goods request has no exec run ID");
            bog.set_error("bill of goods request has no exec run ID");
            return bog.into_map();
        };
        bog.put(keys::EXEC_RUN_ID, exec_run_id);
        bog.put(
            keys::PROJECT_ID,
            validate_string_argument(args.get(keys::PROJECT_ID).map(String::as_str)),
        );
        bog.put(
            keys::USER_ID,
            validate_string_argument(args.get(keys::USER_ID).map(String::as_str)),
        );

        info!(exec_run_id, "assembling bill of goods");

        // All three ids must be present before the catalog is touched.
        let Some(platform_id) = required(args, "platformid") else {
            bog.set_error("bill of goods request has no platform ID");
            return bog.into_map();
        };
        let Some(tool_id) = required(args, "toolid") else {
            bog.set_error("bill of goods request has no tool ID");
            return bog.into_map();
        };
        let Some(package_id) = required(args, "packageid") else {
            bog.set_error("bill of goods request has no package ID");
            return bog.into_map();
        };

        // Platform
        let platforms = match self.store.platform_versions(platform_id).await {
            Ok(platforms) => platforms,
            Err(err) => {
                error!(exec_run_id, %err, "platform retrieval failed");
                bog.set_error(format!("error retrieving the platform: {}", err));
                return bog.into_map();
            }
        };
        let Some(platform) = platforms.first() else {
            bog.set_error("platform store has not retrieved the requested platform");
            return bog.into_map();
        };
        if platforms.len() > 1 {
            warn!(
                exec_run_id,
                platform_id, "multiple platform rows retrieved, using the first"
            );
        }
        bog.put(keys::PLATFORM, platform.platform_path.clone());

        // Package
        let packages = match self.store.package_versions(package_id).await {
            Ok(packages) => packages,
            Err(err) => {
                error!(exec_run_id, %err, "package retrieval failed");
                bog.set_error(format!("error retrieving the package: {}", err));
                return bog.into_map();
            }
        };
        let Some(package) = packages.first() else {
            bog.set_error("package store has not retrieved the requested package");
            return bog.into_map();
        };
        if packages.len() > 1 {
            warn!(
                exec_run_id,
                package_id, "multiple package rows retrieved, using the first"
            );
        }
        if let Err(msg) = self.verify_archive("package", &package.package_path, &package.checksum)
        {
            error!(exec_run_id, "{}", msg);
            bog.set_error(msg);
            return bog.into_map();
        }
        write_package_fields(&mut bog, package);

        // Dependency list
        match self.store.dependency_list(package_id, platform_id).await {
            Ok(deps) => {
                bog.put(
                    keys::PACKAGE_DEPENDENCY_LIST,
                    validate_string_argument(Some(&deps)),
                );
            }
            Err(err) => {
                error!(exec_run_id, %err, "dependency list retrieval failed");
                bog.set_error(format!(
                    "error retrieving the package dependency list: {}",
                    err
                ));
                return bog.into_map();
            }
        }

        // Tool
        let tools = match self.store.tool_versions(tool_id, platform_id, package_id).await {
            Ok(tools) => tools,
            Err(err) => {
                error!(exec_run_id, %err, "tool retrieval failed");
                bog.set_error(format!("error retrieving the tool: {}", err));
                return bog.into_map();
            }
        };
        let Some(tool) = tools.first() else {
            bog.set_error("tool store has not retrieved the requested tool");
            return bog.into_map();
        };
        if tools.len() > 1 {
            warn!(exec_run_id, tool_id, "multiple tool rows retrieved, using the first");
        }
        if let Err(msg) = self.verify_archive("tool", &tool.tool_path, &tool.checksum) {
            error!(exec_run_id, "{}", msg);
            bog.set_error(msg);
            return bog.into_map();
        }
        write_tool_fields(&mut bog, tool);

        info!(exec_run_id, entries = bog.len(), "bill of goods assembled");
        bog.into_map()
    }

    fn verify_archive(&self, kind: &str, path: &str, stored: &str) -> Result<(), String> {
        if self.test_mode {
            return Ok(());
        }
        match checksum::file_checksum_sha512(path) {
            Ok(actual) if checksum::checksums_match(stored, &actual) => Ok(()),
            Ok(actual) => Err(format!(
                "check sum error on {} {}: stored {} computed {}",
                kind, path, stored, actual
            )),
            Err(err) => Err(format!("check sum error on {} {}: {}", kind, path, err)),
        }
    }
}

/// Present and non-empty, or None.
fn required<'a>(args: &'a RpcMap, key: &str) -> Option<&'a str> {
    args.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn write_package_fields(bog: &mut BillOfGoods, package: &PackageRecord) {
    bog.put(keys::PACKAGE_NAME, package.package_name.clone());
    bog.put(keys::PACKAGE_BUILD_TARGET, package.build_target.clone());
    bog.put(keys::PACKAGE_BUILD_SYSTEM, package.build_system.clone());
    bog.put(keys::PACKAGE_BUILD_DIR, package.build_dir.clone());
    bog.put(keys::PACKAGE_BUILD_OPT, package.build_opt.clone());
    bog.put(keys::PACKAGE_BUILD_CMD, package.build_cmd.clone());
    bog.put(keys::PACKAGE_CONFIG_OPT, package.config_opt.clone());
    bog.put(keys::PACKAGE_CONFIG_DIR, package.config_dir.clone());
    bog.put(keys::PACKAGE_CONFIG_CMD, package.config_cmd.clone());
    bog.put(keys::PACKAGE_PATH, package.package_path.clone());
    bog.put(keys::PACKAGE_SOURCE_PATH, package.source_path.clone());
    bog.put(keys::PACKAGE_BUILD_FILE, package.build_file.clone());
    bog.put(keys::PACKAGE_TYPE, package.package_type.clone());
    bog.put(keys::PACKAGE_CLASS_PATH, package.bytecode_class_path.clone());
    bog.put(
        keys::PACKAGE_AUX_CLASS_PATH,
        package.bytecode_aux_class_path.clone(),
    );
    bog.put(
        keys::PACKAGE_BYTECODE_SOURCE_PATH,
        package.bytecode_source_path.clone(),
    );
    bog.put(keys::PACKAGE_LANGUAGE, package.package_language.clone());
    bog.put(keys::ANDROID_SDK_TARGET, package.android_sdk_target.clone());
    bog.put(keys::ANDROID_REDO_BUILD, package.android_redo_build.to_string());
    bog.put(keys::USE_GRADLE_WRAPPER, package.use_gradle_wrapper.to_string());
    bog.put(keys::ANDROID_LINT_TARGET, package.android_lint_target.clone());
    bog.put(keys::LANGUAGE_VERSION, package.language_version.clone());
    bog.put(keys::MAVEN_VERSION, package.maven_version.clone());
    bog.put(keys::ANDROID_MAVEN_PLUGIN, package.android_maven_plugin.clone());
}

fn write_tool_fields(bog: &mut BillOfGoods, tool: &ToolRecord) {
    bog.put(keys::TOOL_NAME, tool.tool_name.clone());
    bog.put(keys::TOOL_PATH, tool.tool_path.clone());
    bog.put(keys::TOOL_ARGUMENTS, tool.tool_arguments.clone());
    bog.put(keys::TOOL_EXECUTABLE, tool.tool_executable.clone());
    bog.put(keys::TOOL_DIRECTORY, tool.tool_directory.clone());
    bog.put(keys::TOOL_VERSION, tool.version_string.clone());
    bog.put(keys::BUILD_NEEDED, tool.build_needed.to_string());
}

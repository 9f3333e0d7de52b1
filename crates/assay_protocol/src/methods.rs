//! RPC method names.
//!
//! Deployments historically renamed these at the service boundary, so the
//! servers dispatch against a table rather than hard-coded literals. The
//! canonical names below are the defaults.

pub const GET_BILL_OF_GOODS: &str = "quartermaster.getBillOfGoods";
pub const LIST_TOOLS: &str = "gator.listTools";
pub const LIST_PACKAGES: &str = "gator.listPackages";
pub const LIST_PLATFORMS: &str = "gator.listPlatforms";
pub const INSERT_EXECUTION_EVENT: &str = "admin.insertExecutionEvent";
pub const INSERT_SYSTEM_STATUS: &str = "admin.insertSystemStatus";
pub const STORE_VIEWER_DATABASE: &str = "viewer.storeViewerDatabase";
pub const UPDATE_VIEWER_INSTANCE: &str = "viewer.updateViewerInstance";
pub const DO_RUN: &str = "runController.doRun";
pub const UPDATE_EXECUTION_RESULTS: &str = "execCollector.updateExecutionResults";
pub const GET_SINGLE_EXECUTION_RECORD: &str = "execCollector.getSingleExecutionRecord";
pub const SAVE_RESULT: &str = "resultCollector.saveResult";
pub const LAUNCH_PAD_START: &str = "launchpad.start";

/// Method names a server dispatches against.
#[derive(Debug, Clone)]
pub struct MethodTable {
    pub get_bill_of_goods: String,
    pub list_tools: String,
    pub list_packages: String,
    pub list_platforms: String,
    pub insert_execution_event: String,
    pub insert_system_status: String,
    pub store_viewer_database: String,
    pub update_viewer_instance: String,
    pub do_run: String,
    pub update_execution_results: String,
    pub get_single_execution_record: String,
    pub save_result: String,
}

impl Default for MethodTable {
    fn default() -> Self {
        Self {
            get_bill_of_goods: GET_BILL_OF_GOODS.to_string(),
            list_tools: LIST_TOOLS.to_string(),
            list_packages: LIST_PACKAGES.to_string(),
            list_platforms: LIST_PLATFORMS.to_string(),
            insert_execution_event: INSERT_EXECUTION_EVENT.to_string(),
            insert_system_status: INSERT_SYSTEM_STATUS.to_string(),
            store_viewer_database: STORE_VIEWER_DATABASE.to_string(),
            update_viewer_instance: UPDATE_VIEWER_INSTANCE.to_string(),
            do_run: DO_RUN.to_string(),
            update_execution_results: UPDATE_EXECUTION_RESULTS.to_string(),
            get_single_execution_record: GET_SINGLE_EXECUTION_RECORD.to_string(),
            save_result: SAVE_RESULT.to_string(),
        }
    }
}

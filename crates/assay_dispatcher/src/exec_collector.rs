//! Execution status collection.

use crate::store::ExecStore;
use assay_protocol::encoding::{
    check_string_for_null, convert_date_string, decode_double_from_string,
    decode_integer_from_string, validate_string_argument, NULL_STRING,
};
use assay_protocol::{put_error, RpcMap};
use assay_db::ExecStatusUpdate;
use tracing::{error, info, warn};

/// Write a status update for an assessment run.
///
/// Individual malformed fields are decoded leniently (logged and stored as
/// their zero or `"null"` stand-ins); only a missing run id or a store
/// failure fails the call.
pub async fn update_execution_results<S: ExecStore>(store: &S, args: &RpcMap) -> RpcMap {
    let mut results = RpcMap::new();

    let Some(exec_run_id) = required(args, "execrunid") else {
        put_error(&mut results, "bad assessment run ID");
        return results;
    };
    results.insert("execrunid".to_string(), exec_run_id.to_string());

    info!(exec_run_id, "request to update execution results");

    let status = validate_string_argument(args.get("status").map(String::as_str));
    let run_date = convert_date(exec_run_id, args.get("run_date").map(String::as_str));
    let completion_date =
        convert_date(exec_run_id, args.get("completion_date").map(String::as_str));
    let execute_node = validate_string_argument(
        args.get("execute_node_architecture_id").map(String::as_str),
    );
    let lines_of_code = decode_integer_from_string(args.get("lines_of_code").map(String::as_str));
    let cpu_utilization = decode_cpu_utilization(args.get("cpu_utilization").map(String::as_str));

    let update = ExecStatusUpdate {
        execution_record_uuid: exec_run_id.to_string(),
        status,
        run_date,
        completion_date,
        execute_node_architecture_id: execute_node,
        lines_of_code,
        cpu_utilization,
        vm_hostname: check_string_for_null(args.get("vm_hostname").map(String::as_str)),
        vm_username: check_string_for_null(args.get("vm_username").map(String::as_str)),
        vm_password: check_string_for_null(args.get("vm_password").map(String::as_str)),
        vm_ip: check_string_for_null(args.get("vmip").map(String::as_str)),
        vm_image: check_string_for_null(args.get("vm_image").map(String::as_str)),
        tool_filename: check_string_for_null(args.get("tool_filename").map(String::as_str)),
    };

    match store.update_execution_run_status(&update).await {
        Ok(true) => {}
        Ok(false) => put_error(&mut results, "update failed"),
        Err(err) => {
            error!(exec_run_id, %err, "execution status update failed");
            put_error(&mut results, format!("error updating exec run status: {}", err));
        }
    }
    results
}

/// Fetch the status fields of a single execution record.
pub async fn get_single_execution_record<S: ExecStore>(store: &S, args: &RpcMap) -> RpcMap {
    let mut results = RpcMap::new();

    let Some(exec_run_id) = required(args, "execrunid") else {
        put_error(&mut results, "bad assessment run ID");
        return results;
    };
    results.insert("execrunid".to_string(), exec_run_id.to_string());

    info!(exec_run_id, "request to get single execution record");

    let records = match store.execution_records(exec_run_id).await {
        Ok(records) => records,
        Err(err) => {
            error!(exec_run_id, %err, "execution record retrieval failed");
            put_error(
                &mut results,
                format!("error retrieving the execution record: {}", err),
            );
            return results;
        }
    };
    let Some(record) = records.first() else {
        put_error(
            &mut results,
            "assessment DB has not retrieved the requested exec record",
        );
        return results;
    };
    if records.len() > 1 {
        warn!(exec_run_id, "multiple execution records retrieved, using the first");
    }

    results.insert("status".to_string(), record.status.clone());
    results.insert("run_date".to_string(), record.run_date.clone());
    results.insert("completion_date".to_string(), record.completion_date.clone());
    results.insert("cpu_utilization".to_string(), record.cpu_utilization.clone());
    results.insert("lines_of_code".to_string(), record.lines_of_code.clone());
    results.insert(
        "execute_node_architecture_id".to_string(),
        record.execute_node_architecture_id.clone(),
    );
    results
}

/// A date that fails to parse is recorded as `"null"`, never a call failure.
fn convert_date(exec_run_id: &str, value: Option<&str>) -> String {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return NULL_STRING.to_string();
    };
    match convert_date_string(value) {
        Ok(converted) => converted,
        Err(_) => {
            warn!(exec_run_id, value, "unparseable date stored as null");
            NULL_STRING.to_string()
        }
    }
}

/// CPU utilization arrives either plain, integer-encoded (`i__42`, `_42`)
/// or double-encoded (`d__2.5`).
fn decode_cpu_utilization(value: Option<&str>) -> String {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return "0".to_string();
    };
    if value.starts_with('i') || value.starts_with('_') {
        decode_integer_from_string(Some(value)).to_string()
    } else if value.starts_with('d') {
        decode_double_from_string(Some(value)).to_string()
    } else {
        value.to_string()
    }
}

fn required<'a>(args: &'a RpcMap, key: &str) -> Option<&'a str> {
    args.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

//! Assessment result collection.

use crate::store::ExecStore;
use assay_protocol::encoding::{check_string_for_null, decode_integer_from_string};
use assay_protocol::{put_error, RpcMap};
use assay_db::ResultRecord;
use tracing::{error, info};

/// Weakness count reported when the tool could not produce one. Distinct
/// from zero, which means "ran clean".
pub const WEAKNESS_COUNT_UNKNOWN: i64 = -1;

/// Record the artifact paths, checksums and weakness count for a run.
pub async fn save_result<S: ExecStore>(store: &S, args: &RpcMap) -> RpcMap {
    let mut results = RpcMap::new();

    let Some(exec_run_id) = required(args, "execrunid") else {
        put_error(&mut results, "bad assessment run ID");
        return results;
    };
    results.insert("execrunid".to_string(), exec_run_id.to_string());

    info!(exec_run_id, "request to save result");

    let record = ResultRecord {
        execution_record_uuid: exec_run_id.to_string(),
        result_path: check_string_for_null(args.get("pathname").map(String::as_str)),
        result_checksum: check_string_for_null(args.get("sha512sum").map(String::as_str)),
        source_path: check_string_for_null(args.get("sourcepathname").map(String::as_str)),
        source_checksum: check_string_for_null(args.get("source512sum").map(String::as_str)),
        log_path: check_string_for_null(args.get("logpathname").map(String::as_str)),
        log_checksum: check_string_for_null(args.get("log512sum").map(String::as_str)),
        weakness_count: handle_weakness_count(args.get("weaknesses").map(String::as_str)),
    };

    match store.insert_results(&record).await {
        Ok(true) => {}
        Ok(false) => put_error(&mut results, "result insert failed"),
        Err(err) => {
            error!(exec_run_id, %err, "result insert failed");
            put_error(&mut results, format!("error saving result: {}", err));
        }
    }
    results
}

/// Absent, empty or `"undefined"` counts mean unknown, not zero. Plain
/// numeric strings parse directly; underscore-encoded values go through
/// the decoder.
fn handle_weakness_count(value: Option<&str>) -> i64 {
    match value {
        None => WEAKNESS_COUNT_UNKNOWN,
        Some(v) if v.is_empty() || v.eq_ignore_ascii_case("undefined") => WEAKNESS_COUNT_UNKNOWN,
        Some(v) => match v.parse::<i64>() {
            Ok(n) => n,
            Err(_) => decode_integer_from_string(Some(v)),
        },
    }
}

fn required<'a>(args: &'a RpcMap, key: &str) -> Option<&'a str> {
    args.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

//! Administrative operations: execution events and system status.

use assay_db::AssayDb;
use assay_protocol::{put_error, RpcMap};
use tracing::{error, info};

/// Record an execution event for a run. All four arguments are required,
/// and each missing one gets its own diagnostic.
pub async fn insert_execution_event(db: &AssayDb, args: &RpcMap) -> RpcMap {
    let mut results = RpcMap::new();

    let Some(exec_record_uuid) = required(args, "execrecorduuid") else {
        put_error(&mut results, "no exec record uuid in the argument map");
        return results;
    };
    results.insert("execrecorduuid".to_string(), exec_record_uuid.to_string());

    let Some(event_time) = required(args, "eventtime") else {
        put_error(&mut results, "no event time in the argument map");
        return results;
    };
    let Some(event_name) = required(args, "eventname") else {
        put_error(&mut results, "no event name in the argument map");
        return results;
    };
    let Some(event_payload) = required(args, "eventpayload") else {
        put_error(&mut results, "no event payload in the argument map");
        return results;
    };

    info!(exec_record_uuid, event_name, "request to insert execution event");

    match db
        .insert_execution_event(exec_record_uuid, event_time, event_name, event_payload)
        .await
    {
        Ok(true) => {}
        Ok(false) => put_error(&mut results, "execution event insert failed"),
        Err(err) => {
            error!(exec_record_uuid, %err, "execution event insert failed");
            put_error(&mut results, format!("error inserting execution event: {}", err));
        }
    }
    results
}

/// Upsert a system status key/value pair.
pub async fn insert_system_status(db: &AssayDb, args: &RpcMap) -> RpcMap {
    let mut results = RpcMap::new();

    let Some(status_key) = required(args, "statuskey") else {
        put_error(&mut results, "no status key in the argument map");
        return results;
    };
    results.insert("statuskey".to_string(), status_key.to_string());

    let Some(status_value) = required(args, "statusvalue") else {
        put_error(&mut results, "no status value in the argument map");
        return results;
    };

    info!(status_key, "request to insert system status");

    match db.set_system_status(status_key, status_value).await {
        Ok(true) => {}
        Ok(false) => put_error(&mut results, "system status insert failed"),
        Err(err) => {
            error!(status_key, %err, "system status insert failed");
            put_error(&mut results, format!("error inserting system status: {}", err));
        }
    }
    results
}

fn required<'a>(args: &'a RpcMap, key: &str) -> Option<&'a str> {
    args.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

//! Viewer store operations.

use crate::checksum;
use assay_db::AssayDb;
use assay_protocol::{put_error, RpcMap};
use tracing::{error, info};

/// Store a viewer database path, computing its checksum when the caller
/// didn't supply one.
pub async fn store_viewer_database(db: &AssayDb, args: &RpcMap) -> RpcMap {
    let mut results = RpcMap::new();

    let Some(viewer_uuid) = required(args, "vieweruuid") else {
        put_error(&mut results, "no viewer uuid in the argument map");
        return results;
    };
    results.insert("vieweruuid".to_string(), viewer_uuid.to_string());

    let Some(viewer_db_path) = required(args, "viewerdbpath") else {
        put_error(&mut results, "no viewer database path in the argument map");
        return results;
    };

    info!(viewer_uuid, viewer_db_path, "request to store viewer database");

    let viewer_db_checksum = match required(args, "viewerdbchecksum") {
        Some(sum) => sum.to_string(),
        None => match checksum::file_checksum_sha512(viewer_db_path) {
            Ok(sum) => sum,
            Err(err) => {
                error!(viewer_uuid, %err, "viewer database checksum failed");
                put_error(
                    &mut results,
                    format!("check sum error on viewer database {}: {}", viewer_db_path, err),
                );
                return results;
            }
        },
    };

    match db.store_viewer(viewer_uuid, viewer_db_path, &viewer_db_checksum).await {
        Ok(true) => {}
        Ok(false) => put_error(&mut results, "viewer store failed"),
        Err(err) => {
            error!(viewer_uuid, %err, "viewer store failed");
            put_error(&mut results, format!("error storing viewer database: {}", err));
        }
    }
    results
}

/// Update a viewer instance's status. The status code, address and proxy
/// URL are optional; the literal string "null" (any case) counts as absent.
pub async fn update_viewer_instance(db: &AssayDb, args: &RpcMap) -> RpcMap {
    let mut results = RpcMap::new();

    let Some(viewer_uuid) = required(args, "vieweruuid") else {
        put_error(&mut results, "no viewer uuid in the argument map");
        return results;
    };
    results.insert("vieweruuid".to_string(), viewer_uuid.to_string());

    let Some(viewer_status) = required(args, "viewerstatus") else {
        put_error(&mut results, "no viewer status in the argument map");
        return results;
    };

    info!(viewer_uuid, viewer_status, "request to update viewer instance");

    let status_code = optional(args, "viewerstatuscode");
    let address = optional(args, "vieweraddress");
    let proxy_url = optional(args, "viewerproxyurl");

    match db
        .update_viewer_instance(viewer_uuid, viewer_status, status_code, address, proxy_url)
        .await
    {
        Ok(true) => {}
        Ok(false) => put_error(&mut results, "viewer instance update failed"),
        Err(err) => {
            error!(viewer_uuid, %err, "viewer instance update failed");
            put_error(&mut results, format!("error updating viewer instance: {}", err));
        }
    }
    results
}

fn required<'a>(args: &'a RpcMap, key: &str) -> Option<&'a str> {
    args.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn optional<'a>(args: &'a RpcMap, key: &str) -> Option<&'a str> {
    required(args, key).filter(|v| !v.eq_ignore_ascii_case("null"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_treats_null_literal_as_absent() {
        let mut args = RpcMap::new();
        args.insert("vieweraddress".to_string(), "null".to_string());
        args.insert("viewerproxyurl".to_string(), "NULL".to_string());
        args.insert("viewerstatuscode".to_string(), "0".to_string());

        assert_eq!(optional(&args, "vieweraddress"), None);
        assert_eq!(optional(&args, "viewerproxyurl"), None);
        assert_eq!(optional(&args, "viewerstatuscode"), Some("0"));
        assert_eq!(optional(&args, "missing"), None);
    }
}

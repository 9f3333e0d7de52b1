//! Catalog listings.
//!
//! Result maps use numbered keys: `"0"` is the header row, `"1"`..`"n"` are
//! data rows, each a pipe-joined list of cells, plus `nitems` for the total
//! row count including the header.

use assay_db::{AssayDb, CatalogTable, Result as DbResult};
use assay_protocol::encoding::validate_string_argument;
use assay_protocol::{error_map, RpcMap};
use tracing::{error, info};

const GATOR_SEPARATOR: &str = "|";

/// List every tool in the tool shed.
pub async fn list_tools(db: &AssayDb) -> RpcMap {
    info!("request to list tools");
    table_results(db.select_all_tools().await, "tool")
}

/// List every package in the package store.
pub async fn list_packages(db: &AssayDb) -> RpcMap {
    info!("request to list packages");
    table_results(db.select_all_packages().await, "package")
}

/// List every platform in the platform store.
pub async fn list_platforms(db: &AssayDb) -> RpcMap {
    info!("request to list platforms");
    table_results(db.select_all_platforms().await, "platform")
}

fn table_results(table: DbResult<CatalogTable>, what: &str) -> RpcMap {
    let table = match table {
        Ok(table) => table,
        Err(err) => {
            error!(%err, "{} catalog listing failed", what);
            return error_map(format!("error retrieving the {} catalog: {}", what, err));
        }
    };

    let mut results = RpcMap::new();
    results.insert("0".to_string(), table.header.join(GATOR_SEPARATOR));
    for (idx, row) in table.rows.iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| validate_string_argument(Some(cell)))
            .collect();
        results.insert((idx + 1).to_string(), cells.join(GATOR_SEPARATOR));
    }
    results.insert("nitems".to_string(), (table.rows.len() + 1).to_string());
    results
}

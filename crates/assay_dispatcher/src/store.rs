//! Assessment store seam between the handlers and the database.

use assay_db::{AssayDb, ExecRecord, ExecStatusUpdate, Result as DbResult, ResultRecord};

/// Access to the assessment store used by the dispatcher handlers.
#[allow(async_fn_in_trait)]
pub trait ExecStore {
    async fn execution_records(&self, execution_record_uuid: &str) -> DbResult<Vec<ExecRecord>>;

    async fn update_execution_run_status(&self, update: &ExecStatusUpdate) -> DbResult<bool>;

    async fn insert_results(&self, record: &ResultRecord) -> DbResult<bool>;
}

impl ExecStore for AssayDb {
    async fn execution_records(&self, execution_record_uuid: &str) -> DbResult<Vec<ExecRecord>> {
        self.select_execution_record(execution_record_uuid).await
    }

    async fn update_execution_run_status(&self, update: &ExecStatusUpdate) -> DbResult<bool> {
        AssayDb::update_execution_run_status(self, update).await
    }

    async fn insert_results(&self, record: &ResultRecord) -> DbResult<bool> {
        AssayDb::insert_results(self, record).await
    }
}

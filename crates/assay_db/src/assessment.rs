//! Assessment store operations: execution records, results, events, status.

use crate::types::{text_or_empty, text_or_null};
use crate::{AssayDb, ExecRecord, ExecStatusUpdate, Result, ResultRecord};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::debug;

impl AssayDb {
    /// Fetch execution records for a run uuid. Matching is
    /// case-insensitive; records come back with their stored casing.
    pub async fn select_execution_record(
        &self,
        execution_record_uuid: &str,
    ) -> Result<Vec<ExecRecord>> {
        let rows = sqlx::query(
            "SELECT execution_record_uuid, platform_version_uuid, tool_version_uuid,
                    package_version_uuid, project_uuid, user_uuid, status, run_date,
                    completion_date, cpu_utilization, lines_of_code,
                    execute_node_architecture_id
             FROM execution_record
             WHERE execution_record_uuid = ?1 COLLATE NOCASE",
        )
        .bind(execution_record_uuid)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_exec_record).collect()
    }

    /// Write the exec collector's status update. Returns false when no
    /// record matched the run uuid.
    pub async fn update_execution_run_status(&self, update: &ExecStatusUpdate) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE execution_record
             SET status = ?2, run_date = ?3, completion_date = ?4,
                 execute_node_architecture_id = ?5, lines_of_code = ?6,
                 cpu_utilization = ?7, vm_hostname = ?8, vm_username = ?9,
                 vm_password = ?10, vm_ip = ?11, vm_image = ?12, tool_filename = ?13
             WHERE execution_record_uuid = ?1 COLLATE NOCASE",
        )
        .bind(&update.execution_record_uuid)
        .bind(&update.status)
        .bind(&update.run_date)
        .bind(&update.completion_date)
        .bind(&update.execute_node_architecture_id)
        .bind(update.lines_of_code.to_string())
        .bind(&update.cpu_utilization)
        .bind(&update.vm_hostname)
        .bind(&update.vm_username)
        .bind(&update.vm_password)
        .bind(&update.vm_ip)
        .bind(&update.vm_image)
        .bind(&update.tool_filename)
        .execute(&self.pool)
        .await?;

        debug!(
            execution_record_uuid = %update.execution_record_uuid,
            rows = result.rows_affected(),
            "execution run status updated"
        );
        Ok(result.rows_affected() > 0)
    }

    /// Store an assessment result row.
    pub async fn insert_results(&self, record: &ResultRecord) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO assessment_result
                 (execution_record_uuid, result_path, result_checksum, source_path,
                  source_checksum, log_path, log_checksum, weakness_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&record.execution_record_uuid)
        .bind(&record.result_path)
        .bind(&record.result_checksum)
        .bind(&record.source_path)
        .bind(&record.source_checksum)
        .bind(&record.log_path)
        .bind(&record.log_checksum)
        .bind(record.weakness_count)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Record an execution event for a run.
    pub async fn insert_execution_event(
        &self,
        execution_record_uuid: &str,
        event_time: &str,
        event_name: &str,
        event_payload: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO execution_event
                 (execution_record_uuid, event_time, event_name, event_payload)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(execution_record_uuid)
        .bind(event_time)
        .bind(event_name)
        .bind(event_payload)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Upsert a system status key.
    pub async fn set_system_status(&self, status_key: &str, status_value: &str) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO system_status (status_key, status_value, updated_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(status_key) DO UPDATE SET
                 status_value = excluded.status_value,
                 updated_at = excluded.updated_at",
        )
        .bind(status_key)
        .bind(status_value)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

fn row_to_exec_record(row: &SqliteRow) -> Result<ExecRecord> {
    Ok(ExecRecord {
        execution_record_uuid: text_or_empty(row.try_get("execution_record_uuid")?),
        platform_version_uuid: text_or_empty(row.try_get("platform_version_uuid")?),
        tool_version_uuid: text_or_empty(row.try_get("tool_version_uuid")?),
        package_version_uuid: text_or_empty(row.try_get("package_version_uuid")?),
        project_uuid: text_or_empty(row.try_get("project_uuid")?),
        user_uuid: text_or_empty(row.try_get("user_uuid")?),
        status: text_or_null(row.try_get("status")?),
        run_date: text_or_null(row.try_get("run_date")?),
        completion_date: text_or_null(row.try_get("completion_date")?),
        cpu_utilization: text_or_null(row.try_get("cpu_utilization")?),
        lines_of_code: text_or_null(row.try_get("lines_of_code")?),
        execute_node_architecture_id: text_or_null(row.try_get("execute_node_architecture_id")?),
    })
}

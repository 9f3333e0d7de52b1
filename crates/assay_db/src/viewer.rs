//! Viewer store operations.

use crate::{AssayDb, Result};

impl AssayDb {
    /// Store (or refresh) a viewer database path and checksum.
    pub async fn store_viewer(
        &self,
        viewer_uuid: &str,
        viewer_db_path: &str,
        viewer_db_checksum: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO viewer_instance (viewer_uuid, viewer_db_path,
                                          viewer_db_checksum, updated_at)
             VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(viewer_uuid) DO UPDATE SET
                 viewer_db_path = excluded.viewer_db_path,
                 viewer_db_checksum = excluded.viewer_db_checksum,
                 updated_at = excluded.updated_at",
        )
        .bind(viewer_uuid)
        .bind(viewer_db_path)
        .bind(viewer_db_checksum)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Update a viewer instance's status. Optional fields left as `None`
    /// keep their stored values.
    pub async fn update_viewer_instance(
        &self,
        viewer_uuid: &str,
        viewer_status: &str,
        viewer_status_code: Option<&str>,
        viewer_address: Option<&str>,
        viewer_proxy_url: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO viewer_instance (viewer_uuid, viewer_status, viewer_status_code,
                                          viewer_address, viewer_proxy_url, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))
             ON CONFLICT(viewer_uuid) DO UPDATE SET
                 viewer_status = excluded.viewer_status,
                 viewer_status_code =
                     COALESCE(excluded.viewer_status_code, viewer_instance.viewer_status_code),
                 viewer_address =
                     COALESCE(excluded.viewer_address, viewer_instance.viewer_address),
                 viewer_proxy_url =
                     COALESCE(excluded.viewer_proxy_url, viewer_instance.viewer_proxy_url),
                 updated_at = excluded.updated_at",
        )
        .bind(viewer_uuid)
        .bind(viewer_status)
        .bind(viewer_status_code)
        .bind(viewer_address)
        .bind(viewer_proxy_url)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use sidecron_core::types::ScheduleEntry;

use crate::codec;
use crate::error::StoreError;
use crate::table::{JobTable, HEADER_ROWS};

/// Capability surface over a remote tabular store.
///
/// Implementations are plain transport: one network call per method, no
/// retries, no caching. Row indices are the store's own logical indices
/// (header row excluded) — callers go through [`CrontabStore`], which owns
/// the position-to-index translation.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Establish (or reuse) an authenticated session.
    async fn sign_in(&self) -> Result<(), StoreError>;

    /// All cell values of the table, header row included, in row order.
    async fn table_values(
        &self,
        workbook: &str,
        table: &str,
    ) -> Result<Vec<Vec<String>>, StoreError>;

    async fn append_rows(
        &self,
        workbook: &str,
        table: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<(), StoreError>;

    async fn update_row(
        &self,
        workbook: &str,
        table: &str,
        index: usize,
        row: Vec<String>,
    ) -> Result<(), StoreError>;

    async fn delete_row(&self, workbook: &str, table: &str, index: usize)
        -> Result<(), StoreError>;
}

/// The publish-later job store: a capability-restricted view over one table
/// in one workbook.
///
/// Every read re-fetches the table — the workbook is owned by the external
/// store and can change between invocations.
pub struct CrontabStore {
    store: Arc<dyn TableStore>,
    workbook_path: String,
    table: String,
}

impl CrontabStore {
    pub fn new(
        store: Arc<dyn TableStore>,
        workbook_path: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            store,
            workbook_path: workbook_path.into(),
            table: table.into(),
        }
    }

    pub async fn sign_in(&self) -> Result<(), StoreError> {
        self.store.sign_in().await
    }

    /// Fetch the current job table.
    pub async fn load(&self) -> Result<JobTable, StoreError> {
        let values = self
            .store
            .table_values(&self.workbook_path, &self.table)
            .await?;
        debug!(rows = values.len(), table = %self.table, "crontab table loaded");
        Ok(JobTable::new(values))
    }

    /// Append a new job row.
    pub async fn add_job(&self, entry: &ScheduleEntry) -> Result<(), StoreError> {
        let row = codec::encode(entry);
        debug!(path = %entry.path, "appending publish job");
        self.store
            .append_rows(&self.workbook_path, &self.table, vec![row.cells()])
            .await
    }

    /// Overwrite the job row at `position` (a table position as reported by
    /// [`JobTable::find_job`]; the header offset is applied here).
    pub async fn update_job(
        &self,
        position: usize,
        entry: &ScheduleEntry,
    ) -> Result<(), StoreError> {
        let row = codec::encode(entry);
        debug!(position, path = %entry.path, "updating publish job");
        self.store
            .update_row(
                &self.workbook_path,
                &self.table,
                position.saturating_sub(HEADER_ROWS),
                row.cells(),
            )
            .await
    }

    /// Delete the job row at `position` (table position, header offset
    /// applied here).
    pub async fn delete_job(&self, position: usize) -> Result<(), StoreError> {
        debug!(position, "deleting publish job");
        self.store
            .delete_row(
                &self.workbook_path,
                &self.table,
                position.saturating_sub(HEADER_ROWS),
            )
            .await
    }

    /// Path of the public JSON projection of the crontab workbook, the
    /// resource to re-preview after every mutation.
    pub fn json_path(&self) -> String {
        self.workbook_path.replace(".xlsx", ".json")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::NaiveDate;

    use super::*;

    /// In-memory [`TableStore`] mirroring the remote protocol: logical
    /// indices exclude the header row.
    struct MemStore {
        rows: Mutex<Vec<Vec<String>>>,
    }

    impl MemStore {
        fn new(rows: Vec<Vec<String>>) -> Self {
            Self {
                rows: Mutex::new(rows),
            }
        }
    }

    #[async_trait]
    impl TableStore for MemStore {
        async fn sign_in(&self) -> Result<(), StoreError> {
            Ok(())
        }

        async fn table_values(
            &self,
            _workbook: &str,
            _table: &str,
        ) -> Result<Vec<Vec<String>>, StoreError> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn append_rows(
            &self,
            _workbook: &str,
            _table: &str,
            rows: Vec<Vec<String>>,
        ) -> Result<(), StoreError> {
            self.rows.lock().unwrap().extend(rows);
            Ok(())
        }

        async fn update_row(
            &self,
            _workbook: &str,
            _table: &str,
            index: usize,
            row: Vec<String>,
        ) -> Result<(), StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let slot = rows.get_mut(index + HEADER_ROWS).ok_or(StoreError::Status {
                status: 404,
                context: format!("row {index}"),
            })?;
            *slot = row;
            Ok(())
        }

        async fn delete_row(
            &self,
            _workbook: &str,
            _table: &str,
            index: usize,
        ) -> Result<(), StoreError> {
            let mut rows = self.rows.lock().unwrap();
            if index + HEADER_ROWS >= rows.len() {
                return Err(StoreError::Status {
                    status: 404,
                    context: format!("row {index}"),
                });
            }
            rows.remove(index + HEADER_ROWS);
            Ok(())
        }
    }

    fn seeded() -> (Arc<MemStore>, CrontabStore) {
        let store = Arc::new(MemStore::new(vec![
            vec!["when".to_string(), "action".to_string()],
            vec![
                "at 14:30 on the 5 day of March in 2025".to_string(),
                "publish /news/foo".to_string(),
            ],
        ]));
        let crontab = CrontabStore::new(store.clone(), "/.helix/crontab.xlsx", "jobs");
        (store, crontab)
    }

    fn entry(path: &str) -> ScheduleEntry {
        let datetime = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        ScheduleEntry::new(datetime, path)
    }

    #[tokio::test]
    async fn update_at_position_hits_row_below_header() {
        let (store, crontab) = seeded();
        crontab.update_job(1, &entry("/news/foo")).await.unwrap();

        let rows = store.rows.lock().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "at 12:00 on the 1 day of June in 2025");
        assert_eq!(rows[1][1], "publish /news/foo");
    }

    #[tokio::test]
    async fn delete_at_position_removes_only_that_row() {
        let (store, crontab) = seeded();
        crontab.delete_job(1).await.unwrap();

        let rows = store.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "when");
    }

    #[tokio::test]
    async fn add_job_appends_encoded_row() {
        let (store, crontab) = seeded();
        crontab.add_job(&entry("/news/bar")).await.unwrap();

        let rows = store.rows.lock().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2][1], "publish /news/bar");
    }

    #[test]
    fn json_path_swaps_workbook_extension() {
        let (_, crontab) = seeded();
        assert_eq!(crontab.json_path(), "/.helix/crontab.json");
    }
}

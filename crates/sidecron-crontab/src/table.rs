use crate::codec;

/// Physical header rows before the first job row in the crontab table.
///
/// Logical store index = table position − `HEADER_ROWS`. The offset is
/// applied in exactly one place ([`crate::store::CrontabStore`]); everything
/// else speaks in table positions.
pub const HEADER_ROWS: usize = 1;

/// One crontab row: a when-expression and an action-expression, both opaque
/// text until [`codec::decode`] is asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRow {
    pub when: String,
    pub action: String,
}

impl JobRow {
    pub fn new(when: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            when: when.into(),
            action: action.into(),
        }
    }

    /// The first two cells of a raw table row, if present.
    pub fn from_cells(cells: &[String]) -> Option<Self> {
        match cells {
            [when, action, ..] => Some(Self::new(when, action)),
            _ => None,
        }
    }

    pub fn cells(&self) -> Vec<String> {
        vec![self.when.clone(), self.action.clone()]
    }

    /// Target path referenced by this row's action cell.
    pub fn path(&self) -> String {
        codec::action_path(&self.action)
    }
}

/// A row found by [`JobTable::find_job`], remembered with its table position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobMatch {
    /// 0-based position in the fetched table (the header row is position 0).
    pub position: usize,
    pub row: JobRow,
}

/// The crontab table exactly as fetched: header row first, then one row per
/// job, order defining positions. Always re-fetched, never cached.
#[derive(Debug, Clone, Default)]
pub struct JobTable {
    values: Vec<Vec<String>>,
}

impl JobTable {
    pub fn new(values: Vec<Vec<String>>) -> Self {
        Self { values }
    }

    /// Find the job scheduled for `target_path`: the first row whose action
    /// cell ends with the path.
    ///
    /// At most one job per path is assumed. If duplicate rows exist for the
    /// same path, only the first is ever surfaced; the rest stay unreachable
    /// through update/delete until the first one is removed.
    pub fn find_job(&self, target_path: &str) -> Option<JobMatch> {
        self.values.iter().enumerate().find_map(|(position, cells)| {
            let row = JobRow::from_cells(cells)?;
            row.action
                .ends_with(target_path)
                .then(|| JobMatch { position, row })
        })
    }

    /// All job rows (header skipped) with their table positions.
    pub fn jobs(&self) -> impl Iterator<Item = (usize, JobRow)> + '_ {
        self.values
            .iter()
            .enumerate()
            .skip(HEADER_ROWS)
            .filter_map(|(position, cells)| JobRow::from_cells(cells).map(|row| (position, row)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> JobTable {
        JobTable::new(vec![
            vec!["when".to_string(), "action".to_string()],
            vec![
                "at 14:30 on the 5 day of March in 2025".to_string(),
                "publish /news/foo".to_string(),
            ],
            vec![
                "at 09:00 on the 1 day of April in 2025".to_string(),
                "publish /news/baz".to_string(),
            ],
        ])
    }

    #[test]
    fn finds_job_at_table_position() {
        let found = table().find_job("/news/foo").unwrap();
        assert_eq!(found.position, 1);
        assert_eq!(found.row.path(), "/news/foo");
    }

    #[test]
    fn no_match_for_unscheduled_path() {
        assert!(table().find_job("/news/bar").is_none());
    }

    #[test]
    fn first_duplicate_wins() {
        let mut rows = table().values;
        rows.push(vec![
            "at 10:00 on the 2 day of May in 2025".to_string(),
            "publish /news/foo".to_string(),
        ]);
        let found = JobTable::new(rows).find_job("/news/foo").unwrap();
        assert_eq!(found.position, 1);
    }

    #[test]
    fn jobs_skips_header() {
        let positions: Vec<usize> = table().jobs().map(|(p, _)| p).collect();
        assert_eq!(positions, vec![1, 2]);
    }

    #[test]
    fn short_rows_are_ignored() {
        let t = JobTable::new(vec![vec!["header".to_string()], vec![]]);
        assert!(t.find_job("/news/foo").is_none());
        assert_eq!(t.jobs().count(), 0);
    }
}

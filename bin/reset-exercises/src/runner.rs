use std::fmt::Display;

use storage::{Error, Store, ID_COLUMN, SENTINEL_ID};

/// The outcome of a single reset run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunStatus {
    /// Rows were deleted; the count is known if the store reported it.
    Deleted { rows: Option<u64> },
    /// Nothing was deleted; this many rows would have been.
    DryRun { rows: Option<u64> },
    /// The store answered with an error.
    Rejected,
    /// The run failed before the store could answer.
    Failed,
}

/// Logs an error that prevented the reset from completing.
pub(crate) fn unexpected(table: &str, e: &dyn Display) -> RunStatus {
    vlog::error!("Unexpected error while resetting {table}: {e}");

    RunStatus::Failed
}

/// Deletes every row of a table in a single request.
///
/// The delete is filtered on `id != SENTINEL_ID`, which every real row
/// satisfies.
pub(crate) struct ResetRunner<'a> {
    store: &'a dyn Store,
    table: &'a str,
    dry_run: bool,
}

impl<'a> ResetRunner<'a> {
    pub(crate) fn new(store: &'a dyn Store, table: &'a str) -> Self {
        Self {
            store,
            table,
            dry_run: false,
        }
    }

    pub(crate) fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run the reset. Errors are logged and reflected in the returned status,
    /// never propagated.
    pub(crate) async fn run(&self) -> RunStatus {
        if self.dry_run {
            self.count().await
        } else {
            self.delete().await
        }
    }

    async fn delete(&self) -> RunStatus {
        let table = self.table;

        vlog::info!("Deleting all {table}...");

        match self
            .store
            .delete_where_ne(table, ID_COLUMN, SENTINEL_ID)
            .await
        {
            Ok(rows) => {
                match rows {
                    Some(rows) => vlog::info!("Successfully deleted all {table} ({rows} rows)"),
                    None => vlog::info!("Successfully deleted all {table}"),
                }
                vlog::info!("You can now re-import {table}");

                RunStatus::Deleted { rows }
            }
            Err(Error::Rejected(e)) => {
                vlog::error!("Error deleting {table}: {e}");

                RunStatus::Rejected
            }
            Err(e) => unexpected(table, &e),
        }
    }

    async fn count(&self) -> RunStatus {
        let table = self.table;

        vlog::info!("Dry run: counting {table} that would be deleted...");

        match self
            .store
            .count_where_ne(table, ID_COLUMN, SENTINEL_ID)
            .await
        {
            Ok(rows) => {
                match rows {
                    Some(rows) => vlog::info!("Dry run: {rows} {table} would be deleted"),
                    None => vlog::info!("Dry run: {table} is reachable, row count unknown"),
                }

                RunStatus::DryRun { rows }
            }
            Err(Error::Rejected(e)) => {
                vlog::error!("Error counting {table}: {e}");

                RunStatus::Rejected
            }
            Err(e) => unexpected(table, &e),
        }
    }
}

use client_core::{LatestRunPolicy, UploadFile};
use shared::domain::{Run, RunId};

use crate::{
    policy::latest_run,
    views::{display_timestamp, Intent, SuccessRate},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardSummary {
    pub total_providers: u32,
    pub validated: u32,
    pub flagged: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunRow {
    pub run_id: RunId,
    pub created_at: String,
    pub total_providers: u32,
    pub validated: u32,
    pub flagged: u32,
    pub success_rate: SuccessRate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardModel {
    /// Counts for the most recent run, zero when there are none.
    pub summary: DashboardSummary,
    /// Newest first.
    pub rows: Vec<RunRow>,
}

impl DashboardModel {
    pub fn build(runs: &[Run], policy: LatestRunPolicy) -> Self {
        let summary = latest_run(policy, runs)
            .map(|run| DashboardSummary {
                total_providers: run.total_providers,
                validated: run.validated,
                flagged: run.flagged,
            })
            .unwrap_or_default();

        let rows = runs
            .iter()
            .rev()
            .map(|run| RunRow {
                run_id: run.run_id.clone(),
                created_at: display_timestamp(run),
                total_providers: run.total_providers,
                validated: run.validated,
                flagged: run.flagged,
                success_rate: SuccessRate::for_run(run),
            })
            .collect();

        Self { summary, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn run_count(&self) -> usize {
        self.rows.len()
    }

    pub fn upload(&self, file: UploadFile) -> Intent {
        Intent::Upload(file)
    }

    pub fn open_run(&self, run_id: &RunId) -> Option<Intent> {
        self.rows
            .iter()
            .find(|row| &row.run_id == run_id)
            .map(|row| Intent::OpenRun(row.run_id.clone()))
    }
}

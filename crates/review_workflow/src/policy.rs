//! Which run the dashboard summarises as "most recent".

use client_core::LatestRunPolicy;
use shared::domain::Run;

pub fn latest_run(policy: LatestRunPolicy, runs: &[Run]) -> Option<&Run> {
    match policy {
        LatestRunPolicy::LastInList => runs.last(),
        // Unparseable timestamps sort before parseable ones; later list
        // position wins ties.
        LatestRunPolicy::NewestTimestamp => runs
            .iter()
            .enumerate()
            .max_by_key(|(position, run)| (run.created_at(), *position))
            .map(|(_, run)| run),
    }
}

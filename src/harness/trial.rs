//! A single pass through acquire, work and release.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Phase, PhaseStopwatches};
use crate::backend::{Query, ResourceClient, ResourceId};
use crate::error::TrialError;

/// What a failed release means for the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleasePolicy {
    /// A failed close aborts the run like any other step.
    #[default]
    Strict,
    /// A failed close is logged and its lap still counts.
    BestEffort,
}

/// Run one trial, lapping each phase stopwatch around exactly its step.
///
/// A failed trial leaves no sample in any phase: its laps are rewound, so
/// every stopwatch holds exactly `trial` samples when the error is returned.
/// When the query fails the connection is still closed, untimed, before the
/// error is returned.
pub async fn run_trial<C: ResourceClient>(
    client: &C,
    resource: &ResourceId,
    query: &Query,
    stopwatches: &mut PhaseStopwatches,
    release: ReleasePolicy,
    trial: usize,
) -> Result<(), TrialError> {
    let result = lap_phases(client, resource, query, stopwatches, release, trial).await;
    if result.is_err() {
        stopwatches.rewind(trial);
    }
    result
}

async fn lap_phases<C: ResourceClient>(
    client: &C,
    resource: &ResourceId,
    query: &Query,
    stopwatches: &mut PhaseStopwatches,
    release: ReleasePolicy,
    trial: usize,
) -> Result<(), TrialError> {
    let lap = stopwatches
        .acquire
        .start()
        .map_err(|e| TrialError::new(trial, Phase::Acquire, e))?;
    let mut connection = match client.connect(resource).await {
        Ok(connection) => {
            stopwatches.acquire.stop(lap);
            connection
        }
        Err(e) => return Err(TrialError::new(trial, Phase::Acquire, e)),
    };

    let lap = match stopwatches.work.start() {
        Ok(lap) => lap,
        Err(e) => {
            discard(client, connection, trial).await;
            return Err(TrialError::new(trial, Phase::Work, e));
        }
    };
    match client.execute_query(&mut connection, query).await {
        Ok(()) => stopwatches.work.stop(lap),
        Err(e) => {
            discard(client, connection, trial).await;
            return Err(TrialError::new(trial, Phase::Work, e));
        }
    }

    let lap = match stopwatches.release.start() {
        Ok(lap) => lap,
        Err(e) => {
            discard(client, connection, trial).await;
            return Err(TrialError::new(trial, Phase::Release, e));
        }
    };
    match client.close(connection).await {
        Ok(()) => stopwatches.release.stop(lap),
        Err(e) => match release {
            ReleasePolicy::Strict => return Err(TrialError::new(trial, Phase::Release, e)),
            ReleasePolicy::BestEffort => {
                stopwatches.release.stop(lap);
                warn!(trial, "release failed, continuing: {}", e);
            }
        },
    }

    Ok(())
}

async fn discard<C: ResourceClient>(client: &C, connection: C::Connection, trial: usize) {
    if let Err(e) = client.close(connection).await {
        debug!(trial, "closing connection after failure: {}", e);
    }
}

//! Job lifecycle controller
//!
//! Owns the lifecycle of a single analysis job: submission, the progress
//! feed, the elapsed ticker, the one-shot result fetch, and the
//! acknowledgment gate in front of the normalized outputs. Only one job is
//! ever active; a new submission invalidates the previous one first.

use crate::client::{AnalysisClient, JobHandle};
use crate::interpreter::{ProgressInterpreter, StreamPhase};
use crate::normalize::{self, MarkerPosition, TimelineTick};
use crate::registry::ChannelRegistry;
use crate::stream::progress_events;
use crate::surface::DisplaySurface;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use sga_common::api::{AnalysisOptions, AnalysisResponse};
use sga_common::{human_time, AnalysisChannel, Error, Result};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Elapsed-timer refresh period.
const TICKER_PERIOD: Duration = Duration::from_millis(200);

/// State of the one in-flight (or just-finished) job.
struct JobState {
    handle: JobHandle,
    started_at: DateTime<Utc>,
    cancel: CancellationToken,
    /// Write-once: set at the result fetch completion, replaced wholesale
    /// on the next submission. Never partially committed.
    result: Option<AnalysisResponse>,
    acknowledgeable: bool,
}

/// Outcome of driving a job to a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// The feed delivered `Done`; the result (when fetchable) is stored.
    Completed,
    /// A newer submission superseded this job mid-stream.
    Superseded,
}

/// Normalized outputs released by acknowledgment.
#[derive(Debug, Clone)]
pub struct AcknowledgedResult {
    pub total_measures: Option<f64>,
    pub markers: BTreeMap<AnalysisChannel, MarkerPosition>,
    pub ticks: Vec<TimelineTick>,
}

/// Controller for the analysis-job lifecycle.
pub struct JobController {
    client: AnalysisClient,
    registry: ChannelRegistry,
    job: Option<JobState>,
}

impl JobController {
    pub fn new(client: AnalysisClient) -> Self {
        JobController {
            client,
            registry: ChannelRegistry::new(),
            job: None,
        }
    }

    /// Handle of the current job, if one was submitted.
    pub fn job_handle(&self) -> Option<&JobHandle> {
        self.job.as_ref().map(|job| &job.handle)
    }

    /// Whether the acknowledge action is available (the job completed and
    /// its result fetch has finished, successfully or not).
    pub fn can_acknowledge(&self) -> bool {
        self.job.as_ref().is_some_and(|job| job.acknowledgeable)
    }

    /// Submit a new analysis job.
    ///
    /// Any prior job is invalidated first: its cancellation token fires so
    /// a stale stream's late events become no-ops, and its stored result is
    /// discarded. Submission failures leave no active job behind.
    pub async fn submit(
        &mut self,
        file_name: &str,
        score_file: Vec<u8>,
        options: &AnalysisOptions,
    ) -> Result<JobHandle> {
        if let Some(prev) = self.job.take() {
            tracing::info!(job_id = %prev.handle, "Superseding previous job");
            prev.cancel.cancel();
        }

        let handle = self.client.submit(file_name, score_file, options).await?;
        self.job = Some(JobState {
            handle: handle.clone(),
            started_at: Utc::now(),
            cancel: CancellationToken::new(),
            result: None,
            acknowledgeable: false,
        });
        Ok(handle)
    }

    /// Drive the submitted job to a terminal state.
    ///
    /// Opens the progress feed and serializes the three callback sources
    /// (elapsed ticker, feed events, cancellation) through one select loop;
    /// the ticker dies with the loop on every exit path. After the feed
    /// delivers `Done`, the result is fetched exactly once and stored, and
    /// acknowledgment becomes available.
    pub async fn run(&mut self, surface: &mut dyn DisplaySurface) -> Result<JobOutcome> {
        let (handle, cancel, started_at) = match &self.job {
            Some(job) => (job.handle.clone(), job.cancel.clone(), job.started_at),
            None => return Err(Error::InvalidInput("no job submitted".to_string())),
        };
        if cancel.is_cancelled() {
            return Ok(JobOutcome::Superseded);
        }

        let response = self.client.open_progress(&handle).await?;
        let mut events = Box::pin(progress_events(response));

        let mut interpreter = ProgressInterpreter::new(self.registry.clone());
        interpreter.begin(surface);
        surface.set_elapsed(0, 0);

        let started = Instant::now();
        let mut ticker = tokio::time::interval(TICKER_PERIOD);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(job_id = %handle, "Job superseded; closing its progress stream");
                    return Ok(JobOutcome::Superseded);
                }
                _ = ticker.tick() => {
                    let (minutes, seconds) = human_time::elapsed_parts(started.elapsed());
                    surface.set_elapsed(minutes, seconds);
                }
                event = events.next() => match event {
                    Some(Ok(event)) => {
                        if interpreter.apply(&event, surface) == StreamPhase::Completed {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        interpreter.fail(surface);
                        return Err(e);
                    }
                    None => {
                        interpreter.fail(surface);
                        return Err(Error::Stream(
                            "progress feed ended before completion".to_string(),
                        ));
                    }
                },
            }
        }

        tracing::info!(
            job_id = %handle,
            started_at = %started_at,
            elapsed = %human_time::format_elapsed(started.elapsed()),
            "Analysis complete"
        );

        // Completed: fetch the result exactly once, keyed by the same handle
        match self.client.fetch_result(&handle).await {
            Ok(result) => {
                if let Some(job) = self.job.as_mut().filter(|job| job.handle == handle) {
                    job.result = Some(result);
                    job.acknowledgeable = true;
                }
            }
            Err(e) => {
                // Result stays unset; acknowledgment will have nothing to apply
                tracing::error!(job_id = %handle, "Failed to fetch result: {}", e);
                if let Some(job) = self.job.as_mut().filter(|job| job.handle == handle) {
                    job.acknowledgeable = true;
                }
            }
        }

        Ok(JobOutcome::Completed)
    }

    /// Apply the acknowledged result to the surface.
    ///
    /// Reads the controller-owned stored result — never a transient
    /// callback capture — paints the confidence markers, and returns the
    /// normalized outputs for the caller's timeline. Returns `None` when
    /// there is nothing to apply: no job, acknowledgment not yet enabled,
    /// or the result fetch failed.
    pub fn acknowledge(&self, surface: &mut dyn DisplaySurface) -> Option<AcknowledgedResult> {
        let job = self.job.as_ref()?;
        if !job.acknowledgeable {
            tracing::debug!(job_id = %job.handle, "Acknowledgment before completion; ignored");
            return None;
        }
        let result = match &job.result {
            Some(response) => &response.result,
            None => {
                tracing::warn!(job_id = %job.handle, "No stored result; nothing to apply");
                return None;
            }
        };

        let markers = normalize::marker_positions(&result.confidences);
        for (channel, position) in &markers {
            surface.set_marker(channel.as_str(), *position);
        }

        Some(AcknowledgedResult {
            total_measures: result.total_measures,
            markers,
            ticks: normalize::timeline_ticks(&result.analysis_notes),
        })
    }
}

use crate::core::etl::EtlEngine;
use crate::domain::model::{ReportRequest, RunSummary};
use crate::domain::ports::{Pipeline, ProgressSink};
use crate::utils::error::{ErrorSeverity, EtlError, Result};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Idle,
    Running,
}

/// The single completion event of an accepted run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Succeeded(RunSummary),
    Failed {
        message: String,
        severity: ErrorSeverity,
    },
}

impl RunOutcome {
    fn failed(error: &EtlError) -> Self {
        RunOutcome::Failed {
            message: error.user_friendly_message(),
            severity: error.severity(),
        }
    }
}

/// Hosts at most one report run at a time on a background task.
pub struct ReportRunner<P: Pipeline + 'static> {
    engine: Arc<EtlEngine<P>>,
    status: Arc<Mutex<RunStatus>>,
}

impl<P: Pipeline + 'static> Clone for ReportRunner<P> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            status: self.status.clone(),
        }
    }
}

/// Puts the runner back to idle however the job ends, panics included.
struct IdleOnDrop(Arc<Mutex<RunStatus>>);

impl Drop for IdleOnDrop {
    fn drop(&mut self) {
        let mut status = match self.0.lock() {
            Ok(status) => status,
            Err(poisoned) => poisoned.into_inner(),
        };
        *status = RunStatus::Idle;
    }
}

impl<P: Pipeline + 'static> ReportRunner<P> {
    pub fn new(engine: EtlEngine<P>) -> Self {
        Self {
            engine: Arc::new(engine),
            status: Arc::new(Mutex::new(RunStatus::Idle)),
        }
    }

    pub fn status(&self) -> RunStatus {
        match self.status.lock() {
            Ok(status) => *status,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn try_begin(&self) -> Result<IdleOnDrop> {
        let mut status = match self.status.lock() {
            Ok(status) => status,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *status == RunStatus::Running {
            return Err(EtlError::AlreadyRunning);
        }
        *status = RunStatus::Running;
        Ok(IdleOnDrop(self.status.clone()))
    }

    /// Starts a run in the background. `on_complete` fires exactly once,
    /// after the status is back to idle.
    pub fn start<F>(
        &self,
        request: ReportRequest,
        progress: Arc<dyn ProgressSink>,
        on_complete: F,
    ) -> Result<JoinHandle<()>>
    where
        F: FnOnce(RunOutcome) + Send + 'static,
    {
        let guard = self.try_begin()?;
        let engine = self.engine.clone();

        let handle = tokio::spawn(async move {
            let job = tokio::spawn(async move { engine.run(&request, progress.as_ref()).await });

            let outcome = match job.await {
                Ok(Ok(summary)) => RunOutcome::Succeeded(summary),
                Ok(Err(e)) => {
                    tracing::error!("✗ Report failed: {}", e);
                    RunOutcome::failed(&e)
                }
                Err(join_error) => {
                    let e = EtlError::WorkerFailed {
                        message: join_error.to_string(),
                    };
                    tracing::error!("✗ {}", e);
                    RunOutcome::failed(&e)
                }
            };

            drop(guard);
            on_complete(outcome);
        });

        Ok(handle)
    }
}

use crate::domain::ports::{ProgressEvent, ProgressSink};
use tokio::sync::mpsc::UnboundedSender;

/// Writes every event to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, event: ProgressEvent) {
        match &event {
            ProgressEvent::NoPhysiciansFound => tracing::warn!("⚠ {}", event),
            ProgressEvent::PhysicianExcluded { .. } => tracing::info!("⊘ {}", event),
            _ => tracing::info!("✓ {}", event),
        }
    }
}

/// Forwards events to a front-end that tails the run.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    sender: UnboundedSender<ProgressEvent>,
}

impl ChannelProgress {
    pub fn new(sender: UnboundedSender<ProgressEvent>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelProgress {
    fn report(&self, event: ProgressEvent) {
        // A closed receiver only means nobody is watching any more.
        if self.sender.send(event).is_err() {
            tracing::debug!("Progress receiver dropped");
        }
    }
}

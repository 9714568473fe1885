use crate::domain::model::{ReportRequest, RunSummary};
use crate::domain::ports::{Pipeline, ProgressEvent, ProgressSink};
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs one report start to finish. Nothing is written unless every
    /// step before `load` succeeded.
    pub async fn run(
        &self,
        request: &ReportRequest,
        progress: &dyn ProgressSink,
    ) -> Result<RunSummary> {
        tracing::info!("Starting report run");
        progress.report(ProgressEvent::Started {
            start: request.start,
            end: request.end,
            facility_id: request.facility_id.clone(),
        });

        // Extract
        let pages = self.pipeline.extract(request, progress).await?;
        tracing::info!("Extracted {} physician page(s)", pages.len());

        if pages.is_empty() {
            progress.report(ProgressEvent::NoPhysiciansFound);
            return Ok(RunSummary::default());
        }

        // Transform
        let data = self.pipeline.transform(request, pages, progress).await?;
        tracing::info!(
            "Grouped {} row(s) into {} day(s)",
            data.buckets.record_count(),
            data.buckets.day_count()
        );

        // Load
        let output_path = self.pipeline.load(request, &data).await?;
        progress.report(ProgressEvent::ReportWritten {
            path: output_path.clone(),
            efficiency: data.totals.efficiency(),
        });

        Ok(RunSummary {
            output_path: Some(output_path),
            links_found: data.links_found,
            physicians_included: data.physicians_included,
            physicians_excluded: data.physicians_excluded,
            records: data.buckets.record_count(),
            totals: data.totals,
        })
    }
}

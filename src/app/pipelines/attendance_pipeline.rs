use crate::adapters::http::PortalClient;
use crate::core::report::{render_csv, report_filename, ReportMeta};
use crate::core::{ConfigProvider, Pipeline, ProgressEvent, ProgressSink, Storage};
use crate::domain::model::{
    DayBuckets, LinkSet, PhysicianPage, ReportData, ReportRequest, Totals,
};
use crate::domain::services::to_record;
use crate::utils::error::Result;
use chrono::Local;

/// Scrapes the clinic portal and writes the attendance report.
pub struct AttendancePipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) portal: PortalClient,
}

impl<S: Storage, C: ConfigProvider> AttendancePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let portal = PortalClient::from_config(&config)?;
        Ok(Self {
            storage,
            config,
            portal,
        })
    }

    async fn collect_links(
        &self,
        request: &ReportRequest,
        progress: &dyn ProgressSink,
    ) -> Result<LinkSet> {
        let mut links = LinkSet::new();

        for day in request.days() {
            self.portal.pause().await;
            let found = self.portal.fetch_listing(day, &request.facility_id).await?;
            let links_on_day = found.len();

            for url in found {
                if !links.insert(url, day) {
                    tracing::debug!("Link already queued, skipping");
                }
            }

            progress.report(ProgressEvent::DayScanned {
                day,
                links_on_day,
                unique_links: links.len(),
            });
        }

        Ok(links)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for AttendancePipeline<S, C> {
    async fn extract(
        &self,
        request: &ReportRequest,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<PhysicianPage>> {
        self.portal.authenticate().await?;
        progress.report(ProgressEvent::Authenticated);

        let links = self.collect_links(request, progress).await?;
        let total = links.len();
        let mut pages = Vec::with_capacity(total);

        for (i, link) in links.into_links().into_iter().enumerate() {
            self.portal.pause().await;
            let detail = self.portal.fetch_detail(&link.url).await?;

            if !detail.has_table {
                tracing::warn!(
                    "No results table on {} ({}), physician has no rows",
                    link.url,
                    detail.name
                );
            }

            let mut rows = Vec::with_capacity(detail.rows.len());
            let mut skipped_rows = 0;
            for row in detail.rows {
                match row {
                    Ok(row) => rows.push(row),
                    Err(e) => {
                        skipped_rows += 1;
                        tracing::warn!("Skipping row for {}: {}", detail.name, e);
                    }
                }
            }

            progress.report(ProgressEvent::PhysicianProcessed {
                index: i + 1,
                total,
                name: detail.name.clone(),
                specialty: detail.specialty.clone(),
                rows: rows.len(),
            });

            pages.push(PhysicianPage {
                url: link.url,
                first_seen: link.first_seen,
                name: detail.name,
                specialty: detail.specialty,
                rows,
                skipped_rows,
            });
        }

        Ok(pages)
    }

    async fn transform(
        &self,
        request: &ReportRequest,
        pages: Vec<PhysicianPage>,
        progress: &dyn ProgressSink,
    ) -> Result<ReportData> {
        let mut buckets = DayBuckets::new();
        let mut totals = Totals::default();
        let mut included = 0;
        let mut excluded = 0;
        let links_found = pages.len();

        for page in &pages {
            if let Some(hit) = request.filters.matching_term(&page.name, &page.specialty) {
                excluded += 1;
                progress.report(ProgressEvent::PhysicianExcluded {
                    name: page.name.clone(),
                    specialty: page.specialty.clone(),
                    reason: format!("{} matches '{}'", hit.field, hit.term),
                });
                continue;
            }

            included += 1;
            for row in &page.rows {
                let record = to_record(page, row);
                totals.add(&record);
                buckets.push(record);
            }
        }

        Ok(ReportData {
            buckets,
            totals,
            links_found,
            physicians_included: included,
            physicians_excluded: excluded,
        })
    }

    async fn load(&self, request: &ReportRequest, data: &ReportData) -> Result<String> {
        let meta = ReportMeta {
            title: self.config.report_title(),
            generated_at: Local::now().naive_local(),
            start: request.start,
            end: request.end,
            facility_id: &request.facility_id,
        };
        let csv = render_csv(&data.buckets, &meta)?;
        let filename = report_filename(self.config.filename_prefix(), request.start, request.end);

        tracing::debug!("Writing {} ({} bytes)", filename, csv.len());
        self.storage.write_file(&filename, &csv).await
    }
}

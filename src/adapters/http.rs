use crate::adapters::parser::{parse_detail_page, parse_listing_links, DetailPage};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub const LOGIN_PATH: &str = "Account/Login";
pub const LOGIN_RETURN_URL: &str = "/Medico/RelatorioEstatistica";
pub const LISTING_PATH: &str = "Medico/ListaRelatorioAtendimentoMedico";

const LOGIN_FIELD: &str = "login";
const PASSWORD_FIELD: &str = "Senha";

/// Parses the configured base URL as a directory so a portal hosted under a
/// sub-path keeps it when endpoint paths are joined.
fn portal_root(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Cookie-keeping session against the clinic portal.
pub struct PortalClient {
    client: Client,
    base_url: Url,
    login: String,
    password: String,
    delay: Duration,
}

impl PortalClient {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout())
            .user_agent(config.user_agent())
            .build()?;

        Ok(Self {
            client,
            base_url: portal_root(config.base_url())?,
            login: config.login().to_string(),
            password: config.password().to_string(),
            delay: config.request_delay(),
        })
    }

    pub fn login_url(&self) -> Result<Url> {
        let mut url = self.base_url.join(LOGIN_PATH)?;
        url.query_pairs_mut()
            .append_pair("ReturnUrl", LOGIN_RETURN_URL);
        Ok(url)
    }

    /// Listing of one day; `cache_buster` goes into the `_` parameter.
    pub fn listing_url(&self, day: NaiveDate, facility_id: &str, cache_buster: i64) -> Result<Url> {
        let day = day.format("%Y-%m-%d").to_string();
        let mut url = self.base_url.join(LISTING_PATH)?;
        url.query_pairs_mut()
            .append_pair("inicio", &day)
            .append_pair("fim", &day)
            .append_pair("unidade", facility_id)
            .append_pair("usuario", "undefined")
            .append_pair("medId", "")
            .append_pair("dia", "true")
            .append_pair("_", &cache_buster.to_string());
        Ok(url)
    }

    /// Submits the login form. Only HTTP failures are detected here; a
    /// rejected login shows up later as pages without data.
    pub async fn authenticate(&self) -> Result<()> {
        let url = self.login_url()?;
        tracing::debug!("Submitting login form to {}", url);

        let response = self
            .client
            .post(url)
            .form(&[(LOGIN_FIELD, &self.login), (PASSWORD_FIELD, &self.password)])
            .send()
            .await
            .inspect_err(|e| tracing::error!("Login request failed: {e:?}"))?
            .error_for_status()?;

        tracing::debug!("Login response status: {}", response.status());
        Ok(())
    }

    pub async fn fetch_listing(&self, day: NaiveDate, facility_id: &str) -> Result<Vec<String>> {
        let url = self.listing_url(day, facility_id, Utc::now().timestamp_millis())?;
        tracing::debug!("Fetching listing for {}: {}", day, url);
        let html = self.get_html(url.as_str()).await?;
        Ok(parse_listing_links(&html, &self.base_url)?)
    }

    pub async fn fetch_detail(&self, url: &str) -> Result<DetailPage> {
        tracing::debug!("Fetching physician page: {}", url);
        let html = self.get_html(url).await?;
        Ok(parse_detail_page(&html))
    }

    /// Politeness pause between consecutive portal requests.
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    async fn get_html(&self, url: &str) -> Result<String> {
        Ok(self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| tracing::error!("HTTP error: {e:?}"))?
            .error_for_status()?
            .text()
            .await
            .inspect_err(|e| tracing::error!("Decode error: {e:?}"))?)
    }
}

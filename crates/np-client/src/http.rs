//! REST client for the sales backend.

use crate::error::ClientError;
use crate::upload::UploadSink;
use np_core::config::AppConfig;
use np_core::data_url::DataUrl;
use np_core::error::UploadError;
use np_core::sale::{Customer, Sale, SaleFilter};
use np_render::DocumentSource;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(30);
const CUSTOMER_SEARCH_LIMIT: u32 = 10;

/// `{"base64": "..."}` as returned by the document endpoints.
#[derive(Deserialize)]
struct Base64Body {
    base64: String,
}

impl Base64Body {
    /// Accepts either a bare payload or a full data URL.
    fn decode(self, mime: &str) -> Result<DataUrl, ClientError> {
        let payload = self.base64.trim();
        let url = if payload.starts_with("data:") {
            DataUrl::parse(payload)?
        } else {
            DataUrl::from_base64(mime, payload)?
        };
        Ok(url)
    }
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base: String,
    branch: String,
    terminal: String,
}

impl BackendClient {
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let http = Client::builder().timeout(TIMEOUT).build()?;
        Ok(Self {
            http,
            base: config.endpoint().to_string(),
            branch: config.branch.trim().to_string(),
            terminal: config.terminal.trim().to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Most recent sale at the configured branch and terminal.
    pub async fn latest_sale(&self) -> Result<Option<Sale>, ClientError> {
        let filter = SaleFilter::latest(&self.branch, &self.terminal);
        Ok(self.list_sales(&filter).await?.into_iter().next())
    }

    /// Sales matching `filter`. Branch and terminal default to the
    /// configured ones; a 404 means no matches.
    pub async fn list_sales(&self, filter: &SaleFilter) -> Result<Vec<Sale>, ClientError> {
        let mut filter = filter.clone();
        filter.branch.get_or_insert_with(|| self.branch.clone());
        filter.terminal.get_or_insert_with(|| self.terminal.clone());

        let resp = self
            .http
            .get(self.url("/conrec"))
            .query(&filter.query_pairs())
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            log::debug!("conrec: no sales for {filter:?}");
            return Ok(Vec::new());
        }
        let sales: Vec<Sale> = ok(resp).await?.json().await?;
        log::debug!("conrec: {} sale(s)", sales.len());
        Ok(sales)
    }

    pub async fn search_customers(&self, name: &str) -> Result<Vec<Customer>, ClientError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::InvalidArgument("customer name must not be blank"));
        }
        let limit = CUSTOMER_SEARCH_LIMIT.to_string();
        let resp = self
            .http
            .get(self.url("/cadcli/"))
            .query(&[("nome", name), ("limit", limit.as_str())])
            .send()
            .await?;
        Ok(ok(resp).await?.json().await?)
    }

    /// Ask the backend to generate the promissory note for `sale`.
    pub async fn generate_promissory(&self, sale: &Sale) -> Result<DocumentSource, ClientError> {
        let resp = self
            .http
            .post(self.url("/docs/nota-promissoria"))
            .query(&[("base64_output", "true")])
            .json(&sale.promissory_request())
            .send()
            .await?;
        let body: Base64Body = ok(resp).await?.json().await?;
        let document = DocumentSource::from(body.decode("application/pdf")?);
        log::info!(
            "generated promissory note for document {} ({} bytes)",
            sale.document,
            document.bytes.len()
        );
        Ok(document)
    }

    /// PNG bytes of a previously uploaded signature.
    pub async fn fetch_signed(&self, filename: &str) -> Result<Vec<u8>, ClientError> {
        let resp = self
            .http
            .get(self.url("/docs/nota-promissoria/assinada"))
            .query(&[("nome_arquivo", filename)])
            .send()
            .await?;
        let body: Base64Body = ok(resp).await?.json().await?;
        Ok(body.decode("image/png")?.bytes)
    }
}

/// Pass 2xx responses through; anything else becomes `ClientError::Status`.
async fn ok(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let path = resp.url().path().to_string();
    let body = resp.text().await.unwrap_or_default();
    log::warn!("{path} -> HTTP {}", status.as_u16());
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}

impl UploadSink for BackendClient {
    async fn upload(&self, image: &[u8], filename: &str, record_id: &str) -> Result<(), UploadError> {
        if image.is_empty() {
            return Err(UploadError::NothingToUpload);
        }
        let part = Part::bytes(image.to_vec())
            .file_name(filename.to_string())
            .mime_str("image/png")
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        let form = Form::new()
            .part("arquivo", part)
            .text("vendaId", record_id.to_string());

        let resp = self
            .http
            .post(self.url("/docs/nota-promissoria/salvar-png"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            log::warn!("upload of {filename} rejected: HTTP {}", status.as_u16());
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        log::info!("uploaded {filename} ({} bytes) for sale {record_id}", image.len());
        Ok(())
    }
}

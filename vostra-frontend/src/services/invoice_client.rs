//! HTTP client for the invoice backend's `/api` endpoints.
//!
//! Each call is a single attempt. Failures are normalized into [`ApiError`]
//! so handlers can show `message()` directly.

use async_trait::async_trait;
use reqwest::{multipart, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Instant;
use vostra_core::api::{ApprovalRequest, HealthStatus, ListInvoicesParams, UploadFile};
use vostra_core::models::{Invoice, InvoiceList};
use vostra_core::observability::trace_headers;
use vostra_core::{ApiError, InvoiceApi};

use crate::config::InvoiceApiSettings;
use crate::middleware::current_request_id;
use crate::services::metrics::record_api_call;

#[derive(Debug, Clone)]
pub struct InvoiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl InvoiceClient {
    pub fn new(settings: &InvoiceApiSettings) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, &settings.base_url))
    }

    /// Uses a caller-supplied client, e.g. one pointed at a test server.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Sends one request with trace headers and maps non-2xx responses.
    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, ApiError> {
        let start = Instant::now();
        let headers = trace_headers(current_request_id().as_deref());

        let result = match request.headers(headers).send().await {
            Ok(response) if response.status().is_success() => Ok(response),
            Ok(response) => {
                let status = response.status().as_u16();
                // An unreadable error body still leaves the status table.
                let body = response.text().await.unwrap_or_default();
                Err(ApiError::from_response(status, &body))
            }
            Err(err) => Err(ApiError::from(err)),
        };

        let outcome = match &result {
            Ok(_) => "ok",
            Err(err) => err.kind(),
        };
        record_api_call(operation, outcome, start.elapsed());

        if let Err(err) = &result {
            tracing::warn!(
                operation,
                status = err.status(),
                kind = err.kind(),
                message = %err,
                "Invoice API call failed"
            );
        }
        result
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            tracing::error!(status, error = %e, "Invoice API returned an unexpected body");
            ApiError::unexpected_body(status)
        })
    }
}

#[async_trait]
impl InvoiceApi for InvoiceClient {
    async fn upload(&self, file: UploadFile) -> Result<Invoice, ApiError> {
        let size = file.size();
        let part = multipart::Part::bytes(file.data)
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|_| ApiError::validation("Ogiltig filtyp."))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .send(
                "upload",
                self.client.post(self.url("/invoices/upload")).multipart(form),
            )
            .await?;
        let invoice: Invoice = Self::read_json(response).await?;

        tracing::info!(
            invoice_id = invoice.id,
            file_name = %file.file_name,
            size,
            status = %invoice.status,
            "Invoice uploaded"
        );
        Ok(invoice)
    }

    async fn get_invoice(&self, id: i64) -> Result<Invoice, ApiError> {
        let response = self
            .send(
                "get_invoice",
                self.client.get(self.url(&format!("/invoices/{id}"))),
            )
            .await?;
        Self::read_json(response).await
    }

    async fn list_invoices(&self, params: &ListInvoicesParams) -> Result<InvoiceList, ApiError> {
        let response = self
            .send(
                "list_invoices",
                self.client
                    .get(self.url("/invoices"))
                    .query(&params.query_pairs()),
            )
            .await?;
        Self::read_json(response).await
    }

    async fn approve_invoice(
        &self,
        id: i64,
        request: &ApprovalRequest,
    ) -> Result<Invoice, ApiError> {
        let response = self
            .send(
                "approve_invoice",
                self.client
                    .post(self.url(&format!("/invoices/{id}/approve")))
                    .json(request),
            )
            .await?;
        let invoice: Invoice = Self::read_json(response).await?;
        tracing::info!(invoice_id = id, status = %invoice.status, "Invoice approved");
        Ok(invoice)
    }

    async fn delete_invoice(&self, id: i64) -> Result<(), ApiError> {
        self.send(
            "delete_invoice",
            self.client.delete(self.url(&format!("/invoices/{id}"))),
        )
        .await?;
        tracing::info!(invoice_id = id, "Invoice deleted");
        Ok(())
    }

    async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        let response = self
            .send("health_check", self.client.get(self.url("/health")))
            .await?;
        Self::read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = InvoiceClient::with_client(reqwest::Client::new(), "http://backend:8000/");
        assert_eq!(client.base_url(), "http://backend:8000");
        assert_eq!(client.url("/invoices/4"), "http://backend:8000/api/invoices/4");
    }
}

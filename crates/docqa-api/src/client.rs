//! Session backend that talks to a running server over HTTP

use async_trait::async_trait;
use docqa_core::{
    Backend, ErrorBody, ExtractResponse, QueryRequest, QueryResponse, SummarizeRequest,
    SummarizeResponse, UploadedFile,
};
use reqwest::multipart::{Form, Part};
use serde::{de::DeserializeOwned, Serialize};

use crate::routes::extract::FILES_FIELD;

#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, ErrorBody>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        read_response(response).await
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn extract(&self, files: Vec<UploadedFile>) -> Result<ExtractResponse, ErrorBody> {
        let mut form = Form::new();
        for file in files {
            let mut part = Part::bytes(file.bytes).file_name(file.filename);
            if let Some(content_type) = &file.content_type {
                part = part
                    .mime_str(content_type)
                    .map_err(|e| ErrorBody::new(format!("Invalid content type: {}", e)))?;
            }
            form = form.part(FILES_FIELD, part);
        }

        let response = self
            .http
            .post(self.url("/extract"))
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        read_response(response).await
    }

    async fn query(&self, request: QueryRequest) -> Result<QueryResponse, ErrorBody> {
        self.post_json("/query", &request).await
    }

    async fn summarize(&self, request: SummarizeRequest) -> Result<SummarizeResponse, ErrorBody> {
        self.post_json("/summarize", &request).await
    }
}

async fn read_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ErrorBody> {
    let status = response.status();

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        tracing::debug!(status = %status, "Backend returned an error");
        return Err(serde_json::from_str::<ErrorBody>(&text)
            .unwrap_or_else(|_| ErrorBody::new(format!("Request failed with status {}", status))));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ErrorBody::new(format!("Invalid response body: {}", e)))
}

fn transport_error(err: reqwest::Error) -> ErrorBody {
    ErrorBody::new(format!("Request failed: {}", err))
}

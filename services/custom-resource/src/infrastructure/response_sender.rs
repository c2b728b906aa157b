//! CloudFormation応答送信モジュール
//!
//! 処理結果をイベントの`ResponseURL`（S3の署名付きURL）へPUTする。
//! 署名にContent-Typeが含まれないため、Content-Typeは空で送る。

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::domain::CustomResourceResponse;

/// 応答送信のエラー型
#[derive(Debug, Error)]
pub enum ResponseSendError {
    #[error("ResponseURLが不正です: {0}")]
    InvalidUrl(String),
    #[error("応答のシリアライズに失敗しました: {0}")]
    SerializeError(String),
    #[error("応答の送信に失敗しました: {0}")]
    HttpError(String),
    #[error("応答の送信が拒否されました (status: {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// 応答送信トレイト（テスト用の抽象化）
#[async_trait]
pub trait ResponseSender: Send + Sync {
    async fn send(&self, response_url: &str, response: &CustomResourceResponse) -> Result<(), ResponseSendError>;
}

/// ResponseURLを検証する
///
/// http/https以外のスキームは受け付けない。
pub fn parse_response_url(response_url: &str) -> Result<Url, ResponseSendError> {
    let url = Url::parse(response_url).map_err(|e| ResponseSendError::InvalidUrl(format!("{}: {}", response_url, e)))?;
    match url.scheme() {
        "https" | "http" => Ok(url),
        scheme => Err(ResponseSendError::InvalidUrl(format!("unsupported scheme: {}", scheme))),
    }
}

/// reqwestを使用した応答送信実装
pub struct HttpResponseSender {
    client: HttpClient,
}

impl HttpResponseSender {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

impl Default for HttpResponseSender {
    fn default() -> Self {
        Self::new(HttpClient::new())
    }
}

#[async_trait]
impl ResponseSender for HttpResponseSender {
    async fn send(&self, response_url: &str, response: &CustomResourceResponse) -> Result<(), ResponseSendError> {
        let url = parse_response_url(response_url)?;
        let body = serde_json::to_vec(response).map_err(|e| ResponseSendError::SerializeError(e.to_string()))?;

        info!(
            status = ?response.status,
            physical_resource_id = %response.physical_resource_id,
            body_length = body.len(),
            "CloudFormationへ応答を送信"
        );

        let result = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "")
            .body(body)
            .send()
            .await
            .map_err(|e| ResponseSendError::HttpError(e.to_string()))?;

        let status = result.status();
        if status.is_success() {
            info!(status = status.as_u16(), "応答送信成功");
            Ok(())
        } else {
            let body = result.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "応答送信が拒否されました");
            Err(ResponseSendError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

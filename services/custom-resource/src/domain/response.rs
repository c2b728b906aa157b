//! CloudFormationへの応答
//!
//! カスタムリソースの処理結果をCloudFormationの応答形式にまとめる。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::resource_event::ResourceEvent;

/// 失敗理由の最大文字数（応答全体は4KiBまで）
pub const MAX_REASON_LENGTH: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

/// カスタムリソース応答
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    pub status: ResponseStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub data: Map<String, Value>,
}

impl CustomResourceResponse {
    /// 成功応答を作成
    pub fn succeed(event: &ResourceEvent, data: Map<String, Value>, physical_resource_id: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            reason: String::new(),
            physical_resource_id: physical_resource_id.into(),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            data,
        }
    }

    /// 失敗応答を作成
    ///
    /// 物理IDはイベントの物理IDを優先し、無ければログストリーム名を使う。
    pub fn fail(event: &ResourceEvent, reason: impl std::fmt::Display, log_stream: &str) -> Self {
        let mut reason = reason.to_string();
        if !log_stream.is_empty() {
            reason = format!("{} (See the details in CloudWatch Log Stream: {})", reason, log_stream);
        }
        if reason.chars().count() > MAX_REASON_LENGTH {
            reason = reason.chars().take(MAX_REASON_LENGTH).collect();
        }

        let physical_resource_id = event
            .physical_resource_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| log_stream.to_string());

        Self {
            status: ResponseStatus::Failed,
            reason,
            physical_resource_id,
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            data: Map::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

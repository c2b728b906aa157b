//! CloudFormationカスタムリソースイベント
//!
//! CloudFormationがカスタムリソースのLambdaへ送るリクエストの型定義。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::properties::ResourceProperties;
use super::stack_arn::{StackArn, StackArnError};

/// スタックのライフサイクルイベント種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RequestType::Create => "Create",
            RequestType::Update => "Update",
            RequestType::Delete => "Delete",
        };
        f.write_str(s)
    }
}

/// カスタムリソースイベント
///
/// 1回の呼び出しの間は不変。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceEvent {
    pub request_type: RequestType,
    /// 応答送信先の署名付きURL
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    pub resource_type: String,
    pub logical_resource_id: String,
    /// Create時には存在しない
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: Map<String, Value>,
    /// Update時のみ存在する
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_token: Option<String>,
}

impl ResourceEvent {
    /// `StackId`を解析する
    pub fn stack_arn(&self) -> Result<StackArn, StackArnError> {
        StackArn::parse(&self.stack_id)
    }

    /// 現在のリソースプロパティ
    pub fn properties(&self) -> ResourceProperties<'_> {
        ResourceProperties::new(&self.resource_properties)
    }

    /// 更新前のリソースプロパティ（Update以外では`None`）
    pub fn old_properties(&self) -> Option<ResourceProperties<'_>> {
        self.old_resource_properties.as_ref().map(ResourceProperties::new)
    }
}

//! CloudFormation操作モジュール
//!
//! スタックのリソース一覧と、各リソースのメタデータを取得する。
//! ListStackResourcesはメタデータを返さないため、リソースごとに
//! DescribeStackResourceを呼んで`Metadata`を読む。

use async_trait::async_trait;
use aws_sdk_cloudformation::Client as CloudFormationClient;
use aws_sdk_cloudformation::error::DisplayErrorContext;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::StackResource;

/// CloudFormation操作のエラー型
#[derive(Debug, Error)]
pub enum CloudFormationOpsError {
    /// AWS SDK エラー
    #[error("AWS CloudFormation APIエラー: {0}")]
    AwsSdkError(String),
    /// メタデータがJSONとして読めない
    #[error("リソース {resource} のメタデータを解析できません: {message}")]
    InvalidMetadata { resource: String, message: String },
}

/// CloudFormation操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait CloudFormationOps: Send + Sync {
    /// スタックの全リソースをメタデータ付きで取得する
    async fn describe_stack_resources(&self, stack_id: &str) -> Result<Vec<StackResource>, CloudFormationOpsError>;
}

/// 実際のAWS CloudFormation SDKを使用した実装
pub struct AwsCloudFormationOps {
    client: CloudFormationClient,
}

impl AwsCloudFormationOps {
    /// 新しいAwsCloudFormationOpsを作成
    pub fn new(client: CloudFormationClient) -> Self {
        Self { client }
    }

    /// AWS設定からデフォルトのクライアントを作成
    pub async fn from_config() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = CloudFormationClient::new(&config);
        Self::new(client)
    }

    /// 1リソースのメタデータを取得する
    async fn resource_metadata(&self, stack_id: &str, logical_id: &str) -> Result<Value, CloudFormationOpsError> {
        let output = self
            .client
            .describe_stack_resource()
            .stack_name(stack_id)
            .logical_resource_id(logical_id)
            .send()
            .await
            .map_err(|err| {
                warn!(
                    stack_id = %stack_id,
                    logical_id = %logical_id,
                    error = %DisplayErrorContext(&err),
                    "DescribeStackResourceエラー"
                );
                CloudFormationOpsError::AwsSdkError(DisplayErrorContext(&err).to_string())
            })?;

        parse_metadata(
            logical_id,
            output.stack_resource_detail().and_then(|detail| detail.metadata()),
        )
    }
}

/// DescribeStackResourceが返すメタデータ文字列を解析する
fn parse_metadata(logical_id: &str, metadata: Option<&str>) -> Result<Value, CloudFormationOpsError> {
    match metadata {
        None => Ok(Value::Null),
        Some(raw) if raw.trim().is_empty() => Ok(Value::Null),
        Some(raw) => serde_json::from_str(raw).map_err(|e| CloudFormationOpsError::InvalidMetadata {
            resource: logical_id.to_string(),
            message: e.to_string(),
        }),
    }
}

/// リソース概要の論理IDとタイプ
///
/// SDKではどちらも任意項目。論理IDが無い概要は扱えないので`None`を返す。
fn summary_identity<'a>(logical_id: Option<&'a str>, resource_type: Option<&'a str>) -> Option<(&'a str, &'a str)> {
    let logical_id = logical_id.filter(|id| !id.is_empty())?;
    Some((logical_id, resource_type.unwrap_or_default()))
}

#[async_trait]
impl CloudFormationOps for AwsCloudFormationOps {
    async fn describe_stack_resources(&self, stack_id: &str) -> Result<Vec<StackResource>, CloudFormationOpsError> {
        let mut resources = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_stack_resources()
                .stack_name(stack_id)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|err| {
                    warn!(stack_id = %stack_id, error = %DisplayErrorContext(&err), "ListStackResourcesエラー");
                    CloudFormationOpsError::AwsSdkError(DisplayErrorContext(&err).to_string())
                })?;

            for summary in output.stack_resource_summaries() {
                let Some((logical_id, resource_type)) =
                    summary_identity(summary.logical_resource_id(), summary.resource_type())
                else {
                    warn!(stack_id = %stack_id, "論理IDの無いリソースをスキップ");
                    continue;
                };
                let metadata = self.resource_metadata(stack_id, logical_id).await?;

                debug!(
                    logical_id = %logical_id,
                    resource_type = %resource_type,
                    has_metadata = !metadata.is_null(),
                    "スタックリソースを取得"
                );

                resources.push(StackResource {
                    logical_id: logical_id.to_string(),
                    resource_type: resource_type.to_string(),
                    physical_id: summary.physical_resource_id().map(str::to_string),
                    metadata,
                });
            }

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        info!(stack_id = %stack_id, resource_count = resources.len(), "スタックリソース一覧を取得");
        Ok(resources)
    }
}

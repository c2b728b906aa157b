//! カスタムリソースハンドラーの共通インターフェース

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{PolicyBuildError, PropertyError, ResourceEvent, RoleIdentityError, StackArnError};
use crate::infrastructure::{CloudFormationOpsError, IamOpsError, LambdaOpsError, S3OpsError};

/// ハンドラー処理のエラー型
///
/// どのエラーもCloudFormationには失敗応答の理由として返る。
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Property(#[from] PropertyError),
    #[error(transparent)]
    StackArn(#[from] StackArnError),
    #[error(transparent)]
    RoleIdentity(#[from] RoleIdentityError),
    #[error(transparent)]
    PolicyBuild(#[from] PolicyBuildError),
    #[error(transparent)]
    Iam(#[from] IamOpsError),
    #[error(transparent)]
    S3(#[from] S3OpsError),
    #[error(transparent)]
    CloudFormation(#[from] CloudFormationOpsError),
    #[error(transparent)]
    Lambda(#[from] LambdaOpsError),
    #[error("ロールが存在しません: {0}")]
    RoleNotFound(String),
    #[error("イベントに物理IDがありません（{0}）")]
    MissingPhysicalResourceId(String),
    #[error("ハンドラーの応答が不正です: {0}")]
    InvalidHandlerResponse(String),
    #[error("ポリシーのシリアライズに失敗しました: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// ハンドラーの処理結果
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutcome {
    pub physical_resource_id: String,
    pub data: Map<String, Value>,
}

impl HandlerOutcome {
    /// データなしの結果を作成
    pub fn new(physical_resource_id: impl Into<String>) -> Self {
        Self {
            physical_resource_id: physical_resource_id.into(),
            data: Map::new(),
        }
    }

    /// 応答データを追加
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// カスタムリソースハンドラートレイト
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// 1つのライフサイクルイベントを処理する
    async fn handle(&self, event: &ResourceEvent) -> Result<HandlerOutcome, HandlerError>;
}

/// Update/Deleteイベントの物理IDを取得する
pub(crate) fn require_physical_id(event: &ResourceEvent) -> Result<&str, HandlerError> {
    event
        .physical_resource_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| HandlerError::MissingPhysicalResourceId(event.request_type.to_string()))
}

//! IAM操作モジュール
//!
//! Lambda実行ロールの作成・参照・削除と、インラインポリシーの設定を提供する。

use async_trait::async_trait;
use aws_sdk_iam::Client as IamClient;
use aws_sdk_iam::error::DisplayErrorContext;
use thiserror::Error;
use tracing::{info, warn};

/// IAM操作のエラー型
#[derive(Debug, Error)]
pub enum IamOpsError {
    /// AWS SDK エラー
    #[error("AWS IAM APIエラー: {0}")]
    AwsSdkError(String),
    /// 対象のロールまたはポリシーが存在しない
    #[error("IAMエンティティが存在しません: {0}")]
    NotFound(String),
    /// APIの応答にロールが含まれていない
    #[error("IAM APIの応答にロールがありません: {0}")]
    MissingRole(String),
}

/// IAM操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait IamOps: Send + Sync {
    /// ロールを作成してARNを返す
    async fn create_role(&self, role_name: &str, path: &str, assume_role_policy: &str) -> Result<String, IamOpsError>;

    /// ロールのARNを取得する（存在しない場合は`None`）
    async fn get_role_arn(&self, role_name: &str) -> Result<Option<String>, IamOpsError>;

    /// インラインポリシーを設定する（同名のポリシーは置き換えられる）
    async fn put_role_policy(&self, role_name: &str, policy_name: &str, policy_document: &str)
    -> Result<(), IamOpsError>;

    /// インラインポリシーを削除する
    async fn delete_role_policy(&self, role_name: &str, policy_name: &str) -> Result<(), IamOpsError>;

    /// ロールを削除する
    async fn delete_role(&self, role_name: &str) -> Result<(), IamOpsError>;
}

/// 実際のAWS IAM SDKを使用したIAM操作実装
pub struct AwsIamOps {
    client: IamClient,
}

impl AwsIamOps {
    /// 新しいAwsIamOpsを作成
    pub fn new(client: IamClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IamOps for AwsIamOps {
    async fn create_role(&self, role_name: &str, path: &str, assume_role_policy: &str) -> Result<String, IamOpsError> {
        let output = self
            .client
            .create_role()
            .role_name(role_name)
            .path(path)
            .assume_role_policy_document(assume_role_policy)
            .send()
            .await
            .map_err(|err| {
                warn!(role_name = %role_name, error = %DisplayErrorContext(&err), "CreateRoleエラー");
                IamOpsError::AwsSdkError(DisplayErrorContext(&err).to_string())
            })?;

        let arn = output
            .role()
            .map(|role| role.arn().to_string())
            .ok_or_else(|| IamOpsError::MissingRole(role_name.to_string()))?;

        info!(role_name = %role_name, path = %path, role_arn = %arn, "CreateRole成功");
        Ok(arn)
    }

    async fn get_role_arn(&self, role_name: &str) -> Result<Option<String>, IamOpsError> {
        match self.client.get_role().role_name(role_name).send().await {
            Ok(output) => Ok(output.role().map(|role| role.arn().to_string())),
            Err(err) => {
                let message = DisplayErrorContext(&err).to_string();
                if err.into_service_error().is_no_such_entity_exception() {
                    info!(role_name = %role_name, "GetRole: ロールが存在しません");
                    Ok(None)
                } else {
                    warn!(role_name = %role_name, error = %message, "GetRoleエラー");
                    Err(IamOpsError::AwsSdkError(message))
                }
            }
        }
    }

    async fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy_document: &str,
    ) -> Result<(), IamOpsError> {
        self.client
            .put_role_policy()
            .role_name(role_name)
            .policy_name(policy_name)
            .policy_document(policy_document)
            .send()
            .await
            .map_err(|err| {
                warn!(
                    role_name = %role_name,
                    policy_name = %policy_name,
                    error = %DisplayErrorContext(&err),
                    "PutRolePolicyエラー"
                );
                IamOpsError::AwsSdkError(DisplayErrorContext(&err).to_string())
            })?;

        info!(
            role_name = %role_name,
            policy_name = %policy_name,
            policy_length = policy_document.len(),
            "PutRolePolicy成功"
        );
        Ok(())
    }

    async fn delete_role_policy(&self, role_name: &str, policy_name: &str) -> Result<(), IamOpsError> {
        match self
            .client
            .delete_role_policy()
            .role_name(role_name)
            .policy_name(policy_name)
            .send()
            .await
        {
            Ok(_) => {
                info!(role_name = %role_name, policy_name = %policy_name, "DeleteRolePolicy成功");
                Ok(())
            }
            Err(err) => {
                let message = DisplayErrorContext(&err).to_string();
                if err.into_service_error().is_no_such_entity_exception() {
                    Err(IamOpsError::NotFound(format!("{}/{}", role_name, policy_name)))
                } else {
                    warn!(role_name = %role_name, policy_name = %policy_name, error = %message, "DeleteRolePolicyエラー");
                    Err(IamOpsError::AwsSdkError(message))
                }
            }
        }
    }

    async fn delete_role(&self, role_name: &str) -> Result<(), IamOpsError> {
        match self.client.delete_role().role_name(role_name).send().await {
            Ok(_) => {
                info!(role_name = %role_name, "DeleteRole成功");
                Ok(())
            }
            Err(err) => {
                let message = DisplayErrorContext(&err).to_string();
                if err.into_service_error().is_no_such_entity_exception() {
                    Err(IamOpsError::NotFound(role_name.to_string()))
                } else {
                    warn!(role_name = %role_name, error = %message, "DeleteRoleエラー");
                    Err(IamOpsError::AwsSdkError(message))
                }
            }
        }
    }
}

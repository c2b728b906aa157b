//! Lambda実行ロールの作成・更新・削除
//!
//! スタックのFunctionAccessメタデータから導出したインラインポリシーを、
//! 関数ごとの実行ロールに同期する。更新時はステートメント全体を導出し直して
//! ポリシーを丸ごと置き換える（差分更新はしない）。

use std::sync::Arc;

use tracing::{error, info, warn};

use super::resource_handler::HandlerError;
use crate::domain::{
    FUNCTION_ACCESS_POLICY_NAME, PolicyDocument, RoleIdentity, StackArn, build_function_policy, lambda_trust_policy,
};
use crate::infrastructure::{CloudFormationOps, IamOps, IamOpsError};

/// 作成したロール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRole {
    pub identity: RoleIdentity,
    pub arn: String,
}

/// ロール同期処理
pub struct RoleReconciler {
    iam: Arc<dyn IamOps>,
    cloudformation: Arc<dyn CloudFormationOps>,
}

impl RoleReconciler {
    pub fn new(iam: Arc<dyn IamOps>, cloudformation: Arc<dyn CloudFormationOps>) -> Self {
        Self { iam, cloudformation }
    }

    /// スタックの現在のリソースから関数のポリシーを導出する
    pub async fn derive_policy(&self, stack: &StackArn, function_name: &str) -> Result<PolicyDocument, HandlerError> {
        let resources = self.cloudformation.describe_stack_resources(stack.as_str()).await?;
        let document = build_function_policy(stack, &resources, function_name)?;

        info!(
            stack_name = %stack.stack_name(),
            function_name = %function_name,
            statement_count = document.statement.len(),
            "FunctionAccessポリシーを導出"
        );
        Ok(document)
    }

    /// ロールを作成し、ポリシーを設定する
    pub async fn create_role(&self, stack: &StackArn, function_name: &str) -> Result<CreatedRole, HandlerError> {
        let identity = RoleIdentity::for_function(stack, function_name)?;
        // ロール作成前に導出してメタデータの誤りでロールが残らないようにする
        let policy = self.derive_policy(stack, function_name).await?.to_json()?;

        let arn = self
            .iam
            .create_role(&identity.name, &identity.path, &lambda_trust_policy().to_string())
            .await?;

        // 失敗したCreateの物理IDはロール名にならず、Deleteでは消せないためここで片付ける
        if let Err(err) = self
            .iam
            .put_role_policy(&identity.name, FUNCTION_ACCESS_POLICY_NAME, &policy)
            .await
        {
            warn!(role_name = %identity.name, error = %err, "ポリシー設定に失敗したためロールを削除");
            if let Err(cleanup_err) = self.iam.delete_role(&identity.name).await {
                error!(role_name = %identity.name, error = %cleanup_err, "作成途中のロールの削除に失敗");
            }
            return Err(err.into());
        }

        info!(role_name = %identity.name, role_arn = %arn, "実行ロールを作成");
        Ok(CreatedRole { identity, arn })
    }

    /// ロールのARNを取得する（存在しない場合は`None`）
    pub async fn role_arn(&self, role_name: &str) -> Result<Option<String>, HandlerError> {
        Ok(self.iam.get_role_arn(role_name).await?)
    }

    /// 既存ロールのポリシーを現在のメタデータに合わせて置き換える
    ///
    /// ロールのARNは変わらない。
    pub async fn update_role(&self, stack: &StackArn, role_name: &str, function_name: &str) -> Result<String, HandlerError> {
        let arn = self
            .iam
            .get_role_arn(role_name)
            .await?
            .ok_or_else(|| HandlerError::RoleNotFound(role_name.to_string()))?;

        let document = self.derive_policy(stack, function_name).await?;
        self.iam
            .put_role_policy(role_name, FUNCTION_ACCESS_POLICY_NAME, &document.to_json()?)
            .await?;

        info!(role_name = %role_name, role_arn = %arn, "実行ロールのポリシーを更新");
        Ok(arn)
    }

    /// ポリシーとロールを削除する
    ///
    /// すでに存在しないロールやポリシーは削除済みとして扱う。
    pub async fn delete_role(&self, role_name: &str) -> Result<(), HandlerError> {
        match self.iam.delete_role_policy(role_name, FUNCTION_ACCESS_POLICY_NAME).await {
            Ok(()) => {}
            Err(IamOpsError::NotFound(_)) => {
                warn!(role_name = %role_name, "ポリシーは削除済み");
            }
            Err(err) => return Err(err.into()),
        }

        match self.iam.delete_role(role_name).await {
            Ok(()) => {}
            Err(IamOpsError::NotFound(_)) => {
                warn!(role_name = %role_name, "ロールは削除済み");
            }
            Err(err) => return Err(err.into()),
        }

        info!(role_name = %role_name, "実行ロールを削除");
        Ok(())
    }
}

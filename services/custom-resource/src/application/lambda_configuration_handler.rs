//! `Custom::LambdaConfiguration` ハンドラー
//!
//! 関数ごとのLambda実行ロールを管理する。物理IDはロール名。
//!
//! # プロパティ
//! - FunctionName: テンプレート上の関数の論理名（必須）
//!
//! # 応答データ
//! - Role: ロールARN
//! - RoleName: ロール名

use async_trait::async_trait;
use tracing::info;

use super::resource_handler::{HandlerError, HandlerOutcome, ResourceHandler, require_physical_id};
use super::role_reconciler::{CreatedRole, RoleReconciler};
use crate::domain::{RequestType, ResourceEvent, RoleIdentity, StackArn, is_valid_role_name};

/// リソースタイプ名
pub const LAMBDA_CONFIGURATION_RESOURCE_TYPE: &str = "Custom::LambdaConfiguration";

pub struct LambdaConfigurationHandler {
    reconciler: RoleReconciler,
}

impl LambdaConfigurationHandler {
    pub fn new(reconciler: RoleReconciler) -> Self {
        Self { reconciler }
    }

    async fn update_outcome(
        &self,
        stack: &StackArn,
        role_name: &str,
        function_name: &str,
    ) -> Result<HandlerOutcome, HandlerError> {
        let arn = self.reconciler.update_role(stack, role_name, function_name).await?;
        Ok(HandlerOutcome::new(role_name)
            .with_data("Role", arn)
            .with_data("RoleName", role_name))
    }
}

#[async_trait]
impl ResourceHandler for LambdaConfigurationHandler {
    async fn handle(&self, event: &ResourceEvent) -> Result<HandlerOutcome, HandlerError> {
        match event.request_type {
            RequestType::Create => {
                let function_name = event.properties().required_str("FunctionName")?;
                let created = self.reconciler.create_role(&event.stack_arn()?, function_name).await?;
                Ok(created_outcome(created))
            }
            RequestType::Update => {
                let function_name = event.properties().required_str("FunctionName")?;
                let role_name = require_physical_id(event)?;
                let stack = event.stack_arn()?;
                let old_function_name = event
                    .old_properties()
                    .map(|old| old.optional_str("FunctionName"))
                    .transpose()?
                    .flatten();

                // 関数名が変わった場合は置き換え（古いロールはCloudFormationのDeleteで消える）
                if old_function_name.is_some_and(|old| old != function_name) {
                    info!(
                        old_function_name = ?old_function_name,
                        function_name = %function_name,
                        "関数名が変更されたためロールを置き換え"
                    );
                    // ロールバックで元の関数名に戻る場合、そのロールはまだ残っている
                    let identity = RoleIdentity::for_function(&stack, function_name)?;
                    if self.reconciler.role_arn(&identity.name).await?.is_some() {
                        info!(role_name = %identity.name, "置き換え先のロールが既に存在するため再利用");
                        return self.update_outcome(&stack, &identity.name, function_name).await;
                    }
                    let created = self.reconciler.create_role(&stack, function_name).await?;
                    return Ok(created_outcome(created));
                }

                self.update_outcome(&stack, role_name, function_name).await
            }
            RequestType::Delete => {
                let role_name = require_physical_id(event)?;
                // Create失敗時の物理ID（ログストリーム名）はロール名ではない
                if !is_valid_role_name(role_name) {
                    info!(physical_resource_id = %role_name, "ロール名ではない物理IDのため削除をスキップ");
                    return Ok(HandlerOutcome::new(role_name));
                }
                self.reconciler.delete_role(role_name).await?;
                Ok(HandlerOutcome::new(role_name))
            }
        }
    }
}

fn created_outcome(created: CreatedRole) -> HandlerOutcome {
    HandlerOutcome::new(created.identity.name.clone())
        .with_data("Role", created.arn)
        .with_data("RoleName", created.identity.name)
}

//! CloudFormationスタックARNの解析
//!
//! `arn:aws:cloudformation:REGION:ACCOUNT:stack/STACK_NAME/UUID` 形式のARNから
//! リージョン・アカウントID・スタック名を取り出す。

use thiserror::Error;

/// スタックARN解析のエラー型
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StackArnError {
    #[error("スタックARNの形式が不正です: {0}")]
    Malformed(String),
}

/// 解析済みのスタックARN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackArn {
    arn: String,
    region: String,
    account_id: String,
    stack_name: String,
    stack_uuid: String,
}

impl StackArn {
    /// スタックARN文字列を解析する
    pub fn parse(arn: &str) -> Result<Self, StackArnError> {
        let malformed = || StackArnError::Malformed(arn.to_string());

        let parts: Vec<&str> = arn.splitn(6, ':').collect();
        if parts.len() != 6 || parts[0] != "arn" || parts[2] != "cloudformation" {
            return Err(malformed());
        }

        let region = parts[3];
        let account_id = parts[4];
        if region.is_empty() || account_id.is_empty() {
            return Err(malformed());
        }

        // stack/STACK_NAME/UUID
        let mut resource = parts[5].split('/');
        let (Some("stack"), Some(stack_name), Some(stack_uuid), None) =
            (resource.next(), resource.next(), resource.next(), resource.next())
        else {
            return Err(malformed());
        };
        if stack_name.is_empty() || stack_uuid.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            arn: arn.to_string(),
            region: region.to_string(),
            account_id: account_id.to_string(),
            stack_name: stack_name.to_string(),
            stack_uuid: stack_uuid.to_string(),
        })
    }

    /// 元のARN文字列
    pub fn as_str(&self) -> &str {
        &self.arn
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    pub fn stack_uuid(&self) -> &str {
        &self.stack_uuid
    }

    /// スタック名からリソースグループ情報を導出する
    ///
    /// スタック名が `{Project}-{Deployment}-{ResourceGroup}` の規約に
    /// 従っていない場合は`None`を返す。
    pub fn resource_group_info(&self) -> Option<ResourceGroupInfo> {
        let parts: Vec<&str> = self.stack_name.split('-').collect();
        match parts.as_slice() {
            [project, deployment, resource_group]
                if !project.is_empty() && !deployment.is_empty() && !resource_group.is_empty() =>
            {
                Some(ResourceGroupInfo {
                    project_name: project.to_string(),
                    deployment_name: deployment.to_string(),
                    resource_group_name: resource_group.to_string(),
                })
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for StackArn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.arn)
    }
}

/// リソースグループスタックの所属情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceGroupInfo {
    pub project_name: String,
    pub deployment_name: String,
    pub resource_group_name: String,
}

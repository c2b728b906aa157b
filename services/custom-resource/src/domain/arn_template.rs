//! リソースタイプ別のARNテンプレート
//!
//! CloudFormationのリソースタイプと物理IDから、IAMポリシーで使うARNを組み立てる。

use thiserror::Error;

use super::stack_arn::StackArn;

/// ARN解決のエラー型
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArnTemplateError {
    #[error("ARNを解決できないリソースタイプです: {0}")]
    UnsupportedResourceType(String),
}

/// 対応するリソースタイプとARNパターン
const RESOURCE_ARN_PATTERNS: &[(&str, &str)] = &[
    ("AWS::DynamoDB::Table", "arn:aws:dynamodb:{region}:{account_id}:table/{resource_name}"),
    ("AWS::Lambda::Function", "arn:aws:lambda:{region}:{account_id}:function:{resource_name}"),
    ("AWS::SQS::Queue", "arn:aws:sqs:{region}:{account_id}:{resource_name}"),
    ("AWS::SNS::Topic", "arn:aws:sns:{region}:{account_id}:{resource_name}"),
    ("AWS::S3::Bucket", "arn:aws:s3:::{resource_name}"),
];

/// リソースタイプに対応するARNパターンを取得する
pub fn pattern_for(resource_type: &str) -> Option<&'static str> {
    RESOURCE_ARN_PATTERNS
        .iter()
        .find(|(t, _)| *t == resource_type)
        .map(|(_, pattern)| *pattern)
}

/// リソースのARNを解決する
///
/// リージョンとアカウントIDはスタックARNから取る。
/// 物理IDはタイプごとに次のように名前へ変換する:
/// - SQS: 物理IDはキューURLなので末尾のパスをキュー名とする
/// - SNS: 物理IDがすでにトピックARNなのでそのまま使う
pub fn resolve_arn(stack: &StackArn, resource_type: &str, physical_id: &str) -> Result<String, ArnTemplateError> {
    let pattern =
        pattern_for(resource_type).ok_or_else(|| ArnTemplateError::UnsupportedResourceType(resource_type.to_string()))?;

    let resource_name = match resource_type {
        "AWS::SQS::Queue" => physical_id.rsplit('/').next().unwrap_or(physical_id),
        "AWS::SNS::Topic" if physical_id.starts_with("arn:") => return Ok(physical_id.to_string()),
        _ => physical_id,
    };

    Ok(pattern
        .replace("{region}", stack.region())
        .replace("{account_id}", stack.account_id())
        .replace("{resource_name}", resource_name))
}

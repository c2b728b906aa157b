//! FunctionAccessメタデータからのポリシー導出
//!
//! スタック内の各リソースのメタデータを調べ、対象関数に関するアクセス宣言ごとに
//! 1つのステートメントを作る。最後に固定の`WriteLogs`ステートメントを加える。
//!
//! 物理IDがまだ無いリソース（関数自身や並行して作成中のリソース）は飛ばす。
//! Updateではポリシー全体を導出し直すため、次回のUpdateで反映される。

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::arn_template::{ArnTemplateError, resolve_arn};
use super::function_access::{FunctionAccessEntry, FunctionAccessError};
use super::policy::{PolicyDocument, PolicyStatement};
use super::stack_arn::StackArn;

/// ポリシー導出のエラー型
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyBuildError {
    #[error(transparent)]
    FunctionAccess(#[from] FunctionAccessError),
    #[error("リソース {resource} のARNを解決できません: {source}")]
    Arn {
        resource: String,
        #[source]
        source: ArnTemplateError,
    },
}

/// スタック内のリソース
#[derive(Debug, Clone, PartialEq)]
pub struct StackResource {
    pub logical_id: String,
    pub resource_type: String,
    /// 作成前のリソースには無い
    pub physical_id: Option<String>,
    /// リソースの`Metadata`（無ければNull）
    pub metadata: Value,
}

/// 対象関数のインラインポリシーを組み立てる
///
/// # 引数
/// * `stack` - リソースが属するスタック（ARNのリージョン・アカウントに使う）
/// * `resources` - スタックのリソース一覧
/// * `function_name` - ポリシーを作る対象の関数名（テンプレート上の論理名）
pub fn build_function_policy(
    stack: &StackArn,
    resources: &[StackResource],
    function_name: &str,
) -> Result<PolicyDocument, PolicyBuildError> {
    let mut sorted: Vec<&StackResource> = resources.iter().collect();
    sorted.sort_by(|a, b| a.logical_id.cmp(&b.logical_id));

    let mut statements = Vec::new();

    for resource in sorted {
        let entries: Vec<FunctionAccessEntry> =
            FunctionAccessEntry::parse_metadata(&resource.logical_id, &resource.metadata)?
                .into_iter()
                .filter(|entry| entry.function_name == function_name)
                .collect();
        if entries.is_empty() {
            continue;
        }

        let Some(physical_id) = resource.physical_id.as_deref().filter(|id| !id.is_empty()) else {
            debug!(
                logical_id = %resource.logical_id,
                function_name = %function_name,
                "物理IDが無いリソースをスキップ"
            );
            continue;
        };

        let arn = resolve_arn(stack, &resource.resource_type, physical_id).map_err(|source| PolicyBuildError::Arn {
            resource: resource.logical_id.clone(),
            source,
        })?;

        for (index, entry) in entries.into_iter().enumerate() {
            let sid = if index == 0 {
                format!("{}Access", resource.logical_id)
            } else {
                format!("{}Access{}", resource.logical_id, index + 1)
            };
            let target = match &entry.resource_suffix {
                Some(suffix) => format!("{}{}", arn, suffix),
                None => arn.clone(),
            };
            statements.push(PolicyStatement::allow(sid, entry.actions, target));
        }
    }

    statements.push(PolicyStatement::write_logs());

    Ok(PolicyDocument::new(statements))
}

//! FunctionAccessメタデータ
//!
//! テンプレートのリソースに付与される `Metadata.CloudCanvas.FunctionAccess` を読み取り、
//! どのLambda関数がどの操作でそのリソースにアクセスするかを表す。
//!
//! ```json
//! "Metadata": {
//!     "CloudCanvas": {
//!         "FunctionAccess": [
//!             { "FunctionName": "TestFunction", "Action": ["s3:GetObject"], "ResourceSuffix": "/*" }
//!         ]
//!     }
//! }
//! ```
//!
//! `FunctionAccess`は単一オブジェクトでも配列でもよく、`Action`は文字列でも配列でもよい。

use serde_json::Value;
use thiserror::Error;

/// FunctionAccessメタデータのエラー型
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FunctionAccessError {
    #[error("リソース {resource} のメタデータが不正です: {reason}")]
    InvalidMetadata { resource: String, reason: String },
}

impl FunctionAccessError {
    fn invalid(resource: &str, reason: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            resource: resource.to_string(),
            reason: reason.into(),
        }
    }
}

/// 1つのアクセス宣言
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionAccessEntry {
    pub function_name: String,
    pub actions: Vec<String>,
    pub resource_suffix: Option<String>,
}

impl FunctionAccessEntry {
    /// リソースのメタデータ全体からアクセス宣言を取り出す
    ///
    /// `CloudCanvas`や`FunctionAccess`が無い場合は空のリストを返す。
    ///
    /// # 引数
    /// * `resource` - エラーメッセージ用の論理リソースID
    /// * `metadata` - リソースの`Metadata`（オブジェクト）
    pub fn parse_metadata(resource: &str, metadata: &Value) -> Result<Vec<Self>, FunctionAccessError> {
        let Some(metadata) = metadata.as_object() else {
            if metadata.is_null() {
                return Ok(Vec::new());
            }
            return Err(FunctionAccessError::invalid(resource, "Metadata must be an object"));
        };

        let Some(cloud_canvas) = metadata.get("CloudCanvas") else {
            return Ok(Vec::new());
        };
        let Some(cloud_canvas) = cloud_canvas.as_object() else {
            return Err(FunctionAccessError::invalid(resource, "CloudCanvas must be an object"));
        };

        match cloud_canvas.get("FunctionAccess") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items.iter().map(|item| Self::parse_entry(resource, item)).collect(),
            Some(item @ Value::Object(_)) => Ok(vec![Self::parse_entry(resource, item)?]),
            Some(_) => Err(FunctionAccessError::invalid(
                resource,
                "FunctionAccess must be an object or a list of objects",
            )),
        }
    }

    fn parse_entry(resource: &str, item: &Value) -> Result<Self, FunctionAccessError> {
        let Some(item) = item.as_object() else {
            return Err(FunctionAccessError::invalid(resource, "FunctionAccess entry must be an object"));
        };

        let function_name = match item.get("FunctionName") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            Some(_) => {
                return Err(FunctionAccessError::invalid(resource, "FunctionName must be a non-empty string"));
            }
            None => return Err(FunctionAccessError::invalid(resource, "FunctionName is required")),
        };

        let actions = match item.get("Action") {
            Some(Value::String(action)) => vec![action.clone()],
            Some(Value::Array(actions)) => actions
                .iter()
                .map(|action| match action {
                    Value::String(action) => Ok(action.clone()),
                    _ => Err(FunctionAccessError::invalid(resource, "Action entries must be strings")),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(FunctionAccessError::invalid(
                    resource,
                    "Action must be a string or a list of strings",
                ));
            }
            None => return Err(FunctionAccessError::invalid(resource, "Action is required")),
        };
        if actions.is_empty() || actions.iter().any(|a| a.is_empty()) {
            return Err(FunctionAccessError::invalid(resource, "Action must not be empty"));
        }

        let resource_suffix = match item.get("ResourceSuffix") {
            None | Some(Value::Null) => None,
            Some(Value::String(suffix)) => Some(suffix.clone()),
            Some(_) => return Err(FunctionAccessError::invalid(resource, "ResourceSuffix must be a string")),
        };

        Ok(Self {
            function_name,
            actions,
            resource_suffix,
        })
    }
}

//! リソースプロパティの読み出し
//!
//! ハンドラーは必要なプロパティを名前で要求し、欠落や型違いは即座にエラーとする。

use serde_json::{Map, Value};
use thiserror::Error;

/// プロパティ読み出しのエラー型
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PropertyError {
    #[error("必須プロパティがありません: {0}")]
    Missing(String),
    #[error("プロパティが文字列ではありません: {0}")]
    NotAString(String),
}

/// イベントの`ResourceProperties`への読み取り専用ビュー
#[derive(Debug, Clone, Copy)]
pub struct ResourceProperties<'a> {
    values: &'a Map<String, Value>,
}

impl<'a> ResourceProperties<'a> {
    pub fn new(values: &'a Map<String, Value>) -> Self {
        Self { values }
    }

    /// 必須の文字列プロパティを取得する
    ///
    /// 空文字列も欠落として扱う。
    pub fn required_str(&self, name: &str) -> Result<&'a str, PropertyError> {
        match self.optional_str(name)? {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(PropertyError::Missing(name.to_string())),
        }
    }

    /// 任意の文字列プロパティを取得する
    pub fn optional_str(&self, name: &str) -> Result<Option<&'a str>, PropertyError> {
        match self.values.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.as_str())),
            Some(_) => Err(PropertyError::NotAString(name.to_string())),
        }
    }
}

//! リソースタイプによるハンドラー振り分け
//!
//! 組み込みハンドラーを優先し、見つからなければプラグインを探す。

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use super::plugin::{PluginError, PluginRegistry};
use super::resource_handler::{HandlerError, HandlerOutcome, ResourceHandler};
use crate::domain::ResourceEvent;

/// 振り分け処理のエラー型
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("リソースタイプ {0} のハンドラーがありません")]
    NoHandler(String),
    #[error(transparent)]
    Plugin(#[from] PluginError),
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

/// リソースタイプごとのハンドラー振り分け
pub struct Dispatcher {
    handlers: HashMap<String, Arc<dyn ResourceHandler>>,
    plugins: Option<PluginRegistry>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            plugins: None,
        }
    }

    /// 組み込みハンドラーを登録する
    pub fn register(mut self, resource_type: impl Into<String>, handler: Arc<dyn ResourceHandler>) -> Self {
        self.handlers.insert(resource_type.into(), handler);
        self
    }

    /// プラグイン探索を有効にする
    pub fn with_plugins(mut self, plugins: PluginRegistry) -> Self {
        self.plugins = Some(plugins);
        self
    }

    /// リソースタイプに対応するハンドラーを探す
    fn resolve(&self, resource_type: &str) -> Result<Arc<dyn ResourceHandler>, DispatchError> {
        if let Some(handler) = self.handlers.get(resource_type) {
            return Ok(handler.clone());
        }

        if let Some(plugins) = &self.plugins
            && let Some(handler) = plugins.get(resource_type)?
        {
            return Ok(handler);
        }

        warn!(resource_type = %resource_type, "ハンドラーが見つかりません");
        Err(DispatchError::NoHandler(resource_type.to_string()))
    }

    /// イベントをハンドラーへ渡す
    pub async fn dispatch(&self, event: &ResourceEvent) -> Result<HandlerOutcome, DispatchError> {
        let handler = self.resolve(&event.resource_type)?;

        info!(
            resource_type = %event.resource_type,
            request_type = %event.request_type,
            logical_resource_id = %event.logical_resource_id,
            "ハンドラーを実行"
        );
        Ok(handler.handle(event).await?)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

//! プラグインハンドラー
//!
//! 組み込みでないリソースタイプは、プラグインディレクトリに置かれたマニフェストから
//! ハンドラーを探す。`Custom::Name` に対して `NameResourceHandler.json` を
//! ディレクトリ直下、または直下のサブディレクトリ（リソースグループ）から探す。
//!
//! ```json
//! { "FunctionName": "arn:aws:lambda:us-east-1:123456789012:function:MyGame-Dev-DontDie-Handler" }
//! ```
//!
//! 読み込んだハンドラーは実行環境が生きている間キャッシュする。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use super::resource_handler::{HandlerError, HandlerOutcome, ResourceHandler};
use crate::domain::ResourceEvent;
use crate::infrastructure::LambdaOps;

/// カスタムリソースタイプの接頭辞
const CUSTOM_TYPE_PREFIX: &str = "Custom::";

/// マニフェストファイル名の接尾辞
const MANIFEST_SUFFIX: &str = "ResourceHandler.json";

/// プラグイン読み込みのエラー型
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("プラグインディレクトリを読めません ({path}): {message}")]
    Io { path: String, message: String },
    #[error("プラグインマニフェストが不正です ({path}): {message}")]
    InvalidManifest { path: String, message: String },
}

/// プラグインマニフェスト
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PluginManifest {
    /// 呼び出すLambda関数名またはARN
    pub function_name: String,
}

/// プラグイン読み込みトレイト
pub trait PluginLoader: Send + Sync {
    /// リソースタイプのハンドラーを読み込む（見つからなければ`None`）
    fn load(&self, resource_type: &str) -> Result<Option<Arc<dyn ResourceHandler>>, PluginError>;
}

/// `Custom::Name` からマニフェストファイル名を作る
pub fn manifest_file_name(resource_type: &str) -> Option<String> {
    let name = resource_type.strip_prefix(CUSTOM_TYPE_PREFIX)?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some(format!("{}{}", name, MANIFEST_SUFFIX))
}

/// ディレクトリからマニフェストを探すローダー
pub struct DirectoryPluginLoader {
    directory: PathBuf,
    lambda: Arc<dyn LambdaOps>,
}

impl DirectoryPluginLoader {
    pub fn new(directory: impl Into<PathBuf>, lambda: Arc<dyn LambdaOps>) -> Self {
        Self {
            directory: directory.into(),
            lambda,
        }
    }

    /// マニフェストのパスを探す
    ///
    /// 直下を優先し、次にサブディレクトリを名前順に調べる。
    fn find_manifest(&self, file_name: &str) -> Result<Option<PathBuf>, PluginError> {
        if !self.directory.is_dir() {
            debug!(directory = %self.directory.display(), "プラグインディレクトリがありません");
            return Ok(None);
        }

        let direct = self.directory.join(file_name);
        if direct.is_file() {
            return Ok(Some(direct));
        }

        let entries = std::fs::read_dir(&self.directory).map_err(|e| io_error(&self.directory, e))?;
        let mut subdirectories = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| io_error(&self.directory, e))?.path();
            if path.is_dir() {
                subdirectories.push(path);
            }
        }
        subdirectories.sort();

        Ok(subdirectories
            .into_iter()
            .map(|dir| dir.join(file_name))
            .find(|candidate| candidate.is_file()))
    }
}

fn io_error(path: &Path, error: std::io::Error) -> PluginError {
    PluginError::Io {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

impl PluginLoader for DirectoryPluginLoader {
    fn load(&self, resource_type: &str) -> Result<Option<Arc<dyn ResourceHandler>>, PluginError> {
        let Some(file_name) = manifest_file_name(resource_type) else {
            return Ok(None);
        };
        let Some(path) = self.find_manifest(&file_name)? else {
            return Ok(None);
        };

        let raw = std::fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
        let manifest: PluginManifest = serde_json::from_str(&raw).map_err(|e| PluginError::InvalidManifest {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if manifest.function_name.is_empty() {
            return Err(PluginError::InvalidManifest {
                path: path.display().to_string(),
                message: "FunctionName must not be empty".to_string(),
            });
        }

        info!(
            resource_type = %resource_type,
            manifest = %path.display(),
            function_name = %manifest.function_name,
            "プラグインハンドラーを読み込み"
        );
        Ok(Some(Arc::new(LambdaPluginHandler::new(manifest.function_name, self.lambda.clone()))))
    }
}

/// イベントを別のLambda関数へ転送するハンドラー
///
/// 関数は `{"PhysicalResourceId": "...", "Data": {...}}` を返す。
pub struct LambdaPluginHandler {
    function_name: String,
    lambda: Arc<dyn LambdaOps>,
}

impl LambdaPluginHandler {
    pub fn new(function_name: impl Into<String>, lambda: Arc<dyn LambdaOps>) -> Self {
        Self {
            function_name: function_name.into(),
            lambda,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PluginResponse {
    physical_resource_id: Option<String>,
    #[serde(default)]
    data: Map<String, Value>,
}

#[async_trait]
impl ResourceHandler for LambdaPluginHandler {
    async fn handle(&self, event: &ResourceEvent) -> Result<HandlerOutcome, HandlerError> {
        let payload = serde_json::to_value(event)?;
        let response = self.lambda.invoke(&self.function_name, &payload).await?;

        let response: PluginResponse = serde_json::from_value(response)
            .map_err(|e| HandlerError::InvalidHandlerResponse(format!("{}: {}", self.function_name, e)))?;

        // 物理IDを返さないプラグインは既存の物理IDを引き継ぐ
        let physical_resource_id = response
            .physical_resource_id
            .filter(|id| !id.is_empty())
            .or_else(|| event.physical_resource_id.clone())
            .ok_or_else(|| {
                HandlerError::InvalidHandlerResponse(format!("{}: PhysicalResourceId is missing", self.function_name))
            })?;

        Ok(HandlerOutcome {
            physical_resource_id,
            data: response.data,
        })
    }
}

/// 読み込み済みプラグインのキャッシュ
///
/// 実行環境は一度に1つの呼び出しだけを処理するが、ランタイムの要求に合わせて
/// `Mutex`で保護する。見つからなかったタイプはキャッシュしない。
pub struct PluginRegistry {
    loader: Box<dyn PluginLoader>,
    cache: Mutex<HashMap<String, Arc<dyn ResourceHandler>>>,
}

impl PluginRegistry {
    pub fn new(loader: Box<dyn PluginLoader>) -> Self {
        Self {
            loader,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// リソースタイプのハンドラーを取得する（初回のみ読み込む）
    pub fn get(&self, resource_type: &str) -> Result<Option<Arc<dyn ResourceHandler>>, PluginError> {
        if let Some(handler) = self.lock_cache().get(resource_type) {
            debug!(resource_type = %resource_type, "キャッシュ済みプラグインを使用");
            return Ok(Some(handler.clone()));
        }

        let Some(handler) = self.loader.load(resource_type)? else {
            return Ok(None);
        };
        self.lock_cache()
            .insert(resource_type.to_string(), handler.clone());
        Ok(Some(handler))
    }

    /// キャッシュ済みのタイプ数
    pub fn cached_count(&self) -> usize {
        self.lock_cache().len()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<dyn ResourceHandler>>> {
        // 保持中にパニックしてもキャッシュの内容は壊れない
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::domain::RequestType;
    use crate::domain::resource_event::test_support::event;
    use crate::infrastructure::mocks::MockLambdaOps;
    use serde_json::json;

    /// 呼び出し回数を返すテスト用ハンドラー
    struct CountingHandler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ResourceHandler for CountingHandler {
        async fn handle(&self, _event: &ResourceEvent) -> Result<HandlerOutcome, HandlerError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(HandlerOutcome::new("counting").with_data("Call", call))
        }
    }

    /// 読み込み回数を数えるローダー
    struct CountingLoader {
        loads: Arc<AtomicUsize>,
    }

    impl PluginLoader for CountingLoader {
        fn load(&self, resource_type: &str) -> Result<Option<Arc<dyn ResourceHandler>>, PluginError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if resource_type == "Custom::Test" {
                Ok(Some(Arc::new(CountingHandler {
                    calls: AtomicUsize::new(0),
                })))
            } else {
                Ok(None)
            }
        }
    }

    fn write_manifest(dir: &Path, file_name: &str, function_name: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(
            dir.join(file_name),
            json!({ "FunctionName": function_name }).to_string(),
        )
        .unwrap();
    }

    #[test]
    fn test_manifest_file_name() {
        assert_eq!(manifest_file_name("Custom::Test").as_deref(), Some("TestResourceHandler.json"));
        assert_eq!(manifest_file_name("Custom::Player_Access").as_deref(), Some("Player_AccessResourceHandler.json"));
        assert_eq!(manifest_file_name("AWS::S3::Bucket"), None);
        assert_eq!(manifest_file_name("Custom::"), None);
        assert_eq!(manifest_file_name("Custom::../etc"), None);
    }

    #[tokio::test]
    async fn test_registry_loads_plugin_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let registry = PluginRegistry::new(Box::new(CountingLoader { loads: loads.clone() }));
        let event = event(RequestType::Create, "Custom::Test", json!({}));

        let first = registry.get("Custom::Test").unwrap().unwrap();
        let first_outcome = first.handle(&event).await.unwrap();
        let second = registry.get("Custom::Test").unwrap().unwrap();
        let second_outcome = second.handle(&event).await.unwrap();

        // 同じインスタンスが再利用される
        assert_eq!(first_outcome.data["Call"], json!(1));
        assert_eq!(second_outcome.data["Call"], json!(2));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(registry.cached_count(), 1);
    }

    #[test]
    fn test_registry_does_not_cache_misses() {
        let loads = Arc::new(AtomicUsize::new(0));
        let registry = PluginRegistry::new(Box::new(CountingLoader { loads: loads.clone() }));

        assert!(registry.get("Custom::Unknown").unwrap().is_none());
        assert!(registry.get("Custom::Unknown").unwrap().is_none());

        assert_eq!(loads.load(Ordering::SeqCst), 2);
        assert_eq!(registry.cached_count(), 0);
    }

    #[test]
    fn test_directory_loader_finds_manifest_in_root() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "TestResourceHandler.json", "TestPluginFunction");
        let loader = DirectoryPluginLoader::new(dir.path(), Arc::new(MockLambdaOps::returning(Value::Null)));

        assert!(loader.load("Custom::Test").unwrap().is_some());
        assert!(loader.load("Custom::Other").unwrap().is_none());
    }

    #[test]
    fn test_directory_loader_searches_resource_group_directories() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(&dir.path().join("DontDie"), "ScoreboardResourceHandler.json", "ScoreboardFunction");
        std::fs::write(dir.path().join("README.txt"), "not a directory").unwrap();
        let loader = DirectoryPluginLoader::new(dir.path(), Arc::new(MockLambdaOps::returning(Value::Null)));

        let path = loader.find_manifest("ScoreboardResourceHandler.json").unwrap().unwrap();

        assert_eq!(path, dir.path().join("DontDie").join("ScoreboardResourceHandler.json"));
        assert!(loader.load("Custom::Scoreboard").unwrap().is_some());
    }

    #[test]
    fn test_directory_loader_prefers_root_then_sorted_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(&dir.path().join("B"), "TestResourceHandler.json", "FromB");
        write_manifest(&dir.path().join("A"), "TestResourceHandler.json", "FromA");
        let loader = DirectoryPluginLoader::new(dir.path(), Arc::new(MockLambdaOps::returning(Value::Null)));

        assert_eq!(
            loader.find_manifest("TestResourceHandler.json").unwrap().unwrap(),
            dir.path().join("A").join("TestResourceHandler.json")
        );

        write_manifest(dir.path(), "TestResourceHandler.json", "FromRoot");
        assert_eq!(
            loader.find_manifest("TestResourceHandler.json").unwrap().unwrap(),
            dir.path().join("TestResourceHandler.json")
        );
    }

    #[test]
    fn test_directory_loader_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let loader = DirectoryPluginLoader::new(
            dir.path().join("does-not-exist"),
            Arc::new(MockLambdaOps::returning(Value::Null)),
        );

        assert!(loader.load("Custom::Test").unwrap().is_none());
    }

    #[test]
    fn test_directory_loader_invalid_manifest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("TestResourceHandler.json"), "{ not json").unwrap();
        let loader = DirectoryPluginLoader::new(dir.path(), Arc::new(MockLambdaOps::returning(Value::Null)));

        assert!(matches!(loader.load("Custom::Test"), Err(PluginError::InvalidManifest { .. })));

        std::fs::write(dir.path().join("TestResourceHandler.json"), r#"{"FunctionName": ""}"#).unwrap();
        assert!(matches!(loader.load("Custom::Test"), Err(PluginError::InvalidManifest { .. })));
    }

    #[tokio::test]
    async fn test_lambda_plugin_forwards_event() {
        let lambda = Arc::new(MockLambdaOps::returning(json!({
            "PhysicalResourceId": "scoreboard-1",
            "Data": { "TableName": "Scores" }
        })));
        let handler = LambdaPluginHandler::new("ScoreboardFunction", lambda.clone());
        let event = event(RequestType::Create, "Custom::Scoreboard", json!({ "Size": "10" }));

        let outcome = handler.handle(&event).await.unwrap();

        assert_eq!(outcome.physical_resource_id, "scoreboard-1");
        assert_eq!(outcome.data["TableName"], json!("Scores"));

        let invocations = lambda.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].0, "ScoreboardFunction");
        assert_eq!(invocations[0].1["ResourceType"], json!("Custom::Scoreboard"));
        assert_eq!(invocations[0].1["ResourceProperties"]["Size"], json!("10"));
    }

    #[tokio::test]
    async fn test_lambda_plugin_keeps_existing_physical_id() {
        let lambda = Arc::new(MockLambdaOps::returning(json!({})));
        let handler = LambdaPluginHandler::new("F", lambda);
        let mut event = event(RequestType::Delete, "Custom::Scoreboard", json!({}));
        event.physical_resource_id = Some("existing".to_string());

        let outcome = handler.handle(&event).await.unwrap();

        assert_eq!(outcome.physical_resource_id, "existing");
        assert!(outcome.data.is_empty());
    }

    #[tokio::test]
    async fn test_lambda_plugin_without_physical_id_on_create_fails() {
        let lambda = Arc::new(MockLambdaOps::returning(Value::Null));
        let handler = LambdaPluginHandler::new("F", lambda);
        let event = event(RequestType::Create, "Custom::Scoreboard", json!({}));

        let err = handler.handle(&event).await.unwrap_err();

        assert!(matches!(err, HandlerError::InvalidHandlerResponse(_)));
    }

    #[tokio::test]
    async fn test_lambda_plugin_function_error() {
        let lambda = Arc::new(MockLambdaOps::failing("Unhandled"));
        let handler = LambdaPluginHandler::new("F", lambda);
        let event = event(RequestType::Create, "Custom::Scoreboard", json!({}));

        let err = handler.handle(&event).await.unwrap_err();

        assert!(matches!(err, HandlerError::Lambda(_)));
    }
}

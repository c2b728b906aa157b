/// カスタムリソースLambda設定
///
/// 環境変数からプラグインディレクトリとログストリーム名を読み込む。
/// AWS認証情報とリージョンはaws-configのデフォルトチェーンに任せる。
use std::path::{Path, PathBuf};

use thiserror::Error;

/// 設定のエラー型
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("環境変数の値が不正です: {0}")]
    InvalidEnvVar(String),
}

/// プラグインディレクトリのデフォルト名（タスクルート配下）
const DEFAULT_PLUGIN_DIRECTORY: &str = "plugin";

/// カスタムリソースLambda設定
///
/// 以下の環境変数から読み込む:
/// - PLUGIN_DIRECTORY_PATH: プラグインマニフェストの探索ディレクトリ（任意）
/// - LAMBDA_TASK_ROOT: PLUGIN_DIRECTORY_PATH未設定時の基準ディレクトリ（Lambdaが設定）
/// - AWS_LAMBDA_LOG_STREAM_NAME: 失敗応答に含めるログストリーム名（Lambdaが設定）
#[derive(Debug, Clone)]
pub struct CustomResourceConfig {
    /// プラグインディレクトリ
    plugin_directory: PathBuf,
    /// 実行環境のログストリーム名
    log_stream_name: String,
}

impl CustomResourceConfig {
    /// 環境変数から設定を読み込む
    ///
    /// # エラー
    /// PLUGIN_DIRECTORY_PATHが空文字列の場合はエラーを返す
    pub fn from_env() -> Result<Self, ConfigError> {
        let plugin_directory = match std::env::var("PLUGIN_DIRECTORY_PATH") {
            Ok(path) if path.trim().is_empty() => {
                return Err(ConfigError::InvalidEnvVar("PLUGIN_DIRECTORY_PATH".to_string()));
            }
            Ok(path) => PathBuf::from(path),
            Err(_) => match std::env::var("LAMBDA_TASK_ROOT") {
                Ok(root) if !root.is_empty() => Path::new(&root).join(DEFAULT_PLUGIN_DIRECTORY),
                _ => PathBuf::from(DEFAULT_PLUGIN_DIRECTORY),
            },
        };

        let log_stream_name = std::env::var("AWS_LAMBDA_LOG_STREAM_NAME").unwrap_or_default();

        Ok(Self {
            plugin_directory,
            log_stream_name,
        })
    }

    /// 明示的な値で設定を作成（テスト用）
    pub fn new(plugin_directory: impl Into<PathBuf>, log_stream_name: impl Into<String>) -> Self {
        Self {
            plugin_directory: plugin_directory.into(),
            log_stream_name: log_stream_name.into(),
        }
    }

    /// プラグインディレクトリを取得
    pub fn plugin_directory(&self) -> &Path {
        &self.plugin_directory
    }

    /// ログストリーム名を取得（ローカル実行では空）
    pub fn log_stream_name(&self) -> &str {
        &self.log_stream_name
    }
}

//! Lambda操作モジュール
//!
//! プラグインハンドラーの実体であるLambda関数を同期呼び出しする。

use async_trait::async_trait;
use aws_sdk_lambda::Client as LambdaClient;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

/// Lambda操作のエラー型
#[derive(Debug, Error)]
pub enum LambdaOpsError {
    /// AWS SDK エラー
    #[error("AWS Lambda APIエラー: {0}")]
    AwsSdkError(String),
    /// 呼び出した関数の実行エラー
    #[error("Lambda関数 {function_name} の実行エラー ({error_type}): {payload}")]
    FunctionError {
        function_name: String,
        error_type: String,
        payload: String,
    },
    /// ペイロードのシリアライズ/デシリアライズエラー
    #[error("Lambdaペイロードエラー: {0}")]
    PayloadError(String),
}

/// Lambda操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait LambdaOps: Send + Sync {
    /// 関数をRequestResponseで呼び出し、応答ペイロードを返す
    ///
    /// # 引数
    /// * `function_name` - 関数名またはARN
    /// * `payload` - 入力ペイロード
    ///
    /// # 戻り値
    /// * `Ok(Value)` - 関数の戻り値（空の場合はNull）
    /// * `Err(LambdaOpsError)` - API呼び出しまたは関数実行のエラー
    async fn invoke(&self, function_name: &str, payload: &Value) -> Result<Value, LambdaOpsError>;
}

/// 実際のAWS Lambda SDKを使用したLambda操作実装
pub struct AwsLambdaOps {
    client: LambdaClient,
}

impl AwsLambdaOps {
    /// 新しいAwsLambdaOpsを作成
    pub fn new(client: LambdaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LambdaOps for AwsLambdaOps {
    async fn invoke(&self, function_name: &str, payload: &Value) -> Result<Value, LambdaOpsError> {
        let body = serde_json::to_vec(payload).map_err(|e| LambdaOpsError::PayloadError(e.to_string()))?;

        let output = self
            .client
            .invoke()
            .function_name(function_name)
            .payload(Blob::new(body))
            .send()
            .await
            .map_err(|err| {
                warn!(function_name = %function_name, error = %DisplayErrorContext(&err), "Invokeエラー");
                LambdaOpsError::AwsSdkError(DisplayErrorContext(&err).to_string())
            })?;

        let response = output.payload().map(|blob| blob.as_ref()).unwrap_or_default();

        if let Some(error_type) = output.function_error() {
            let payload = String::from_utf8_lossy(response).into_owned();
            warn!(
                function_name = %function_name,
                error_type = %error_type,
                payload = %payload,
                "Lambda関数が実行エラーを返却"
            );
            return Err(LambdaOpsError::FunctionError {
                function_name: function_name.to_string(),
                error_type: error_type.to_string(),
                payload,
            });
        }

        info!(
            function_name = %function_name,
            status_code = output.status_code(),
            response_length = response.len(),
            "Invoke成功"
        );

        if response.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(response).map_err(|e| LambdaOpsError::PayloadError(e.to_string()))
    }
}

/// CloudFormationカスタムリソースLambda関数
///
/// CloudFormationから届いたカスタムリソースイベントを`ResourceType`で振り分け、
/// 結果を`ResponseURL`へ送信する。
///
/// # 組み込みハンドラー
/// - Custom::LambdaConfiguration: Lambda実行ロールとFunctionAccessポリシーの管理
/// - Custom::PopulateMainBucket: メインバケットへの静的データ投入
///
/// それ以外のタイプはプラグインディレクトリのマニフェストから探す。
///
/// # 環境変数
/// - PLUGIN_DIRECTORY_PATH: プラグインディレクトリ（任意、デフォルト: $LAMBDA_TASK_ROOT/plugin）
/// - RUST_LOG: ログレベル（任意、デフォルト: info）
use std::sync::Arc;

use custom_resource::application::{
    CustomResourceService, DirectoryPluginLoader, Dispatcher, LAMBDA_CONFIGURATION_RESOURCE_TYPE,
    LambdaConfigurationHandler, POPULATE_MAIN_BUCKET_RESOURCE_TYPE, PluginRegistry, PopulateBucketHandler,
    RoleReconciler,
};
use custom_resource::domain::ResourceEvent;
use custom_resource::infrastructure::{
    AwsCloudFormationOps, AwsIamOps, AwsLambdaOps, AwsS3Ops, CustomResourceConfig, HttpResponseSender, init_logging,
};
use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    let config = match CustomResourceConfig::from_env() {
        Ok(config) => {
            info!(
                plugin_directory = %config.plugin_directory().display(),
                log_stream_name = config.log_stream_name(),
                "カスタムリソース設定を読み込み"
            );
            config
        }
        Err(err) => {
            error!(error = %err, "カスタムリソース設定読み込み失敗");
            return Err(format!("カスタムリソース設定読み込み失敗: {}", err).into());
        }
    };

    // 実行環境が再利用される間、サービス（プラグインキャッシュを含む）を使い回す
    let service = Arc::new(build_service(&config).await);

    let func = service_fn(move |event: LambdaEvent<Value>| {
        let service = service.clone();
        async move { handler(&service, event).await }
    });
    lambda_runtime::run(func).await?;
    Ok(())
}

/// 依存関係を組み立てる
async fn build_service(config: &CustomResourceConfig) -> CustomResourceService {
    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    let iam = Arc::new(AwsIamOps::new(aws_sdk_iam::Client::new(&sdk_config)));
    let cloudformation = Arc::new(AwsCloudFormationOps::new(aws_sdk_cloudformation::Client::new(&sdk_config)));
    let s3 = Arc::new(AwsS3Ops::new(aws_sdk_s3::Client::new(&sdk_config)));
    let lambda = Arc::new(AwsLambdaOps::new(aws_sdk_lambda::Client::new(&sdk_config)));

    let dispatcher = Dispatcher::new()
        .register(
            LAMBDA_CONFIGURATION_RESOURCE_TYPE,
            Arc::new(LambdaConfigurationHandler::new(RoleReconciler::new(iam, cloudformation))),
        )
        .register(POPULATE_MAIN_BUCKET_RESOURCE_TYPE, Arc::new(PopulateBucketHandler::new(s3)))
        .with_plugins(PluginRegistry::new(Box::new(DirectoryPluginLoader::new(
            config.plugin_directory(),
            lambda,
        ))));

    CustomResourceService::new(
        dispatcher,
        Arc::new(HttpResponseSender::default()),
        config.log_stream_name(),
    )
}

/// Lambda関数のメインハンドラー
///
/// # 戻り値
/// CloudFormationへ送信した応答。ハンドラーの失敗はFAILED応答として返す。
/// イベントを解釈できない場合と応答の送信に失敗した場合のみエラーを返す。
async fn handler(service: &CustomResourceService, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let request_id = event.context.request_id.clone();

    let resource_event: ResourceEvent = match serde_json::from_value(event.payload) {
        Ok(resource_event) => resource_event,
        Err(err) => {
            error!(lambda_request_id = %request_id, error = %err, "カスタムリソースイベントの解析に失敗");
            return Err(format!("カスタムリソースイベントの解析に失敗: {}", err).into());
        }
    };

    let response = match service.handle(&resource_event).await {
        Ok(response) => response,
        Err(err) => {
            error!(
                lambda_request_id = %request_id,
                logical_resource_id = %resource_event.logical_resource_id,
                error = %err,
                "CloudFormationへの応答送信に失敗"
            );
            return Err(err.into());
        }
    };

    Ok(serde_json::to_value(response)?)
}

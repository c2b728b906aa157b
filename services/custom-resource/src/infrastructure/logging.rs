/// ログ基盤モジュール
///
/// カスタムリソースLambda向けの構造化ログ設定。
/// CloudWatch Logsで検索しやすいようJSON形式で出力する。
use std::sync::Once;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログサブスクライバー初期化用の同期プリミティブ
static INIT: Once = Once::new();

/// Lambda環境向けのログサブスクライバーを初期化する
///
/// JSON形式での構造化ログ出力を設定し、環境変数`RUST_LOG`または
/// デフォルトのログレベル（info）でフィルタリングを行う。
///
/// この関数は複数回呼び出しても安全で、最初の呼び出しのみ初期化を実行する。
///
/// # 使用例
/// ```ignore
/// use custom_resource::infrastructure::init_logging;
///
/// init_logging();
/// tracing::info!(resource_type = "Custom::LambdaConfiguration", "event received");
/// ```
pub fn init_logging() {
    INIT.call_once(|| {
        // 環境変数からログレベルを取得、デフォルトはinfo
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        // JSON形式のログレイヤー（Lambda/CloudWatch向け）
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .flatten_event(true)
            .with_current_span(false);

        // サブスクライバーを構築して初期化
        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .init();
    });
}

/// テスト用のログサブスクライバーを初期化する（人間が読みやすい形式）
///
/// # 注意
/// この関数はテスト専用であり、本番環境では`init_logging`を使用すること。
#[cfg(test)]
pub fn init_test_logging() {
    use std::sync::Once;
    static TEST_INIT: Once = Once::new();

    TEST_INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();
    });
}

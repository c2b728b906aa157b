/// FunctionAccessポリシーのプレビュー
///
/// デプロイ済みスタックのメタデータから、関数の実行ロールに設定される
/// ロール名・パス・インラインポリシーを導出して表示する。AWSへの書き込みはしない。
///
/// # ローカル実行
/// ```bash
/// cargo run --bin policy_preview -- \
///   --stack-arn arn:aws:cloudformation:us-east-1:123456789012:stack/MyGame-Dev-DontDie/0f1e2d3c-... \
///   --function-name Main
/// ```
use clap::Parser;
use custom_resource::domain::{FUNCTION_ACCESS_POLICY_NAME, RoleIdentity, StackArn, build_function_policy};
use custom_resource::infrastructure::{AwsCloudFormationOps, CloudFormationOps, init_logging};
use serde_json::json;
use tracing::info;

/// コマンドライン引数
#[derive(Parser, Debug)]
#[command(name = "policy_preview")]
#[command(about = "スタックのFunctionAccessメタデータから関数の実行ロールとポリシーを表示")]
struct CliArgs {
    /// 対象スタックのARN
    #[arg(long, short = 's')]
    stack_arn: String,

    /// テンプレート上の関数の論理名
    #[arg(long, short = 'f')]
    function_name: String,

    /// 構造化ログを出力する（標準出力に混ざる）
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    if args.verbose {
        init_logging();
    }

    let stack = StackArn::parse(&args.stack_arn)?;
    let identity = RoleIdentity::for_function(&stack, &args.function_name)?;

    let cloudformation = AwsCloudFormationOps::from_config().await;
    let resources = cloudformation.describe_stack_resources(stack.as_str()).await?;
    info!(resource_count = resources.len(), "スタックリソースを取得");

    let document = build_function_policy(&stack, &resources, &args.function_name)?;

    let output = json!({
        "RoleName": identity.name,
        "Path": identity.path,
        "PolicyName": FUNCTION_ACCESS_POLICY_NAME,
        "PolicyDocument": document,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

//! IAMポリシードキュメント
//!
//! Lambda実行ロールにアタッチするインラインポリシーと信頼ポリシーの定義。

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// IAMポリシー言語のバージョン
pub const POLICY_VERSION: &str = "2012-10-17";

/// 実行ロールにアタッチするインラインポリシー名
pub const FUNCTION_ACCESS_POLICY_NAME: &str = "FunctionAccess";

/// ログ出力用ステートメントのSid
pub const WRITE_LOGS_SID: &str = "WriteLogs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
}

/// ポリシーステートメント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub sid: String,
    pub effect: Effect,
    pub action: Vec<String>,
    pub resource: String,
}

impl PolicyStatement {
    /// Allowステートメントを作成
    pub fn allow(sid: impl Into<String>, actions: Vec<String>, resource: impl Into<String>) -> Self {
        Self {
            sid: sid.into(),
            effect: Effect::Allow,
            action: actions,
            resource: resource.into(),
        }
    }

    /// CloudWatch Logsへの書き込みを許可する固定ステートメント
    pub fn write_logs() -> Self {
        Self::allow(
            WRITE_LOGS_SID,
            vec![
                "logs:CreateLogGroup".to_string(),
                "logs:CreateLogStream".to_string(),
                "logs:PutLogEvents".to_string(),
            ],
            "arn:aws:logs:*:*:*",
        )
    }
}

/// ポリシードキュメント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn new(statement: Vec<PolicyStatement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement,
        }
    }

    /// IAM APIに渡すJSON文字列
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Sidでステートメントを探す
    pub fn statement(&self, sid: &str) -> Option<&PolicyStatement> {
        self.statement.iter().find(|s| s.sid == sid)
    }
}

/// Lambdaサービスにロールの引き受けを許可する信頼ポリシー
pub fn lambda_trust_policy() -> Value {
    json!({
        "Version": POLICY_VERSION,
        "Statement": [
            {
                "Effect": "Allow",
                "Action": "sts:AssumeRole",
                "Principal": {
                    "Service": "lambda.amazonaws.com"
                }
            }
        ]
    })
}

//! S3操作モジュール
//!
//! 静的データの投入と削除に使うオブジェクト操作を提供する。

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use thiserror::Error;
use tracing::{info, warn};

/// S3操作のエラー型
#[derive(Debug, Error)]
pub enum S3OpsError {
    /// AWS SDK エラー
    #[error("AWS S3 APIエラー ({bucket}/{key}): {message}")]
    AwsSdkError {
        bucket: String,
        key: String,
        message: String,
    },
}

/// S3操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait S3Ops: Send + Sync {
    /// オブジェクトを書き込む
    async fn put_object(&self, bucket: &str, key: &str, body: &str) -> Result<(), S3OpsError>;

    /// オブジェクトを削除する（存在しないキーの削除も成功する）
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), S3OpsError>;
}

/// 実際のAWS S3 SDKを使用したS3操作実装
pub struct AwsS3Ops {
    client: S3Client,
}

impl AwsS3Ops {
    /// 新しいAwsS3Opsを作成
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl S3Ops for AwsS3Ops {
    async fn put_object(&self, bucket: &str, key: &str, body: &str) -> Result<(), S3OpsError> {
        let result = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body.as_bytes().to_vec()))
            .send()
            .await;

        match result {
            Ok(_) => {
                info!(bucket = %bucket, key = %key, size = body.len(), "PutObject成功");
                Ok(())
            }
            Err(err) => {
                let message = DisplayErrorContext(&err).to_string();
                warn!(bucket = %bucket, key = %key, error = %message, "PutObjectエラー");
                Err(S3OpsError::AwsSdkError {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    message,
                })
            }
        }
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), S3OpsError> {
        let result = self.client.delete_object().bucket(bucket).key(key).send().await;

        match result {
            Ok(_) => {
                info!(bucket = %bucket, key = %key, "DeleteObject成功");
                Ok(())
            }
            Err(err) => {
                let message = DisplayErrorContext(&err).to_string();
                warn!(bucket = %bucket, key = %key, error = %message, "DeleteObjectエラー");
                Err(S3OpsError::AwsSdkError {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    message,
                })
            }
        }
    }
}

//! `Custom::PopulateMainBucket` ハンドラー
//!
//! メインバケットに静的データを投入する。Createで全オブジェクトを書き込み、
//! Deleteで全キーを削除する。Updateでは何もしない。
//! 途中でS3呼び出しが失敗した時点で処理を中断する（部分的な回復はしない）。

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::resource_handler::{HandlerError, HandlerOutcome, ResourceHandler};
use crate::domain::{BUCKET_SEED, RequestType, ResourceEvent, populate_bucket_physical_id};
use crate::infrastructure::S3Ops;

/// リソースタイプ名
pub const POPULATE_MAIN_BUCKET_RESOURCE_TYPE: &str = "Custom::PopulateMainBucket";

pub struct PopulateBucketHandler {
    s3: Arc<dyn S3Ops>,
}

impl PopulateBucketHandler {
    pub fn new(s3: Arc<dyn S3Ops>) -> Self {
        Self { s3 }
    }
}

#[async_trait]
impl ResourceHandler for PopulateBucketHandler {
    async fn handle(&self, event: &ResourceEvent) -> Result<HandlerOutcome, HandlerError> {
        let bucket = event.properties().required_str("MainBucket")?;
        let physical_id = populate_bucket_physical_id(&event.stack_arn()?);

        match event.request_type {
            RequestType::Create => {
                for object in BUCKET_SEED {
                    self.s3.put_object(bucket, object.key, object.content).await?;
                }
                info!(bucket = %bucket, object_count = BUCKET_SEED.len(), "静的データを投入");
            }
            RequestType::Delete => {
                for object in BUCKET_SEED {
                    self.s3.delete_object(bucket, object.key).await?;
                }
                info!(bucket = %bucket, object_count = BUCKET_SEED.len(), "静的データを削除");
            }
            RequestType::Update => {
                info!(bucket = %bucket, "Updateでは何もしない");
            }
        }

        Ok(HandlerOutcome::new(physical_id))
    }
}

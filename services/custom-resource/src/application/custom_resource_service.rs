//! カスタムリソースイベント処理サービス
//!
//! 1つのイベントを振り分け、結果をCloudFormationの応答にまとめて送信する。
//! ハンドラーの失敗はFAILED応答として返し、Lambdaのエラーにはしない。
//! 応答の送信に失敗した場合のみエラーを返す。
use std::sync::Arc;

use tracing::{error, info};

use super::dispatcher::Dispatcher;
use crate::domain::{CustomResourceResponse, ResourceEvent};
use crate::infrastructure::{ResponseSendError, ResponseSender};

pub struct CustomResourceService {
    dispatcher: Dispatcher,
    sender: Arc<dyn ResponseSender>,
    /// 失敗応答に含めるログストリーム名
    log_stream_name: String,
}

impl CustomResourceService {
    pub fn new(dispatcher: Dispatcher, sender: Arc<dyn ResponseSender>, log_stream_name: impl Into<String>) -> Self {
        Self {
            dispatcher,
            sender,
            log_stream_name: log_stream_name.into(),
        }
    }

    /// イベントを処理して応答を送信する
    ///
    /// # 戻り値
    /// * 送信した応答
    /// * 送信に失敗した場合は`Err(ResponseSendError)`
    pub async fn handle(&self, event: &ResourceEvent) -> Result<CustomResourceResponse, ResponseSendError> {
        info!(
            request_type = %event.request_type,
            resource_type = %event.resource_type,
            logical_resource_id = %event.logical_resource_id,
            request_id = %event.request_id,
            "カスタムリソースイベントを受信"
        );

        let response = match self.dispatcher.dispatch(event).await {
            Ok(outcome) => CustomResourceResponse::succeed(event, outcome.data, outcome.physical_resource_id),
            Err(err) => {
                error!(
                    resource_type = %event.resource_type,
                    logical_resource_id = %event.logical_resource_id,
                    error = %err,
                    "カスタムリソースの処理に失敗"
                );
                CustomResourceResponse::fail(event, &err, &self.log_stream_name)
            }
        };

        self.sender.send(&event.response_url, &response).await?;

        info!(
            status = ?response.status,
            physical_resource_id = %response.physical_resource_id,
            "応答を送信"
        );
        Ok(response)
    }
}

//! 事件处理基础 Trait

use std::sync::Arc;

use async_trait::async_trait;
use recconv_core::Result;
use tokio::sync::mpsc;

use crate::types::MessageEvent;

/// 消息事件处理器
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// 处理一条消息事件
    async fn handle(&self, event: MessageEvent) -> Result<()>;
}

/// 消费事件流，每个事件在独立任务中处理
pub async fn serve(mut events: mpsc::Receiver<MessageEvent>, handler: Arc<dyn EventHandler>) {
    while let Some(event) = events.recv().await {
        let handler = handler.clone();
        tokio::spawn(async move {
            let message_id = event.message_id.clone();
            if let Err(e) = handler.handle(event).await {
                tracing::error!("处理消息 {} 失败: {}", message_id, e);
            }
        });
    }
    tracing::info!("事件流已关闭");
}

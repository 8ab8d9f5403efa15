//! OneBot v11 正向 WebSocket 客户端

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use recconv_core::{OneBotConfig, RecConvError, Result};
use serde_json::{Value, json};
use tokio::sync::{RwLock, mpsc, oneshot};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{client::IntoClientRequest, http::HeaderValue, protocol::Message as WsMessage},
};
use tracing::{debug, info, warn};

use crate::api::{OneBotApi, check_api_response};
use crate::types::MessageEvent;

const EVENT_BUFFER: usize = 256;

#[derive(Default)]
struct ClientInner {
    sender: RwLock<Option<mpsc::UnboundedSender<String>>>,
    pending: RwLock<HashMap<String, oneshot::Sender<Value>>>,
    self_id: RwLock<Option<i64>>,
}

impl ClientInner {
    async fn attach(&self, tx: mpsc::UnboundedSender<String>) {
        *self.sender.write().await = Some(tx);
    }

    async fn detach(&self) {
        *self.sender.write().await = None;
        // 未完成的调用随 oneshot 被丢弃而失败
        self.pending.write().await.clear();
    }

    /// 处理一帧文本。动作响应交给等待者，消息事件返回给调用方。
    async fn dispatch_frame(&self, text: &str) -> Option<MessageEvent> {
        let json: Value = match serde_json::from_str(text) {
            Ok(json) => json,
            Err(e) => {
                warn!("无法解析的 OneBot 数据帧: {}", e);
                return None;
            }
        };

        if let Some(echo) = json.get("echo").and_then(|e| e.as_str())
            && let Some(waiter) = self.pending.write().await.remove(echo)
        {
            let _ = waiter.send(json);
            return None;
        }

        if let Some(sid) = json.get("self_id").and_then(|s| s.as_i64()) {
            let mut self_id = self.self_id.write().await;
            if *self_id != Some(sid) {
                info!("已连接 Bot: {}", sid);
                *self_id = Some(sid);
            }
        }

        MessageEvent::from_value(&json)
    }
}

/// 正向 WebSocket 客户端
#[derive(Clone)]
pub struct OneBotClient {
    config: OneBotConfig,
    inner: Arc<ClientInner>,
}

impl OneBotClient {
    pub fn new(config: OneBotConfig) -> Self {
        Self {
            config,
            inner: Arc::new(ClientInner::default()),
        }
    }

    /// 启动连接任务 (断线自动重连)，返回消息事件流
    pub fn start(&self) -> mpsc::Receiver<MessageEvent> {
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let client = self.clone();

        tokio::spawn(async move {
            let interval = Duration::from_millis(client.config.reconnect_interval_ms);
            loop {
                match client.connect_once(&event_tx).await {
                    Ok(()) => warn!("OneBot 连接已断开"),
                    Err(e) => warn!("OneBot 连接失败: {}", e),
                }
                client.inner.detach().await;

                if event_tx.is_closed() {
                    break;
                }
                info!("{}ms 后重连...", client.config.reconnect_interval_ms);
                tokio::time::sleep(interval).await;
            }
        });

        event_rx
    }

    async fn connect_once(&self, event_tx: &mpsc::Sender<MessageEvent>) -> Result<()> {
        let mut request = self
            .config
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| RecConvError::Config(format!("无效的 WebSocket 地址: {}", e)))?;

        if let Some(token) = self.config.access_token.as_deref().filter(|t| !t.trim().is_empty()) {
            let value: HeaderValue = format!("Bearer {}", token)
                .parse()
                .map_err(|e| RecConvError::Config(format!("无效的 access_token: {}", e)))?;
            request.headers_mut().insert("Authorization", value);
        }

        let (ws_stream, _) = connect_async(request)
            .await
            .map_err(|e| RecConvError::Channel(format!("WebSocket 连接失败: {}", e)))?;
        info!("已连接 OneBot: {}", self.config.url);

        let (mut write, mut read) = ws_stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        self.inner.attach(tx).await;

        let writer = tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                if write.send(WsMessage::Text(frame.into())).await.is_err() {
                    break;
                }
            }
        });

        while let Some(msg) = read.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    writer.abort();
                    return Err(RecConvError::Channel(format!("WebSocket 读取失败: {}", e)));
                }
            };

            match msg {
                WsMessage::Text(text) => {
                    if let Some(event) = self.inner.dispatch_frame(&text).await
                        && event_tx.send(event).await.is_err()
                    {
                        break;
                    }
                }
                WsMessage::Close(_) => break,
                _ => {}
            }
        }

        writer.abort();
        Ok(())
    }
}

#[async_trait]
impl OneBotApi for OneBotClient {
    async fn call_api(&self, action: &str, params: Value) -> Result<Value> {
        let sender = self
            .inner
            .sender
            .read()
            .await
            .clone()
            .ok_or_else(|| RecConvError::Channel("没有可用的 OneBot 连接".to_string()))?;

        let echo = uuid::Uuid::new_v4().to_string();
        let frame = json!({
            "action": action,
            "params": params,
            "echo": echo,
        });

        let (resp_tx, resp_rx) = oneshot::channel();
        self.inner.pending.write().await.insert(echo.clone(), resp_tx);

        debug!("调用 OneBot 动作: {}", action);
        if sender.send(frame.to_string()).is_err() {
            self.inner.pending.write().await.remove(&echo);
            return Err(RecConvError::Channel("WebSocket 通道已关闭".to_string()));
        }

        let timeout = Duration::from_secs(self.config.api_timeout_secs);
        match tokio::time::timeout(timeout, resp_rx).await {
            Ok(Ok(json)) => check_api_response(json),
            Ok(Err(_)) => Err(RecConvError::Channel("响应通道已关闭".to_string())),
            Err(_) => {
                self.inner.pending.write().await.remove(&echo);
                Err(RecConvError::Timeout(format!("动作 {} 超时", action)))
            }
        }
    }
}

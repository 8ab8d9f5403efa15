//! 测试用的手写 Mock

pub mod onebot {
    use async_trait::async_trait;
    use recconv_core::{RecConvError, Result};
    use recconv_onebot::{ChatType, MessageEvent, OneBotApi, Segment, Sender};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// 记录所有动作调用，按动作名返回预设响应
    #[derive(Clone, Default)]
    pub struct MockOneBot {
        responses: Arc<Mutex<HashMap<String, Value>>>,
        failures: Arc<Mutex<HashMap<String, String>>>,
        calls: Arc<Mutex<Vec<(String, Value)>>>,
    }

    impl MockOneBot {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(self, action: &str, data: Value) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(action.to_string(), data);
            self
        }

        pub fn with_failure(self, action: &str, message: &str) -> Self {
            self.failures
                .lock()
                .unwrap()
                .insert(action.to_string(), message.to_string());
            self
        }

        pub fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().unwrap().clone()
        }

        /// 指定动作的全部调用参数
        pub fn calls_for(&self, action: &str) -> Vec<Value> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(a, _)| a == action)
                .map(|(_, p)| p.clone())
                .collect()
        }

        pub fn was_called(&self, action: &str) -> bool {
            !self.calls_for(action).is_empty()
        }
    }

    #[async_trait]
    impl OneBotApi for MockOneBot {
        async fn call_api(&self, action: &str, params: Value) -> Result<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((action.to_string(), params));

            if let Some(message) = self.failures.lock().unwrap().get(action) {
                return Err(RecConvError::Api(message.clone()));
            }

            Ok(self
                .responses
                .lock()
                .unwrap()
                .get(action)
                .cloned()
                .unwrap_or_else(|| json!({})))
        }
    }

    /// 构造一条群消息事件
    pub fn group_event(group_id: i64, user_id: i64, segments: Vec<Segment>) -> MessageEvent {
        MessageEvent {
            message_id: "1".to_string(),
            chat: ChatType::Group(group_id),
            user_id,
            self_id: 10000,
            sender: Sender {
                user_id,
                nickname: format!("user{}", user_id),
                card: None,
            },
            segments,
            raw_message: String::new(),
        }
    }

    /// 构造一条私聊消息事件
    pub fn private_event(user_id: i64, segments: Vec<Segment>) -> MessageEvent {
        MessageEvent {
            chat: ChatType::Private,
            ..group_event(0, user_id, segments)
        }
    }

    /// 引用 `reply_id` 并附带文本指令的消息段
    pub fn quoting(reply_id: &str, text: &str) -> Vec<Segment> {
        vec![
            Segment::Reply {
                id: reply_id.to_string(),
            },
            Segment::text(text),
        ]
    }
}

pub mod tts {
    use async_trait::async_trait;
    use recconv_core::{RecConvError, Result};
    use recconv_voice::{SynthesisOptions, TextToSpeech};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    pub struct MockTts {
        audio: Vec<u8>,
        should_fail: bool,
        texts: Arc<Mutex<Vec<String>>>,
    }

    impl Default for MockTts {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockTts {
        pub fn new() -> Self {
            Self {
                audio: b"ID3\x04\x00mock-audio".to_vec(),
                should_fail: false,
                texts: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn failing() -> Self {
            Self {
                should_fail: true,
                ..Self::new()
            }
        }

        pub fn audio(&self) -> &[u8] {
            &self.audio
        }

        pub fn texts(&self) -> Vec<String> {
            self.texts.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.texts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextToSpeech for MockTts {
        fn provider_name(&self) -> &str {
            "mock"
        }

        async fn synthesize(&self, text: &str, _options: Option<SynthesisOptions>) -> Result<Vec<u8>> {
            self.texts.lock().unwrap().push(text.to_string());
            if self.should_fail {
                return Err(RecConvError::Tts("mock failure".to_string()));
            }
            Ok(self.audio.clone())
        }

        fn is_available(&self) -> bool {
            !self.should_fail
        }
    }
}

pub mod http {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// 在本地端口上对任意请求都返回 `body`，返回可访问的 URL
    pub async fn serve_bytes(body: Vec<u8>) -> String {
        serve(200, body).await
    }

    /// 对任意请求返回指定状态码
    pub async fn serve(status: u16, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let body = body.clone();
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = stream.read(&mut buf).await;
                    let head = format!(
                        "HTTP/1.1 {} MOCK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        status,
                        body.len()
                    );
                    let _ = stream.write_all(head.as_bytes()).await;
                    let _ = stream.write_all(&body).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        format!("http://{}/file", addr)
    }
}

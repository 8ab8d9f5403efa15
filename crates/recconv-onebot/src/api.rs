//! OneBot v11 动作调用
//!
//! 只有 `call_api` 需要实现，其余方法都是对具体动作的类型化封装。
//! 部分动作 (AI 声聊、`get_file`) 为 NapCat 扩展。

use async_trait::async_trait;
use recconv_core::{RecConvError, Result};
use serde_json::{Value, json};

use crate::types::{AiCharacterGroup, FileInfo, QuotedMessage, RecordFile, Segment, Sender};

/// 解析动作响应外层
pub fn check_api_response(json: Value) -> Result<Value> {
    match json.get("status").and_then(|s| s.as_str()) {
        Some("ok") | Some("async") => Ok(json.get("data").cloned().unwrap_or(Value::Null)),
        Some("failed") => {
            let msg = json
                .get("wording")
                .or_else(|| json.get("msg"))
                .and_then(|m| m.as_str())
                .unwrap_or("unknown");
            Err(RecConvError::Api(format!(
                "{} (retcode: {})",
                msg,
                json.get("retcode").cloned().unwrap_or(Value::Null)
            )))
        }
        _ => Ok(json),
    }
}

/// 数字形式的 id 按数字发送，其余按字符串
fn id_param(id: &str) -> Value {
    id.parse::<i64>().map(Value::from).unwrap_or_else(|_| json!(id))
}

/// OneBot 动作调用 Trait
#[async_trait]
pub trait OneBotApi: Send + Sync {
    /// 调用任意动作，返回响应中的 `data`
    async fn call_api(&self, action: &str, params: Value) -> Result<Value>;

    /// 获取消息 (用于解析引用)
    async fn get_msg(&self, message_id: &str) -> Result<QuotedMessage> {
        let data = self
            .call_api("get_msg", json!({ "message_id": id_param(message_id) }))
            .await?;
        Ok(QuotedMessage::from_value(&data))
    }

    /// 获取语音文件，按 `out_format` 转码后返回本地路径
    async fn get_record(&self, file: &str, out_format: &str) -> Result<RecordFile> {
        let data = self
            .call_api("get_record", json!({ "file": file, "out_format": out_format }))
            .await?;
        let record: RecordFile = serde_json::from_value(data)?;
        if record.file.is_empty() {
            return Err(RecConvError::Api("get_record 未返回文件路径".to_string()));
        }
        Ok(record)
    }

    /// 获取文件信息
    async fn get_file(&self, file_id: &str) -> Result<FileInfo> {
        let data = self
            .call_api("get_file", json!({ "file_id": file_id }))
            .await?;
        Ok(serde_json::from_value(data)?)
    }

    async fn get_group_member_info(&self, group_id: i64, user_id: i64) -> Result<Sender> {
        let data = self
            .call_api(
                "get_group_member_info",
                json!({ "group_id": group_id, "user_id": user_id, "no_cache": false }),
            )
            .await?;
        Ok(serde_json::from_value(data)?)
    }

    async fn get_stranger_info(&self, user_id: i64) -> Result<Sender> {
        let data = self
            .call_api("get_stranger_info", json!({ "user_id": user_id }))
            .await?;
        Ok(serde_json::from_value(data)?)
    }

    async fn upload_group_file(&self, group_id: i64, file: &str, name: &str) -> Result<()> {
        self.call_api(
            "upload_group_file",
            json!({ "group_id": group_id, "file": file, "name": name }),
        )
        .await?;
        Ok(())
    }

    async fn upload_private_file(&self, user_id: i64, file: &str, name: &str) -> Result<()> {
        self.call_api(
            "upload_private_file",
            json!({ "user_id": user_id, "file": file, "name": name }),
        )
        .await?;
        Ok(())
    }

    async fn send_group_msg(&self, group_id: i64, message: &[Segment]) -> Result<Value> {
        let message: Vec<Value> = message.iter().map(Segment::to_value).collect();
        self.call_api(
            "send_group_msg",
            json!({ "group_id": group_id, "message": message }),
        )
        .await
    }

    async fn send_private_msg(&self, user_id: i64, message: &[Segment]) -> Result<Value> {
        let message: Vec<Value> = message.iter().map(Segment::to_value).collect();
        self.call_api(
            "send_private_msg",
            json!({ "user_id": user_id, "message": message }),
        )
        .await
    }

    /// 获取 AI 声聊角色列表
    async fn get_ai_characters(&self, group_id: i64, chat_type: u32) -> Result<Vec<AiCharacterGroup>> {
        let data = self
            .call_api(
                "get_ai_characters",
                json!({ "group_id": group_id, "chat_type": chat_type }),
            )
            .await?;
        Ok(serde_json::from_value(data)?)
    }

    /// 生成 AI 声聊语音，返回音频地址
    async fn get_ai_record(&self, group_id: i64, character: &str, text: &str) -> Result<String> {
        let data = self
            .call_api(
                "get_ai_record",
                json!({ "group_id": group_id, "character": character, "text": text }),
            )
            .await?;

        let url = match &data {
            Value::String(s) => Some(s.clone()),
            other => other
                .get("url")
                .or_else(|| other.get("file"))
                .and_then(|v| v.as_str())
                .map(str::to_string),
        };

        url.filter(|u| !u.is_empty())
            .ok_or_else(|| RecConvError::Api("get_ai_record 未返回语音地址".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FixedApi {
        response: Value,
        calls: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl OneBotApi for FixedApi {
        async fn call_api(&self, action: &str, params: Value) -> Result<Value> {
            self.calls.lock().unwrap().push((action.to_string(), params));
            Ok(self.response.clone())
        }
    }

    fn fixed(response: Value) -> FixedApi {
        FixedApi {
            response,
            calls: Mutex::new(Vec::new()),
        }
    }

    #[test]
    fn test_check_api_response_ok() {
        let data = check_api_response(json!({ "status": "ok", "retcode": 0, "data": { "a": 1 } }))
            .unwrap();
        assert_eq!(data, json!({ "a": 1 }));
    }

    #[test]
    fn test_check_api_response_failed() {
        let err = check_api_response(json!({
            "status": "failed",
            "retcode": 1200,
            "msg": "NOT_FOUND",
            "wording": "消息不存在"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("消息不存在"));
        assert!(err.to_string().contains("1200"));
    }

    #[test]
    fn test_check_api_response_passthrough() {
        let raw = json!({ "anything": true });
        assert_eq!(check_api_response(raw.clone()).unwrap(), raw);
    }

    #[tokio::test]
    async fn test_get_msg_sends_numeric_id() {
        let api = fixed(json!({ "message_id": 5, "message": [] }));
        api.get_msg("5").await.unwrap();
        let calls = api.calls.lock().unwrap();
        assert_eq!(calls[0].0, "get_msg");
        assert_eq!(calls[0].1["message_id"], json!(5));
    }

    #[tokio::test]
    async fn test_get_record_requires_path() {
        let api = fixed(json!({ "file": "" }));
        assert!(api.get_record("v.amr", "mp3").await.is_err());

        let api = fixed(json!({ "file": "/data/v.mp3", "out_format": "mp3" }));
        let record = api.get_record("v.amr", "mp3").await.unwrap();
        assert_eq!(record.file, "/data/v.mp3");
    }

    #[tokio::test]
    async fn test_get_ai_record_accepts_string_or_object() {
        let api = fixed(json!("http://voice.example.com/a.silk"));
        assert_eq!(
            api.get_ai_record(1, "lucy", "hi").await.unwrap(),
            "http://voice.example.com/a.silk"
        );

        let api = fixed(json!({ "url": "http://voice.example.com/b.silk" }));
        assert_eq!(
            api.get_ai_record(1, "lucy", "hi").await.unwrap(),
            "http://voice.example.com/b.silk"
        );

        let api = fixed(Value::Null);
        assert!(api.get_ai_record(1, "lucy", "hi").await.is_err());
    }

    #[tokio::test]
    async fn test_get_ai_characters() {
        let api = fixed(json!([{
            "type": "推荐",
            "characters": [
                { "character_id": "lucy-voice-female1", "character_name": "小美", "preview_url": "" }
            ]
        }]));
        let groups = api.get_ai_characters(1, 1).await.unwrap();
        assert_eq!(groups[0].kind, "推荐");
        assert_eq!(groups[0].characters[0].character_name, "小美");
    }

    #[tokio::test]
    async fn test_send_group_msg_serializes_segments() {
        let api = fixed(json!({ "message_id": 1 }));
        api.send_group_msg(9, &[Segment::record("/tmp/x.mp3")])
            .await
            .unwrap();
        let calls = api.calls.lock().unwrap();
        assert_eq!(calls[0].1["message"][0]["type"], "record");
        assert_eq!(calls[0].1["group_id"], 9);
    }
}

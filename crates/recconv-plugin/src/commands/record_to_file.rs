//! 语音转文件

use recconv_core::Result;
use recconv_onebot::{MessageEvent, QuotedMessage, Segment};
use tracing::{error, info};

use crate::context::PluginContext;
use crate::reply::Reply;

pub(crate) const NEED_RECORD: &str = "请同时引用一条语音消息";
pub(crate) const SENT_PRIVATELY: &str = "私发给你了";

/// 将引用的语音消息转为文件上传
pub async fn record_to_file(ctx: &PluginContext, event: &MessageEvent) -> Vec<Reply> {
    let quoted = match ctx.quoted_message(event).await {
        Ok(Some(quoted)) => quoted,
        Ok(None) => return vec![Reply::notice(NEED_RECORD)],
        Err(e) => return vec![Reply::notice(format!("获取引用消息失败: {}", e))],
    };

    let file = match quoted.first_segment() {
        Some(Segment::Record { file, .. }) if !file.is_empty() => file.clone(),
        _ => return vec![Reply::notice(NEED_RECORD)],
    };

    match convert(ctx, event, &quoted, &file).await {
        Ok(file_name) => {
            info!(
                "成功转化语音文件: {} (消息 {}) -> {}",
                file, quoted.message_id, file_name
            );
            if !event.is_private() && ctx.config.send_private {
                vec![Reply::text(SENT_PRIVATELY)]
            } else {
                Vec::new()
            }
        }
        Err(e) => {
            error!("转化语音文件 {} 失败: {}", file, e);
            vec![Reply::notice(format!("转换语音文件失败: {}", e))]
        }
    }
}

async fn convert(
    ctx: &PluginContext,
    event: &MessageEvent,
    quoted: &QuotedMessage,
    file: &str,
) -> Result<String> {
    let record = ctx.api.get_record(file, &ctx.config.format).await?;
    let file_name = format!("{}.{}", ctx.file_stem(event, quoted).await, ctx.config.format);
    ctx.upload_file(event, &record.file, &file_name).await?;
    Ok(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recconv_core::PluginConfig;
    use recconv_testing::onebot::{MockOneBot, group_event, private_event, quoting};
    use serde_json::json;
    use std::sync::Arc;

    fn context(bot: &MockOneBot, send_private: bool) -> PluginContext {
        let config = PluginConfig {
            send_private,
            ..Default::default()
        };
        PluginContext::new(config, Arc::new(bot.clone()), None)
    }

    fn record_bot() -> MockOneBot {
        MockOneBot::new()
            .with_response(
                "get_msg",
                json!({
                    "message_id": 9,
                    "sender": { "user_id": 77 },
                    "message": [{ "type": "record", "data": { "file": "abc.amr" } }]
                }),
            )
            .with_response("get_record", json!({ "file": "/napcat/cache/abc.mp3" }))
            .with_response(
                "get_group_member_info",
                json!({ "user_id": 77, "nickname": "bob", "card": "" }),
            )
    }

    #[tokio::test]
    async fn test_without_quote() {
        let bot = MockOneBot::new();
        let event = group_event(100, 1, vec![Segment::text("转文件")]);
        let replies = record_to_file(&context(&bot, false), &event).await;
        assert_eq!(replies, vec![Reply::notice(NEED_RECORD)]);
        assert!(bot.calls().is_empty());
    }

    #[tokio::test]
    async fn test_quote_is_not_a_record() {
        let bot = MockOneBot::new().with_response(
            "get_msg",
            json!({ "message": [{ "type": "text", "data": { "text": "hi" } }] }),
        );
        let event = group_event(100, 1, quoting("9", "转文件"));
        let replies = record_to_file(&context(&bot, false), &event).await;
        assert_eq!(replies, vec![Reply::notice(NEED_RECORD)]);
        assert!(!bot.was_called("get_record"));
    }

    #[tokio::test]
    async fn test_uploads_group_file() {
        let bot = record_bot();
        let event = group_event(100, 1, quoting("9", "转文件"));
        let replies = record_to_file(&context(&bot, false), &event).await;
        assert!(replies.is_empty());

        let get_record = &bot.calls_for("get_record")[0];
        assert_eq!(get_record["file"], "abc.amr");
        assert_eq!(get_record["out_format"], "mp3");

        let upload = &bot.calls_for("upload_group_file")[0];
        assert_eq!(upload["group_id"], 100);
        assert_eq!(upload["file"], "/napcat/cache/abc.mp3");
        let name = upload["name"].as_str().unwrap();
        assert!(name.starts_with("bob_"));
        assert!(name.ends_with(".mp3"));
    }

    #[tokio::test]
    async fn test_send_private_in_group() {
        let bot = record_bot();
        let event = group_event(100, 1, quoting("9", "转文件"));
        let replies = record_to_file(&context(&bot, true), &event).await;
        assert_eq!(replies, vec![Reply::text(SENT_PRIVATELY)]);
        assert_eq!(bot.calls_for("upload_private_file")[0]["user_id"], 1);
    }

    #[tokio::test]
    async fn test_private_chat_has_no_notice() {
        let bot = record_bot().with_response("get_stranger_info", json!({ "nickname": "bob" }));
        let event = private_event(1, quoting("9", "转文件"));
        let replies = record_to_file(&context(&bot, true), &event).await;
        assert!(replies.is_empty());
        assert!(bot.was_called("upload_private_file"));
    }

    #[tokio::test]
    async fn test_get_record_failure_is_reported() {
        let bot = record_bot().with_failure("get_record", "file not found");
        let event = group_event(100, 1, quoting("9", "转文件"));
        let replies = record_to_file(&context(&bot, false), &event).await;
        let text = replies[0].as_text().unwrap();
        assert!(text.starts_with("转换语音文件失败"));
        assert!(text.contains("file not found"));
        assert!(!bot.was_called("upload_group_file"));
    }
}

//! 自动语音：按概率将简短的文本回复改为语音发送

use recconv_core::config::AutoVoiceConfig;
use recconv_onebot::MessageEvent;
use tracing::{debug, warn};

use crate::commands::synthesize_voice;
use crate::context::PluginContext;
use crate::reply::Reply;

/// 判断本次回复是否转为语音，返回需要合成的文本
///
/// 仅在回复只有一条纯文本、长度不超过 `max_chars` 且 `roll` 落在概率内时生效。
/// 提示与错误 (`Reply::Notice`) 不会转换。
pub fn should_convert<'a>(config: &AutoVoiceConfig, replies: &'a [Reply], roll: f64) -> Option<&'a str> {
    if !config.enabled {
        return None;
    }

    let [Reply::Text(text)] = replies else {
        return None;
    };
    let text = text.trim();

    let chars = text.chars().count();
    if chars == 0 || chars > config.max_chars {
        return None;
    }

    (roll < config.probability.clamp(0.0, 1.0)).then_some(text)
}

/// 对回复应用自动语音，合成失败时保持原文本
pub async fn decorate(
    ctx: &PluginContext,
    event: &MessageEvent,
    replies: Vec<Reply>,
    roll: f64,
) -> Vec<Reply> {
    let Some(text) = should_convert(&ctx.config.auto_voice, &replies, roll) else {
        return replies;
    };

    match synthesize_voice(ctx, event, text).await {
        Ok(Some(segment)) => {
            debug!("自动转为语音: {}", text);
            vec![Reply::Chain(vec![segment])]
        }
        Ok(None) => replies,
        Err(e) => {
            warn!("自动语音合成失败，发送原文本: {}", e);
            replies
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recconv_core::PluginConfig;
    use recconv_onebot::Segment;
    use recconv_testing::onebot::{MockOneBot, group_event};
    use recconv_testing::tts::MockTts;
    use std::sync::Arc;

    fn enabled(probability: f64, max_chars: usize) -> AutoVoiceConfig {
        AutoVoiceConfig {
            enabled: true,
            probability,
            max_chars,
        }
    }

    #[test]
    fn test_should_convert() {
        let replies = vec![Reply::text(" 你好 ")];
        assert_eq!(should_convert(&enabled(0.5, 10), &replies, 0.1), Some("你好"));
        assert_eq!(should_convert(&enabled(0.5, 10), &replies, 0.5), None);
        assert_eq!(should_convert(&enabled(0.5, 1), &replies, 0.1), None);
    }

    #[test]
    fn test_should_convert_requires_single_text() {
        let config = enabled(1.0, 50);
        assert_eq!(should_convert(&config, &[], 0.0), None);
        assert_eq!(
            should_convert(&config, &[Reply::text("a"), Reply::text("b")], 0.0),
            None
        );
        assert_eq!(should_convert(&config, &[Reply::record("file:///a.mp3")], 0.0), None);
        assert_eq!(should_convert(&config, &[Reply::text("   ")], 0.0), None);
        assert_eq!(should_convert(&config, &[Reply::notice("文件下载失败")], 0.0), None);
    }

    #[test]
    fn test_should_convert_disabled_and_clamped() {
        let replies = vec![Reply::text("hi")];
        let mut config = enabled(1.0, 50);
        config.enabled = false;
        assert_eq!(should_convert(&config, &replies, 0.0), None);

        assert_eq!(should_convert(&enabled(5.0, 50), &replies, 0.999), Some("hi"));
        assert_eq!(should_convert(&enabled(-1.0, 50), &replies, 0.0), None);
    }

    fn context(tts: MockTts, data_dir: &std::path::Path) -> PluginContext {
        let config = PluginConfig {
            data_dir: data_dir.to_path_buf(),
            auto_voice: enabled(1.0, 50),
            ..Default::default()
        };
        PluginContext::new(config, Arc::new(MockOneBot::new()), Some(Arc::new(tts)))
    }

    #[tokio::test]
    async fn test_decorate_converts_text() {
        let dir = tempfile::tempdir().unwrap();
        let tts = MockTts::new();
        let ctx = context(tts.clone(), dir.path());
        let event = group_event(100, 1, vec![]);

        let replies = decorate(&ctx, &event, vec![Reply::text("私发给你了")], 0.0).await;
        assert!(matches!(
            replies.as_slice(),
            [Reply::Chain(segments)] if matches!(segments[0], Segment::Record { .. })
        ));
        assert_eq!(tts.texts(), vec!["私发给你了".to_string()]);
    }

    #[tokio::test]
    async fn test_decorate_keeps_text_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(MockTts::failing(), dir.path());
        let event = group_event(100, 1, vec![]);

        let replies = decorate(&ctx, &event, vec![Reply::text("你好")], 0.0).await;
        assert_eq!(replies, vec![Reply::text("你好")]);
    }
}

//! 语音合成与 AI 声聊角色

use chrono::Local;
use recconv_core::Result;
use recconv_onebot::{AiCharacterGroup, MessageEvent, Segment};
use recconv_voice::{AudioFormat, SynthesisOptions, UNKNOWN_EXTENSION, guess_audio_ext};
use tracing::{debug, error, warn};

use crate::context::{PluginContext, file_uri, unique_suffix};
use crate::reply::Reply;

pub(crate) const NEED_TEXT: &str = "请在指令后输入要说的内容";
pub(crate) const NO_TTS: &str = "未配置语音合成服务";
pub(crate) const GROUP_ONLY: &str = "角色语音仅支持群聊";
pub(crate) const NO_CHARACTERS: &str = "暂无可用角色";

/// 将文本合成为语音消息段
///
/// 优先使用配置的 TTS 服务，未配置时在群聊中退回 QQ AI 声聊的默认角色。
/// 两者都不可用时返回 `Ok(None)`。
pub async fn synthesize_voice(
    ctx: &PluginContext,
    event: &MessageEvent,
    text: &str,
) -> Result<Option<Segment>> {
    if let Some(tts) = &ctx.tts {
        let tts_config = &ctx.config.tts;
        let options = SynthesisOptions {
            voice: Some(tts_config.voice.clone()),
            speed: Some(tts_config.speed),
            format: AudioFormat::parse(&tts_config.format),
        };
        let audio = tts.synthesize(text, Some(options)).await?;

        let ext = match guess_audio_ext(&audio) {
            UNKNOWN_EXTENSION => tts_config.format.trim_start_matches('.'),
            ext => ext,
        };
        let path = ctx.data_dir().await?.join(format!(
            "tts_{}_{}.{}",
            Local::now().format("%Y%m%d_%H%M%S"),
            unique_suffix(),
            ext
        ));
        tokio::fs::write(&path, &audio).await?;
        debug!("{} 合成语音: {}", tts.provider_name(), path.display());
        return Ok(Some(Segment::record(file_uri(&path))));
    }

    match event.group_id() {
        Some(group_id) => {
            let character = &ctx.config.character_voice.default_character;
            let url = ctx.api.get_ai_record(group_id, character, text).await?;
            Ok(Some(Segment::record(url)))
        }
        None => Ok(None),
    }
}

/// `说 <文本>`
pub async fn speak(ctx: &PluginContext, event: &MessageEvent, text: &str) -> Vec<Reply> {
    let text = text.trim();
    if text.is_empty() {
        return vec![Reply::notice(NEED_TEXT)];
    }

    match synthesize_voice(ctx, event, text).await {
        Ok(Some(segment)) => vec![Reply::Chain(vec![segment])],
        Ok(None) => vec![Reply::notice(NO_TTS)],
        Err(e) => {
            error!("语音合成失败: {}", e);
            vec![Reply::notice(format!("语音合成失败: {}", e))]
        }
    }
}

/// 在角色列表中按名称或 ID 查找
fn find_character<'a>(groups: &'a [AiCharacterGroup], name: &str) -> Option<&'a str> {
    groups
        .iter()
        .flat_map(|group| group.characters.iter())
        .find(|c| c.character_name == name || c.character_id == name)
        .map(|c| c.character_id.as_str())
}

/// `角色说 [角色] <文本>`，首个词匹配到角色时作为角色名，否则使用默认角色
pub async fn character_speak(ctx: &PluginContext, event: &MessageEvent, rest: &str) -> Vec<Reply> {
    let Some(group_id) = event.group_id() else {
        return vec![Reply::notice(GROUP_ONLY)];
    };
    let rest = rest.trim();
    if rest.is_empty() {
        return vec![Reply::notice(NEED_TEXT)];
    }

    let voice_config = &ctx.config.character_voice;
    let mut character = voice_config.default_character.clone();
    let mut text = rest;

    if let Some((first, remaining)) = rest.split_once(char::is_whitespace)
        && !remaining.trim().is_empty()
    {
        match ctx
            .api
            .get_ai_characters(group_id, voice_config.chat_type)
            .await
        {
            Ok(groups) => {
                if let Some(id) = find_character(&groups, first) {
                    character = id.to_string();
                    text = remaining.trim();
                }
            }
            Err(e) => warn!("获取 AI 角色列表失败，使用默认角色: {}", e),
        }
    }

    match ctx.api.get_ai_record(group_id, &character, text).await {
        Ok(url) => vec![Reply::record(url)],
        Err(e) => {
            error!("角色 {} 语音生成失败: {}", character, e);
            vec![Reply::notice(format!("语音合成失败: {}", e))]
        }
    }
}

/// 格式化角色列表
fn format_characters(groups: &[AiCharacterGroup]) -> String {
    let mut lines = Vec::new();
    for group in groups.iter().filter(|g| !g.characters.is_empty()) {
        if !group.kind.is_empty() {
            lines.push(format!("【{}】", group.kind));
        }
        for c in &group.characters {
            lines.push(format!("{} ({})", c.character_name, c.character_id));
        }
    }
    lines.join("\n")
}

/// `角色列表`
pub async fn list_characters(ctx: &PluginContext, event: &MessageEvent) -> Vec<Reply> {
    let Some(group_id) = event.group_id() else {
        return vec![Reply::notice(GROUP_ONLY)];
    };

    match ctx
        .api
        .get_ai_characters(group_id, ctx.config.character_voice.chat_type)
        .await
    {
        Ok(groups) => {
            let listing = format_characters(&groups);
            if listing.is_empty() {
                vec![Reply::notice(NO_CHARACTERS)]
            } else {
                vec![Reply::text(listing)]
            }
        }
        Err(e) => vec![Reply::notice(format!("获取角色列表失败: {}", e))],
    }
}

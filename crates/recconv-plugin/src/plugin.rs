//! 插件入口：指令分发与回复发送

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use recconv_core::{PluginConfig, Result};
use recconv_onebot::{EventHandler, MessageEvent, OneBotApi};
use recconv_voice::{TextToSpeech, create_tts};
use tracing::{debug, info, warn};

use crate::auto_voice;
use crate::commands::{self, Command, parse_command};
use crate::context::PluginContext;
use crate::reply::Reply;

/// QQ 语音转换插件
pub struct RecordConverterPlugin {
    ctx: PluginContext,
}

impl RecordConverterPlugin {
    /// 按配置创建插件，TTS 服务由 `config.tts` 决定
    pub fn new(config: PluginConfig, api: Arc<dyn OneBotApi>) -> Self {
        let tts = create_tts(&config.tts);
        Self::with_tts(config, api, tts)
    }

    pub fn with_tts(
        config: PluginConfig,
        api: Arc<dyn OneBotApi>,
        tts: Option<Arc<dyn TextToSpeech>>,
    ) -> Self {
        match &tts {
            Some(tts) => info!("语音合成服务: {}", tts.provider_name()),
            None => info!("未配置语音合成服务，群聊中使用 AI 声聊"),
        }
        Self {
            ctx: PluginContext::new(config, api, tts),
        }
    }

    pub fn context(&self) -> &PluginContext {
        &self.ctx
    }

    /// 处理一条消息，返回需要发送的回复
    pub async fn handle_event(&self, event: &MessageEvent) -> Vec<Reply> {
        if event.user_id == event.self_id {
            return Vec::new();
        }

        let text = event.plain_text();
        let Some(command) = parse_command(&text) else {
            return Vec::new();
        };
        debug!("收到指令 {} 来自 {}", command.name(), event.user_id);

        let roll: f64 = rand::thread_rng().r#gen();
        let replies = self.dispatch(command, event).await;
        auto_voice::decorate(&self.ctx, event, replies, roll).await
    }

    async fn dispatch(&self, command: Command<'_>, event: &MessageEvent) -> Vec<Reply> {
        let ctx = &self.ctx;
        match command {
            Command::RecordToFile => commands::record_to_file(ctx, event).await,
            Command::FileToRecord => commands::file_to_record(ctx, event).await,
            Command::Speak(text) => commands::speak(ctx, event, text).await,
            Command::CharacterSpeak(rest) => commands::character_speak(ctx, event, rest).await,
            Command::ListCharacters => commands::list_characters(ctx, event).await,
        }
    }

    /// 将回复发回消息来源
    pub async fn deliver(&self, event: &MessageEvent, replies: &[Reply]) -> Result<()> {
        for reply in replies {
            let segments = reply.to_segments();
            match event.group_id() {
                Some(group_id) => self.ctx.api.send_group_msg(group_id, &segments).await?,
                None => self.ctx.api.send_private_msg(event.user_id, &segments).await?,
            };
        }
        Ok(())
    }

    /// 回复中引用的临时目录文件
    fn staged_files(&self, replies: &[Reply]) -> Vec<PathBuf> {
        let Ok(data_dir) = std::path::absolute(&self.ctx.config.data_dir) else {
            return Vec::new();
        };
        replies
            .iter()
            .flat_map(|reply| reply.local_files_in(&data_dir))
            .collect()
    }
}

#[async_trait]
impl EventHandler for RecordConverterPlugin {
    async fn handle(&self, event: MessageEvent) -> Result<()> {
        let replies = self.handle_event(&event).await;
        let result = self.deliver(&event, &replies).await;

        // 发送完成后临时文件不再需要，发送失败也一并清理
        for path in self.staged_files(&replies) {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!("清理临时文件 {} 失败: {}", path.display(), e);
            }
        }

        result
    }
}

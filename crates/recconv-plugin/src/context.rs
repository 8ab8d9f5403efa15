//! 指令处理共享的上下文与工具函数

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use recconv_core::{PluginConfig, Result};
use recconv_onebot::{MessageEvent, OneBotApi, QuotedMessage};
use recconv_voice::TextToSpeech;
use tracing::warn;

/// 指令处理上下文
#[derive(Clone)]
pub struct PluginContext {
    pub config: PluginConfig,
    pub api: Arc<dyn OneBotApi>,
    pub tts: Option<Arc<dyn TextToSpeech>>,
    pub http: reqwest::Client,
}

impl PluginContext {
    pub fn new(
        config: PluginConfig,
        api: Arc<dyn OneBotApi>,
        tts: Option<Arc<dyn TextToSpeech>>,
    ) -> Self {
        Self {
            config,
            api,
            tts,
            http: reqwest::Client::new(),
        }
    }

    /// 获取被引用的消息，没有引用时返回 `None`
    pub async fn quoted_message(&self, event: &MessageEvent) -> Result<Option<QuotedMessage>> {
        match event.reply_id() {
            Some(id) => Ok(Some(self.api.get_msg(id).await?)),
            None => Ok(None),
        }
    }

    /// 群名片或昵称，获取失败时退回 QQ 号
    pub async fn nickname(&self, event: &MessageEvent, user_id: i64) -> String {
        let info = match event.group_id() {
            Some(group_id) => self.api.get_group_member_info(group_id, user_id).await,
            None => self.api.get_stranger_info(user_id).await,
        };

        match info {
            Ok(sender) => sender
                .display_name()
                .map(sanitize_file_component)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| user_id.to_string()),
            Err(e) => {
                warn!("获取用户 {} 昵称失败: {}", user_id, e);
                user_id.to_string()
            }
        }
    }

    /// 生成 `{昵称}_{时间}` 形式的文件名前缀
    pub async fn file_stem(&self, event: &MessageEvent, quoted: &QuotedMessage) -> String {
        let user_id = quoted.sender_id.unwrap_or(event.user_id);
        let nickname = self.nickname(event, user_id).await;
        build_file_stem(&nickname, Local::now())
    }

    /// 确保临时目录存在，返回其绝对路径
    pub async fn data_dir(&self) -> Result<PathBuf> {
        let dir = std::path::absolute(&self.config.data_dir)?;
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// 上传文件：群聊且未开启私发时传到群文件，否则私发给指令发送者
    pub async fn upload_file(&self, event: &MessageEvent, path: &str, name: &str) -> Result<()> {
        match event.group_id() {
            Some(group_id) if !self.config.send_private => {
                self.api.upload_group_file(group_id, path, name).await
            }
            _ => self.api.upload_private_file(event.user_id, path, name).await,
        }
    }
}

/// 文件名中不允许出现的字符替换为 `_`
pub fn sanitize_file_component(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

pub fn build_file_stem(nickname: &str, at: DateTime<Local>) -> String {
    format!(
        "{}_{}",
        sanitize_file_component(nickname),
        at.format("%Y%m%d_%H%M%S")
    )
}

/// 临时文件名后缀，同一秒内的多次转换互不覆盖
pub fn unique_suffix() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}

/// 本地文件转为消息段可用的 `file://` 地址
pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

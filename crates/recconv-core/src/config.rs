//! 插件配置管理

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{RecConvError, Result};

/// 插件主配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// 语音转文件时的输出格式
    pub format: String,
    /// 是否总是私发文件
    pub send_private: bool,
    /// 临时文件目录
    pub data_dir: PathBuf,
    /// 下载时将 https 改写为 http
    pub force_http_download: bool,
    /// ffmpeg 可执行文件
    pub ffmpeg_path: String,
    /// OneBot 连接配置
    pub onebot: OneBotConfig,
    /// 语音合成配置
    pub tts: TtsConfig,
    /// 角色语音配置
    pub character_voice: CharacterVoiceConfig,
    /// 自动转语音配置
    pub auto_voice: AutoVoiceConfig,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            format: "mp3".to_string(),
            send_private: false,
            data_dir: default_home().join("data"),
            force_http_download: true,
            ffmpeg_path: "ffmpeg".to_string(),
            onebot: OneBotConfig::default(),
            tts: TtsConfig::default(),
            character_voice: CharacterVoiceConfig::default(),
            auto_voice: AutoVoiceConfig::default(),
        }
    }
}

/// OneBot v11 正向 WebSocket 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OneBotConfig {
    pub url: String,
    pub access_token: Option<String>,
    pub reconnect_interval_ms: u64,
    pub api_timeout_secs: u64,
}

impl Default for OneBotConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:3001".to_string(),
            access_token: None,
            reconnect_interval_ms: 3000,
            api_timeout_secs: 60,
        }
    }
}

/// TTS 提供商类型
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TtsProviderKind {
    #[default]
    Disabled,
    OpenAI,
    Custom,
}

/// 语音合成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub provider: TtsProviderKind,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub voice: String,
    /// 语速 (0.25 - 4.0)
    pub speed: f32,
    pub format: String,
    pub custom: Option<CustomTtsConfig>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: TtsProviderKind::Disabled,
            api_key: None,
            base_url: None,
            model: "tts-1".to_string(),
            voice: "alloy".to_string(),
            speed: 1.0,
            format: "mp3".to_string(),
            custom: None,
        }
    }
}

/// 自定义 TTS 提供商配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomTtsConfig {
    /// 提供商名称
    pub name: String,
    /// API 端点 URL
    pub endpoint: String,
    /// HTTP 方法
    #[serde(default = "default_http_method")]
    pub method: String,
    /// 请求头
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// 请求体模板 (支持 {{text}}, {{voice}}, {{speed}}, {{format}})
    pub request_template: String,
    /// 响应处理方式
    #[serde(default)]
    pub response_type: CustomResponseType,
}

fn default_http_method() -> String {
    "POST".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CustomResponseType {
    /// 直接返回音频二进制
    #[default]
    Binary,
    /// 返回 JSON，指定字段为 base64 音频
    Json { audio_field: String },
}

/// 角色语音 (AI 声聊) 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterVoiceConfig {
    pub default_character: String,
    pub chat_type: u32,
}

impl Default for CharacterVoiceConfig {
    fn default() -> Self {
        Self {
            default_character: "lucy-voice-female1".to_string(),
            chat_type: 1,
        }
    }
}

/// 自动转语音配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoVoiceConfig {
    pub enabled: bool,
    /// 触发概率 (0.0 - 1.0)
    pub probability: f64,
    /// 只转换不超过该字数的文本
    pub max_chars: usize,
}

impl Default for AutoVoiceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            probability: 0.1,
            max_chars: 50,
        }
    }
}

impl PluginConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| RecConvError::Config(format!("读取配置失败: {}", e)))?;

        let mut config: Self = serde_json::from_str(&content)
            .map_err(|e| RecConvError::Config(format!("解析配置失败: {}", e)))?;
        config.data_dir = expand_home(&config.data_dir);

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| RecConvError::Config(format!("创建目录失败: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| RecConvError::Config(format!("序列化配置失败: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| RecConvError::Config(format!("写入配置失败: {}", e)))?;

        Ok(())
    }

    pub fn default_path() -> PathBuf {
        default_home().join("config.json")
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> Result<()> {
        if self.format.trim().is_empty() {
            return Err(RecConvError::Config("format 不能为空".to_string()));
        }

        if !(0.0..=1.0).contains(&self.auto_voice.probability) {
            return Err(RecConvError::Config(format!(
                "auto_voice.probability 必须在 0 到 1 之间: {}",
                self.auto_voice.probability
            )));
        }

        match self.tts.provider {
            TtsProviderKind::OpenAI if self.tts.api_key.is_none() => {
                Err(RecConvError::Config("未配置 OpenAI API Key".to_string()))
            }
            TtsProviderKind::Custom if self.tts.custom.is_none() => {
                Err(RecConvError::Config("未配置自定义 TTS 提供商".to_string()))
            }
            _ => Ok(()),
        }
    }
}

fn default_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".recconv")
}

/// 展开以 `~` 开头的路径
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PluginConfig::default();
        assert_eq!(config.format, "mp3");
        assert!(!config.send_private);
        assert!(config.force_http_download);
        assert_eq!(config.tts.provider, TtsProviderKind::Disabled);
        assert!(!config.auto_voice.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PluginConfig = serde_json::from_str(
            r#"{ "format": "wav", "onebot": { "url": "ws://10.0.0.2:3001" } }"#,
        )
        .unwrap();
        assert_eq!(config.format, "wav");
        assert_eq!(config.onebot.url, "ws://10.0.0.2:3001");
        assert_eq!(config.onebot.api_timeout_secs, 60);
        assert_eq!(config.character_voice.chat_type, 1);
    }

    #[test]
    fn test_custom_response_type_json() {
        let config: CustomTtsConfig = serde_json::from_str(
            r#"{
                "name": "local",
                "endpoint": "http://127.0.0.1:9880/tts",
                "request_template": "{\"text\": \"{{text}}\"}",
                "response_type": { "json": { "audio_field": "audio" } }
            }"#,
        )
        .unwrap();
        assert_eq!(config.method, "POST");
        assert_eq!(
            config.response_type,
            CustomResponseType::Json {
                audio_field: "audio".to_string()
            }
        );
    }

    #[test]
    fn test_validate_rejects_bad_probability() {
        let mut config = PluginConfig::default();
        config.auto_voice.probability = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_openai_key() {
        let mut config = PluginConfig::default();
        config.tts.provider = TtsProviderKind::OpenAI;
        assert!(config.validate().is_err());

        config.tts.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = PluginConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.format, "mp3");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = PluginConfig::default();
        config.send_private = true;
        config.data_dir = dir.path().join("data");
        config.save(&path).unwrap();

        let loaded = PluginConfig::load(&path).unwrap();
        assert!(loaded.send_private);
        assert_eq!(loaded.data_dir, dir.path().join("data"));
    }

    #[test]
    fn test_expand_home() {
        let plain = PathBuf::from("/tmp/recconv");
        assert_eq!(expand_home(&plain), plain);

        let expanded = expand_home(Path::new("~/data"));
        assert!(expanded.ends_with("data"));
        assert!(!expanded.starts_with("~"));
    }
}

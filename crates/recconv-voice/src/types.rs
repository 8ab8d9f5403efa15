//! 语音模块类型定义

use serde::{Deserialize, Serialize};

/// 语音合成选项，未设置的字段由提供商配置补全
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynthesisOptions {
    /// 语音名称
    pub voice: Option<String>,
    /// 语速 (0.25 - 4.0)
    pub speed: Option<f32>,
    /// 输出格式
    pub format: Option<AudioFormat>,
}

/// 合成音频格式
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Wav,
    Ogg,
    Flac,
    Aac,
}

impl AudioFormat {
    pub fn as_extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Flac => "flac",
            AudioFormat::Aac => "aac",
        }
    }

    /// 按扩展名解析，未知格式返回 `None`
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            "ogg" | "opus" => Some(AudioFormat::Ogg),
            "flac" => Some(AudioFormat::Flac),
            "aac" => Some(AudioFormat::Aac),
            _ => None,
        }
    }
}

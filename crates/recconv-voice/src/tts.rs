//! 语音合成 (TTS) 模块

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use recconv_core::{CustomResponseType, CustomTtsConfig, RecConvError, Result, TtsConfig, TtsProviderKind};
use reqwest::Client;

use crate::types::{AudioFormat, SynthesisOptions};

/// 语音合成 Trait
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// 获取提供商名称
    fn provider_name(&self) -> &str;

    /// 将文本转换为语音
    async fn synthesize(&self, text: &str, options: Option<SynthesisOptions>) -> Result<Vec<u8>>;

    /// 将文本转换为语音并保存到文件
    async fn synthesize_to_file(
        &self,
        text: &str,
        output_path: &Path,
        options: Option<SynthesisOptions>,
    ) -> Result<()> {
        let audio_data = self.synthesize(text, options).await?;
        tokio::fs::write(output_path, audio_data)
            .await
            .map_err(|e| RecConvError::Tts(format!("写入音频文件失败: {}", e)))?;
        Ok(())
    }

    /// 检查是否可用
    fn is_available(&self) -> bool;
}

/// OpenAI 兼容的 TTS
pub struct OpenAITts {
    config: TtsConfig,
    client: Client,
}

impl OpenAITts {
    const API_URL: &'static str = "https://api.openai.com/v1/audio/speech";

    pub fn new(config: TtsConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn api_url(&self) -> String {
        self.config
            .base_url
            .as_ref()
            .map(|base| format!("{}/audio/speech", base.trim_end_matches('/')))
            .unwrap_or_else(|| Self::API_URL.to_string())
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| RecConvError::Config("未配置 OpenAI API Key".to_string()))
    }

    fn response_format(format: &AudioFormat) -> &'static str {
        match format {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::Ogg => "opus",
            AudioFormat::Flac => "flac",
            AudioFormat::Aac => "aac",
        }
    }

    fn request_body(&self, text: &str, options: SynthesisOptions) -> serde_json::Value {
        let voice = options.voice.unwrap_or_else(|| self.config.voice.clone());
        let speed = options.speed.unwrap_or(self.config.speed);
        let format = options
            .format
            .or_else(|| AudioFormat::parse(&self.config.format))
            .unwrap_or_default();

        serde_json::json!({
            "model": self.config.model,
            "input": text,
            "voice": voice,
            "speed": speed,
            "response_format": Self::response_format(&format),
        })
    }
}

#[async_trait]
impl TextToSpeech for OpenAITts {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn synthesize(&self, text: &str, options: Option<SynthesisOptions>) -> Result<Vec<u8>> {
        let api_key = self.api_key()?;
        let body = self.request_body(text, options.unwrap_or_default());

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RecConvError::Http(format!("TTS API 请求失败: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RecConvError::Tts(format!(
                "TTS API 错误 ({}): {}",
                status, error_text
            )));
        }

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| RecConvError::Http(format!("读取音频数据失败: {}", e)))?;

        Ok(audio_data.to_vec())
    }

    fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }
}

/// 用户自定义的 HTTP TTS
pub struct CustomTts {
    config: CustomTtsConfig,
    defaults: TtsConfig,
    client: Client,
}

impl CustomTts {
    pub fn new(config: CustomTtsConfig, defaults: TtsConfig) -> Self {
        Self {
            config,
            defaults,
            client: Client::new(),
        }
    }

    fn build_request_body(&self, text: &str, options: &SynthesisOptions) -> String {
        let voice = options.voice.as_deref().unwrap_or(&self.defaults.voice);
        let speed = options.speed.unwrap_or(self.defaults.speed);
        let format = match &options.format {
            Some(f) => f.as_extension(),
            None => self.defaults.format.as_str(),
        };

        self.config
            .request_template
            .replace("{{text}}", &escape_json(text))
            .replace("{{voice}}", voice)
            .replace("{{speed}}", &speed.to_string())
            .replace("{{format}}", format)
    }
}

/// 模板通常是 JSON，文本中的引号和换行需要转义
fn escape_json(text: &str) -> String {
    let quoted = serde_json::Value::String(text.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

#[async_trait]
impl TextToSpeech for CustomTts {
    fn provider_name(&self) -> &str {
        &self.config.name
    }

    async fn synthesize(&self, text: &str, options: Option<SynthesisOptions>) -> Result<Vec<u8>> {
        let opts = options.unwrap_or_default();
        let body = self.build_request_body(text, &opts);
        let method = self.config.method.to_uppercase();

        let mut request = match method.as_str() {
            "GET" => self.client.get(&self.config.endpoint),
            "POST" => self.client.post(&self.config.endpoint),
            "PUT" => self.client.put(&self.config.endpoint),
            _ => {
                return Err(RecConvError::Config(format!(
                    "不支持的 HTTP 方法: {}",
                    self.config.method
                )));
            }
        };

        for (key, value) in &self.config.headers {
            request = request.header(key, value);
        }

        if method != "GET" {
            request = request.header("Content-Type", "application/json").body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RecConvError::Http(format!("请求失败: {}", e)))?;

        if !response.status().is_success() {
            return Err(RecConvError::Tts(format!("API 错误: {}", response.status())));
        }

        match &self.config.response_type {
            CustomResponseType::Binary => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| RecConvError::Http(format!("读取响应失败: {}", e)))?;
                Ok(bytes.to_vec())
            }
            CustomResponseType::Json { audio_field } => {
                let json: serde_json::Value = response
                    .json()
                    .await
                    .map_err(|e| RecConvError::Http(format!("解析 JSON 失败: {}", e)))?;
                decode_audio_field(&json, audio_field)
            }
        }
    }

    fn is_available(&self) -> bool {
        !self.config.endpoint.is_empty()
    }
}

fn decode_audio_field(json: &serde_json::Value, audio_field: &str) -> Result<Vec<u8>> {
    let audio_base64 = json
        .get(audio_field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| RecConvError::Tts(format!("响应中未找到音频字段: {}", audio_field)))?;

    base64::engine::general_purpose::STANDARD
        .decode(audio_base64)
        .map_err(|e| RecConvError::Tts(format!("Base64 解码失败: {}", e)))
}

/// 按配置创建 TTS 实例，未启用时返回 `None`
pub fn create_tts(config: &TtsConfig) -> Option<Arc<dyn TextToSpeech>> {
    match config.provider {
        TtsProviderKind::Disabled => None,
        TtsProviderKind::OpenAI => Some(Arc::new(OpenAITts::new(config.clone()))),
        TtsProviderKind::Custom => config
            .custom
            .clone()
            .map(|custom| Arc::new(CustomTts::new(custom, config.clone())) as Arc<dyn TextToSpeech>),
    }
}

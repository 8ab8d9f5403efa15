//! 统一错误处理

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecConvError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP 请求错误: {0}")]
    Http(String),

    #[error("API 错误: {0}")]
    Api(String),

    #[error("连接错误: {0}")]
    Channel(String),

    #[error("请求超时: {0}")]
    Timeout(String),

    #[error("转码错误: {0}")]
    Transcode(String),

    #[error("语音合成错误: {0}")]
    Tts(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, RecConvError>;

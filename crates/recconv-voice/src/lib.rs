//! Record Converter Voice - 音频处理与语音合成
//!
//! ## 功能
//! - 文件头识别常见音频容器
//! - 调用 ffmpeg 从视频中提取音轨
//! - 语音合成 (TTS)，支持 OpenAI 兼容接口和自定义 HTTP 接口

pub mod sniff;
pub mod transcode;
pub mod tts;
pub mod types;

pub use sniff::*;
pub use transcode::*;
pub use tts::*;
pub use types::*;

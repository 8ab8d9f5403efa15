//! Record Converter Plugin - QQ 语音转换插件
//!
//! 语音转文件、文件/视频转语音、文本转语音，克服 QQ 语音无法转发的问题。
//!
//! ## 指令
//! - `转文件` 引用一条语音，转为文件上传
//! - `转语音` 引用一个文件或视频，转为语音发送
//! - `说 <文本>` 语音合成
//! - `角色说 [角色] <文本>` 使用 QQ AI 声聊角色朗读
//! - `角色列表` 列出可用的 AI 声聊角色

pub mod auto_voice;
pub mod commands;
pub mod context;
pub mod download;
pub mod plugin;
pub mod reply;

pub use auto_voice::*;
pub use commands::{Command, parse_command};
pub use context::*;
pub use download::*;
pub use plugin::*;
pub use reply::*;

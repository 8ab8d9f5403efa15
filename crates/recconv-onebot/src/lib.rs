//! Record Converter OneBot - OneBot v11 协议接入
//!
//! - 消息段与消息事件模型
//! - `OneBotApi` 动作调用抽象
//! - 正向 WebSocket 客户端

pub mod api;
pub mod base;
pub mod client;
pub mod types;

pub use api::*;
pub use base::*;
pub use client::*;
pub use types::*;

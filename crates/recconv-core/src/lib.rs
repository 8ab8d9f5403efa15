//! Record Converter Core - 核心类型
//!
//! 提供统一的错误类型和插件配置。

pub mod config;
pub mod error;

pub use config::*;
pub use error::*;

pub mod init;
pub mod run;

use std::path::PathBuf;

use anyhow::Result;
use recconv_core::PluginConfig;

/// 读取配置文件，未指定路径时使用默认位置
pub fn load_config(path: Option<PathBuf>) -> Result<(PathBuf, PluginConfig)> {
    let path = recconv_core::expand_home(&path.unwrap_or_else(PluginConfig::default_path));
    let config = PluginConfig::load(&path)?;
    Ok((path, config))
}

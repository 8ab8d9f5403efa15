//! Run 命令

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use recconv_onebot::{OneBotClient, serve};
use recconv_plugin::RecordConverterPlugin;
use recconv_voice::is_ffmpeg_available;
use tracing::{info, warn};

use super::load_config;

pub async fn run(config_path: Option<PathBuf>) -> Result<()> {
    let (path, config) = load_config(config_path)?;
    config.validate()?;
    info!("已加载配置: {}", path.display());

    if !is_ffmpeg_available(&config.ffmpeg_path).await {
        warn!("未找到 ffmpeg ({})，视频转语音不可用", config.ffmpeg_path);
    }

    let client = OneBotClient::new(config.onebot.clone());
    let events = client.start();
    let plugin = Arc::new(RecordConverterPlugin::new(config, Arc::new(client)));

    info!("Record Converter 已启动，按 Ctrl+C 退出");
    tokio::select! {
        _ = serve(events, plugin) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("收到退出信号");
        }
    }

    Ok(())
}

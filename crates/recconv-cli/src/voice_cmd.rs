//! 音频工具命令

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use recconv_voice::{
    AudioFormat, SynthesisOptions, create_tts, extract_audio, guess_audio_ext, sniff_video,
};

use crate::commands::load_config;

/// 识别文件头，打印音频扩展名
pub async fn sniff(file: &Path) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("无法读取 {}", file.display()))?;

    match sniff_video(&bytes) {
        Some(ext) => println!("{} (video)", ext),
        None => println!("{}", guess_audio_ext(&bytes)),
    }
    Ok(())
}

pub async fn extract(config_path: Option<PathBuf>, video: &Path, output: &Path) -> Result<()> {
    let (_, config) = load_config(config_path)?;
    let path = extract_audio(&config.ffmpeg_path, video, output).await?;
    println!("✅ 已提取音频: {}", path.display());
    Ok(())
}

pub async fn synthesize(
    config_path: Option<PathBuf>,
    text: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let (_, config) = load_config(config_path)?;
    let Some(tts) = create_tts(&config.tts) else {
        bail!("未配置语音合成服务，请在配置文件中设置 tts.provider");
    };

    let output = output.unwrap_or_else(|| {
        PathBuf::from(format!("output.{}", config.tts.format.trim_start_matches('.')))
    });
    let options = SynthesisOptions {
        voice: Some(config.tts.voice.clone()),
        speed: Some(config.tts.speed),
        format: AudioFormat::parse(&config.tts.format),
    };

    println!("🔊 使用 {} 合成语音...", tts.provider_name());
    tts.synthesize_to_file(text, &output, Some(options)).await?;
    println!("✅ 已保存: {}", output.display());
    Ok(())
}

//! 文件/视频转语音

use recconv_onebot::{MessageEvent, Segment};
use recconv_voice::{extract_audio, guess_audio_ext, is_video_name, sniff_video};
use tracing::{info, warn};

use crate::context::{PluginContext, file_uri, unique_suffix};
use crate::download::download_file;
use crate::reply::Reply;

pub(crate) const NEED_FILE: &str = "请同时引用一条文件消息";
pub(crate) const DOWNLOAD_FAILED: &str = "文件下载失败";

/// 提取视频音轨时使用的容器
const EXTRACTED_AUDIO_EXT: &str = "m4a";

/// 引用的可下载媒体
#[derive(Debug, Clone, PartialEq)]
struct MediaSource {
    url: String,
    is_video: bool,
}

async fn resolve_source(ctx: &PluginContext, segment: &Segment) -> Option<MediaSource> {
    match segment {
        Segment::File {
            file,
            file_id,
            url,
            name,
            ..
        } => {
            let display_name = name.as_deref().unwrap_or(file);
            let url = match (url, file_id) {
                (Some(url), _) => Some(url.clone()),
                (None, Some(file_id)) => match ctx.api.get_file(file_id).await {
                    Ok(info) => info.url.filter(|u| !u.is_empty()),
                    Err(e) => {
                        warn!("获取文件 {} 下载地址失败: {}", file_id, e);
                        None
                    }
                },
                (None, None) => None,
            }?;
            Some(MediaSource {
                url,
                is_video: is_video_name(display_name),
            })
        }
        Segment::Video { file, url } => {
            let url = url
                .clone()
                .or_else(|| file.starts_with("http").then(|| file.clone()))?;
            Some(MediaSource {
                url,
                is_video: true,
            })
        }
        _ => None,
    }
}

/// 将引用的文件或视频转为语音消息
pub async fn file_to_record(ctx: &PluginContext, event: &MessageEvent) -> Vec<Reply> {
    let quoted = match ctx.quoted_message(event).await {
        Ok(Some(quoted)) => quoted,
        Ok(None) => return vec![Reply::notice(NEED_FILE)],
        Err(e) => return vec![Reply::notice(format!("获取引用消息失败: {}", e))],
    };

    let source = match quoted.first_segment() {
        Some(segment) => resolve_source(ctx, segment).await,
        None => None,
    };
    let Some(source) = source else {
        return vec![Reply::notice(NEED_FILE)];
    };

    let bytes = match download_file(&ctx.http, &source.url, ctx.config.force_http_download).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("下载 {} 失败: {}", source.url, e);
            return vec![Reply::notice(DOWNLOAD_FAILED)];
        }
    };

    let data_dir = match ctx.data_dir().await {
        Ok(dir) => dir,
        Err(e) => return vec![Reply::notice(format!("保存文件时出错: {}", e))],
    };
    let stem = format!("{}_{}", ctx.file_stem(event, &quoted).await, unique_suffix());

    let video_ext = sniff_video(&bytes).or(source.is_video.then_some("mp4"));
    let saved = match video_ext {
        Some(ext) => {
            let video_path = data_dir.join(format!("{}.{}", stem, ext));
            if let Err(e) = tokio::fs::write(&video_path, &bytes).await {
                return vec![Reply::notice(format!("保存文件时出错: {}", e))];
            }
            let audio_path = data_dir.join(format!("{}.{}", stem, EXTRACTED_AUDIO_EXT));
            let result =
                extract_audio(&ctx.config.ffmpeg_path, &video_path, &audio_path).await;
            let _ = tokio::fs::remove_file(&video_path).await;
            match result {
                Ok(path) => path,
                Err(e) => {
                    let _ = tokio::fs::remove_file(&audio_path).await;
                    return vec![Reply::notice(format!("提取音频失败: {}", e))];
                }
            }
        }
        None => {
            let path = data_dir.join(format!("{}.{}", stem, guess_audio_ext(&bytes)));
            if let Err(e) = tokio::fs::write(&path, &bytes).await {
                return vec![Reply::notice(format!("保存文件时出错: {}", e))];
            }
            path
        }
    };

    info!("文件已转为语音: {}", saved.display());
    vec![Reply::record(file_uri(&saved))]
}

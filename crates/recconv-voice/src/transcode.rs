//! 调用 ffmpeg 提取视频音轨

use std::path::{Path, PathBuf};
use std::process::Stdio;

use recconv_core::{RecConvError, Result};
use tokio::process::Command;
use tracing::debug;

/// 从视频中提取音轨，不重新编码
///
/// 等价于 `ffmpeg -i <video> -vn -acodec copy -y <out>`，任何非零退出码都视为失败。
pub async fn extract_audio(ffmpeg: &str, video_path: &Path, out_path: &Path) -> Result<PathBuf> {
    let bin = ffmpeg.trim();
    if bin.is_empty() {
        return Err(RecConvError::InvalidInput("ffmpeg 路径为空".to_string()));
    }
    if video_path.as_os_str().is_empty() || out_path.as_os_str().is_empty() {
        return Err(RecConvError::InvalidInput("输入或输出路径为空".to_string()));
    }

    if let Some(parent) = out_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut cmd = Command::new(bin);
    cmd.arg("-i")
        .arg(video_path)
        .arg("-vn")
        .arg("-acodec")
        .arg("copy")
        .arg("-y")
        .arg(out_path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd
        .spawn()
        .map_err(|e| RecConvError::Transcode(format!("无法启动 {}: {}", bin, e)))?;

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| RecConvError::Transcode(format!("{} 执行失败: {}", bin, e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stdout.lines().chain(stderr.lines()) {
        debug!(target: "recconv::ffmpeg", "{}", line);
    }

    if !output.status.success() {
        let tail = stderr.lines().last().unwrap_or_default().trim().to_string();
        return Err(RecConvError::Transcode(if tail.is_empty() {
            format!("ffmpeg exit code: {}", output.status)
        } else {
            format!("ffmpeg exit code: {} ({})", output.status, tail)
        }));
    }

    if !out_path.exists() {
        return Err(RecConvError::Transcode(format!(
            "ffmpeg 未生成输出文件: {}",
            out_path.display()
        )));
    }

    Ok(out_path.to_path_buf())
}

/// 检查 ffmpeg 是否可用
pub async fn is_ffmpeg_available(ffmpeg: &str) -> bool {
    Command::new(ffmpeg)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_transcode_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract_audio(
            "recconv-no-such-ffmpeg",
            &dir.path().join("in.mp4"),
            &dir.path().join("out.m4a"),
        )
        .await;

        match result {
            Err(RecConvError::Transcode(msg)) => assert!(msg.contains("recconv-no-such-ffmpeg")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_binary_is_rejected() {
        let result = extract_audio("  ", Path::new("in.mp4"), Path::new("out.m4a")).await;
        assert!(matches!(result, Err(RecConvError::InvalidInput(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract_audio(
            "false",
            &dir.path().join("in.mp4"),
            &dir.path().join("out.m4a"),
        )
        .await;
        assert!(matches!(result, Err(RecConvError::Transcode(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_zero_exit_without_output_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("sub").join("out.m4a");
        let result = extract_audio("true", &dir.path().join("in.mp4"), &out).await;
        assert!(matches!(result, Err(RecConvError::Transcode(_))));
        assert!(dir.path().join("sub").is_dir());
    }

    /// 写一个只创建输出文件的假 ffmpeg
    #[cfg(unix)]
    fn fake_ffmpeg(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-ffmpeg");
        std::fs::write(&script, "#!/bin/sh\nfor last; do :; done\ntouch \"$last\"\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_returns_out_path() {
        let dir = tempfile::tempdir().unwrap();
        let ffmpeg = fake_ffmpeg(dir.path());
        let out = dir.path().join("out.m4a");

        let result = extract_audio(ffmpeg.to_str().unwrap(), &dir.path().join("in.mp4"), &out)
            .await
            .unwrap();
        assert_eq!(result, out);
        assert!(out.exists());
    }

    #[tokio::test]
    async fn test_ffmpeg_check_missing_binary() {
        assert!(!is_ffmpeg_available("recconv-no-such-ffmpeg").await);
    }
}

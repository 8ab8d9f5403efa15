//! 文件下载

use recconv_core::{RecConvError, Result};
use tracing::debug;

/// QQ 的文件服务器对 https 支持不稳定，按需改写为 http
pub fn normalize_url(url: &str, force_http: bool) -> String {
    match url.strip_prefix("https://") {
        Some(rest) if force_http => format!("http://{}", rest),
        _ => url.to_string(),
    }
}

/// 下载文件内容
pub async fn download_file(client: &reqwest::Client, url: &str, force_http: bool) -> Result<Vec<u8>> {
    let url = normalize_url(url, force_http);
    debug!("下载文件: {}", url);

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| RecConvError::Http(format!("下载失败: {}", e)))?;

    if !response.status().is_success() {
        return Err(RecConvError::Http(format!(
            "下载失败: HTTP {}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| RecConvError::Http(format!("读取响应失败: {}", e)))?;

    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use recconv_testing::http::{serve, serve_bytes};

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("https://example.com/a.mp3", true),
            "http://example.com/a.mp3"
        );
        assert_eq!(
            normalize_url("https://example.com/a.mp3", false),
            "https://example.com/a.mp3"
        );
        assert_eq!(
            normalize_url("http://example.com/https://x", true),
            "http://example.com/https://x"
        );
    }

    #[tokio::test]
    async fn test_download_file() {
        let url = serve_bytes(b"OggS\x00\x02payload".to_vec()).await;
        let bytes = download_file(&reqwest::Client::new(), &url, true).await.unwrap();
        assert_eq!(bytes, b"OggS\x00\x02payload");
    }

    #[tokio::test]
    async fn test_download_error_status() {
        let url = serve(404, b"missing".to_vec()).await;
        let result = download_file(&reqwest::Client::new(), &url, true).await;
        assert!(matches!(result, Err(RecConvError::Http(_))));
    }
}

//! 回复消息

use std::path::{Path, PathBuf};

use recconv_onebot::Segment;

/// 一条待发送的回复
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    /// 提示或错误信息，始终以文本发送
    Notice(String),
    Chain(Vec<Segment>),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Reply::Notice(text.into())
    }

    pub fn record(file: impl Into<String>) -> Self {
        Reply::Chain(vec![Segment::record(file)])
    }

    pub fn to_segments(&self) -> Vec<Segment> {
        match self {
            Reply::Text(text) | Reply::Notice(text) => vec![Segment::text(text.clone())],
            Reply::Chain(segments) => segments.clone(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(text) | Reply::Notice(text) => Some(text),
            Reply::Chain(_) => None,
        }
    }

    /// 语音段引用的、位于 `dir` 下的本地文件
    pub fn local_files_in(&self, dir: &Path) -> Vec<PathBuf> {
        let Reply::Chain(segments) = self else {
            return Vec::new();
        };
        segments
            .iter()
            .filter_map(|seg| match seg {
                Segment::Record { file, .. } => file.strip_prefix("file://").map(PathBuf::from),
                _ => None,
            })
            .filter(|path| path.starts_with(dir))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_is_sent_as_text() {
        let notice = Reply::notice("文件下载失败");
        assert_eq!(notice.as_text(), Some("文件下载失败"));
        assert_eq!(notice.to_segments(), vec![Segment::text("文件下载失败")]);
        assert_ne!(notice, Reply::text("文件下载失败"));
    }

    #[test]
    fn test_local_files_in() {
        let dir = Path::new("/data/recconv");
        let reply = Reply::Chain(vec![
            Segment::record("file:///data/recconv/a.mp3"),
            Segment::record("file:///elsewhere/b.mp3"),
            Segment::record("http://voice.example.com/c.silk"),
        ]);
        assert_eq!(
            reply.local_files_in(dir),
            vec![PathBuf::from("/data/recconv/a.mp3")]
        );
        assert!(Reply::text("hi").local_files_in(dir).is_empty());
    }
}

//! 根据文件头识别音频/视频容器

use std::path::Path;

/// 可识别的音频容器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioContainer {
    Mp3,
    Wav,
    Ogg,
    Flac,
    Aac,
}

impl AudioContainer {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioContainer::Mp3 => "mp3",
            AudioContainer::Wav => "wav",
            AudioContainer::Ogg => "ogg",
            AudioContainer::Flac => "flac",
            AudioContainer::Aac => "aac",
        }
    }
}

/// 无法识别时使用的扩展名
pub const UNKNOWN_EXTENSION: &str = "dat";

const HEADER_LEN: usize = 16;

const MAGIC_TABLE: &[(&[u8], AudioContainer)] = &[
    (b"ID3", AudioContainer::Mp3),
    (b"\xff\xfb", AudioContainer::Mp3),
    (b"RIFF", AudioContainer::Wav),
    (b"OggS", AudioContainer::Ogg),
    (b"fLaC", AudioContainer::Flac),
    (b"\xff\xf1", AudioContainer::Aac),
    (b"\xff\xf9", AudioContainer::Aac),
];

/// 识别音频容器，只检查前 16 字节
pub fn sniff_audio(bytes: &[u8]) -> Option<AudioContainer> {
    let header = &bytes[..bytes.len().min(HEADER_LEN)];

    for (magic, container) in MAGIC_TABLE {
        if !header.starts_with(magic) {
            continue;
        }
        // RIFF 还需要在偏移 8 处确认 WAVE 标记
        if *container == AudioContainer::Wav && header.get(8..12) != Some(b"WAVE".as_slice()) {
            continue;
        }
        return Some(*container);
    }

    None
}

/// 猜测音频扩展名 (不含 `.`)，未识别时返回 `dat`
pub fn guess_audio_ext(bytes: &[u8]) -> &'static str {
    sniff_audio(bytes)
        .map(|c| c.extension())
        .unwrap_or(UNKNOWN_EXTENSION)
}

/// 识别常见视频容器，返回建议扩展名
pub fn sniff_video(bytes: &[u8]) -> Option<&'static str> {
    let header = &bytes[..bytes.len().min(HEADER_LEN)];

    if header.get(4..8) == Some(b"ftyp".as_slice()) {
        return Some("mp4");
    }
    if header.starts_with(b"\x1a\x45\xdf\xa3") {
        return Some("mkv");
    }
    if header.starts_with(b"FLV") {
        return Some("flv");
    }
    if header.starts_with(b"RIFF") && header.get(8..12) == Some(b"AVI ".as_slice()) {
        return Some("avi");
    }

    None
}

pub fn looks_like_video(bytes: &[u8]) -> bool {
    sniff_video(bytes).is_some()
}

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "webm", "avi", "flv", "m4v", "3gp"];

/// 根据文件名判断是否为视频
pub fn is_video_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            VIDEO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

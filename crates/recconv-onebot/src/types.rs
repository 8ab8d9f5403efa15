//! OneBot v11 消息类型定义

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// 消息段
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text {
        text: String,
    },
    Reply {
        id: String,
    },
    At {
        qq: String,
    },
    Record {
        file: String,
        url: Option<String>,
        path: Option<String>,
    },
    File {
        file: String,
        file_id: Option<String>,
        url: Option<String>,
        name: Option<String>,
        size: Option<u64>,
    },
    Video {
        file: String,
        url: Option<String>,
    },
    Image {
        file: String,
        url: Option<String>,
    },
    Other {
        kind: String,
        data: Value,
    },
}

/// 读取字符串字段，兼容数字形式的 id
fn str_field(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn i64_field(data: &Value, key: &str) -> Option<i64> {
    match data.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

impl Segment {
    pub fn text(text: impl Into<String>) -> Self {
        Segment::Text { text: text.into() }
    }

    pub fn record(file: impl Into<String>) -> Self {
        Segment::Record {
            file: file.into(),
            url: None,
            path: None,
        }
    }

    /// 从 `{ "type": ..., "data": {...} }` 解析
    pub fn from_value(value: &Value) -> Option<Self> {
        let kind = value.get("type")?.as_str()?;
        let data = value.get("data").cloned().unwrap_or(Value::Null);

        let segment = match kind {
            "text" => Segment::Text {
                text: data
                    .get("text")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
            },
            "reply" => Segment::Reply {
                id: str_field(&data, "id")?,
            },
            "at" => Segment::At {
                qq: str_field(&data, "qq")?,
            },
            "record" => Segment::Record {
                file: str_field(&data, "file").unwrap_or_default(),
                url: str_field(&data, "url"),
                path: str_field(&data, "path"),
            },
            "file" => Segment::File {
                file: str_field(&data, "file").unwrap_or_default(),
                file_id: str_field(&data, "file_id"),
                url: str_field(&data, "url"),
                name: str_field(&data, "name").or_else(|| str_field(&data, "file_name")),
                size: i64_field(&data, "file_size").and_then(|s| u64::try_from(s).ok()),
            },
            "video" => Segment::Video {
                file: str_field(&data, "file").unwrap_or_default(),
                url: str_field(&data, "url"),
            },
            "image" => Segment::Image {
                file: str_field(&data, "file").unwrap_or_default(),
                url: str_field(&data, "url"),
            },
            other => Segment::Other {
                kind: other.to_string(),
                data,
            },
        };

        Some(segment)
    }

    /// 转为发送用的 JSON
    pub fn to_value(&self) -> Value {
        match self {
            Segment::Text { text } => json!({ "type": "text", "data": { "text": text } }),
            Segment::Reply { id } => json!({ "type": "reply", "data": { "id": id } }),
            Segment::At { qq } => json!({ "type": "at", "data": { "qq": qq } }),
            Segment::Record { file, .. } => json!({ "type": "record", "data": { "file": file } }),
            Segment::File { file, name, .. } => {
                let mut data = json!({ "file": file });
                if let Some(name) = name {
                    data["name"] = json!(name);
                }
                json!({ "type": "file", "data": data })
            }
            Segment::Video { file, .. } => json!({ "type": "video", "data": { "file": file } }),
            Segment::Image { file, .. } => json!({ "type": "image", "data": { "file": file } }),
            Segment::Other { kind, data } => json!({ "type": kind, "data": data }),
        }
    }
}

/// 解析消息字段，字符串形式的消息视为单个文本段
pub fn parse_message(value: &Value) -> Vec<Segment> {
    match value {
        Value::Array(items) => items.iter().filter_map(Segment::from_value).collect(),
        Value::String(s) => vec![Segment::text(s.clone())],
        _ => Vec::new(),
    }
}

/// 会话类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatType {
    Group(i64),
    Private,
}

/// 发送者信息
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Sender {
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub card: Option<String>,
}

impl Sender {
    /// 群名片优先，其次昵称
    pub fn display_name(&self) -> Option<&str> {
        self.card
            .as_deref()
            .filter(|c| !c.is_empty())
            .or(Some(self.nickname.as_str()).filter(|n| !n.is_empty()))
    }
}

/// 消息事件
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    pub message_id: String,
    pub chat: ChatType,
    pub user_id: i64,
    pub self_id: i64,
    pub sender: Sender,
    pub segments: Vec<Segment>,
    pub raw_message: String,
}

impl MessageEvent {
    /// 解析 `post_type` 为 `message` 的上报，其余返回 `None`
    pub fn from_value(value: &Value) -> Option<Self> {
        if value.get("post_type")?.as_str()? != "message" {
            return None;
        }

        let chat = match value.get("message_type")?.as_str()? {
            "group" => ChatType::Group(i64_field(value, "group_id")?),
            "private" => ChatType::Private,
            _ => return None,
        };

        let sender = value
            .get("sender")
            .cloned()
            .and_then(|s| serde_json::from_value(s).ok())
            .unwrap_or_default();

        Some(Self {
            message_id: str_field(value, "message_id").unwrap_or_default(),
            chat,
            user_id: i64_field(value, "user_id")?,
            self_id: i64_field(value, "self_id").unwrap_or_default(),
            sender,
            segments: value.get("message").map(parse_message).unwrap_or_default(),
            raw_message: value
                .get("raw_message")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        })
    }

    pub fn group_id(&self) -> Option<i64> {
        match self.chat {
            ChatType::Group(id) => Some(id),
            ChatType::Private => None,
        }
    }

    pub fn is_private(&self) -> bool {
        self.chat == ChatType::Private
    }

    /// 消息中第一个引用段的消息 id
    pub fn reply_id(&self) -> Option<&str> {
        self.segments.iter().find_map(|seg| match seg {
            Segment::Reply { id } => Some(id.as_str()),
            _ => None,
        })
    }

    /// 拼接所有文本段
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|seg| match seg {
                Segment::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// 被引用的消息
#[derive(Debug, Clone, PartialEq)]
pub struct QuotedMessage {
    pub message_id: String,
    pub sender_id: Option<i64>,
    pub segments: Vec<Segment>,
}

impl QuotedMessage {
    /// 解析 `get_msg` 的返回数据
    pub fn from_value(value: &Value) -> Self {
        let sender_id = value
            .get("sender")
            .and_then(|s| i64_field(s, "user_id"))
            .or_else(|| i64_field(value, "user_id"));

        Self {
            message_id: str_field(value, "message_id").unwrap_or_default(),
            sender_id,
            segments: value.get("message").map(parse_message).unwrap_or_default(),
        }
    }

    pub fn first_segment(&self) -> Option<&Segment> {
        self.segments.first()
    }
}

/// `get_record` 返回的本地文件
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordFile {
    #[serde(default)]
    pub file: String,
}

/// `get_file` 返回的文件信息
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileInfo {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<Value>,
}

/// AI 声聊角色
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AiCharacter {
    pub character_id: String,
    pub character_name: String,
    #[serde(default)]
    pub preview_url: Option<String>,
}

/// 按分类分组的 AI 声聊角色
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AiCharacterGroup {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub characters: Vec<AiCharacter>,
}

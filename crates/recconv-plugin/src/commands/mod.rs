//! 指令解析与处理

mod file_to_record;
mod record_to_file;
mod speak;

pub use file_to_record::file_to_record;
pub use record_to_file::record_to_file;
pub use speak::{character_speak, list_characters, speak, synthesize_voice};

/// 已注册的指令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `转文件`
    RecordToFile,
    /// `转语音`
    FileToRecord,
    /// `说 <文本>`
    Speak(&'a str),
    /// `角色说 [角色] <文本>`
    CharacterSpeak(&'a str),
    /// `角色列表`
    ListCharacters,
}

impl Command<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Command::RecordToFile => "转文件",
            Command::FileToRecord => "转语音",
            Command::Speak(_) => "说",
            Command::CharacterSpeak(_) => "角色说",
            Command::ListCharacters => "角色列表",
        }
    }
}

/// 从消息文本中解析指令，可带 `/` 前缀
pub fn parse_command(text: &str) -> Option<Command<'_>> {
    let text = text.trim();
    let text = text.strip_prefix('/').unwrap_or(text);

    let (word, rest) = match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    };

    match word {
        "转文件" => Some(Command::RecordToFile),
        "转语音" => Some(Command::FileToRecord),
        "说" => Some(Command::Speak(rest)),
        "角色说" => Some(Command::CharacterSpeak(rest)),
        "角色列表" => Some(Command::ListCharacters),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("转文件"), Some(Command::RecordToFile));
        assert_eq!(parse_command(" /转语音 "), Some(Command::FileToRecord));
        assert_eq!(parse_command("说 你好 世界"), Some(Command::Speak("你好 世界")));
        assert_eq!(parse_command("说"), Some(Command::Speak("")));
        assert_eq!(
            parse_command("角色说 小美 早上好"),
            Some(Command::CharacterSpeak("小美 早上好"))
        );
        assert_eq!(parse_command("角色列表"), Some(Command::ListCharacters));
    }

    #[test]
    fn test_parse_command_rejects_other_text() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("说明书"), None);
        assert_eq!(parse_command("hello 转文件"), None);
    }

    #[test]
    fn test_command_name() {
        assert_eq!(Command::Speak("x").name(), "说");
    }
}

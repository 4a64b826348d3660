//! 入站帧分类
//!
//! 服务端下行只有两类文本帧:
//! - `"ACTIVE_USERS: " + JSON 字符串数组` — 在线用户列表全量更新
//! - 其余任意文本 — 聊天消息, 原样透传
//!
//! 前缀标记是没有长度字段和转义的最小文本协议, 恰好以保留前缀开头的
//! 聊天文本会被误分类为在线用户帧; 这是协议本身的限制, 解码器不做防御。

use crate::constants::PRESENCE_PREFIX;
use crate::error::{ProtocolError, Result};

/// 解码后的入站事件
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// 在线用户列表全量更新
    PresenceUpdate(Vec<String>),
    /// 聊天消息文本（未裁剪的原始帧）
    ChatText(String),
}

/// 将一条原始入站文本帧分类为事件
///
/// 每条帧恰好归入一类。在线用户帧解析失败时返回
/// [`ProtocolError::MalformedPresence`], 调用方应丢弃该帧并保持已有状态不变。
pub fn decode_frame(frame: &str) -> Result<InboundEvent> {
    if let Some(payload) = frame.strip_prefix(PRESENCE_PREFIX) {
        let users: Vec<String> =
            serde_json::from_str(payload).map_err(ProtocolError::MalformedPresence)?;
        return Ok(InboundEvent::PresenceUpdate(users));
    }
    Ok(InboundEvent::ChatText(frame.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_presence_update() {
        let event = decode_frame(r#"ACTIVE_USERS: ["alice","bob"]"#).unwrap();
        assert_eq!(
            event,
            InboundEvent::PresenceUpdate(vec!["alice".to_string(), "bob".to_string()])
        );
    }

    #[test]
    fn test_decode_empty_presence_update() {
        let event = decode_frame("ACTIVE_USERS: []").unwrap();
        assert_eq!(event, InboundEvent::PresenceUpdate(Vec::new()));
    }

    #[test]
    fn test_decode_chat_text_verbatim() {
        let frame = "alice (12:30:05 01.02.2025): hello there";
        let event = decode_frame(frame).unwrap();
        assert_eq!(event, InboundEvent::ChatText(frame.to_string()));
    }

    #[test]
    fn test_prefix_elsewhere_is_chat_text() {
        // 保留前缀出现在帧中间不触发分类
        let frame = "no ACTIVE_USERS: here";
        let event = decode_frame(frame).unwrap();
        assert_eq!(event, InboundEvent::ChatText(frame.to_string()));
    }

    #[test]
    fn test_prefix_requires_trailing_space() {
        let frame = r#"ACTIVE_USERS:["alice"]"#;
        let event = decode_frame(frame).unwrap();
        assert_eq!(event, InboundEvent::ChatText(frame.to_string()));
    }

    #[test]
    fn test_chat_text_not_trimmed() {
        let frame = "  spaced out  ";
        let event = decode_frame(frame).unwrap();
        assert_eq!(event, InboundEvent::ChatText(frame.to_string()));
    }

    #[test]
    fn test_malformed_presence_payload() {
        let err = decode_frame("ACTIVE_USERS: not-json").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedPresence(_)));
    }

    #[test]
    fn test_presence_payload_wrong_shape() {
        // 合法 JSON 但不是字符串数组, 同样按格式错误处理
        let err = decode_frame(r#"ACTIVE_USERS: {"alice":1}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedPresence(_)));
    }
}

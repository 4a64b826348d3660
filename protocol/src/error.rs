//! 错误类型定义

use thiserror::Error;

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 在线用户帧负载不是合法的 JSON 字符串数组
    #[error("Malformed presence frame: {0}")]
    MalformedPresence(#[source] serde_json::Error),

    /// WebSocket 握手或传输失败
    #[error("WebSocket error: {0}")]
    Ws(#[from] tokio_tungstenite::tungstenite::Error),

    /// 握手请求无法构造或目标不可达
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// 连接超时
    #[error("Connection timeout")]
    ConnectionTimeout,

    /// 连接已关闭
    #[error("Connection closed")]
    ConnectionClosed,
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;

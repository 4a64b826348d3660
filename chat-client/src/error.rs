//! 客户端错误类型定义

use protocol::ProtocolError;
use thiserror::Error;

use crate::session::SessionState;

/// 会话错误类型
///
/// 所有错误都以值的形式同步返回给调用方, 核心内部不做任何自动重试。
#[derive(Error, Debug)]
pub enum SessionError {
    /// 用户名或密码错误 (401)
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// 认证服务返回了意外状态
    #[error("Auth service error: status {status}")]
    AuthService { status: u16 },

    /// 注册失败（服务端不区分具体原因）
    #[error("Registration failed: status {status}")]
    RegistrationFailed { status: u16 },

    /// 已有连接尝试在进行中
    #[error("Connect attempt already in progress (state: {state})")]
    AlreadyConnecting { state: SessionState },

    /// 当前状态下不允许收发消息
    #[error("Not connected (state: {state})")]
    NotConnected { state: SessionState },

    /// 连接已丢失, 本会话实例到此为止
    #[error("Connection lost")]
    ConnectionLost,

    /// 凭据不完整
    #[error("Username and password are required")]
    MissingCredentials,

    /// 协议层错误
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// HTTP 请求失败
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

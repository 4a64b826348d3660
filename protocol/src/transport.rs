//! 传输层抽象
//!
//! 提供 Transport trait 使会话层与具体传输实现解耦,
//! 测试中可以用进程内传输替换真实的 WebSocket 连接。

use std::time::Duration;

use crate::error::Result;
use crate::CONNECT_TIMEOUT;

/// 传输层配置
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// 连接超时时间
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: CONNECT_TIMEOUT,
        }
    }
}

/// 连接请求
///
/// 凭据随握手一起提交（Authorization 头）, 不作为 URL 查询参数明文携带。
#[derive(Clone, Debug)]
pub struct ConnectRequest {
    /// 连接目标, 如 "ws://host:port/ws"
    pub url: String,
    /// 用户名
    pub username: String,
    /// 密码
    pub password: String,
}

impl ConnectRequest {
    /// 创建连接请求
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

/// 入站帧读取端
pub trait FrameSource: Send {
    /// 读取下一条文本帧
    ///
    /// 对端正常关闭时返回 `Ok(None)`。
    fn recv(&mut self) -> impl std::future::Future<Output = Result<Option<String>>> + Send;
}

/// 出站帧写入端
pub trait FrameSink: Send {
    /// 将文本原样作为单独一帧发送
    fn send(&mut self, text: &str) -> impl std::future::Future<Output = Result<()>> + Send;

    /// 通知对端关闭并结束写入端
    fn close(&mut self) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 传输层抽象 trait
///
/// 定义客户端建立连接和读写分离的基本操作。
/// 通过实现此 trait, 可以支持不同的传输方式（WebSocket、进程内通道等）。
pub trait Transport: Send + Sized {
    /// 读取端类型
    type Reader: FrameSource;
    /// 写入端类型
    type Writer: FrameSink;

    /// 建立连接并完成握手（客户端使用）
    ///
    /// # Arguments
    /// * `request` - 连接目标与握手凭据
    /// * `config` - 传输配置
    fn connect(
        request: ConnectRequest,
        config: &TransportConfig,
    ) -> impl std::future::Future<Output = Result<Self>> + Send;

    /// 分离读写端
    ///
    /// 将连接分离为独立的读取端和写入端, 便于并发读写。
    fn split(self) -> (Self::Reader, Self::Writer);
}

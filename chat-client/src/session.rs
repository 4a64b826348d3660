//! 会话管理
//!
//! 负责 登录 -> 建立连接 的握手流程、会话状态机, 以及把入站帧
//! 路由到在线用户列表或消息回调。单个会话实例同一时刻只允许
//! 一次连接尝试, 传输句柄由会话独占持有。

use std::fmt;

use protocol::{
    decode_frame, ConnectRequest, FrameSink, FrameSource, InboundEvent, Transport,
    TransportConfig, WS_PATH,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::auth::{AuthClient, Credentials};
use crate::error::SessionError;
use crate::presence::PresenceList;
use crate::sink::{MessageSink, PresenceSink};

/// 会话状态
///
/// 状态只向前推进; 仅 [`Session::reset`] 允许 Closed -> LoggedOut 回到起点。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// 未登录
    LoggedOut,
    /// 登录请求已发出, 等待认证与握手完成
    AuthPending,
    /// 连接已建立, 可收发消息
    Open,
    /// 连接已关闭
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::LoggedOut => "logged-out",
            SessionState::AuthPending => "auth-pending",
            SessionState::Open => "open",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// 调用方发给会话循环的命令
#[derive(Debug)]
pub enum SessionCommand {
    /// 发送聊天消息
    Send(String),
    /// 主动断开连接
    Disconnect,
}

/// 会话配置
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// 认证服务地址, 如 "http://127.0.0.1:8080"
    pub auth_base_url: String,
    /// 实时连接目标, 如 "ws://127.0.0.1:8080/ws"
    pub ws_url: String,
    /// 传输层配置
    pub transport: TransportConfig,
}

impl SessionConfig {
    /// 由服务器地址推出认证与实时连接目标
    pub fn for_addr(addr: &str) -> Self {
        Self {
            auth_base_url: format!("http://{addr}"),
            ws_url: format!("ws://{addr}{WS_PATH}"),
            transport: TransportConfig::default(),
        }
    }
}

/// 聊天会话
pub struct Session<T: Transport> {
    auth: AuthClient,
    config: SessionConfig,
    state: SessionState,
    presence: PresenceList,
    local_username: Option<String>,
    reader: Option<T::Reader>,
    writer: Option<T::Writer>,
}

impl<T: Transport> Session<T> {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            auth: AuthClient::new(config.auth_base_url.clone()),
            config,
            state: SessionState::LoggedOut,
            presence: PresenceList::new(),
            local_username: None,
            reader: None,
            writer: None,
        }
    }

    /// 当前会话状态
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// 当前在线用户快照
    pub fn presence(&self) -> &[String] {
        self.presence.snapshot()
    }

    /// 认证服务客户端, 注册流程直接使用
    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    /// 登录并建立实时连接
    ///
    /// 成功返回即表示连接就绪, 会话进入 Open 状态。认证失败或握手
    /// 失败时回退到 LoggedOut, 不留下半开的连接。
    pub async fn connect(&mut self, credentials: &Credentials) -> Result<(), SessionError> {
        match self.state {
            SessionState::AuthPending | SessionState::Open => {
                return Err(SessionError::AlreadyConnecting { state: self.state });
            }
            SessionState::LoggedOut | SessionState::Closed => {}
        }
        credentials.validate()?;

        self.state = SessionState::AuthPending;
        if let Err(e) = self.auth.login(credentials).await {
            self.state = SessionState::LoggedOut;
            return Err(e);
        }

        // 凭据随握手头提交, 不拼进连接 URL
        let request = ConnectRequest::new(
            self.config.ws_url.clone(),
            credentials.username.clone(),
            credentials.password.clone(),
        );
        let transport = match T::connect(request, &self.config.transport).await {
            Ok(transport) => transport,
            Err(e) => {
                self.state = SessionState::LoggedOut;
                return Err(e.into());
            }
        };

        let (reader, writer) = transport.split();
        self.reader = Some(reader);
        self.writer = Some(writer);
        self.local_username = Some(credentials.username.clone());
        self.state = SessionState::Open;
        info!(username = %credentials.username, "session open");
        Ok(())
    }

    /// 将文本原样作为单独一帧发出
    ///
    /// 即发即弃: 不重试、不缓冲、不等待回执。写入失败视为连接丢失。
    pub async fn send(&mut self, text: &str) -> Result<(), SessionError> {
        if self.state != SessionState::Open {
            return Err(SessionError::NotConnected { state: self.state });
        }
        let Some(writer) = self.writer.as_mut() else {
            return Err(SessionError::NotConnected { state: self.state });
        };
        if let Err(e) = writer.send(text).await {
            warn!("send failed, marking connection lost: {e}");
            self.mark_closed();
            return Err(SessionError::ConnectionLost);
        }
        Ok(())
    }

    /// 处理一条入站帧: 解码并路由到对应回调
    ///
    /// 对于帧序列, 解码与应用是一个原子步骤。格式错误的在线用户帧
    /// 被丢弃并同步报告, 已有列表保持不变。
    pub fn apply_frame<M, P>(
        &mut self,
        frame: &str,
        messages: &mut M,
        presence: &mut P,
    ) -> Result<(), SessionError>
    where
        M: MessageSink,
        P: PresenceSink,
    {
        if self.state != SessionState::Open {
            return Err(SessionError::NotConnected { state: self.state });
        }
        match decode_frame(frame) {
            Ok(InboundEvent::PresenceUpdate(users)) => {
                let local = self.local_username.as_deref().unwrap_or_default();
                self.presence.apply_update(users, local);
                presence.on_presence(self.presence.snapshot());
                Ok(())
            }
            Ok(InboundEvent::ChatText(text)) => {
                messages.on_message(&text);
                Ok(())
            }
            Err(e) => {
                warn!("dropping malformed presence frame: {e}");
                Err(e.into())
            }
        }
    }

    /// 会话主循环: 交替处理入站帧与调用方命令
    ///
    /// 每条帧完整处理后才取下一条。连接丢失返回
    /// [`SessionError::ConnectionLost`], 是否重连由调用方决定;
    /// Disconnect 命令触发正常关闭并返回 Ok。
    pub async fn run<M, P>(
        &mut self,
        commands: &mut mpsc::Receiver<SessionCommand>,
        messages: &mut M,
        presence: &mut P,
    ) -> Result<(), SessionError>
    where
        M: MessageSink,
        P: PresenceSink,
    {
        let Some(mut reader) = self.reader.take() else {
            return Err(SessionError::NotConnected { state: self.state });
        };

        loop {
            tokio::select! {
                inbound = reader.recv() => {
                    match inbound {
                        Ok(Some(frame)) => {
                            // 格式错误的帧就地丢弃, 循环继续
                            if let Err(e) = self.apply_frame(&frame, messages, presence) {
                                debug!("frame dropped: {e}");
                            }
                        }
                        Ok(None) => {
                            info!("server closed the connection");
                            self.mark_closed();
                            return Err(SessionError::ConnectionLost);
                        }
                        Err(e) => {
                            warn!("transport error: {e}");
                            self.mark_closed();
                            return Err(SessionError::ConnectionLost);
                        }
                    }
                }
                command = commands.recv() => {
                    match command {
                        Some(SessionCommand::Send(text)) => {
                            self.send(&text).await?;
                        }
                        Some(SessionCommand::Disconnect) | None => {
                            self.disconnect().await;
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// 主动断开连接
    ///
    /// 关闭传输、置为 Closed 并清空在线列表; 丢弃一切在途状态。
    pub async fn disconnect(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.close().await {
                debug!("close not delivered: {e}");
            }
        }
        self.mark_closed();
    }

    /// 显式复位, 仅允许从 Closed 回到 LoggedOut
    #[allow(dead_code)]
    pub fn reset(&mut self) {
        if self.state == SessionState::Closed {
            self.state = SessionState::LoggedOut;
            self.local_username = None;
        }
    }

    fn mark_closed(&mut self) {
        self.state = SessionState::Closed;
        self.presence.reset();
        self.reader = None;
        self.writer = None;
    }
}

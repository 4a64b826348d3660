//! WebSocket 传输实现
//!
//! 基于 tokio-tungstenite 的客户端传输。协议层的 ping/pong 由
//! tungstenite 在读写时自动应答, 上层只看到文本帧。

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::{HeaderValue, Request};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::error::{ProtocolError, Result};
use crate::transport::{ConnectRequest, FrameSink, FrameSource, Transport, TransportConfig};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// 构造握手请求
///
/// 凭据编码进 `Authorization: Basic` 头, 不出现在 URL 中。
fn upgrade_request(request: &ConnectRequest) -> Result<Request<()>> {
    let mut upgrade = request
        .url
        .as_str()
        .into_client_request()
        .map_err(ProtocolError::Ws)?;
    let token = STANDARD.encode(format!("{}:{}", request.username, request.password));
    let value = HeaderValue::from_str(&format!("Basic {token}"))
        .map_err(|e| ProtocolError::Handshake(e.to_string()))?;
    upgrade.headers_mut().insert(AUTHORIZATION, value);
    Ok(upgrade)
}

/// WebSocket 传输实现
pub struct WsTransport {
    stream: WsStream,
}

impl Transport for WsTransport {
    type Reader = WsReader;
    type Writer = WsWriter;

    async fn connect(request: ConnectRequest, config: &TransportConfig) -> Result<Self> {
        let upgrade = upgrade_request(&request)?;

        // 带超时的握手
        let (stream, response) = timeout(config.connect_timeout, connect_async(upgrade))
            .await
            .map_err(|_| ProtocolError::ConnectionTimeout)??;
        debug!(status = %response.status(), "websocket handshake complete");

        Ok(Self { stream })
    }

    fn split(self) -> (WsReader, WsWriter) {
        let (sink, stream) = self.stream.split();
        (WsReader { stream }, WsWriter { sink })
    }
}

/// WebSocket 帧读取端
pub struct WsReader {
    stream: SplitStream<WsStream>,
}

impl FrameSource for WsReader {
    async fn recv(&mut self) -> Result<Option<String>> {
        while let Some(message) = self.stream.next().await {
            match message {
                Ok(Message::Text(text)) => return Ok(Some(text.to_string())),
                Ok(Message::Close(_)) => return Ok(None),
                // 控制帧与二进制帧对上层不可见
                Ok(_) => continue,
                Err(
                    tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed,
                ) => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }
}

/// WebSocket 帧写入端
pub struct WsWriter {
    sink: SplitSink<WsStream, Message>,
}

impl FrameSink for WsWriter {
    async fn send(&mut self, text: &str) -> Result<()> {
        self.sink.send(Message::Text(text.into())).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        match self.sink.send(Message::Close(None)).await {
            Ok(())
            | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upgrade_request_carries_basic_auth() {
        let request = ConnectRequest::new("ws://127.0.0.1:8080/ws", "alice", "secret");
        let upgrade = upgrade_request(&request).unwrap();

        let auth = upgrade.headers().get(AUTHORIZATION).unwrap();
        let expected = format!("Basic {}", STANDARD.encode("alice:secret"));
        assert_eq!(auth.to_str().unwrap(), expected);
        // URL 中不携带凭据
        assert_eq!(upgrade.uri().query(), None);
    }

    #[test]
    fn test_upgrade_request_rejects_bad_url() {
        let request = ConnectRequest::new("not a url", "alice", "secret");
        assert!(upgrade_request(&request).is_err());
    }
}

//! 进程内传输实现
//!
//! 用成对的 mpsc 通道模拟一条双工文本帧连接, 让会话层测试在不开
//! 真实网络端口的情况下驱动完整的连接生命周期。监听器按目标名注册,
//! 对同名目标的 connect 会被路由过去。

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use tokio::sync::mpsc;

use crate::error::{ProtocolError, Result};
use crate::transport::{ConnectRequest, FrameSink, FrameSource, Transport, TransportConfig};

/// 单方向通道的缓冲帧数
const CHANNEL_CAPACITY: usize = 32;

type Registry = Mutex<HashMap<String, mpsc::Sender<MemPeer>>>;

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// 进程内监听器（模拟服务端）
pub struct MemListener {
    target: String,
    incoming: mpsc::Receiver<MemPeer>,
}

impl MemListener {
    /// 以目标名注册监听器
    ///
    /// 同名重复绑定会顶替旧监听器。
    pub fn bind(target: &str) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        registry()
            .lock()
            .expect("mem transport registry poisoned")
            .insert(target.to_string(), tx);
        Self {
            target: target.to_string(),
            incoming: rx,
        }
    }

    /// 接受一个新连接, 返回服务端侧的对端句柄
    pub async fn accept(&mut self) -> Option<MemPeer> {
        self.incoming.recv().await
    }
}

impl Drop for MemListener {
    fn drop(&mut self) {
        registry()
            .lock()
            .expect("mem transport registry poisoned")
            .remove(&self.target);
    }
}

/// 进程内连接的服务端侧对端
///
/// drop 对端即模拟连接断开。
pub struct MemPeer {
    tx: mpsc::Sender<String>,
    rx: mpsc::Receiver<String>,
}

impl MemPeer {
    /// 向客户端下发一条帧
    pub async fn send(&self, frame: &str) -> Result<()> {
        self.tx
            .send(frame.to_string())
            .await
            .map_err(|_| ProtocolError::ConnectionClosed)
    }

    /// 接收客户端发出的下一条帧, 客户端关闭后返回 `None`
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

/// 进程内传输实现
#[derive(Debug)]
pub struct MemTransport {
    reader: MemReader,
    writer: MemWriter,
}

impl Transport for MemTransport {
    type Reader = MemReader;
    type Writer = MemWriter;

    async fn connect(request: ConnectRequest, _config: &TransportConfig) -> Result<Self> {
        let accept_tx = registry()
            .lock()
            .expect("mem transport registry poisoned")
            .get(&request.url)
            .cloned();
        let Some(accept_tx) = accept_tx else {
            return Err(ProtocolError::Handshake(format!(
                "no listener bound for {}",
                request.url
            )));
        };

        let (down_tx, down_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (up_tx, up_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let peer = MemPeer {
            tx: down_tx,
            rx: up_rx,
        };
        accept_tx
            .send(peer)
            .await
            .map_err(|_| ProtocolError::ConnectionClosed)?;

        Ok(Self {
            reader: MemReader { rx: down_rx },
            writer: MemWriter { tx: up_tx },
        })
    }

    fn split(self) -> (MemReader, MemWriter) {
        (self.reader, self.writer)
    }
}

/// 进程内帧读取端
#[derive(Debug)]
pub struct MemReader {
    rx: mpsc::Receiver<String>,
}

impl FrameSource for MemReader {
    async fn recv(&mut self) -> Result<Option<String>> {
        // 通道关闭即对端断开
        Ok(self.rx.recv().await)
    }
}

/// 进程内帧写入端
#[derive(Debug)]
pub struct MemWriter {
    tx: mpsc::Sender<String>,
}

impl FrameSink for MemWriter {
    async fn send(&mut self, text: &str) -> Result<()> {
        self.tx
            .send(text.to_string())
            .await
            .map_err(|_| ProtocolError::ConnectionClosed)
    }

    async fn close(&mut self) -> Result<()> {
        // drop 写入端即关闭通道, 无需关闭帧
        Ok(())
    }
}

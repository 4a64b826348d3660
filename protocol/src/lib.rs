//! 聊天客户端共享协议库
//!
//! 包含:
//! - 入站帧分类 (InboundEvent, decode_frame)
//! - 传输层抽象 (Transport trait)
//! - WebSocket 传输实现 (WsTransport)
//! - 进程内传输实现 (MemTransport, 用于确定性测试)

mod constants;
mod error;
mod frame;
mod mem;
mod transport;
mod ws;

pub use constants::*;
pub use error::{ProtocolError, Result};
pub use frame::{decode_frame, InboundEvent};
pub use mem::{MemListener, MemPeer, MemTransport};
pub use transport::{ConnectRequest, FrameSink, FrameSource, Transport, TransportConfig};
pub use ws::WsTransport;

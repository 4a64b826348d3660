//! 协议常量定义

use std::time::Duration;

/// 在线用户列表帧的保留前缀
pub const PRESENCE_PREFIX: &str = "ACTIVE_USERS: ";

/// 登录接口路径
pub const LOGIN_PATH: &str = "/login";

/// 注册接口路径
pub const REGISTER_PATH: &str = "/register";

/// 实时连接接口路径
pub const WS_PATH: &str = "/ws";

/// 连接超时（秒）
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// 连接超时 Duration
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(CONNECT_TIMEOUT_SECS);

//! 认证服务 REST 客户端
//!
//! 封装 /register 与 /login 两个接口; 实时连接本身由传输层负责建立。

use protocol::{LOGIN_PATH, REGISTER_PATH};
use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use crate::error::SessionError;

/// 登录凭据
#[derive(Clone, Debug, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// 创建凭据
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// 校验凭据是否完整
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(SessionError::MissingCredentials);
        }
        Ok(())
    }
}

/// 认证服务客户端
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    /// 创建客户端, `base_url` 形如 "http://host:port"
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// 注册新用户
    ///
    /// 201 视为成功; 其余状态一律视为注册失败, 服务端不提供更细的原因。
    pub async fn register(&self, credentials: &Credentials) -> Result<(), SessionError> {
        credentials.validate()?;
        let url = format!("{}{}", self.base_url, REGISTER_PATH);
        let response = self.http.post(&url).json(credentials).send().await?;
        match response.status() {
            StatusCode::CREATED => Ok(()),
            status => Err(SessionError::RegistrationFailed {
                status: status.as_u16(),
            }),
        }
    }

    /// 登录
    ///
    /// 200 成功, 401 凭据错误, 其余状态视为认证服务异常。
    pub async fn login(&self, credentials: &Credentials) -> Result<(), SessionError> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);
        debug!(username = %credentials.username, "logging in");
        let response = self.http.post(&url).json(credentials).send().await?;
        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::UNAUTHORIZED => Err(SessionError::InvalidCredentials),
            status => Err(SessionError::AuthService {
                status: status.as_u16(),
            }),
        }
    }
}

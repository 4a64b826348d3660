//! 聊天室终端客户端
//!
//! 轻量渲染层: 核心只回调纯数据, 这里负责打印到终端并读取输入。

mod auth;
mod error;
mod presence;
mod session;
mod sink;
#[cfg(test)]
mod testutil;

use std::io::Write as _;

use anyhow::Result;
use protocol::WsTransport;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::auth::Credentials;
use crate::session::{Session, SessionCommand, SessionConfig};
use crate::sink::{MessageSink, PresenceSink};

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// 聊天文本逐行打印到终端
struct TerminalMessages;

impl MessageSink for TerminalMessages {
    fn on_message(&mut self, text: &str) {
        println!("{text}");
    }
}

/// 在线用户快照打印到终端
struct TerminalPresence;

impl PresenceSink for TerminalPresence {
    fn on_presence(&mut self, users: &[String]) {
        println!("[在线用户: {}]", users.join(", "));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("chat_client=info".parse()?))
        .init();

    let mut args = std::env::args().skip(1);
    let (register, addr) = match args.next().as_deref() {
        Some("register") => (true, args.next().unwrap_or_else(|| DEFAULT_ADDR.to_string())),
        Some(addr) => (false, addr.to_string()),
        None => (false, DEFAULT_ADDR.to_string()),
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let username = prompt_line(&mut lines, "用户名: ").await?;
    let password = prompt_line(&mut lines, "密码: ").await?;
    let credentials = Credentials::new(username, password);

    let mut session: Session<WsTransport> = Session::new(SessionConfig::for_addr(&addr));

    if register {
        session.auth().register(&credentials).await?;
        println!("注册成功, 请重新登录。");
        return Ok(());
    }

    session.connect(&credentials).await?;
    println!("已连接到 {addr}, 输入消息回车发送, /quit 退出。");

    // stdin 行读取任务
    let (command_tx, mut command_rx) = mpsc::channel(32);
    tokio::spawn(async move {
        while let Ok(Some(line)) = lines.next_line().await {
            let command = if line.trim() == "/quit" {
                SessionCommand::Disconnect
            } else {
                SessionCommand::Send(line)
            };
            if command_tx.send(command).await.is_err() {
                break;
            }
        }
    });

    match session
        .run(&mut command_rx, &mut TerminalMessages, &mut TerminalPresence)
        .await
    {
        Ok(()) => println!("已断开连接。"),
        Err(e) => println!("连接中断: {e}"),
    }
    info!("session finished in state {}", session.state());

    Ok(())
}

/// 打印提示并读取一行输入
async fn prompt_line(lines: &mut Lines<BufReader<Stdin>>, prompt: &str) -> Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?.unwrap_or_default())
}

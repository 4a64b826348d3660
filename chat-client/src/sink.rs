//! 渲染回调接口
//!
//! 核心只产出纯数据; 渲染到终端、页面还是别处完全由调用方决定。

/// 聊天文本的渲染回调
pub trait MessageSink {
    /// 收到一条聊天文本帧（原样, 无信封）
    fn on_message(&mut self, text: &str);
}

/// 在线用户快照的渲染回调
pub trait PresenceSink {
    /// 在线用户列表更新后的最新快照
    fn on_presence(&mut self, users: &[String]);
}

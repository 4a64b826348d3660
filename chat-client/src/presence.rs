//! 在线用户列表维护
//!
//! 服务端每次下发全量列表, 本地做整体替换而非增量合并。

/// 在线用户列表
///
/// 不含本地用户自身, 保持服务端给出的顺序, 无重复项。
#[derive(Debug, Default)]
pub struct PresenceList {
    users: Vec<String>,
}

impl PresenceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用服务端下发的全量列表替换当前列表
    ///
    /// 保持服务端顺序, 重复项只保留首次出现, 并剔除本地用户。
    pub fn apply_update(&mut self, update: Vec<String>, local_username: &str) {
        let mut users = Vec::with_capacity(update.len());
        for user in update {
            if user != local_username && !users.contains(&user) {
                users.push(user);
            }
        }
        self.users = users;
    }

    /// 当前列表的只读快照
    pub fn snapshot(&self) -> &[String] {
        &self.users
    }

    /// 清空列表, 会话关闭时调用
    pub fn reset(&mut self) {
        self.users.clear();
    }
}

//! # 版本化文档模型
//!
//! 单个 HTML 文档的线性撤销/重做历史。
//!
//! ## 结构
//! ```text
//! timeline: [v0, v1, v2, v3]      （旧 → 新）
//!                     ^
//!                   cursor        content == timeline[cursor]
//! ```
//!
//! - `commit` 截断游标之后的"未来"条目再追加新版本（在撤销后提交会丢弃被放弃的分支）
//! - `patch_in_place` 覆写游标所在槽位，不产生新的撤销步骤（逐键编辑不会淹没历史）
//! - `undo` / `redo` 在边界处静默无操作

/// 每个文档保留的最大历史条目数
pub const MAX_HISTORY: usize = 50;

/// 带线性历史的文档
///
/// 不变量：
/// - `timeline` 永不为空
/// - `cursor < timeline.len()`
/// - `timeline[cursor] == content`
/// - `timeline.len() <= MAX_HISTORY`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedDocument {
    content: String,
    timeline: Vec<String>,
    cursor: usize,
}

impl VersionedDocument {
    /// 以单个种子条目创建文档：`timeline = [seed]`，`cursor = 0`
    pub fn new(seed: impl Into<String>) -> Self {
        let seed = seed.into();
        Self {
            content: seed.clone(),
            timeline: vec![seed],
            cursor: 0,
        }
    }

    /// 从持久化的扁平字段重建文档
    ///
    /// 存档可能由旧版本或被手工改动过，因此在这里把数据修正到满足不变量：
    /// - 缺少历史（旧格式）时以 `content` 合成单条历史
    /// - 游标越界时夹到最后一个条目
    /// - 超出 `MAX_HISTORY` 时从头部丢弃，游标同步平移
    /// - `content` 始终以 `timeline[cursor]` 为准
    ///
    /// 对已经规范的数据重复调用不会产生任何变化。
    pub fn from_parts(content: String, timeline: Option<Vec<String>>, cursor: Option<usize>) -> Self {
        let mut timeline = match timeline {
            Some(entries) if !entries.is_empty() => entries,
            _ => vec![content.clone()],
        };
        let mut cursor = cursor.unwrap_or(0).min(timeline.len() - 1);

        if timeline.len() > MAX_HISTORY {
            let excess = timeline.len() - MAX_HISTORY;
            timeline.drain(..excess);
            cursor = cursor.saturating_sub(excess);
        }

        let content = timeline[cursor].clone();
        Self {
            content,
            timeline,
            cursor,
        }
    }

    /// 当前物化的文档内容
    pub fn content(&self) -> &str {
        &self.content
    }

    /// 全部历史条目（旧 → 新）
    pub fn timeline(&self) -> &[String] {
        &self.timeline
    }

    /// 当前游标位置
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.timeline.len()
    }

    /// 追加一个新版本
    ///
    /// 丢弃游标之后的所有条目，追加 `new_content` 并把游标移到末尾。
    /// 超过 `MAX_HISTORY` 时从头部丢弃最旧的条目，游标平移相同数量并夹在 0。
    pub fn commit(&mut self, new_content: impl Into<String>) {
        let new_content = new_content.into();

        self.timeline.truncate(self.cursor + 1);
        self.timeline.push(new_content.clone());
        self.cursor = self.timeline.len() - 1;

        if self.timeline.len() > MAX_HISTORY {
            let excess = self.timeline.len() - MAX_HISTORY;
            self.timeline.drain(..excess);
            self.cursor = self.cursor.saturating_sub(excess);
        }

        self.content = new_content;
    }

    /// 原地覆写当前槽位，不改变游标和历史长度
    pub fn patch_in_place(&mut self, new_content: impl Into<String>) {
        let new_content = new_content.into();
        self.timeline[self.cursor] = new_content.clone();
        self.content = new_content;
    }

    /// 后退一步；已在最旧条目时返回 `false` 且不做任何修改
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        self.content = self.timeline[self.cursor].clone();
        true
    }

    /// 前进一步；已在最新条目时返回 `false` 且不做任何修改
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        self.content = self.timeline[self.cursor].clone();
        true
    }
}

//! 码流缓冲区 (BitstreamBuffer).
//!
//! 一块可增长的字节分配, 内部带一个"有效数据窗口" (偏移 + 长度).
//! 所有裸流读取器共用此数据模型: 窗口之前/之后的字节是垃圾数据,
//! 任何时候都不应被读取.
//!
//! # 不变量
//! `data_offset + data_length <= max_length` 恒成立, 有效数据连续.
//!
//! # 生命周期
//! - `with_capacity` 分配初始容量;
//! - `extend` 扩容 (保留有效窗口, 偏移不变);
//! - `compact` 压实 (有效窗口移到分配起始处);
//! - `clear` 释放分配并清零所有字段 (幂等).

use bytes::Bytes;

use crate::error::{LiuError, LiuResult};

/// 码流缓冲区
///
/// 有效数据是 `data[data_offset .. data_offset + data_length]`,
/// 时间戳随缓冲区不透明地传递给下游消费者.
#[derive(Debug, Default)]
pub struct BitstreamBuffer {
    /// 底层分配, `len()` 即容量, 全部已初始化
    data: Vec<u8>,
    /// 有效数据起始偏移
    data_offset: usize,
    /// 有效数据长度
    data_length: usize,
    /// 时间戳 (由读取器填写, 本模块不解释)
    time_stamp: u64,
}

impl BitstreamBuffer {
    /// 创建空缓冲区 (无分配)
    pub fn new() -> Self {
        Self::default()
    }

    /// 分配 `size` 字节容量的空缓冲区
    ///
    /// 分配失败时返回 `LiuError::OutOfMemory`.
    pub fn with_capacity(size: usize) -> LiuResult<Self> {
        let mut buf = Self::new();
        buf.extend(size)?;
        Ok(buf)
    }

    /// 容量 (字节)
    pub fn max_length(&self) -> usize {
        self.data.len()
    }

    /// 有效数据长度 (字节)
    pub fn len(&self) -> usize {
        self.data_length
    }

    /// 是否没有有效数据
    pub fn is_empty(&self) -> bool {
        self.data_length == 0
    }

    /// 有效数据起始偏移
    pub fn data_offset(&self) -> usize {
        self.data_offset
    }

    /// 有效数据视图
    pub fn data(&self) -> &[u8] {
        &self.data[self.data_offset..self.data_offset + self.data_length]
    }

    /// 时间戳
    pub fn time_stamp(&self) -> u64 {
        self.time_stamp
    }

    /// 设置时间戳
    pub fn set_time_stamp(&mut self, ts: u64) {
        self.time_stamp = ts;
    }

    /// 尾部空闲字节数 (有效窗口之后)
    pub fn free_tail(&self) -> usize {
        self.max_length() - self.data_offset - self.data_length
    }

    /// 总空闲字节数 (压实后可得)
    pub fn free_total(&self) -> usize {
        self.max_length() - self.data_length
    }

    /// 扩容到 `new_size` 字节
    ///
    /// 已有有效窗口按原偏移原样保留. `new_size` 不大于当前容量时为
    /// 无操作 (成功). 扩容失败返回 `LiuError::OutOfMemory`, 此时原缓冲区
    /// 保持不变, 不产生部分状态.
    pub fn extend(&mut self, new_size: usize) -> LiuResult<()> {
        let old_size = self.data.len();
        if new_size <= old_size {
            return Ok(());
        }
        self.data
            .try_reserve_exact(new_size - old_size)
            .map_err(|e| LiuError::OutOfMemory(format!("码流缓冲区扩容到 {new_size} 字节: {e}")))?;
        self.data.resize(new_size, 0);
        log::trace!("码流缓冲区扩容: {old_size} -> {new_size} 字节");
        Ok(())
    }

    /// 保障至少 `additional` 字节的总空闲容量 (必要时扩容)
    ///
    /// 之后的 `move_from`/`commit` 至多写入 `additional` 字节时不会因
    /// 容量不足失败 (压实由 `move_from` 自行处理).
    pub fn reserve(&mut self, additional: usize) -> LiuResult<()> {
        if additional > self.free_total() {
            let grow = additional - self.free_total();
            self.extend(self.max_length() + grow)?;
        }
        Ok(())
    }

    /// 压实: 将有效窗口移动到分配起始处
    pub fn compact(&mut self) {
        if self.data_offset == 0 {
            return;
        }
        self.data
            .copy_within(self.data_offset..self.data_offset + self.data_length, 0);
        self.data_offset = 0;
    }

    /// 从 `source` 的有效数据头部拷贝至多 `n` 字节到本缓冲区尾部
    ///
    /// 优先直接追加; 尾部空间不足而压实后足够时, 先压实再追加.
    /// 成功后推进 `source` 的窗口偏移并缩短其长度, 即"已取回但未消费"
    /// 的字节就是通过本操作在缓冲区之间交接的.
    ///
    /// # 返回
    /// 实际拷贝的字节数; 0 表示无可拷贝, 不是错误.
    /// 压实后仍放不下时返回 `LiuError::BufferTooSmall`, 不做截断拷贝.
    pub fn move_from(&mut self, source: &mut BitstreamBuffer, n: usize) -> LiuResult<usize> {
        let to_copy = n.min(source.data_length);
        if to_copy == 0 {
            return Ok(0);
        }
        if to_copy > self.free_tail() {
            if to_copy > self.free_total() {
                return Err(LiuError::BufferTooSmall {
                    needed: to_copy,
                    available: self.free_total(),
                });
            }
            self.compact();
        }
        let dst = self.data_offset + self.data_length;
        self.data[dst..dst + to_copy]
            .copy_from_slice(&source.data[source.data_offset..source.data_offset + to_copy]);
        self.data_length += to_copy;
        source.consume(to_copy);
        Ok(to_copy)
    }

    /// 丢弃有效数据头部的 `n` 字节 (推进窗口偏移)
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.data_length);
        self.data_offset += n;
        self.data_length -= n;
        if self.data_length == 0 {
            self.data_offset = 0;
        }
    }

    /// 尾部空闲区的可写视图 (供 refill 直接写入)
    pub fn spare_mut(&mut self) -> &mut [u8] {
        let start = self.data_offset + self.data_length;
        &mut self.data[start..]
    }

    /// 确认尾部空闲区新写入了 `n` 字节有效数据
    pub fn commit(&mut self, n: usize) {
        debug_assert!(n <= self.free_tail());
        self.data_length += n;
    }

    /// 释放分配并清零所有字段 (幂等)
    pub fn clear(&mut self) {
        self.data = Vec::new();
        self.data_offset = 0;
        self.data_length = 0;
        self.time_stamp = 0;
    }

    /// 拷贝有效数据为 `Bytes`, 交给下游消费者
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.data())
    }
}

//! 基础码流读取器.
//!
//! 持有一个顺序字节源, 负责按块取回原始字节并写入码流缓冲区尾部.
//! 这是唯一直接接触字节源的组件, 各格式定界器只通过 `refill_raw`
//! 间接读取.

use liu_core::{BitstreamBuffer, LiuError, LiuResult};

use crate::io::{FileBackend, SourceBackend};

/// 默认单次取回的块大小 (256 KB)
///
/// 块边界与帧边界几乎不会对齐, 越界读到的字节由上层定界器
/// 通过跨界缓冲区转交给下一次调用.
pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

/// 基础码流读取器
///
/// 生命周期: `open` 打开字节源, `reset` 回到流起点, `close` 释放
/// 字节源 (幂等, 可多次调用).
pub struct StreamReader {
    source: Option<Box<dyn SourceBackend>>,
    chunk_size: usize,
}

impl StreamReader {
    /// 打开文件字节源
    ///
    /// 路径无法打开时返回 `LiuError::FileOpen`.
    pub fn open(path: &str) -> LiuResult<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| LiuError::FileOpen(format!("{path}: {e}")))?;
        Ok(Self::from_backend(Box::new(FileBackend::new(file))))
    }

    /// 从任意字节源创建
    pub fn from_backend(source: Box<dyn SourceBackend>) -> Self {
        Self {
            source: Some(source),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// 调整单次取回的块大小
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// 块大小
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// 字节源是否仍然打开
    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    /// 回到流的起点
    pub fn reset(&mut self) -> LiuResult<()> {
        let source = self.source.as_mut().ok_or_else(closed)?;
        source.rewind()?;
        Ok(())
    }

    /// 释放字节源 (幂等)
    pub fn close(&mut self) {
        self.source = None;
    }

    /// 从字节源取回一块数据, 追加到 `buf` 的有效窗口之后
    ///
    /// `buf` 尾部空间不足一块时先压实, 压实后仍不足则扩容.
    ///
    /// # 返回
    /// 实际读取的字节数; 0 表示已到流末尾.
    pub fn refill_raw(&mut self, buf: &mut BitstreamBuffer) -> LiuResult<usize> {
        let source = self.source.as_mut().ok_or_else(closed)?;
        if buf.free_tail() < self.chunk_size {
            buf.compact();
            if buf.free_tail() < self.chunk_size {
                buf.extend(buf.len() + self.chunk_size)?;
            }
        }
        let chunk_size = self.chunk_size;
        let n = source.read(&mut buf.spare_mut()[..chunk_size])?;
        buf.commit(n);
        Ok(n)
    }
}

fn closed() -> LiuError {
    LiuError::InvalidArgument("读取器已关闭".into())
}

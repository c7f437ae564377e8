//! 顺序字节源抽象.
//!
//! 为裸流读取器提供统一的输入接口: 按需读取、单调前进,
//! 只允许通过 `rewind` 回到流的起点 (用于循环播放等场景).
//! 读取是同步阻塞的, 这是刻意的模型选择, 不提供超时或取消.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

/// 顺序字节源 trait
///
/// 实现此 trait 以支持不同的输入来源 (文件、内存等).
/// 读取位置隐含在源自身之中, 除 `rewind` 外不可回退.
pub trait SourceBackend: Send {
    /// 读取数据到缓冲区, 返回实际读取的字节数; 0 表示流末尾
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// 回到流的起点
    fn rewind(&mut self) -> io::Result<()>;

    /// 获取总大小 (如果可知)
    fn size(&self) -> Option<u64>;
}

/// 文件字节源
pub struct FileBackend {
    file: File,
    size: Option<u64>,
}

impl FileBackend {
    /// 从已打开的文件创建
    pub fn new(file: File) -> Self {
        let size = file.metadata().ok().map(|m| m.len());
        Self { file, size }
    }
}

impl SourceBackend for FileBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        Ok(())
    }

    fn size(&self) -> Option<u64> {
        self.size
    }
}

/// 内存字节源
///
/// 用于测试和内存中处理. `chunk_limit` 可限制单次 `read` 返回的
/// 最大字节数, 以模拟任意的块边界切分.
pub struct MemoryBackend {
    data: Vec<u8>,
    pos: usize,
    chunk_limit: Option<usize>,
}

impl MemoryBackend {
    /// 从已有数据创建
    pub fn from_data(data: Vec<u8>) -> Self {
        Self {
            data,
            pos: 0,
            chunk_limit: None,
        }
    }

    /// 限制单次读取返回的最大字节数
    pub fn with_chunk_limit(mut self, limit: usize) -> Self {
        self.chunk_limit = Some(limit);
        self
    }
}

impl SourceBackend for MemoryBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.data.len().saturating_sub(self.pos);
        let mut to_read = buf.len().min(available);
        if let Some(limit) = self.chunk_limit {
            to_read = to_read.min(limit);
        }
        if to_read == 0 {
            return Ok(0);
        }
        buf[..to_read].copy_from_slice(&self.data[self.pos..self.pos + to_read]);
        self.pos += to_read;
        Ok(to_read)
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.pos = 0;
        Ok(())
    }

    fn size(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }
}

//! 统一错误类型定义.
//!
//! 所有 Liu crate 共用的错误类型, 支持跨模块传播.

use thiserror::Error;

/// Liu 框架统一错误类型
#[derive(Debug, Error)]
pub enum LiuError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 源文件无法打开
    #[error("无法打开文件: {0}")]
    FileOpen(String),

    /// 内存分配失败 (缓冲区扩容失败等)
    #[error("内存分配失败: {0}")]
    OutOfMemory(String),

    /// 目标缓冲区容量不足 (压实后仍放不下请求的拷贝量)
    ///
    /// 可恢复: 调用方扩容目标缓冲区后重试即可.
    #[error("缓冲区容量不足: 需要 {needed} 字节, 可用 {available} 字节")]
    BufferTooSmall {
        /// 请求拷贝的字节数
        needed: usize,
        /// 目标缓冲区压实后的可用字节数
        available: usize,
    },

    /// 容器头部无效 (签名不匹配或数据不足)
    #[error("无效容器: {0}")]
    InvalidContainer(String),

    /// 码流损坏 (边界标记缺失等, 无法给出完整帧)
    #[error("码流损坏: {0}")]
    CorruptBitstream(String),

    /// 功能未实现
    #[error("功能未实现: {0}")]
    NotImplemented(String),

    /// 已到达流末尾
    ///
    /// 不是故障, 而是逐帧迭代协议的正常终止信号.
    #[error("已到达流末尾")]
    Eof,
}

/// Liu 框架统一 Result 类型
pub type LiuResult<T> = Result<T, LiuError>;

//! 帧读取器 (FrameReader) trait 定义.
//!
//! 每次调用返回恰好一个自定界的压缩帧/片单元. 各格式的定界器
//! 都实现此 trait, 组合共用的缓冲区原语而不共享状态.

use liu_core::{BitstreamBuffer, LiuResult};

/// 帧读取器 trait
///
/// 使用流程:
/// 1. 通过格式对应的构造函数打开输入
/// 2. 循环调用 `read_next_frame()` 逐帧取出单元
/// 3. 可选: 调用 `reset()` 回到流起点重新读取
/// 4. 调用 `close()` 释放资源 (幂等)
///
/// 单元数据通过 `bs` 的有效窗口交给调用方, 仅在下一次调用同一
/// 读取器之前有效, 不提供更长的别名保证.
pub trait FrameReader: Send {
    /// 格式名称
    fn name(&self) -> &str;

    /// 读取下一个单元, 追加到 `bs` 的有效窗口之后
    ///
    /// # 返回
    /// - `Ok(())`: 成功取出一个完整单元
    /// - `Err(LiuError::Eof)`: 流正常结束, 不再有单元
    /// - 其他错误: 同步上报, 内部不重试; 绝不返回截断的单元
    fn read_next_frame(&mut self, bs: &mut BitstreamBuffer) -> LiuResult<()>;

    /// 回到流起点并清空已缓存/跨界的字节
    fn reset(&mut self) -> LiuResult<()>;

    /// 关闭字节源并擦除所有缓冲区 (幂等)
    fn close(&mut self);
}

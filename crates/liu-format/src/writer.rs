//! 码流写入器.
//!
//! 定界器的写侧对偶: 把逐帧取出的单元原样追加到目标文件,
//! 统计已写入的帧数. 无任何封装逻辑.

use std::fs::File;
use std::io::Write;

use liu_core::{BitstreamBuffer, LiuError, LiuResult};

/// 码流帧写入器
pub struct FrameWriter {
    dest: Option<File>,
    frames_written: u64,
}

impl FrameWriter {
    /// 创建目标文件
    ///
    /// 路径无法创建时返回 `LiuError::FileOpen`.
    pub fn open(path: &str) -> LiuResult<Self> {
        let dest = File::create(path).map_err(|e| LiuError::FileOpen(format!("{path}: {e}")))?;
        Ok(Self {
            dest: Some(dest),
            frames_written: 0,
        })
    }

    /// 把一个单元的有效数据原样写入目标
    pub fn write_next_frame(&mut self, bs: &BitstreamBuffer) -> LiuResult<()> {
        let dest = self
            .dest
            .as_mut()
            .ok_or_else(|| LiuError::InvalidArgument("写入器已关闭".into()))?;
        dest.write_all(bs.data())?;
        self.frames_written += 1;
        log::trace!("writer: 第 {} 帧, {} 字节", self.frames_written, bs.len());
        Ok(())
    }

    /// 已写入的帧数
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// 冲刷并关闭目标文件 (幂等)
    pub fn close(&mut self) {
        if let Some(mut dest) = self.dest.take() {
            let _ = dest.flush();
        }
    }
}

impl Drop for FrameWriter {
    fn drop(&mut self) {
        self.close();
    }
}

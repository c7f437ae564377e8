//! # Liu (流)
//!
//! 纯 Rust 实现的裸流逐帧读取工具集.
//!
//! Liu 面向"无容器或轻容器"的压缩视频字节流 (H.264 Annex-B 裸流、
//! Motion-JPEG 流、IVF 封装流), 从只能顺序读取的字节源中每次提取
//! 恰好一个完整的压缩帧/片单元, 越界读到的字节透明地转交给下一次
//! 调用.
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use liu::core::{BitstreamBuffer, LiuError};
//! use liu::format::{FrameReader, H264SliceReader};
//!
//! # fn main() -> liu::core::LiuResult<()> {
//! let mut reader = H264SliceReader::open("input.h264")?;
//! let mut bs = BitstreamBuffer::new();
//! loop {
//!     match reader.read_next_frame(&mut bs) {
//!         Ok(()) => println!("单元: {} 字节", bs.len()),
//!         Err(LiuError::Eof) => break,
//!         Err(e) => return Err(e),
//!     }
//!     bs.consume(bs.len()); // 交给下游后排空
//! }
//! reader.close();
//! # Ok(())
//! # }
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `liu-core` | 核心类型: 错误、码流缓冲区、基础值类型 |
//! | `liu-format` | 字节源、基础读取器与三种帧定界器 |

/// 核心类型与工具
pub use liu_core as core;

/// 帧定界框架
pub use liu_format as format;

pub mod logging;

/// 获取 Liu 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

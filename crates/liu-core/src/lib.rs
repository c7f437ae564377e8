//! # liu-core
//!
//! Liu 裸流工具集核心类型库: 统一错误类型、码流缓冲区、
//! 有理数与 FourCC 等基础值类型.

pub mod bitstream;
pub mod error;
pub mod fourcc;
pub mod rational;

// 重导出常用类型
pub use bitstream::BitstreamBuffer;
pub use error::{LiuError, LiuResult};
pub use fourcc::FourCc;
pub use rational::Rational;

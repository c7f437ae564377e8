//! # liu-format
//!
//! Liu 裸流工具集帧定界库: 从顺序读取的字节源中逐帧提取压缩单元.
//!
//! 裸流没有容器索引, 单元边界只能在无结构的字节流里搜索得到;
//! 字节源按固定大小的块取回, 块边界几乎不与单元边界对齐,
//! 越界读到的字节由各定界器的跨界缓冲区转交给下一次调用.
//!
//! 提供三种定界器:
//! - [`h264::H264SliceReader`] — Annex-B 起始码边界搜索
//! - [`mjpeg::JpegFrameReader`] — SOI/EOI 标记对搜索
//! - [`ivf::IvfFrameReader`] — 长度前缀记录, 无需搜索

pub mod frame_reader;
pub mod h264;
pub mod io;
pub mod ivf;
pub mod mjpeg;
pub mod reader;
pub mod writer;

// 重导出常用类型
pub use frame_reader::FrameReader;
pub use h264::H264SliceReader;
pub use io::{FileBackend, MemoryBackend, SourceBackend};
pub use ivf::{IvfFrameReader, IvfHeader};
pub use mjpeg::{JpegFrameReader, PicStruct};
pub use reader::StreamReader;
pub use writer::FrameWriter;

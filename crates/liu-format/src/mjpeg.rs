//! Motion-JPEG 裸流帧定界器.
//!
//! 每幅 JPEG 图片由 SOI 标记 (`FF D8`) 开始, EOI 标记 (`FF D9`) 结束,
//! 每次调用返回恰好一幅完整图片 (SOI 与 EOI 均包含在内).
//! 截断的图片没有定义良好的部分解码结果, 因此 SOI 之后找不到 EOI
//! 即判为码流损坏, 绝不返回截断的单元.

use liu_core::{BitstreamBuffer, LiuError, LiuResult};

use crate::frame_reader::FrameReader;
use crate::io::SourceBackend;
use crate::reader::StreamReader;

/// Start-Of-Image 标记第二字节
const MARKER_SOI: u8 = 0xD8;
/// End-Of-Image 标记第二字节
const MARKER_EOI: u8 = 0xD9;
/// APP0 标记第二字节
const MARKER_APP0: u8 = 0xE0;
/// Start-Of-Scan 标记第二字节
const MARKER_SOS: u8 = 0xDA;

/// 在 `data[from..]` 中寻找标记 `FF marker`, 返回标记首字节位置
fn find_marker(data: &[u8], from: usize, marker: u8) -> Option<usize> {
    let mut i = from;
    while i + 2 <= data.len() {
        if data[i] == 0xFF && data[i + 1] == marker {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// 图片结构提示 (来自首幅图片的 AVI1 APP0 段)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PicStruct {
    /// 未知 (无 AVI1 APP0 段或字段无效)
    Unknown,
    /// 逐行
    Progressive,
    /// 隔行, 上场优先
    FieldTff,
    /// 隔行, 下场优先
    FieldBff,
}

/// 解析一幅图片的 AVI1 APP0 段, 恢复图片结构提示
///
/// 每条流只需调用一次 (传入首幅图片), 有界单遍扫描,
/// 不在逐帧热路径上.
pub fn parse_pic_struct(picture: &[u8]) -> PicStruct {
    if picture.len() < 2 || picture[0] != 0xFF || picture[1] != MARKER_SOI {
        return PicStruct::Unknown;
    }
    // 逐段走过 SOI 之后的标记段, 直到 APP0 或扫描数据开始
    let mut pos = 2;
    while pos + 4 <= picture.len() {
        if picture[pos] != 0xFF {
            return PicStruct::Unknown;
        }
        let marker = picture[pos + 1];
        if marker == MARKER_SOS {
            return PicStruct::Unknown;
        }
        let seg_len = usize::from(u16::from_be_bytes([picture[pos + 2], picture[pos + 3]]));
        if marker == MARKER_APP0 {
            // 段载荷: 标识符 "AVI1" + 极性字节
            let payload = pos + 4;
            if seg_len >= 7
                && payload + 5 <= picture.len()
                && &picture[payload..payload + 4] == b"AVI1"
            {
                return match picture[payload + 4] {
                    0 => PicStruct::Progressive,
                    1 => PicStruct::FieldTff,
                    2 => PicStruct::FieldBff,
                    _ => PicStruct::Unknown,
                };
            }
            return PicStruct::Unknown;
        }
        if seg_len < 2 {
            return PicStruct::Unknown;
        }
        pos += 2 + seg_len;
    }
    PicStruct::Unknown
}

/// Motion-JPEG 帧定界器
pub struct JpegFrameReader {
    reader: StreamReader,
    work: BitstreamBuffer,
    carry: BitstreamBuffer,
}

impl JpegFrameReader {
    /// 打开文件输入
    pub fn open(path: &str) -> LiuResult<Self> {
        Ok(Self::from_reader(StreamReader::open(path)?))
    }

    /// 从任意字节源创建
    pub fn from_backend(source: Box<dyn SourceBackend>) -> Self {
        Self::from_reader(StreamReader::from_backend(source))
    }

    /// 从已配置的基础读取器创建
    pub fn from_reader(reader: StreamReader) -> Self {
        Self {
            reader,
            work: BitstreamBuffer::new(),
            carry: BitstreamBuffer::new(),
        }
    }

    fn seed_from_carry(&mut self) -> LiuResult<()> {
        let pending = self.carry.len();
        if pending > 0 {
            self.work.reserve(pending)?;
            self.work.move_from(&mut self.carry, pending)?;
        }
        Ok(())
    }
}

impl FrameReader for JpegFrameReader {
    fn name(&self) -> &str {
        "mjpeg"
    }

    fn read_next_frame(&mut self, bs: &mut BitstreamBuffer) -> LiuResult<()> {
        self.seed_from_carry()?;

        // 阶段 1: 定位 SOI
        let mut scan = 0usize;
        loop {
            match find_marker(self.work.data(), scan, MARKER_SOI) {
                Some(pos) => {
                    self.work.consume(pos);
                    break;
                }
                None => {
                    // 标记可能跨越块边界, 回退 1 字节重扫
                    scan = self.work.len().saturating_sub(1);
                    if self.reader.refill_raw(&mut self.work)? == 0 {
                        self.work.clear();
                        return Err(LiuError::Eof);
                    }
                }
            }
        }

        // 阶段 2: 从 SOI 之后定位 EOI
        let mut scan = 2usize;
        let unit_len = loop {
            match find_marker(self.work.data(), scan, MARKER_EOI) {
                Some(pos) => break pos + 2,
                None => {
                    scan = self.work.len().saturating_sub(1).max(2);
                    if self.reader.refill_raw(&mut self.work)? == 0 {
                        // 有 SOI 无 EOI: 截断图片没有定义良好的解码结果
                        return Err(LiuError::CorruptBitstream(
                            "SOI 之后直到流尾未找到 EOI".into(),
                        ));
                    }
                }
            }
        };

        log::trace!(
            "mjpeg: 取出图片 {unit_len} 字节, 跨界余量 {} 字节",
            self.work.len() - unit_len
        );

        bs.reserve(unit_len)?;
        bs.move_from(&mut self.work, unit_len)?;
        let rest = self.work.len();
        if rest > 0 {
            self.carry.reserve(rest)?;
            self.carry.move_from(&mut self.work, rest)?;
        }
        Ok(())
    }

    fn reset(&mut self) -> LiuResult<()> {
        self.reader.reset()?;
        self.work.clear();
        self.carry.clear();
        Ok(())
    }

    fn close(&mut self) {
        self.reader.close();
        self.work.clear();
        self.carry.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryBackend;

    /// 拼一幅最小的 JPEG 图片: SOI + 载荷 + EOI
    fn picture(payload: &[u8]) -> Vec<u8> {
        let mut v = vec![0xFF, 0xD8];
        v.extend_from_slice(payload);
        v.extend_from_slice(&[0xFF, 0xD9]);
        v
    }

    /// 带 AVI1 APP0 段的图片头
    fn picture_with_app0(polarity: u8) -> Vec<u8> {
        let mut v = vec![0xFF, 0xD8];
        v.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x0A]); // APP0, 段长 10 (含长度字段)
        v.extend_from_slice(b"AVI1");
        v.push(polarity);
        v.extend_from_slice(&[0x11, 0x22, 0x33]);
        v.extend_from_slice(&[0xFF, 0xD9]);
        v
    }

    fn reader_over(data: Vec<u8>, source_chunk: usize, refill_chunk: usize) -> JpegFrameReader {
        let backend = MemoryBackend::from_data(data).with_chunk_limit(source_chunk);
        JpegFrameReader::from_reader(
            StreamReader::from_backend(Box::new(backend)).with_chunk_size(refill_chunk),
        )
    }

    fn drain(reader: &mut JpegFrameReader) -> (Vec<Vec<u8>>, LiuResult<()>) {
        let mut units = Vec::new();
        loop {
            let mut bs = BitstreamBuffer::new();
            match reader.read_next_frame(&mut bs) {
                Ok(()) => units.push(bs.data().to_vec()),
                Err(e) => return (units, Err(e)),
            }
        }
    }

    #[test]
    fn test_soi_eoi_pairing() {
        let mut stream = Vec::new();
        stream.extend(picture(&[0x01; 20]));
        stream.extend(picture(&[0x02; 35]));
        stream.extend(picture(&[0x03; 7]));

        let mut reader = reader_over(stream.clone(), 11, 16);
        let (units, end) = drain(&mut reader);
        assert!(matches!(end, Err(LiuError::Eof)));
        assert_eq!(units.len(), 3);
        for u in &units {
            assert_eq!(&u[..2], &[0xFF, 0xD8], "单元必须以 SOI 开始");
            assert_eq!(&u[u.len() - 2..], &[0xFF, 0xD9], "单元必须以 EOI 结束");
        }
        assert_eq!(units.concat(), stream);
    }

    #[test]
    fn test_truncated_picture_is_corrupt() {
        let mut stream = picture(&[0x01; 10]);
        stream.extend_from_slice(&[0xFF, 0xD8]); // 第二幅只有 SOI
        stream.extend_from_slice(&[0x55; 10]);   // SOI 之后 10 字节即截断

        let mut reader = reader_over(stream, 8, 16);
        let (units, end) = drain(&mut reader);
        assert_eq!(units.len(), 1);
        assert!(matches!(end, Err(LiuError::CorruptBitstream(_))));
    }

    #[test]
    fn test_no_soi_reports_eof() {
        let mut reader = reader_over(vec![0x42; 50], 16, 16);
        let mut bs = BitstreamBuffer::new();
        assert!(matches!(
            reader.read_next_frame(&mut bs),
            Err(LiuError::Eof)
        ));
    }

    #[test]
    fn test_marker_split_across_chunks() {
        // 块大小 1 字节: SOI/EOI 两字节必然跨块
        let mut stream = Vec::new();
        stream.extend(picture(&[0xAA, 0xBB, 0xCC]));
        stream.extend(picture(&[0xDD]));

        let mut reader = reader_over(stream.clone(), 1, 4);
        let (units, _) = drain(&mut reader);
        assert_eq!(units.len(), 2);
        assert_eq!(units.concat(), stream);
    }

    #[test]
    fn test_pic_struct_from_app0() {
        assert_eq!(
            parse_pic_struct(&picture_with_app0(0)),
            PicStruct::Progressive
        );
        assert_eq!(parse_pic_struct(&picture_with_app0(1)), PicStruct::FieldTff);
        assert_eq!(parse_pic_struct(&picture_with_app0(2)), PicStruct::FieldBff);
        assert_eq!(parse_pic_struct(&picture_with_app0(9)), PicStruct::Unknown);
    }

    #[test]
    fn test_pic_struct_without_app0() {
        assert_eq!(parse_pic_struct(&picture(&[0x01; 4])), PicStruct::Unknown);
        assert_eq!(parse_pic_struct(&[]), PicStruct::Unknown);
    }

    #[test]
    fn test_close_idempotent() {
        let mut reader = reader_over(picture(&[1, 2]), 4, 8);
        reader.close();
        reader.close();
    }
}

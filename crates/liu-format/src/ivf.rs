//! IVF 容器帧读取器.
//!
//! IVF 是最小化的长度前缀容器: 32 字节文件头之后是一串
//! "12 字节子头部 + 载荷" 记录. 载荷长度显式声明, 无需边界搜索,
//! 整条记录总是原子地消费, 这也是三种定界器中最简单的一种 —
//! 另外两种必须"发现"边界, 而不是读出边界.
//!
//! # 文件头布局 (全部小端)
//! ```text
//! 偏移 0   4 字节  签名 'DKIF'
//! 偏移 4   2 字节  版本
//! 偏移 6   2 字节  头部长度
//! 偏移 8   4 字节  编解码器 FourCC (如 'VP80')
//! 偏移 12  2 字节  宽度 (像素)
//! 偏移 14  2 字节  高度 (像素)
//! 偏移 16  4 字节  帧率分子
//! 偏移 20  4 字节  时间刻度 (分母)
//! 偏移 24  4 字节  帧数
//! 偏移 28  4 字节  保留
//! ```

use byteorder::{ByteOrder, LittleEndian};
use liu_core::{BitstreamBuffer, FourCc, LiuError, LiuResult, Rational};

use crate::frame_reader::FrameReader;
use crate::io::SourceBackend;
use crate::reader::StreamReader;

/// IVF 文件签名
pub const IVF_SIGNATURE: FourCc = FourCc(*b"DKIF");
/// 文件头大小 (字节)
pub const IVF_HEADER_SIZE: usize = 32;
/// 每条记录的子头部大小: 4 字节载荷长度 + 8 字节时间戳
pub const IVF_FRAME_HEADER_SIZE: usize = 12;

/// IVF 文件头
///
/// 在 `open` 时解析一次, 读取器生命周期内不可变.
#[derive(Debug, Clone)]
pub struct IvfHeader {
    /// 版本 (应为 0)
    pub version: u16,
    /// 头部长度 (字节)
    pub header_len: u16,
    /// 编解码器标签
    pub codec: FourCc,
    /// 宽度 (像素)
    pub width: u16,
    /// 高度 (像素)
    pub height: u16,
    /// 帧率分子
    pub frame_rate: u32,
    /// 时间刻度 (帧率分母)
    pub time_scale: u32,
    /// 声明的帧数
    pub num_frames: u32,
}

impl IvfHeader {
    /// 帧率 (frame_rate / time_scale)
    pub fn rate(&self) -> Rational {
        Rational::new(self.frame_rate, self.time_scale)
    }
}

/// 解析 32 字节文件头
fn parse_header(data: &[u8]) -> LiuResult<IvfHeader> {
    debug_assert_eq!(data.len(), IVF_HEADER_SIZE);
    let signature = FourCc([data[0], data[1], data[2], data[3]]);
    if signature != IVF_SIGNATURE {
        return Err(LiuError::InvalidContainer(format!(
            "签名 {signature} 不是 {IVF_SIGNATURE}"
        )));
    }
    Ok(IvfHeader {
        version: LittleEndian::read_u16(&data[4..6]),
        header_len: LittleEndian::read_u16(&data[6..8]),
        codec: FourCc::from_u32_le(LittleEndian::read_u32(&data[8..12])),
        width: LittleEndian::read_u16(&data[12..14]),
        height: LittleEndian::read_u16(&data[14..16]),
        frame_rate: LittleEndian::read_u32(&data[16..20]),
        time_scale: LittleEndian::read_u32(&data[20..24]),
        num_frames: LittleEndian::read_u32(&data[24..28]),
        // 偏移 28..32 保留, 不使用
    })
}

/// 反复取块直到工作区至少有 `n` 字节有效数据
///
/// 返回 `false` 表示流在凑够之前就结束了.
fn fill_until(reader: &mut StreamReader, work: &mut BitstreamBuffer, n: usize) -> LiuResult<bool> {
    while work.len() < n {
        if reader.refill_raw(work)? == 0 {
            return Ok(false);
        }
    }
    Ok(true)
}

/// IVF 帧读取器
pub struct IvfFrameReader {
    reader: StreamReader,
    work: BitstreamBuffer,
    header: IvfHeader,
}

impl IvfFrameReader {
    /// 打开文件输入并解析文件头
    ///
    /// 签名不匹配或头部不足 32 字节时返回 `LiuError::InvalidContainer`.
    pub fn open(path: &str) -> LiuResult<Self> {
        Self::from_reader(StreamReader::open(path)?)
    }

    /// 从任意字节源创建并解析文件头
    pub fn from_backend(source: Box<dyn SourceBackend>) -> LiuResult<Self> {
        Self::from_reader(StreamReader::from_backend(source))
    }

    /// 从已配置的基础读取器创建并解析文件头
    pub fn from_reader(mut reader: StreamReader) -> LiuResult<Self> {
        let mut work = BitstreamBuffer::new();
        if !fill_until(&mut reader, &mut work, IVF_HEADER_SIZE)? {
            return Err(LiuError::InvalidContainer(format!(
                "IVF 头部不足 {IVF_HEADER_SIZE} 字节"
            )));
        }
        let header = parse_header(&work.data()[..IVF_HEADER_SIZE])?;
        work.consume(IVF_HEADER_SIZE);
        log::debug!(
            "ivf: codec={} {}x{} rate={} 声明帧数={}",
            header.codec,
            header.width,
            header.height,
            header.rate(),
            header.num_frames
        );
        Ok(Self {
            reader,
            work,
            header,
        })
    }

    /// 文件头 (会话元数据, 不可变)
    pub fn header(&self) -> &IvfHeader {
        &self.header
    }
}

impl FrameReader for IvfFrameReader {
    fn name(&self) -> &str {
        "ivf"
    }

    fn read_next_frame(&mut self, bs: &mut BitstreamBuffer) -> LiuResult<()> {
        // 子头部: 载荷长度 + 时间戳; 剩余不足子头部即正常结束
        if !fill_until(&mut self.reader, &mut self.work, IVF_FRAME_HEADER_SIZE)? {
            return Err(LiuError::Eof);
        }
        let data = self.work.data();
        let frame_size = LittleEndian::read_u32(&data[0..4]) as usize;
        let time_stamp = LittleEndian::read_u64(&data[4..12]);

        // 整条记录原子消费, 载荷被截断即码流损坏
        if !fill_until(
            &mut self.reader,
            &mut self.work,
            IVF_FRAME_HEADER_SIZE + frame_size,
        )? {
            return Err(LiuError::CorruptBitstream(format!(
                "IVF 记录声明 {frame_size} 字节载荷, 流中只剩 {}",
                self.work.len() - IVF_FRAME_HEADER_SIZE
            )));
        }
        self.work.consume(IVF_FRAME_HEADER_SIZE);

        bs.reserve(frame_size)?;
        bs.move_from(&mut self.work, frame_size)?;
        bs.set_time_stamp(time_stamp);
        log::trace!("ivf: 取出记录 {frame_size} 字节, ts={time_stamp}");
        Ok(())
    }

    fn reset(&mut self) -> LiuResult<()> {
        self.reader.reset()?;
        self.work.clear();
        // 跳过文件头, 回到首条记录
        if !fill_until(&mut self.reader, &mut self.work, IVF_HEADER_SIZE)? {
            return Err(LiuError::InvalidContainer(format!(
                "IVF 头部不足 {IVF_HEADER_SIZE} 字节"
            )));
        }
        self.work.consume(IVF_HEADER_SIZE);
        Ok(())
    }

    fn close(&mut self) {
        self.reader.close();
        self.work.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryBackend;

    fn build_header(num_frames: u32) -> Vec<u8> {
        let mut h = Vec::new();
        h.extend_from_slice(b"DKIF");
        h.extend_from_slice(&0u16.to_le_bytes()); // version
        h.extend_from_slice(&32u16.to_le_bytes()); // header_len
        h.extend_from_slice(b"VP80");
        h.extend_from_slice(&1920u16.to_le_bytes());
        h.extend_from_slice(&1080u16.to_le_bytes());
        h.extend_from_slice(&30u32.to_le_bytes()); // frame_rate
        h.extend_from_slice(&1u32.to_le_bytes()); // time_scale
        h.extend_from_slice(&num_frames.to_le_bytes());
        h.extend_from_slice(&0u32.to_le_bytes()); // 保留
        h
    }

    fn build_record(ts: u64, payload: &[u8]) -> Vec<u8> {
        let mut r = Vec::new();
        r.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        r.extend_from_slice(&ts.to_le_bytes());
        r.extend_from_slice(payload);
        r
    }

    fn reader_over(data: Vec<u8>, source_chunk: usize) -> LiuResult<IvfFrameReader> {
        let backend = MemoryBackend::from_data(data).with_chunk_limit(source_chunk);
        IvfFrameReader::from_reader(
            StreamReader::from_backend(Box::new(backend)).with_chunk_size(64),
        )
    }

    #[test]
    fn test_header_fields() {
        let mut data = build_header(2);
        data.extend(build_record(0, &[0xAA; 8]));
        let reader = reader_over(data, 16).unwrap();
        let h = reader.header();
        assert_eq!(h.version, 0);
        assert_eq!(h.header_len, 32);
        assert_eq!(h.codec, FourCc(*b"VP80"));
        assert_eq!(h.width, 1920);
        assert_eq!(h.height, 1080);
        assert_eq!(h.rate(), Rational::new(30, 1));
        assert_eq!(h.num_frames, 2);
    }

    #[test]
    fn test_bad_signature() {
        let mut data = build_header(0);
        data[0..4].copy_from_slice(b"RIFF");
        assert!(matches!(
            reader_over(data, 16),
            Err(LiuError::InvalidContainer(_))
        ));
    }

    #[test]
    fn test_short_header() {
        assert!(matches!(
            reader_over(b"DKIF\x00\x00".to_vec(), 16),
            Err(LiuError::InvalidContainer(_))
        ));
    }

    #[test]
    fn test_records_then_eof() {
        let mut data = build_header(2);
        data.extend(build_record(100, &[0xAA; 40]));
        data.extend(build_record(101, &[0xBB; 25]));

        let mut reader = reader_over(data, 13).unwrap();

        let mut bs = BitstreamBuffer::new();
        reader.read_next_frame(&mut bs).unwrap();
        assert_eq!(bs.len(), 40);
        assert_eq!(bs.time_stamp(), 100);
        assert!(bs.data().iter().all(|&b| b == 0xAA));

        let mut bs = BitstreamBuffer::new();
        reader.read_next_frame(&mut bs).unwrap();
        assert_eq!(bs.len(), 25);
        assert_eq!(bs.time_stamp(), 101);

        let mut bs = BitstreamBuffer::new();
        assert!(matches!(
            reader.read_next_frame(&mut bs),
            Err(LiuError::Eof)
        ));
    }

    #[test]
    fn test_truncated_payload_is_corrupt() {
        let mut data = build_header(1);
        let mut rec = build_record(0, &[0xCC; 50]);
        rec.truncate(12 + 20); // 声明 50 字节, 只给 20
        data.extend(rec);

        let mut reader = reader_over(data, 16).unwrap();
        let mut bs = BitstreamBuffer::new();
        assert!(matches!(
            reader.read_next_frame(&mut bs),
            Err(LiuError::CorruptBitstream(_))
        ));
    }

    #[test]
    fn test_reset_replays_records() {
        let mut data = build_header(1);
        data.extend(build_record(7, &[0xEE; 10]));

        let mut reader = reader_over(data, 8).unwrap();
        let mut bs = BitstreamBuffer::new();
        reader.read_next_frame(&mut bs).unwrap();
        assert_eq!(bs.time_stamp(), 7);

        reader.reset().unwrap();
        let mut bs = BitstreamBuffer::new();
        reader.read_next_frame(&mut bs).unwrap();
        assert_eq!(bs.len(), 10);
        assert_eq!(bs.time_stamp(), 7);
    }

    #[test]
    fn test_close_idempotent() {
        let data = build_header(0);
        let mut reader = reader_over(data, 16).unwrap();
        reader.close();
        reader.close();
    }
}

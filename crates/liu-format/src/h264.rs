//! H.264 Annex-B 裸流切片定界器.
//!
//! Annex-B 流没有长度前缀, NAL 单元之间以起始码分隔:
//! 3 字节形式 `00 00 01` 或 4 字节形式 `00 00 00 01`.
//! 下游解码器要求每次送入至少一个完整切片, 可以容忍更多,
//! 因此本定界器每次调用返回"从一个起始码到下一个起始码"的整段.
//!
//! # 边界判定的已知简化
//! 默认策略与裸 Annex-B 扫描一致: 任何 `00 00 01` 对齐都视为起始码,
//! 不检查其后的 NAL 头字节. 载荷中偶然出现的同形字节序列会被误判,
//! 这是 Annex-B 扫描的已接受风险. `with_strict(true)` 额外要求
//! NAL 头的 forbidden_zero_bit 为 0, 可以过滤掉一部分误判,
//! 但会改变畸形输入上的可观察分帧行为, 故不作为默认.

use liu_core::{BitstreamBuffer, LiuError, LiuResult};

use crate::frame_reader::FrameReader;
use crate::io::SourceBackend;
use crate::reader::StreamReader;

/// 起始码前缀
const START_CODE_PREFIX: [u8; 3] = [0x00, 0x00, 0x01];

/// 在 `data[from..]` 中寻找下一个起始码
///
/// 返回单元起始位置: 4 字节形式时把前导 0 并入起始码.
/// 严格模式下, 前缀位于窗口末尾而 NAL 头字节尚未进窗口时返回
/// `None` (等待更多数据后重扫).
fn find_start_code(data: &[u8], from: usize, strict: bool) -> Option<usize> {
    let mut i = from;
    while i + 3 <= data.len() {
        if data[i..i + 3] == START_CODE_PREFIX {
            if strict {
                match data.get(i + 3) {
                    // forbidden_zero_bit 必须为 0
                    Some(nal) if nal & 0x80 == 0 => {}
                    Some(_) => {
                        i += 1;
                        continue;
                    }
                    None => return None,
                }
            }
            if i > 0 && data[i - 1] == 0 {
                return Some(i - 1);
            }
            return Some(i);
        }
        i += 1;
    }
    None
}

/// 窗口起始处起始码的长度 (3 或 4 字节)
fn start_code_len(data: &[u8]) -> usize {
    debug_assert!(data.len() >= 3);
    if data[2] == 0x01 { 3 } else { 4 }
}

/// H.264 切片定界器
///
/// 持有基础读取器、工作缓冲区与跨界缓冲区. 跨界缓冲区中保存着
/// 已从字节源取回、但属于下一个单元的字节, 跨调用存续.
pub struct H264SliceReader {
    reader: StreamReader,
    work: BitstreamBuffer,
    carry: BitstreamBuffer,
    strict: bool,
}

impl H264SliceReader {
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
            strict: false,
        }
    }

    /// 严格模式: 起始码之后的 NAL 头字节 forbidden_zero_bit 必须为 0
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// 以上一次调用的跨界余量作为工作区种子
    fn seed_from_carry(&mut self) -> LiuResult<()> {
        let pending = self.carry.len();
        if pending > 0 {
            self.work.reserve(pending)?;
            self.work.move_from(&mut self.carry, pending)?;
        }
        Ok(())
    }
}

impl FrameReader for H264SliceReader {
    fn name(&self) -> &str {
        "h264"
    }

    /// 追加-扫描-决策循环: 工作区种子 + 逐块取回, 跨界缓冲区与新块
    /// 作为同一条逻辑流扫描, 重扫只从上次扫描边界附近恢复,
    /// 不重复检查已判定的字节.
    fn read_next_frame(&mut self, bs: &mut BitstreamBuffer) -> LiuResult<()> {
        self.seed_from_carry()?;

        // 阶段 1: 定位本单元的起始码, 其前的杂散字节不属于任何单元
        let mut scan = 0usize;
        loop {
            match find_start_code(self.work.data(), scan, self.strict) {
                Some(pos) => {
                    self.work.consume(pos);
                    break;
                }
                None => {
                    // 前缀可能跨越块边界, 回退 3 字节重扫
                    scan = self.work.len().saturating_sub(3);
                    if self.reader.refill_raw(&mut self.work)? == 0 {
                        // 整段数据中没有起始码: 流正常结束
                        self.work.clear();
                        return Err(LiuError::Eof);
                    }
                }
            }
        }

        // 阶段 2: 下一个起始码即本单元的右边界
        let prefix = start_code_len(self.work.data());
        let mut scan = prefix;
        let unit_len = loop {
            match find_start_code(self.work.data(), scan, self.strict) {
                Some(pos) => break pos,
                None => {
                    scan = self.work.len().saturating_sub(3).max(prefix);
                    if self.reader.refill_raw(&mut self.work)? == 0 {
                        // 流尾是隐式的单元终结符
                        break self.work.len();
                    }
                }
            }
        };

        log::trace!(
            "h264: 取出单元 {unit_len} 字节, 跨界余量 {} 字节",
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

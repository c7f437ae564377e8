//! FourCC (4 字节编解码器标签).
//!
//! IVF 等容器用 4 字节 ASCII 标签声明码流的编解码器,
//! 例如 `VP80`, `VP90`, `AV01`.

use std::fmt;

/// 4 字节编解码器/容器标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    /// 从小端 u32 还原标签 (容器字段按小端存储)
    pub const fn from_u32_le(v: u32) -> Self {
        Self(v.to_le_bytes())
    }

    /// 转换为小端 u32
    pub const fn to_u32_le(self) -> u32 {
        u32::from_le_bytes(self.0)
    }
}

impl From<&[u8; 4]> for FourCc {
    fn from(tag: &[u8; 4]) -> Self {
        Self(*tag)
    }
}

impl fmt::Display for FourCc {
    /// 可打印 ASCII 直接输出, 否则退化为十六进制形式
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            for b in self.0 {
                write!(f, "{}", b as char)?;
            }
            Ok(())
        } else {
            write!(f, "0x{:08X}", self.to_u32_le())
        }
    }
}

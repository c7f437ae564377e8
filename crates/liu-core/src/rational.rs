//! 有理数类型, 用于帧率等"分子/分母"场景.

use std::fmt;

/// 有理数, 由分子和分母组成
///
/// IVF 容器头部的帧率即以 (frame_rate, time_scale) 的有理数形式声明,
/// 例如 30000/1001 表示 29.97fps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    /// 分子
    pub num: u32,
    /// 分母
    pub den: u32,
}

impl Rational {
    /// 创建新的有理数
    pub const fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    /// 零值
    pub const ZERO: Self = Self { num: 0, den: 1 };

    /// 判断是否有效 (分母不为 0)
    pub const fn is_valid(&self) -> bool {
        self.den != 0
    }

    /// 转换为 f64 浮点数
    ///
    /// 如果分母为 0, 返回 `f64::NAN`.
    pub fn to_f64(self) -> f64 {
        if self.den == 0 {
            return f64::NAN;
        }
        f64::from(self.num) / f64::from(self.den)
    }

    /// 对有理数进行约分
    pub fn reduce(self) -> Self {
        let g = gcd(self.num, self.den);
        if g == 0 {
            return self;
        }
        Self {
            num: self.num / g,
            den: self.den / g,
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// 最大公约数 (欧几里得算法)
fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_f64() {
        assert!((Rational::new(30000, 1001).to_f64() - 29.97).abs() < 0.01);
        assert!(Rational::new(1, 0).to_f64().is_nan());
    }

    #[test]
    fn test_reduce() {
        assert_eq!(Rational::new(30, 10).reduce(), Rational::new(3, 1));
        assert_eq!(Rational::new(0, 0).reduce(), Rational::new(0, 0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Rational::new(30, 1).to_string(), "30/1");
    }
}

// ==========================================
// 混凝土搅拌站过磅系统 - 响应帧解析
// ==========================================
// 职责: 把仪表一行原始文本解析为 Reading
// 支持的帧格式（按先具体后宽松的顺序匹配）:
//   1. ST,<num>,<unit>   带稳定标记的 CSV 形式
//   2. ST <num> <unit>   带稳定标记的空格分隔形式
//   3. <num><unit>       紧凑形式
//   4. <num>             纯数字兜底
// 解析失败返回 None,由调用方决定记日志还是忽略
// ==========================================

use crate::domain::Reading;

/// 缺省重量单位
const DEFAULT_UNIT: &str = "kg";

/// 响应帧解析器
///
/// 无状态,逐帧解析,不跨帧累积
pub struct FrameParser;

impl FrameParser {
    /// 解析一行仪表输出
    ///
    /// 返回 None 表示无法匹配任何已知格式（不是错误）
    pub fn parse(raw: &str) -> Option<Reading> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        // 带 ST 标记的格式本身就是稳定声明;
        // 无标记格式只认独立的 ST/STABLE 词,避免 "STATUS" 之类的子串误判
        let (weight, unit, stable) = parse_csv_tagged(trimmed)
            .or_else(|| parse_space_tagged(trimmed))
            .map(|(w, u)| (w, u, true))
            .or_else(|| {
                parse_numeric(trimmed).map(|(w, u)| (w, u, has_stable_marker(trimmed)))
            })?;

        let unit = if unit.is_empty() {
            DEFAULT_UNIT.to_string()
        } else {
            unit.to_lowercase()
        };

        Some(Reading::new(weight, unit, stable, trimmed))
    }
}

/// 格式 1: `ST,<num>,<unit>`
fn parse_csv_tagged(s: &str) -> Option<(f64, String)> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return None;
    }
    if parts[0].trim() != "ST" {
        return None;
    }
    let weight: f64 = parts[1].trim().parse().ok()?;
    let unit = parts[2].trim();
    if unit.is_empty() || !unit.chars().all(|c| c.is_alphabetic()) {
        return None;
    }
    Some((weight, unit.to_string()))
}

/// 格式 2: `ST <num> <unit>`
fn parse_space_tagged(s: &str) -> Option<(f64, String)> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() != 3 {
        return None;
    }
    if parts[0] != "ST" {
        return None;
    }
    let weight: f64 = parts[1].parse().ok()?;
    let unit = parts[2];
    if !unit.chars().all(|c| c.is_alphabetic()) {
        return None;
    }
    Some((weight, unit.to_string()))
}

/// 无标记格式的稳定判定: 文本中出现独立的 ST / STABLE 词
fn has_stable_marker(s: &str) -> bool {
    s.split(|c: char| !c.is_ascii_alphabetic())
        .any(|token| token == "ST" || token == "STABLE")
}

/// 格式 3/4: `<num><unit>` 或 `<num>`（前导杂项字符被跳过）
fn parse_numeric(s: &str) -> Option<(f64, String)> {
    let (num, unit) = extract_number_and_unit(s);
    let weight: f64 = num.parse().ok()?;
    Some((weight, unit))
}

/// 从字符串中扫出第一段带符号十进制数,之后的字母字符作为单位
fn extract_number_and_unit(s: &str) -> (String, String) {
    let mut num = String::new();
    let mut unit = String::new();
    let mut found_sign = false;
    let mut found_digit = false;
    let mut past_number = false;

    for ch in s.chars() {
        if past_number {
            if ch.is_alphabetic() {
                unit.push(ch);
            }
            continue;
        }

        if ch == '+' && !found_digit && !found_sign {
            // 前导 '+' 只记符号不入数字
            found_sign = true;
        } else if ch == '-' && !found_digit && !found_sign {
            found_sign = true;
            num.push(ch);
        } else if ch.is_ascii_digit() || ch == '.' {
            found_digit = true;
            num.push(ch);
        } else if found_digit {
            // 数字段结束
            past_number = true;
            if ch.is_alphabetic() {
                unit.push(ch);
            }
        }
        // 数字开始前的其他字符一律跳过
    }

    (num, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_tagged() {
        let r = FrameParser::parse("ST,+12000.5,kg").unwrap();
        assert!((r.weight - 12000.5).abs() < 0.001);
        assert_eq!(r.unit, "kg");
        assert!(r.stable);
    }

    #[test]
    fn test_parse_csv_tagged_negative() {
        let r = FrameParser::parse("ST,-20.0,kg").unwrap();
        assert!((r.weight + 20.0).abs() < 0.001);
        assert!(r.stable);
    }

    #[test]
    fn test_parse_space_tagged() {
        let r = FrameParser::parse("ST 8500 kg").unwrap();
        assert!((r.weight - 8500.0).abs() < 0.001);
        assert_eq!(r.unit, "kg");
        assert!(r.stable);
    }

    #[test]
    fn test_parse_compact() {
        let r = FrameParser::parse("12000.5kg").unwrap();
        assert!((r.weight - 12000.5).abs() < 0.001);
        assert_eq!(r.unit, "kg");
        assert!(!r.stable);
    }

    #[test]
    fn test_parse_compact_pounds() {
        let r = FrameParser::parse("+2.500lb").unwrap();
        assert!((r.weight - 2.5).abs() < 0.001);
        assert_eq!(r.unit, "lb");
    }

    #[test]
    fn test_parse_bare_number_defaults_kg() {
        let r = FrameParser::parse("  1234.5  ").unwrap();
        assert!((r.weight - 1234.5).abs() < 0.001);
        assert_eq!(r.unit, "kg");
        assert!(!r.stable);
    }

    #[test]
    fn test_parse_unstable_prefix_still_reads_weight() {
        // US 前缀不匹配稳定格式,由数字兜底解析,稳定标记为 false
        let r = FrameParser::parse("US,1500.0,kg").unwrap();
        assert!((r.weight - 1500.0).abs() < 0.001);
        assert!(!r.stable);
    }

    #[test]
    fn test_substring_st_does_not_mark_stable() {
        // 回显文本里的 "STATUS" 含 ST 子串,不是稳定标记
        let r = FrameParser::parse("STATUS 100").unwrap();
        assert!((r.weight - 100.0).abs() < 0.001);
        assert!(!r.stable);
    }

    #[test]
    fn test_stable_token_on_untagged_frame() {
        let r = FrameParser::parse("STABLE 12000 kg").unwrap();
        assert!((r.weight - 12000.0).abs() < 0.001);
        assert_eq!(r.unit, "kg");
        assert!(r.stable);
    }

    #[test]
    fn test_parse_garbage_returns_none() {
        assert!(FrameParser::parse("garbage").is_none());
        assert!(FrameParser::parse("").is_none());
        assert!(FrameParser::parse("   ").is_none());
        assert!(FrameParser::parse("ST,,kg").is_none());
    }

    #[test]
    fn test_ordered_match_prefers_csv_form() {
        // CSV 格式的逗号不应落入兜底扫描
        let r = FrameParser::parse("ST,100,kg").unwrap();
        assert!((r.weight - 100.0).abs() < 0.001);
        assert_eq!(r.unit, "kg");
    }

    #[test]
    fn test_extract_number_and_unit() {
        let (num, unit) = extract_number_and_unit("+  0.500kg");
        assert_eq!(num, "0.500");
        assert_eq!(unit, "kg");

        let (num, unit) = extract_number_and_unit("-  1.234lb");
        assert_eq!(num, "-1.234");
        assert_eq!(unit, "lb");
    }
}

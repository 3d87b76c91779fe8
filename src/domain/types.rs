// ==========================================
// 混凝土搅拌站过磅系统 - 领域类型定义
// ==========================================
// 红线: 状态单向流转 DRAFT -> COMPLETED, 不可回退
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 过磅单状态 (Draft Status)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftStatus {
    Draft,     // 已录毛重,等待皮重
    Completed, // 已完成,净重已结算
}

impl DraftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftStatus::Draft => "DRAFT",
            DraftStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(s: &str) -> DraftStatus {
        match s.trim().to_uppercase().as_str() {
            "COMPLETED" => DraftStatus::Completed,
            _ => DraftStatus::Draft,
        }
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 车牌号归一化
// ==========================================

/// 车牌号归一化: 去空白、去连字符、统一大写
///
/// 同一辆车的不同录入格式（"01abc123" / "01 ABC-123"）必须归并到同一个键,
/// 否则"同车牌唯一在途"约束失效
pub fn normalize_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        assert_eq!(DraftStatus::parse("COMPLETED"), DraftStatus::Completed);
        assert_eq!(DraftStatus::parse("draft"), DraftStatus::Draft);
        // 未知值回落到 DRAFT
        assert_eq!(DraftStatus::parse("???"), DraftStatus::Draft);
        assert_eq!(DraftStatus::Completed.as_str(), "COMPLETED");
    }

    #[test]
    fn test_normalize_plate() {
        assert_eq!(normalize_plate("01abc123"), "01ABC123");
        assert_eq!(normalize_plate(" 01 ABC-123 "), "01ABC123");
        assert_eq!(normalize_plate("01ABC123"), "01ABC123");
    }
}

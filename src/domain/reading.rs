// ==========================================
// 混凝土搅拌站过磅系统 - 重量读数
// ==========================================
// 说明: 读数为瞬态对象,不单独落库
// 它会被吸收进过磅单(毛重/皮重)或连接状态(当前重量)
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 一次来自称重仪表的重量读数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    /// 重量值（单位见 unit）
    pub weight: f64,
    /// 重量单位（仪表未上报时默认 kg）
    pub unit: String,
    /// 读数时刻
    pub timestamp: DateTime<Utc>,
    /// 是否稳定读数（仪表带 ST/STABLE 标记）
    pub stable: bool,
    /// 原始帧文本（诊断用）
    pub raw: String,
}

impl Reading {
    pub fn new(weight: f64, unit: impl Into<String>, stable: bool, raw: impl Into<String>) -> Self {
        Self {
            weight,
            unit: unit.into(),
            timestamp: Utc::now(),
            stable,
            raw: raw.into(),
        }
    }
}

// ==========================================
// 混凝土搅拌站过磅系统 - 过磅单实体
// ==========================================
// 两段式称重: 进场录毛重 -> 出场录皮重 -> 结算净重
// 红线: net_weight 为派生字段,禁止直接录入
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{normalize_plate, DraftStatus};

// ==========================================
// 操作员引用
// ==========================================

/// 过磅操作员（进场时记录,出场不变更）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorRef {
    pub operator_id: String,
    pub operator_name: String,
}

// ==========================================
// 出场补充信息
// ==========================================

/// 出场时随皮重一并录入的业务信息
///
/// 必填与否由 UI 层把关,本层只做合并
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepartureInfo {
    pub supplier: Option<String>,
    pub recipient: Option<String>,
    pub cargo_type: Option<String>,
    pub notes: Option<String>,
}

// ==========================================
// 过磅单
// ==========================================

/// 过磅单实体
///
/// 不变量:
/// 1. 同一归一化车牌同时最多一张 DRAFT 状态过磅单
/// 2. net_weight 有值 当且仅当 status = COMPLETED,
///    且 net_weight = max(0, gross_weight - tare_weight)
/// 3. 状态单向流转 DRAFT -> COMPLETED
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeighingDraft {
    pub draft_id: String,
    /// 归一化后的车牌号
    pub vehicle_number: String,

    pub gross_weight: f64,
    pub gross_at: DateTime<Utc>,

    pub tare_weight: Option<f64>,
    pub tare_at: Option<DateTime<Utc>>,
    /// 派生: max(0, 毛重 - 皮重)
    pub net_weight: Option<f64>,

    pub supplier: Option<String>,
    pub recipient: Option<String>,
    pub cargo_type: Option<String>,
    pub notes: Option<String>,

    pub status: DraftStatus,

    pub operator_id: String,
    pub operator_name: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WeighingDraft {
    /// 由进场毛重读数创建新过磅单
    pub fn new_arrival(
        plate: &str,
        gross_weight: f64,
        gross_at: DateTime<Utc>,
        operator: &OperatorRef,
    ) -> Self {
        let now = Utc::now();
        Self {
            draft_id: Uuid::new_v4().to_string(),
            vehicle_number: normalize_plate(plate),
            gross_weight,
            gross_at,
            tare_weight: None,
            tare_at: None,
            net_weight: None,
            supplier: None,
            recipient: None,
            cargo_type: None,
            notes: None,
            status: DraftStatus::Draft,
            operator_id: operator.operator_id.clone(),
            operator_name: operator.operator_name.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// 净重结算: max(0, 毛重 - 皮重)
///
/// 皮重大于毛重（空车复磅、仪表漂移）时不允许出现负净重
pub fn compute_net_weight(gross: f64, tare: f64) -> f64 {
    (gross - tare).max(0.0)
}

// ==========================================
// 混凝土搅拌站过磅系统 - 称重流程引擎
// ==========================================
// 两段式称重状态机（按车牌）:
//   无在途单 --进场录毛重--> DRAFT --出场录皮重--> COMPLETED
// 红线:
// - 同车牌唯一在途单
// - 净重 = max(0, 毛重 - 皮重),只在出场时派生
// - COMPLETED 不可回改
// ==========================================

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::draft::compute_net_weight;
use crate::domain::{DepartureInfo, OperatorRef, Reading, WeighingDraft};
use crate::engine::error::{WeighingError, WeighingResult};
use crate::repository::draft_repo::WeighingDraftRepository;
use crate::repository::error::RepositoryError;

/// 称重流程引擎
///
/// 仓储通过构造注入,持久化后端对引擎透明
pub struct WeighingWorkflow {
    draft_repo: Arc<WeighingDraftRepository>,
}

impl WeighingWorkflow {
    pub fn new(draft_repo: Arc<WeighingDraftRepository>) -> Self {
        Self { draft_repo }
    }

    // ==========================================
    // 进场
    // ==========================================

    /// 进场录毛重,创建在途过磅单
    ///
    /// # 前置条件
    /// - 车牌非空
    /// - 读数重量 > 0
    /// - 该车牌当前没有在途单
    pub fn record_arrival(
        &self,
        plate: &str,
        reading: &Reading,
        operator: &OperatorRef,
    ) -> WeighingResult<WeighingDraft> {
        validate_plate(plate)?;
        validate_reading(reading)?;

        if let Some(open) = self.draft_repo.find_open_by_plate(plate)? {
            debug!(plate = %open.vehicle_number, draft_id = %open.draft_id, "进场被拒: 已有在途单");
            return Err(WeighingError::DuplicateDraft {
                plate: open.vehicle_number,
            });
        }

        let draft = WeighingDraft::new_arrival(plate, reading.weight, Utc::now(), operator);
        self.draft_repo.insert(&draft)?;

        info!(
            plate = %draft.vehicle_number,
            draft_id = %draft.draft_id,
            gross = draft.gross_weight,
            "进场毛重已记录"
        );
        Ok(draft)
    }

    // ==========================================
    // 出场
    // ==========================================

    /// 出场录皮重,结算净重并完成过磅单
    ///
    /// 净重 = max(0, 毛重 - 皮重); 补充信息按字段合并,
    /// 必填校验由 UI 层负责
    pub fn record_departure(
        &self,
        plate: &str,
        reading: &Reading,
        info: &DepartureInfo,
    ) -> WeighingResult<WeighingDraft> {
        validate_plate(plate)?;
        validate_tare_reading(reading)?;

        let draft = self
            .draft_repo
            .find_open_by_plate(plate)?
            .ok_or_else(|| WeighingError::NotFound {
                plate: crate::domain::normalize_plate(plate),
            })?;

        let tare_weight = reading.weight;
        let tare_at = Utc::now();
        let net_weight = compute_net_weight(draft.gross_weight, tare_weight);

        self.draft_repo
            .complete_departure(&draft.draft_id, tare_weight, tare_at, net_weight, info)
            .map_err(|e| match e {
                // 查到在途单之后被并发完成属于"在途单不存在"
                RepositoryError::NotFound { .. } => WeighingError::NotFound {
                    plate: draft.vehicle_number.clone(),
                },
                other => WeighingError::from(other),
            })?;

        let completed = self
            .draft_repo
            .find_by_id(&draft.draft_id)?
            .ok_or_else(|| WeighingError::NotFound {
                plate: draft.vehicle_number.clone(),
            })?;

        info!(
            plate = %completed.vehicle_number,
            draft_id = %completed.draft_id,
            gross = completed.gross_weight,
            tare = tare_weight,
            net = net_weight,
            "出场皮重已记录,过磅单完成"
        );
        Ok(completed)
    }

    // ==========================================
    // 查询透传
    // ==========================================

    /// 按车牌查在途过磅单（续录场景: UI 先查再继续编辑）
    pub fn find_open_draft(&self, plate: &str) -> WeighingResult<Option<WeighingDraft>> {
        validate_plate(plate)?;
        Ok(self.draft_repo.find_open_by_plate(plate)?)
    }
}

// ==========================================
// 校验
// ==========================================

fn validate_plate(plate: &str) -> WeighingResult<()> {
    if plate.trim().is_empty() {
        return Err(WeighingError::EmptyPlate);
    }
    Ok(())
}

/// 进场毛重读数: 必须为正数
fn validate_reading(reading: &Reading) -> WeighingResult<()> {
    if !reading.weight.is_finite() {
        return Err(WeighingError::InvalidReading(format!(
            "重量不是有效数值: {}",
            reading.weight
        )));
    }
    if reading.weight <= 0.0 {
        return Err(WeighingError::InvalidReading(format!(
            "重量必须大于 0: {}",
            reading.weight
        )));
    }
    Ok(())
}

/// 出场皮重读数: 允许为 0,不允许负数
fn validate_tare_reading(reading: &Reading) -> WeighingResult<()> {
    if !reading.weight.is_finite() {
        return Err(WeighingError::InvalidReading(format!(
            "重量不是有效数值: {}",
            reading.weight
        )));
    }
    if reading.weight < 0.0 {
        return Err(WeighingError::InvalidReading(format!(
            "皮重不能为负数: {}",
            reading.weight
        )));
    }
    Ok(())
}

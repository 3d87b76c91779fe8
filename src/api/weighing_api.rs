// ==========================================
// 混凝土搅拌站过磅系统 - 称重 API
// ==========================================
// 职责: 过磅单查询与两段式称重操作入口
// ==========================================

use std::sync::Arc;
use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::{DepartureInfo, DraftStatus, OperatorRef, Reading, WeighingDraft};
use crate::engine::weighing::WeighingWorkflow;
use crate::repository::draft_repo::WeighingDraftRepository;

/// 称重 API
///
/// 职责:
/// 1. 过磅单查询（列表/单条/在途）
/// 2. 进场/出场操作入口
/// 3. 输入校验与错误分类转换
pub struct WeighingApi {
    workflow: Arc<WeighingWorkflow>,
    draft_repo: Arc<WeighingDraftRepository>,
}

impl WeighingApi {
    pub fn new(workflow: Arc<WeighingWorkflow>, draft_repo: Arc<WeighingDraftRepository>) -> Self {
        Self {
            workflow,
            draft_repo,
        }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 过磅单列表
    ///
    /// # 参数
    /// - status_filter: 可选状态过滤（"DRAFT" / "COMPLETED"）
    /// - limit: 返回记录数上限
    pub fn list_drafts(
        &self,
        status_filter: Option<String>,
        limit: i64,
    ) -> ApiResult<Vec<WeighingDraft>> {
        let status = match status_filter {
            Some(ref s) if !s.trim().is_empty() => Some(parse_status(s)?),
            _ => None,
        };

        debug!(status = ?status, limit = limit, "查询过磅单列表");
        Ok(self.draft_repo.list(status, limit)?)
    }

    /// 按 ID 查询过磅单
    pub fn get_draft(&self, draft_id: &str) -> ApiResult<WeighingDraft> {
        if draft_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("过磅单 ID 不能为空".to_string()));
        }
        self.draft_repo
            .find_by_id(draft_id)?
            .ok_or_else(|| ApiError::NotFound(format!("过磅单不存在: {}", draft_id)))
    }

    /// 按车牌查在途过磅单（UI 续录场景）
    pub fn find_open_draft(&self, plate: &str) -> ApiResult<Option<WeighingDraft>> {
        Ok(self.workflow.find_open_draft(plate)?)
    }

    // ==========================================
    // 操作接口
    // ==========================================

    /// 进场录毛重
    pub fn record_arrival(
        &self,
        plate: &str,
        reading: &Reading,
        operator: &OperatorRef,
    ) -> ApiResult<WeighingDraft> {
        if operator.operator_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("操作员 ID 不能为空".to_string()));
        }
        Ok(self.workflow.record_arrival(plate, reading, operator)?)
    }

    /// 出场录皮重并完成过磅单
    pub fn record_departure(
        &self,
        plate: &str,
        reading: &Reading,
        info: &DepartureInfo,
    ) -> ApiResult<WeighingDraft> {
        Ok(self.workflow.record_departure(plate, reading, info)?)
    }
}

fn parse_status(s: &str) -> ApiResult<DraftStatus> {
    match s.trim().to_uppercase().as_str() {
        "DRAFT" => Ok(DraftStatus::Draft),
        "COMPLETED" => Ok(DraftStatus::Completed),
        other => Err(ApiError::InvalidInput(format!(
            "未知的过磅单状态: {}",
            other
        ))),
    }
}

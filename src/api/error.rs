// ==========================================
// 混凝土搅拌站过磅系统 - API 层错误类型
// ==========================================
// 职责: 把各层错误转换为操作员可理解的分类
// 分类原则: 设备类错误 != 数据类错误,UI 必须能区分
// ==========================================

use thiserror::Error;

use crate::device::error::{CommandError, ConnectionError};
use crate::engine::error::WeighingError;
use crate::repository::error::RepositoryError;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== 数据类错误 =====
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    // ===== 设备类错误 =====
    #[error("称重设备错误: {0}")]
    DeviceError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从引擎层错误转换
// ==========================================
impl From<WeighingError> for ApiError {
    fn from(err: WeighingError) -> Self {
        match err {
            WeighingError::EmptyPlate => ApiError::InvalidInput(err.to_string()),
            WeighingError::InvalidReading(_) => ApiError::InvalidInput(err.to_string()),
            WeighingError::DuplicateDraft { .. } => {
                ApiError::BusinessRuleViolation(err.to_string())
            }
            WeighingError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            WeighingError::Repository(inner) => ApiError::from(inner),
        }
    }
}

// ==========================================
// 从仓储层错误转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateDraft { .. } => {
                ApiError::BusinessRuleViolation(err.to_string())
            }
            RepositoryError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::Other(e) => ApiError::Other(e),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

// ==========================================
// 从设备层错误转换
// ==========================================
impl From<ConnectionError> for ApiError {
    fn from(err: ConnectionError) -> Self {
        ApiError::DeviceError(err.to_string())
    }
}

impl From<CommandError> for ApiError {
    fn from(err: CommandError) -> Self {
        ApiError::DeviceError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 混凝土搅拌站过磅系统 - 引擎层错误类型
// ==========================================
// 说明: 业务不变量违反必须上抛给调用方,
// 引擎不做静默重试、不做猜测性修复
// ==========================================

use thiserror::Error;

use crate::repository::error::RepositoryError;

/// 称重流程错误
#[derive(Error, Debug)]
pub enum WeighingError {
    #[error("车牌号不能为空")]
    EmptyPlate,

    #[error("无效读数: {0}")]
    InvalidReading(String),

    #[error("该车牌已有在途过磅单: {plate}")]
    DuplicateDraft { plate: String },

    #[error("未找到该车牌的在途过磅单: {plate}")]
    NotFound { plate: String },

    #[error(transparent)]
    Repository(RepositoryError),
}

// 仓储错误转换: 业务约束类错误映射到对应的引擎错误,
// 其余作为仓储错误透传
impl From<RepositoryError> for WeighingError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateDraft { plate } => WeighingError::DuplicateDraft { plate },
            other => WeighingError::Repository(other),
        }
    }
}

/// Result 类型别名
pub type WeighingResult<T> = Result<T, WeighingError>;

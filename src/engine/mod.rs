// ==========================================
// 混凝土搅拌站过磅系统 - 引擎层
// ==========================================
// 职责: 称重业务规则
// 红线: 引擎不直接触碰 SQL,通过仓储接口访问数据
// ==========================================

pub mod error;
pub mod weighing;

// 重导出核心类型
pub use error::WeighingError;
pub use weighing::WeighingWorkflow;

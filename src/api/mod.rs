// ==========================================
// 混凝土搅拌站过磅系统 - API 层
// ==========================================
// 职责: 面向宿主 UI 的业务接口
// 说明: UI 本身不在本库范围内,但 UI 需要能区分
// "硬件问题"与"数据问题",错误转换在本层完成
// ==========================================

pub mod error;
pub mod scale_api;
pub mod weighing_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use scale_api::ScaleApi;
pub use weighing_api::WeighingApi;

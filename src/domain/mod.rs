// ==========================================
// 混凝土搅拌站过磅系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含数据访问逻辑,不含设备 I/O 逻辑
// ==========================================

pub mod draft;
pub mod reading;
pub mod scale;
pub mod types;

// 重导出核心类型
pub use draft::{DepartureInfo, OperatorRef, WeighingDraft};
pub use reading::Reading;
pub use scale::{
    AutoSettings, CommandSet, ConnectionStatus, DataBits, Parity, ScaleModelConfig, StopBits,
};
pub use types::{normalize_plate, DraftStatus};

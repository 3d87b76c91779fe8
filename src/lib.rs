// ==========================================
// 混凝土搅拌站过磅系统 - 称重核心库
// ==========================================
// 技术栈: Rust + SQLite + tokio-serial
// 系统定位: 称重状态/协议引擎 (UI 无关)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 设备层 - 串口协议适配
pub mod device;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 称重业务规则
pub mod engine;

// 配置层 - 称重仪表型号
pub mod config;

// API 层 - 业务接口
pub mod api;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    AutoSettings, CommandSet, ConnectionStatus, DataBits, DepartureInfo, DraftStatus,
    OperatorRef, Parity, Reading, ScaleModelConfig, StopBits, WeighingDraft,
};

// 设备层
pub use device::{
    AutoPolicyEngine, CommandError, ConnectionError, DeviceLink, FrameParser, SerialDeviceLink,
};

// 仓储层
pub use repository::{RepositoryError, RepositoryResult, WeighingDraftRepository};

// 引擎
pub use engine::{WeighingError, WeighingWorkflow};

// API
pub use api::{ApiError, ApiResult, ScaleApi, WeighingApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "混凝土搅拌站过磅系统";

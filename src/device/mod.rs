// ==========================================
// 混凝土搅拌站过磅系统 - 设备层
// ==========================================
// 职责: 称重仪表串口协议适配
// 结构: FrameParser(帧解析) -> DeviceLink(链路) -> AutoPolicyEngine(策略)
// 红线: 设备层不触碰过磅单数据,读数通过广播通道上行
// ==========================================

pub mod error;
pub mod frame_parser;
pub mod link;
pub mod policy;

// 重导出核心类型
pub use error::{CommandError, ConnectionError};
pub use frame_parser::FrameParser;
pub use link::{DeviceLink, SerialDeviceLink};
pub use policy::AutoPolicyEngine;

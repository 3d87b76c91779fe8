// ==========================================
// 混凝土搅拌站过磅系统 - 配置层
// ==========================================
// 职责: 内置称重仪表型号注册表
// ==========================================

pub mod scale_models;

pub use scale_models::{builtin_models, default_model, find_model};

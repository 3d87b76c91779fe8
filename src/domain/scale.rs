// ==========================================
// 混凝土搅拌站过磅系统 - 称重仪表配置
// ==========================================
// 说明: 每种仪表型号一份静态配置,会话期间不可变
// 由 AutoPolicyEngine 独占持有
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// 串口线路参数
// ==========================================

/// 数据位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataBits {
    Seven,
    Eight,
}

/// 停止位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopBits {
    One,
    Two,
}

/// 校验位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl Default for Parity {
    fn default() -> Self {
        Parity::None
    }
}

// ==========================================
// 仪表命令集
// ==========================================

/// 仪表 ASCII 命令集
///
/// 型号未提供的命令用 None 表示,不使用空字符串哨兵
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandSet {
    pub get_weight: Option<String>,
    pub tare: Option<String>,
    pub zero: Option<String>,
    pub calibration: Option<String>,
    pub status: Option<String>,
    pub reset: Option<String>,
}

// ==========================================
// 自动化策略参数
// ==========================================

/// 连接期自动化策略
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoSettings {
    pub auto_connect: bool,
    pub auto_tare: bool,
    pub auto_zero: bool,
    /// 轮询周期（毫秒）,0 表示不轮询（仪表连续输出）
    pub polling_interval_ms: u64,
    pub timeout_ms: u64,
    pub retry_attempts: u32,
    pub auto_reconnect: bool,
    /// 打开串口后的静置时长（毫秒）,等待仪表就绪
    pub connection_delay_ms: u64,
}

impl Default for AutoSettings {
    fn default() -> Self {
        Self {
            auto_connect: false,
            auto_tare: false,
            auto_zero: false,
            polling_interval_ms: 0,
            timeout_ms: 3_000,
            retry_attempts: 3,
            auto_reconnect: false,
            connection_delay_ms: 500,
        }
    }
}

// ==========================================
// 仪表型号配置
// ==========================================

/// 称重仪表型号配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleModelConfig {
    /// 型号键（注册表查询用）
    pub model_key: String,
    pub display_name: String,

    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,

    pub commands: CommandSet,
    pub auto: AutoSettings,
}

// ==========================================
// 连接状态
// ==========================================

/// 串口连接实时状态
///
/// 仅由设备层修改; UI 与称重流程只读
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub port: Option<String>,
    pub model_key: Option<String>,
    pub current_weight: f64,
    pub last_update: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            connected: false,
            port: None,
            model_key: None,
            current_weight: 0.0,
            last_update: None,
            error: None,
        }
    }
}

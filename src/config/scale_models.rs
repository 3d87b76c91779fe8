// ==========================================
// 混凝土搅拌站过磅系统 - 仪表型号注册表
// ==========================================
// 说明: 命令字符串按型号手册原样发送,
// 协议上只约定 "ASCII 命令 / ASCII 或分隔数字响应"
// ==========================================

use crate::domain::{AutoSettings, CommandSet, DataBits, Parity, ScaleModelConfig, StopBits};

/// 通用型号: 仅取重/去皮/清零三条命令,手动连接
fn generic() -> ScaleModelConfig {
    ScaleModelConfig {
        model_key: "GENERIC".to_string(),
        display_name: "通用称重仪表".to_string(),
        baud_rate: 9600,
        data_bits: DataBits::Eight,
        stop_bits: StopBits::One,
        parity: Parity::None,
        commands: CommandSet {
            get_weight: Some("W\r\n".to_string()),
            tare: Some("T\r\n".to_string()),
            zero: Some("Z\r\n".to_string()),
            calibration: None,
            status: None,
            reset: None,
        },
        auto: AutoSettings {
            polling_interval_ms: 500,
            ..AutoSettings::default()
        },
    }
}

/// 耀华 XK3190-A9: 连续输出,不需要轮询命令
fn xk3190_a9() -> ScaleModelConfig {
    ScaleModelConfig {
        model_key: "XK3190-A9".to_string(),
        display_name: "耀华 XK3190-A9".to_string(),
        baud_rate: 9600,
        data_bits: DataBits::Eight,
        stop_bits: StopBits::One,
        parity: Parity::None,
        commands: CommandSet {
            get_weight: None,
            tare: Some("T\r\n".to_string()),
            zero: Some("Z\r\n".to_string()),
            calibration: None,
            status: None,
            reset: None,
        },
        auto: AutoSettings {
            auto_connect: true,
            auto_zero: true,
            polling_interval_ms: 0,
            auto_reconnect: true,
            connection_delay_ms: 1_000,
            ..AutoSettings::default()
        },
    }
}

/// 托利多 IND 系列: 命令应答式,需要轮询取重
fn toledo_ind() -> ScaleModelConfig {
    ScaleModelConfig {
        model_key: "TOLEDO-IND".to_string(),
        display_name: "托利多 IND 系列".to_string(),
        baud_rate: 9600,
        data_bits: DataBits::Seven,
        stop_bits: StopBits::One,
        parity: Parity::Even,
        commands: CommandSet {
            get_weight: Some("P\r\n".to_string()),
            tare: Some("T\r\n".to_string()),
            zero: Some("Z\r\n".to_string()),
            calibration: Some("C\r\n".to_string()),
            status: Some("S\r\n".to_string()),
            reset: Some("R\r\n".to_string()),
        },
        auto: AutoSettings {
            auto_tare: false,
            auto_zero: true,
            polling_interval_ms: 300,
            auto_reconnect: true,
            connection_delay_ms: 500,
            ..AutoSettings::default()
        },
    }
}

/// CAS NT 系列
fn cas_nt() -> ScaleModelConfig {
    ScaleModelConfig {
        model_key: "CAS-NT".to_string(),
        display_name: "CAS NT 系列".to_string(),
        baud_rate: 19200,
        data_bits: DataBits::Eight,
        stop_bits: StopBits::One,
        parity: Parity::None,
        commands: CommandSet {
            get_weight: Some("S\r\n".to_string()),
            tare: Some("T\r\n".to_string()),
            zero: Some("Z\r\n".to_string()),
            calibration: None,
            status: Some("ST\r\n".to_string()),
            reset: None,
        },
        auto: AutoSettings {
            polling_interval_ms: 500,
            auto_reconnect: true,
            ..AutoSettings::default()
        },
    }
}

/// 全部内置型号
pub fn builtin_models() -> Vec<ScaleModelConfig> {
    vec![generic(), xk3190_a9(), toledo_ind(), cas_nt()]
}

/// 按型号键查找（不区分大小写）
pub fn find_model(model_key: &str) -> Option<ScaleModelConfig> {
    let key = model_key.trim().to_uppercase();
    builtin_models().into_iter().find(|m| m.model_key == key)
}

/// 缺省型号
pub fn default_model() -> ScaleModelConfig {
    generic()
}

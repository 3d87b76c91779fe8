// ==========================================
// 混凝土搅拌站过磅系统 - 设备层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 链路错误与命令错误分开,UI 需要区分
// "硬件问题"与"数据问题"
// ==========================================

use thiserror::Error;

/// 串口链路错误
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("串口打开失败: {0}")]
    OpenFailed(String),

    #[error("串口读取失败: {0}")]
    ReadFailed(String),

    #[error("串口写入失败: {0}")]
    WriteFailed(String),

    #[error("串口未连接")]
    NotConnected,

    #[error("不支持的串口参数: {0}")]
    Unsupported(String),
}

/// 仪表命令错误
#[derive(Error, Debug)]
pub enum CommandError {
    /// 仅在重试次数耗尽后抛出
    #[error("命令发送失败: 已尝试 {attempts} 次")]
    SendFailed { attempts: u32 },

    #[error("当前仪表型号未定义命令: {name}")]
    MissingCommand { name: &'static str },
}

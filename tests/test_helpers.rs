// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

use weighbridge_core::domain::{OperatorRef, Reading};
use weighbridge_core::repository::WeighingDraftRepository;

/// 创建临时测试数据库
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();
    Ok((temp_file, db_path))
}

/// 打开测试数据库连接（统一 PRAGMA）
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(weighbridge_core::db::open_sqlite_connection(db_path)?)
}

/// 创建过磅单仓储（建表在构造时完成）
pub fn create_draft_repo(db_path: &str) -> Result<Arc<WeighingDraftRepository>, Box<dyn Error>> {
    let conn = open_test_connection(db_path)?;
    Ok(Arc::new(WeighingDraftRepository::new(Arc::new(
        Mutex::new(conn),
    ))))
}

/// 稳定读数
pub fn stable_reading(weight: f64) -> Reading {
    Reading::new(weight, "kg", true, format!("ST,{},kg", weight))
}

/// 测试操作员
pub fn test_operator() -> OperatorRef {
    OperatorRef {
        operator_id: "op-001".to_string(),
        operator_name: "测试操作员".to_string(),
    }
}

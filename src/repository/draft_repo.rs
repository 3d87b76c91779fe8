// ==========================================
// 混凝土搅拌站过磅系统 - 过磅单仓储
// ==========================================
// 职责: 过磅单的持久化读写
// 约束: "同车牌唯一在途"由两层保障:
//   1. insert 在同一把连接锁内先查后插
//   2. 部分唯一索引(status='DRAFT')做并发兜底
// ==========================================

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

use crate::domain::{normalize_plate, DepartureInfo, DraftStatus, WeighingDraft};
use crate::repository::error::{RepositoryError, RepositoryResult};

/// 时间戳的数据库存储格式（UTC）
const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct WeighingDraftRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WeighingDraftRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        let repo = Self { conn };
        // best-effort: 建表失败不阻断启动,后续使用时错误会浮现
        if let Err(e) = repo.ensure_table_and_indexes() {
            tracing::warn!("weighing_draft ensure failed: {}", e);
        }
        repo
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn ensure_table_and_indexes(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS weighing_draft (
              draft_id TEXT PRIMARY KEY,
              vehicle_number TEXT NOT NULL,

              gross_weight REAL NOT NULL,
              gross_at TEXT NOT NULL,

              tare_weight REAL,
              tare_at TEXT,
              net_weight REAL,

              supplier TEXT,
              recipient TEXT,
              cargo_type TEXT,
              notes TEXT,

              status TEXT NOT NULL CHECK(status IN ('DRAFT', 'COMPLETED')),

              operator_id TEXT NOT NULL,
              operator_name TEXT NOT NULL,

              created_at TEXT NOT NULL,
              updated_at TEXT NOT NULL
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_weighing_draft_open_plate
              ON weighing_draft(vehicle_number) WHERE status = 'DRAFT';
            CREATE INDEX IF NOT EXISTS idx_weighing_draft_status ON weighing_draft(status);
            CREATE INDEX IF NOT EXISTS idx_weighing_draft_created_at ON weighing_draft(created_at DESC);
            "#,
        )?;
        Ok(())
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 插入新过磅单
    ///
    /// 同车牌已有在途单时返回 DuplicateDraft;
    /// 先查后插与部分唯一索引共同保障该约束
    pub fn insert(&self, draft: &WeighingDraft) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let exists = query_open_by_plate(&conn, &draft.vehicle_number)?.is_some();
        if exists {
            return Err(RepositoryError::DuplicateDraft {
                plate: draft.vehicle_number.clone(),
            });
        }

        let result = conn.execute(
            r#"
            INSERT INTO weighing_draft (
              draft_id, vehicle_number,
              gross_weight, gross_at,
              tare_weight, tare_at, net_weight,
              supplier, recipient, cargo_type, notes,
              status,
              operator_id, operator_name,
              created_at, updated_at
            ) VALUES (
              ?1, ?2,
              ?3, ?4,
              ?5, ?6, ?7,
              ?8, ?9, ?10, ?11,
              ?12,
              ?13, ?14,
              ?15, ?16
            )
            "#,
            params![
                draft.draft_id,
                draft.vehicle_number,
                draft.gross_weight,
                fmt_ts(draft.gross_at),
                draft.tare_weight,
                draft.tare_at.map(fmt_ts),
                draft.net_weight,
                draft.supplier,
                draft.recipient,
                draft.cargo_type,
                draft.notes,
                draft.status.as_str(),
                draft.operator_id,
                draft.operator_name,
                fmt_ts(draft.created_at),
                fmt_ts(draft.updated_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let e = RepositoryError::from(e);
                // 并发插入撞上部分唯一索引时也归一为 DuplicateDraft
                if matches!(e, RepositoryError::UniqueConstraintViolation(_)) {
                    Err(RepositoryError::DuplicateDraft {
                        plate: draft.vehicle_number.clone(),
                    })
                } else {
                    Err(e)
                }
            }
        }
    }

    /// 出场结算: 写入皮重/净重/补充信息并置为 COMPLETED
    ///
    /// 仅作用于 DRAFT 状态的记录; 记录不存在或已完成时返回 NotFound
    pub fn complete_departure(
        &self,
        draft_id: &str,
        tare_weight: f64,
        tare_at: DateTime<Utc>,
        net_weight: f64,
        info: &DepartureInfo,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            r#"
            UPDATE weighing_draft
            SET tare_weight = ?1,
                tare_at = ?2,
                net_weight = ?3,
                supplier = COALESCE(?4, supplier),
                recipient = COALESCE(?5, recipient),
                cargo_type = COALESCE(?6, cargo_type),
                notes = COALESCE(?7, notes),
                status = 'COMPLETED',
                updated_at = ?8
            WHERE draft_id = ?9
              AND status = 'DRAFT'
            "#,
            params![
                tare_weight,
                fmt_ts(tare_at),
                net_weight,
                info.supplier,
                info.recipient,
                info.cargo_type,
                info.notes,
                fmt_ts(Utc::now()),
                draft_id,
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "WeighingDraft".to_string(),
                id: draft_id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 按车牌查在途过磅单（查询前归一化车牌）
    pub fn find_open_by_plate(&self, plate: &str) -> RepositoryResult<Option<WeighingDraft>> {
        let conn = self.get_conn()?;
        query_open_by_plate(&conn, &normalize_plate(plate))
    }

    pub fn find_by_id(&self, draft_id: &str) -> RepositoryResult<Option<WeighingDraft>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM weighing_draft WHERE draft_id = ?1",
            SELECT_COLUMNS
        ))?;

        match stmt.query_row(params![draft_id], |row| map_row(row)) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 过磅单列表,可按状态过滤,按创建时间倒序
    pub fn list(
        &self,
        status_filter: Option<DraftStatus>,
        limit: i64,
    ) -> RepositoryResult<Vec<WeighingDraft>> {
        let conn = self.get_conn()?;
        let limit = if limit <= 0 { 200 } else { limit.min(2000) };

        let mut sql = format!("SELECT {} FROM weighing_draft", SELECT_COLUMNS);
        if status_filter.is_some() {
            sql.push_str(" WHERE status = ?1 ");
        }
        sql.push_str(&format!(" ORDER BY created_at DESC LIMIT {}", limit));

        let mut stmt = conn.prepare(&sql)?;
        let rows = match status_filter {
            Some(status) => stmt
                .query_map(params![status.as_str()], |row| map_row(row))?
                .collect::<SqliteResult<Vec<_>>>()?,
            None => stmt
                .query_map([], |row| map_row(row))?
                .collect::<SqliteResult<Vec<_>>>()?,
        };
        Ok(rows)
    }
}

// ==========================================
// 行映射
// ==========================================

const SELECT_COLUMNS: &str = "draft_id, vehicle_number, \
     gross_weight, gross_at, \
     tare_weight, tare_at, net_weight, \
     supplier, recipient, cargo_type, notes, \
     status, \
     operator_id, operator_name, \
     created_at, updated_at";

fn query_open_by_plate(
    conn: &Connection,
    normalized_plate: &str,
) -> RepositoryResult<Option<WeighingDraft>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM weighing_draft WHERE vehicle_number = ?1 AND status = 'DRAFT'",
        SELECT_COLUMNS
    ))?;

    match stmt.query_row(params![normalized_plate], |row| map_row(row)) {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn map_row(row: &Row) -> SqliteResult<WeighingDraft> {
    let draft_id: String = row.get(0)?;
    let vehicle_number: String = row.get(1)?;
    let gross_weight: f64 = row.get(2)?;
    let gross_at_str: String = row.get(3)?;
    let tare_weight: Option<f64> = row.get(4)?;
    let tare_at_str: Option<String> = row.get(5)?;
    let net_weight: Option<f64> = row.get(6)?;
    let supplier: Option<String> = row.get(7)?;
    let recipient: Option<String> = row.get(8)?;
    let cargo_type: Option<String> = row.get(9)?;
    let notes: Option<String> = row.get(10)?;
    let status_str: String = row.get(11)?;
    let operator_id: String = row.get(12)?;
    let operator_name: String = row.get(13)?;
    let created_at_str: String = row.get(14)?;
    let updated_at_str: String = row.get(15)?;

    Ok(WeighingDraft {
        draft_id,
        vehicle_number,
        gross_weight,
        gross_at: parse_ts(&gross_at_str, 3)?,
        tare_weight,
        tare_at: tare_at_str.and_then(|s| parse_ts_opt(&s)),
        net_weight,
        supplier,
        recipient,
        cargo_type,
        notes,
        status: DraftStatus::parse(&status_str),
        operator_id,
        operator_name,
        created_at: parse_ts(&created_at_str, 14)?,
        updated_at: parse_ts(&updated_at_str, 15)?,
    })
}

fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.naive_utc().format(TS_FORMAT).to_string()
}

fn parse_ts(s: &str, col: usize) -> SqliteResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, TS_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn parse_ts_opt(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, TS_FORMAT)
        .map(|naive| naive.and_utc())
        .ok()
}

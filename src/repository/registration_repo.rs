// ==========================================
// 学生选课分配系统 - 报名数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::registration::Registration;
use crate::domain::types::RegistrationStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// RegistrationRepository - 报名仓储
// ==========================================

/// 报名仓储
/// 职责: 管理 student_registration 表的读写
pub struct RegistrationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RegistrationRepository {
    /// 从共享连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询指定池的全部 frozen 报名
    ///
    /// # 参数
    /// - pool_id: 池ID
    ///
    /// # 返回
    /// - Ok(Vec<Registration>): frozen 报名列表 (按学籍号升序,读出顺序确定)
    /// - Err: 数据库错误
    pub fn find_frozen_by_pool(&self, pool_id: i64) -> RepositoryResult<Vec<Registration>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT regno, pool_id, email, mobile, priority_order, status
            FROM student_registration
            WHERE pool_id = ?1 AND status = 'frozen'
            ORDER BY regno
            "#,
        )?;

        let registrations = stmt
            .query_map(params![pool_id], Self::map_row)?
            .collect::<SqliteResult<Vec<Registration>>>()?;

        Ok(registrations)
    }

    /// 按学籍号和池查询单条报名
    pub fn find_by_regno_and_pool(
        &self,
        regno: &str,
        pool_id: i64,
    ) -> RepositoryResult<Option<Registration>> {
        let conn = self.get_conn()?;

        let registration = conn
            .query_row(
                r#"
                SELECT regno, pool_id, email, mobile, priority_order, status
                FROM student_registration
                WHERE regno = ?1 AND pool_id = ?2
                "#,
                params![regno, pool_id],
                Self::map_row,
            )
            .optional()?;

        Ok(registration)
    }

    /// 插入或更新报名
    pub fn upsert(&self, registration: &Registration) -> RepositoryResult<()> {
        let priority_json = serde_json::to_string(&registration.priority_order)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;

        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO student_registration (
                regno, pool_id, email, mobile, priority_order, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                registration.regno,
                registration.pool_id,
                registration.email,
                registration.mobile,
                priority_json,
                registration.status.to_db_str(),
            ],
        )?;

        Ok(())
    }

    /// 统计指定池的 frozen 报名数
    pub fn count_frozen_by_pool(&self, pool_id: i64) -> RepositoryResult<u32> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM student_registration WHERE pool_id = ?1 AND status = 'frozen'",
            params![pool_id],
            |row| row.get(0),
        )?;

        Ok(count.max(0) as u32)
    }

    /// 映射数据库行到 Registration 对象
    fn map_row(row: &Row) -> rusqlite::Result<Registration> {
        let priority_json: String = row.get(4)?;
        let priority_order: Vec<String> =
            serde_json::from_str(&priority_json).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        let status_str: String = row.get(5)?;
        let status = RegistrationStatus::from_str(&status_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                rusqlite::types::Type::Text,
                format!("未知报名状态: {}", status_str).into(),
            )
        })?;

        Ok(Registration {
            regno: row.get(0)?,
            pool_id: row.get(1)?,
            email: row.get(2)?,
            mobile: row.get(3)?,
            priority_order,
            status,
        })
    }
}

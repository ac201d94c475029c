// ==========================================
// 学生选课分配系统 - 分配结果数据仓储
// ==========================================
// 红线: 整池替换必须在单个事务内完成,禁止部分覆盖
// ==========================================

use crate::domain::allotment::Allotment;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ==========================================
// AllotmentRepository - 分配结果仓储
// ==========================================

/// 分配结果仓储
/// 职责: 管理 subject_allotment 表的读写
pub struct AllotmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AllotmentRepository {
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

    /// 原子替换指定池的全部分配结果
    ///
    /// 删除旧结果与写入新结果在同一事务内提交;
    /// 事务失败则整体回滚,旧结果保持可见。
    ///
    /// # 参数
    /// - pool_id: 池ID
    /// - allotments: 新的分配结果集 (必须全部属于该池)
    ///
    /// # 返回
    /// - Ok(usize): 写入的记录数
    /// - Err(DatabaseTransactionError): 事务失败,已回滚
    pub fn replace_for_pool(
        &self,
        pool_id: i64,
        allotments: &[Allotment],
    ) -> RepositoryResult<usize> {
        if let Some(stray) = allotments.iter().find(|a| a.pool_id != pool_id) {
            return Err(RepositoryError::ValidationError(format!(
                "分配记录池不一致: 期望 pool_id={}, 实际 pool_id={} (regno={})",
                pool_id, stray.pool_id, stray.regno
            )));
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let written = (|| -> SqliteResult<usize> {
            tx.execute(
                "DELETE FROM subject_allotment WHERE pool_id = ?1",
                params![pool_id],
            )?;

            for allotment in allotments {
                tx.execute(
                    r#"
                    INSERT INTO subject_allotment (regno, pool_id, subject_code)
                    VALUES (?1, ?2, ?3)
                    "#,
                    params![allotment.regno, allotment.pool_id, allotment.subject_code],
                )?;
            }

            Ok(allotments.len())
        })()
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(written)
    }

    /// 查询指定池的全部分配结果 (按学籍号升序)
    pub fn find_by_pool(&self, pool_id: i64) -> RepositoryResult<Vec<Allotment>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT regno, pool_id, subject_code
            FROM subject_allotment
            WHERE pool_id = ?1
            ORDER BY regno
            "#,
        )?;

        let allotments = stmt
            .query_map(params![pool_id], |row| {
                Ok(Allotment {
                    regno: row.get(0)?,
                    pool_id: row.get(1)?,
                    subject_code: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<Allotment>>>()?;

        Ok(allotments)
    }

    /// 查询指定学生的全部分配结果 (跨池,按池ID升序)
    pub fn find_by_student(&self, regno: &str) -> RepositoryResult<Vec<Allotment>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT regno, pool_id, subject_code
            FROM subject_allotment
            WHERE regno = ?1
            ORDER BY pool_id
            "#,
        )?;

        let allotments = stmt
            .query_map(params![regno], |row| {
                Ok(Allotment {
                    regno: row.get(0)?,
                    pool_id: row.get(1)?,
                    subject_code: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<Allotment>>>()?;

        Ok(allotments)
    }

    /// 按科目统计指定池的分配人数 (未分配行不计入)
    pub fn count_by_subject(&self, pool_id: i64) -> RepositoryResult<HashMap<String, u32>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT subject_code, COUNT(*)
            FROM subject_allotment
            WHERE pool_id = ?1 AND subject_code IS NOT NULL
            GROUP BY subject_code
            "#,
        )?;

        let rows = stmt
            .query_map(params![pool_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<SqliteResult<Vec<(String, i64)>>>()?;

        Ok(rows
            .into_iter()
            .map(|(code, count)| (code, count.max(0) as u32))
            .collect())
    }

    /// 统计指定池的未分配人数
    pub fn count_unallotted(&self, pool_id: i64) -> RepositoryResult<u32> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM subject_allotment WHERE pool_id = ?1 AND subject_code IS NULL",
            params![pool_id],
            |row| row.get(0),
        )?;

        Ok(count.max(0) as u32)
    }
}

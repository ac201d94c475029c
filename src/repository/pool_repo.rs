// ==========================================
// 学生选课分配系统 - 科目池数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::pool::{SubjectEntry, SubjectPool};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// SubjectPoolRepository - 科目池仓储
// ==========================================

/// 科目池仓储
/// 职责: 管理 subject_pool / pool_subject 表的读写
pub struct SubjectPoolRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SubjectPoolRepository {
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

    /// 按ID查询科目池 (含池内科目条目)
    ///
    /// # 参数
    /// - pool_id: 池ID
    ///
    /// # 返回
    /// - Ok(Some(SubjectPool)): 找到科目池
    /// - Ok(None): 未找到
    /// - Err: 数据库错误
    pub fn find_by_id(&self, pool_id: i64) -> RepositoryResult<Option<SubjectPool>> {
        let conn = self.get_conn()?;

        let header = conn
            .query_row(
                r#"
                SELECT pool_id, pool_name, semester, batch, allowed_programmes, is_active
                FROM subject_pool
                WHERE pool_id = ?1
                "#,
                params![pool_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, i64>(5)? != 0,
                    ))
                },
            )
            .optional()?;

        let Some((pool_id, pool_name, semester, batch, programmes_json, is_active)) = header
        else {
            return Ok(None);
        };

        let allowed_programmes: Vec<String> = serde_json::from_str(&programmes_json)
            .map_err(|e| RepositoryError::FieldValueError {
                field: "allowed_programmes".to_string(),
                message: e.to_string(),
            })?;

        let mut stmt = conn.prepare(
            r#"
            SELECT subject_code, subject_name, intake
            FROM pool_subject
            WHERE pool_id = ?1
            ORDER BY rowid
            "#,
        )?;

        let subjects = stmt
            .query_map(params![pool_id], |row| {
                Ok(SubjectEntry {
                    subject_code: row.get(0)?,
                    subject_name: row.get(1)?,
                    intake: row.get::<_, i64>(2)?.max(0) as u32,
                })
            })?
            .collect::<SqliteResult<Vec<SubjectEntry>>>()?;

        Ok(Some(SubjectPool {
            pool_id,
            pool_name,
            subjects,
            semester,
            batch,
            allowed_programmes,
            is_active,
        }))
    }

    /// 查询所有启用的科目池ID
    pub fn list_active_ids(&self) -> RepositoryResult<Vec<i64>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT pool_id FROM subject_pool WHERE is_active = 1 ORDER BY pool_id",
        )?;

        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<SqliteResult<Vec<i64>>>()?;

        Ok(ids)
    }

    /// 插入科目池 (含池内科目条目)
    ///
    /// # 红线
    /// - 必须在事务中完成,保证池头与科目条目一致
    pub fn insert(&self, pool: &SubjectPool) -> RepositoryResult<()> {
        let programmes_json = serde_json::to_string(&pool.allowed_programmes)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO subject_pool (pool_id, pool_name, semester, batch, allowed_programmes, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                pool.pool_id,
                pool.pool_name,
                pool.semester,
                pool.batch,
                programmes_json,
                pool.is_active as i64,
            ],
        )?;

        for entry in &pool.subjects {
            tx.execute(
                r#"
                INSERT INTO pool_subject (pool_id, subject_code, subject_name, intake)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    pool.pool_id,
                    entry.subject_code,
                    entry.subject_name,
                    entry.intake as i64,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// 更新启用标志
    pub fn set_active(&self, pool_id: i64, is_active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            "UPDATE subject_pool SET is_active = ?2 WHERE pool_id = ?1",
            params![pool_id, is_active as i64],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "SubjectPool".to_string(),
                id: pool_id.to_string(),
            });
        }

        Ok(())
    }
}

// ==========================================
// 学生选课分配系统 - 学业数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::academic::AcademicRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ==========================================
// AcademicRecordRepository - 学业成绩仓储
// ==========================================

/// 学业成绩仓储
/// 职责: 管理 student_academic_data 表的读写
pub struct AcademicRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AcademicRecordRepository {
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

    /// 按学籍号查询单条学业记录
    pub fn find_by_regno(&self, regno: &str) -> RepositoryResult<Option<AcademicRecord>> {
        let conn = self.get_conn()?;

        let record = conn
            .query_row(
                r#"
                SELECT regno, cgpa, backlogs
                FROM student_academic_data
                WHERE regno = ?1
                "#,
                params![regno],
                |row| {
                    Ok(AcademicRecord {
                        regno: row.get(0)?,
                        cgpa: row.get(1)?,
                        backlogs: row.get::<_, Option<i64>>(2)?.map(|v| v.max(0) as u32),
                    })
                },
            )
            .optional()?;

        Ok(record)
    }

    /// 批量查询学业记录,返回按学籍号索引的映射
    ///
    /// 缺记录的学籍号不会出现在映射中 (排序时按"无记录"处理)。
    ///
    /// # 参数
    /// - regnos: 学籍号列表
    ///
    /// # 返回
    /// - Ok(HashMap<学籍号, AcademicRecord>)
    /// - Err: 数据库错误
    pub fn find_by_regnos(
        &self,
        regnos: &[String],
    ) -> RepositoryResult<HashMap<String, AcademicRecord>> {
        if regnos.is_empty() {
            return Ok(HashMap::new());
        }

        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT regno, cgpa, backlogs
            FROM student_academic_data
            WHERE regno = ?1
            "#,
        )?;

        let mut records = HashMap::with_capacity(regnos.len());
        for regno in regnos {
            let record = stmt
                .query_row(params![regno], |row| {
                    Ok(AcademicRecord {
                        regno: row.get(0)?,
                        cgpa: row.get(1)?,
                        backlogs: row.get::<_, Option<i64>>(2)?.map(|v| v.max(0) as u32),
                    })
                })
                .optional()?;

            if let Some(record) = record {
                records.insert(regno.clone(), record);
            }
        }

        Ok(records)
    }

    /// 插入或更新学业记录
    pub fn upsert(&self, record: &AcademicRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO student_academic_data (regno, cgpa, backlogs)
            VALUES (?1, ?2, ?3)
            "#,
            params![
                record.regno,
                record.cgpa,
                record.backlogs.map(|v| v as i64),
            ],
        )?;

        Ok(())
    }

    /// 批量插入或更新学业记录
    ///
    /// # 红线
    /// - 必须在事务中完成
    pub fn upsert_batch(&self, records: &[AcademicRecord]) -> RepositoryResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        for record in records {
            tx.execute(
                r#"
                INSERT OR REPLACE INTO student_academic_data (regno, cgpa, backlogs)
                VALUES (?1, ?2, ?3)
                "#,
                params![
                    record.regno,
                    record.cgpa,
                    record.backlogs.map(|v| v as i64),
                ],
            )?;
        }

        tx.commit()?;
        Ok(records.len())
    }

    /// 统计学业记录总数
    pub fn count(&self) -> RepositoryResult<u32> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM student_academic_data",
            [],
            |row| row.get(0),
        )?;

        Ok(count.max(0) as u32)
    }

    /// 查询全部学业记录 (按学籍号升序)
    pub fn find_all(&self) -> RepositoryResult<Vec<AcademicRecord>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT regno, cgpa, backlogs
            FROM student_academic_data
            ORDER BY regno
            "#,
        )?;

        let records = stmt
            .query_map([], |row| {
                Ok(AcademicRecord {
                    regno: row.get(0)?,
                    cgpa: row.get(1)?,
                    backlogs: row.get::<_, Option<i64>>(2)?.map(|v| v.max(0) as u32),
                })
            })?
            .collect::<SqliteResult<Vec<AcademicRecord>>>()?;

        Ok(records)
    }
}

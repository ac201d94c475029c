// ==========================================
// 学生选课分配系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为,避免部分连接外键开启/部分不开启
// - 统一 busy_timeout,减少并发写入时的偶发 busy 错误
// - 统一建表入口,库不存在时自动创建 schema
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开连接、应用配置并确保 schema 存在
pub fn open_and_init(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// 幂等初始化数据库 schema
///
/// 所有表均使用 CREATE TABLE IF NOT EXISTS,可安全重复调用。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS subject_pool (
            pool_id INTEGER PRIMARY KEY,
            pool_name TEXT NOT NULL,
            semester TEXT NOT NULL,
            batch TEXT NOT NULL,
            allowed_programmes TEXT NOT NULL DEFAULT '[]',
            is_active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS pool_subject (
            pool_id INTEGER NOT NULL REFERENCES subject_pool(pool_id) ON DELETE CASCADE,
            subject_code TEXT NOT NULL,
            subject_name TEXT NOT NULL,
            intake INTEGER NOT NULL CHECK (intake >= 0),
            PRIMARY KEY (pool_id, subject_code)
        );

        CREATE TABLE IF NOT EXISTS student_registration (
            regno TEXT NOT NULL,
            pool_id INTEGER NOT NULL REFERENCES subject_pool(pool_id) ON DELETE CASCADE,
            email TEXT NOT NULL,
            mobile TEXT NOT NULL,
            priority_order TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'draft',
            PRIMARY KEY (regno, pool_id)
        );

        CREATE TABLE IF NOT EXISTS student_academic_data (
            regno TEXT PRIMARY KEY,
            cgpa REAL,
            backlogs INTEGER
        );

        CREATE TABLE IF NOT EXISTS subject_allotment (
            regno TEXT NOT NULL,
            pool_id INTEGER NOT NULL REFERENCES subject_pool(pool_id) ON DELETE CASCADE,
            subject_code TEXT,
            PRIMARY KEY (regno, pool_id)
        );
        CREATE INDEX IF NOT EXISTS idx_allotment_pool_subject
            ON subject_allotment(pool_id, subject_code);

        CREATE TABLE IF NOT EXISTS action_log (
            action_id TEXT PRIMARY KEY,
            action_type TEXT NOT NULL,
            action_ts TEXT NOT NULL,
            actor TEXT NOT NULL,
            pool_id INTEGER,
            payload_json TEXT,
            detail TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_action_pool_ts
            ON action_log(pool_id, action_ts);
        "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='subject_pool'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_intake_check_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO subject_pool (pool_id, pool_name, semester, batch) VALUES (1, 'P', '5', '2023')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO pool_subject (pool_id, subject_code, subject_name, intake) VALUES (1, 'C1', 'X', -1)",
            [],
        );
        assert!(result.is_err());
    }
}

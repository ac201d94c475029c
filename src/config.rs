// ==========================================
// 学生选课分配系统 - 运行配置
// ==========================================
// 职责: 数据库路径与操作人标识的解析
// ==========================================

use std::path::PathBuf;

/// 数据库路径环境变量 (便于调试/测试/CI)
pub const DB_PATH_ENV: &str = "SUBJECT_ALLOTMENT_DB_PATH";

/// 操作人标识环境变量
pub const ACTOR_ENV: &str = "SUBJECT_ALLOTMENT_ACTOR";

/// 获取默认数据库路径
///
/// 解析顺序:
/// 1. 环境变量 SUBJECT_ALLOTMENT_DB_PATH
/// 2. 用户数据目录/subject-allotment/subject_allotment.db (开发构建使用 -dev 后缀目录)
/// 3. 兜底: 当前目录 ./subject_allotment.db
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./subject_allotment.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("subject-allotment-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("subject-allotment");
        }

        // 目录创建失败时回落到路径本身,由后续 open 给出明确错误
        std::fs::create_dir_all(&path).ok();
        path = path.join("subject_allotment.db");
    }

    path.to_string_lossy().to_string()
}

/// 获取操作日志中的操作人标识 (默认 cli)
pub fn default_actor() -> String {
    std::env::var(ACTOR_ENV)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "cli".to_string())
}

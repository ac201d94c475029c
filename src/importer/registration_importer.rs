// ==========================================
// 学生选课分配系统 - 报名数据导入器
// ==========================================
// 职责: 解析外部报名系统导出的报名 CSV 并落库
// 输入: 表头 regno,pool_id,email,mobile,status,priority_order 的 CSV
// 格式: priority_order 为 | 分隔的科目代码序列 (自高到低)
// ==========================================

use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::registration::Registration;
use crate::domain::types::RegistrationStatus;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::{ImportReport, RowViolation};
use crate::repository::{ActionLogRepository, RegistrationRepository};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// ==========================================
// RegistrationImporter - 报名数据导入器
// ==========================================
pub struct RegistrationImporter {
    registration_repo: Arc<RegistrationRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    actor: String,
}

impl RegistrationImporter {
    /// 构造函数
    pub fn new(
        registration_repo: Arc<RegistrationRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        actor: String,
    ) -> Self {
        Self {
            registration_repo,
            action_log_repo,
            actor,
        }
    }

    /// 从 CSV 文件导入报名数据
    ///
    /// # 参数
    /// - `file_path`: CSV 文件路径
    ///
    /// # 返回
    /// - Ok(ImportReport): 导入报告 (含逐行违规清单)
    /// - Err: 文件级错误
    pub fn import_csv<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ImportReport> {
        let path = file_path.as_ref();

        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let col = |name: &str| -> ImportResult<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ImportError::HeaderMissing(name.to_string()))
        };

        let regno_col = col("regno")?;
        let pool_col = col("pool_id")?;
        let email_col = col("email")?;
        let mobile_col = col("mobile")?;
        let status_col = col("status")?;
        let priority_col = col("priority_order")?;

        let mut imported = 0usize;
        let mut violations: Vec<RowViolation> = Vec::new();
        let mut total_rows = 0usize;

        for (row_idx, result) in reader.records().enumerate() {
            let row_no = row_idx + 2;
            let record = result?;

            if record.iter().all(|v| v.trim().is_empty()) {
                continue;
            }
            total_rows += 1;

            let regno = record.get(regno_col).unwrap_or("").trim().to_uppercase();
            if regno.is_empty() {
                violations.push(RowViolation {
                    row: row_no,
                    field: "regno".to_string(),
                    message: "学籍号为空".to_string(),
                });
                continue;
            }

            let pool_id = match record.get(pool_col).unwrap_or("").trim().parse::<i64>() {
                Ok(v) if v > 0 => v,
                _ => {
                    violations.push(RowViolation {
                        row: row_no,
                        field: "pool_id".to_string(),
                        message: "池ID必须为正整数".to_string(),
                    });
                    continue;
                }
            };

            let email = record.get(email_col).unwrap_or("").trim().to_lowercase();
            if !email.contains('@') {
                violations.push(RowViolation {
                    row: row_no,
                    field: "email".to_string(),
                    message: "邮箱格式无效".to_string(),
                });
                continue;
            }

            let mobile = record.get(mobile_col).unwrap_or("").trim().to_string();
            if mobile.len() != 10 || !mobile.chars().all(|c| c.is_ascii_digit()) {
                violations.push(RowViolation {
                    row: row_no,
                    field: "mobile".to_string(),
                    message: "手机号必须为10位数字".to_string(),
                });
                continue;
            }

            let status_raw = record.get(status_col).unwrap_or("").trim();
            let Some(status) = RegistrationStatus::from_str(status_raw) else {
                violations.push(RowViolation {
                    row: row_no,
                    field: "status".to_string(),
                    message: format!("未知报名状态: {}", status_raw),
                });
                continue;
            };

            let priority_order: Vec<String> = record
                .get(priority_col)
                .unwrap_or("")
                .split('|')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();

            let registration = Registration {
                regno,
                pool_id,
                email,
                mobile,
                priority_order,
                status,
            };

            self.registration_repo.upsert(&registration)?;
            imported += 1;
        }

        let report = ImportReport {
            total_rows,
            imported,
            rejected: violations.len(),
            violations,
        };

        let log = ActionLog::new(
            Uuid::new_v4().to_string(),
            ActionType::RegistrationImport,
            self.actor.clone(),
        )
        .with_payload(&report)
        .with_detail(format!(
            "报名数据导入: 共{}行, 入库{}行, 拒绝{}行",
            report.total_rows, report.imported, report.rejected
        ));
        self.action_log_repo.insert(&log)?;

        info!(
            total_rows = report.total_rows,
            imported = report.imported,
            rejected = report.rejected,
            "报名数据导入完成"
        );

        Ok(report)
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use rusqlite::Connection;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    fn setup() -> (
        NamedTempFile,
        RegistrationImporter,
        Arc<RegistrationRepository>,
    ) {
        let temp_db = NamedTempFile::new().unwrap();
        let conn = Connection::open(temp_db.path()).unwrap();
        db::init_schema(&conn).unwrap();

        // 报名外键依赖科目池
        conn.execute(
            r#"
            INSERT INTO subject_pool (pool_id, pool_name, semester, batch, allowed_programmes, is_active)
            VALUES (1, '测试池', '5', '2023', '[]', 1)
            "#,
            [],
        )
        .unwrap();

        let conn = Arc::new(Mutex::new(conn));
        let registration_repo = Arc::new(RegistrationRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn));
        let importer = RegistrationImporter::new(
            registration_repo.clone(),
            action_log_repo,
            "test_admin".to_string(),
        );

        (temp_db, importer, registration_repo)
    }

    #[test]
    fn test_import_valid_registration() {
        let (_db, importer, repo) = setup();

        let mut csv_file = NamedTempFile::new().unwrap();
        writeln!(csv_file, "regno,pool_id,email,mobile,status,priority_order").unwrap();
        writeln!(
            csv_file,
            "21cs1001,1,A@Example.edu,9876543210,frozen,CS301|EC305"
        )
        .unwrap();

        let report = importer.import_csv(csv_file.path()).unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.rejected, 0);

        let reg = repo.find_by_regno_and_pool("21CS1001", 1).unwrap().unwrap();
        assert_eq!(reg.email, "a@example.edu");
        assert_eq!(reg.priority_order, vec!["CS301", "EC305"]);
        assert_eq!(reg.status, RegistrationStatus::Frozen);
    }

    #[test]
    fn test_import_rejects_bad_rows() {
        let (_db, importer, _repo) = setup();

        let mut csv_file = NamedTempFile::new().unwrap();
        writeln!(csv_file, "regno,pool_id,email,mobile,status,priority_order").unwrap();
        writeln!(csv_file, ",1,a@b.edu,9876543210,frozen,CS301").unwrap();
        writeln!(csv_file, "R2,0,a@b.edu,9876543210,frozen,CS301").unwrap();
        writeln!(csv_file, "R3,1,not-an-email,9876543210,frozen,CS301").unwrap();
        writeln!(csv_file, "R4,1,a@b.edu,12345,frozen,CS301").unwrap();
        writeln!(csv_file, "R5,1,a@b.edu,9876543210,pending,CS301").unwrap();
        writeln!(csv_file, "R6,1,a@b.edu,9876543210,draft,CS301").unwrap();

        let report = importer.import_csv(csv_file.path()).unwrap();
        assert_eq!(report.total_rows, 6);
        assert_eq!(report.imported, 1);
        assert_eq!(report.rejected, 5);
    }
}

// ==========================================
// 学生选课分配系统 - 学业数据导入器
// ==========================================
// 职责: 解析管理端上传的学业数据 CSV 并落库
// 输入: 表头 regno,cgpa,backlogs 的 CSV 文件
// 规则: 坏行记入违规清单并拒绝,好行批量入库,不中断整个导入
// ==========================================

use crate::domain::academic::{AcademicRecord, CGPA_MAX};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::{ImportReport, RowViolation};
use crate::repository::{AcademicRecordRepository, ActionLogRepository};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// ==========================================
// AcademicRecordImporter - 学业数据导入器
// ==========================================
pub struct AcademicRecordImporter {
    academic_repo: Arc<AcademicRecordRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    actor: String,
}

impl AcademicRecordImporter {
    /// 构造函数
    pub fn new(
        academic_repo: Arc<AcademicRecordRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        actor: String,
    ) -> Self {
        Self {
            academic_repo,
            action_log_repo,
            actor,
        }
    }

    /// 从 CSV 文件导入学业数据
    ///
    /// # 参数
    /// - `file_path`: CSV 文件路径
    ///
    /// # 返回
    /// - Ok(ImportReport): 导入报告 (含逐行违规清单)
    /// - Err: 文件级错误 (不存在/表头缺失等)
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
        let cgpa_col = col("cgpa")?;
        let backlogs_col = col("backlogs")?;

        let mut records: Vec<AcademicRecord> = Vec::new();
        let mut violations: Vec<RowViolation> = Vec::new();
        let mut total_rows = 0usize;

        for (row_idx, result) in reader.records().enumerate() {
            let row_no = row_idx + 2; // 首行为表头
            let record = result?;

            // 跳过完全空白的行
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

            let cgpa_raw = record.get(cgpa_col).unwrap_or("").trim().to_string();
            let cgpa = if cgpa_raw.is_empty() {
                None
            } else {
                match cgpa_raw.parse::<f64>() {
                    Ok(v) if (0.0..=CGPA_MAX).contains(&v) && v.is_finite() => Some(v),
                    Ok(v) => {
                        violations.push(RowViolation {
                            row: row_no,
                            field: "cgpa".to_string(),
                            message: format!("值 {} 超出范围 [0.0, {}]", v, CGPA_MAX),
                        });
                        continue;
                    }
                    Err(e) => {
                        violations.push(RowViolation {
                            row: row_no,
                            field: "cgpa".to_string(),
                            message: format!("解析失败: {}", e),
                        });
                        continue;
                    }
                }
            };

            let backlogs_raw = record.get(backlogs_col).unwrap_or("").trim().to_string();
            let backlogs = if backlogs_raw.is_empty() {
                None
            } else {
                match backlogs_raw.parse::<u32>() {
                    Ok(v) => Some(v),
                    Err(e) => {
                        violations.push(RowViolation {
                            row: row_no,
                            field: "backlogs".to_string(),
                            message: format!("解析失败: {}", e),
                        });
                        continue;
                    }
                }
            };

            records.push(AcademicRecord {
                regno,
                cgpa,
                backlogs,
            });
        }

        let imported = self.academic_repo.upsert_batch(&records)?;

        let report = ImportReport {
            total_rows,
            imported,
            rejected: violations.len(),
            violations,
        };

        let log = ActionLog::new(
            Uuid::new_v4().to_string(),
            ActionType::AcademicImport,
            self.actor.clone(),
        )
        .with_payload(&report)
        .with_detail(format!(
            "学业数据导入: 共{}行, 入库{}行, 拒绝{}行",
            report.total_rows, report.imported, report.rejected
        ));
        self.action_log_repo.insert(&log)?;

        info!(
            total_rows = report.total_rows,
            imported = report.imported,
            rejected = report.rejected,
            "学业数据导入完成"
        );

        Ok(report)
    }
}

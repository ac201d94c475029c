// ==========================================
// 学生选课分配系统 - 导入层
// ==========================================
// 职责: 从管理端 CSV 文件装载学业数据与报名数据
// 红线: 坏行隔离并逐行报告,好行照常入库
// ==========================================

pub mod academic_importer;
pub mod error;
pub mod registration_importer;

pub use academic_importer::AcademicRecordImporter;
pub use error::{ImportError, ImportResult};
pub use registration_importer::RegistrationImporter;

use serde::{Deserialize, Serialize};

// ==========================================
// RowViolation - 单行违规记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowViolation {
    pub row: usize,      // 文件行号 (含表头行计数)
    pub field: String,   // 违规字段
    pub message: String, // 违规说明
}

// ==========================================
// ImportReport - 导入报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub total_rows: usize,             // 非空数据行总数
    pub imported: usize,               // 成功入库行数
    pub rejected: usize,               // 拒绝行数
    pub violations: Vec<RowViolation>, // 逐行违规清单
}

// ==========================================
// 学生选课分配系统 - 报名领域模型
// ==========================================
// 红线: frozen 报名是分配引擎的不可变输入
// ==========================================

use crate::domain::types::RegistrationStatus;
use serde::{Deserialize, Serialize};

// ==========================================
// Registration - 学生报名记录
// ==========================================
// 约束: 一名学生在同一科目池至多一条报名
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    // ===== 主键 =====
    pub regno: String,             // 学籍号 (池内唯一)
    pub pool_id: i64,              // 所属科目池

    // ===== 联系方式 =====
    pub email: String,             // 邮箱
    pub mobile: String,            // 手机号

    // ===== 志愿 =====
    pub priority_order: Vec<String>, // 志愿顺序(科目代码,自高到低)

    // ===== 状态 =====
    pub status: RegistrationStatus, // draft / frozen
}

impl Registration {
    /// 报名是否已冻结 (可进入分配)
    pub fn is_frozen(&self) -> bool {
        self.status == RegistrationStatus::Frozen
    }
}

// ==========================================
// 学生选课分配系统 - 分配结果领域模型
// ==========================================
// 红线: 分配结果只能由分配运行产生,整池原子替换
// 说明: 行内不带时间戳,同输入重跑得到逐字节相同的结果集
// ==========================================

use crate::domain::types::AllotmentOutcome;
use serde::{Deserialize, Serialize};

// ==========================================
// Allotment - 单条分配结果
// ==========================================
// subject_code 为 None 表示显式"未分配"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allotment {
    pub regno: String,                // 学籍号
    pub pool_id: i64,                 // 所属科目池
    pub subject_code: Option<String>, // 分配科目 (None = 未分配)
}

impl Allotment {
    /// 由求解器结局构造分配行
    pub fn from_outcome(regno: String, pool_id: i64, outcome: &AllotmentOutcome) -> Self {
        Self {
            regno,
            pool_id,
            subject_code: outcome.subject_code().map(|c| c.to_string()),
        }
    }

    /// 是否分配成功
    pub fn is_allotted(&self) -> bool {
        self.subject_code.is_some()
    }
}

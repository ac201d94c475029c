// ==========================================
// 学生选课分配系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 报名状态 (Registration Status)
// ==========================================
// 红线: 只有 frozen 状态的报名才能进入分配
// 序列化格式: 小写 (与外部报名系统数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Draft,  // 草稿(志愿可编辑)
    Frozen, // 已冻结(志愿不可变,分配输入)
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationStatus::Draft => write!(f, "draft"),
            RegistrationStatus::Frozen => write!(f, "frozen"),
        }
    }
}

impl RegistrationStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(RegistrationStatus::Draft),
            "frozen" => Some(RegistrationStatus::Frozen),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Draft => "draft",
            RegistrationStatus::Frozen => "frozen",
        }
    }
}

// ==========================================
// 分配结局 (Allotment Outcome)
// ==========================================
// 红线: 显式带标签的两种结局,不用哨兵值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllotmentOutcome {
    /// 分配到指定科目
    Allotted(String),
    /// 所有志愿均无剩余名额
    Unallotted,
}

impl AllotmentOutcome {
    /// 分配到的科目代码 (未分配返回 None)
    pub fn subject_code(&self) -> Option<&str> {
        match self {
            AllotmentOutcome::Allotted(code) => Some(code),
            AllotmentOutcome::Unallotted => None,
        }
    }

    /// 是否分配成功
    pub fn is_allotted(&self) -> bool {
        matches!(self, AllotmentOutcome::Allotted(_))
    }
}

impl fmt::Display for AllotmentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllotmentOutcome::Allotted(code) => write!(f, "ALLOTTED({})", code),
            AllotmentOutcome::Unallotted => write!(f, "UNALLOTTED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_status_roundtrip() {
        assert_eq!(
            RegistrationStatus::from_str("frozen"),
            Some(RegistrationStatus::Frozen)
        );
        assert_eq!(
            RegistrationStatus::from_str("DRAFT"),
            Some(RegistrationStatus::Draft)
        );
        assert_eq!(RegistrationStatus::from_str("unknown"), None);
        assert_eq!(RegistrationStatus::Frozen.to_db_str(), "frozen");
    }

    #[test]
    fn test_allotment_outcome_accessors() {
        let allotted = AllotmentOutcome::Allotted("CS301".to_string());
        assert!(allotted.is_allotted());
        assert_eq!(allotted.subject_code(), Some("CS301"));

        let unallotted = AllotmentOutcome::Unallotted;
        assert!(!unallotted.is_allotted());
        assert_eq!(unallotted.subject_code(), None);
    }
}

// ==========================================
// 学生选课分配系统 - 操作日志领域模型
// ==========================================
// 红线: 所有写入必须记录
// 用途: 审计追踪,对接外部活动日志系统
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    // ===== 主键 =====
    pub action_id: String,        // 日志ID (UUID)
    pub action_type: String,      // 操作类型 (存储为字符串)
    pub action_ts: NaiveDateTime, // 操作时间戳
    pub actor: String,            // 操作人

    // ===== 业务字段 =====
    pub pool_id: Option<i64>,            // 关联科目池 (可选)
    pub payload_json: Option<JsonValue>, // 操作负载 (JSON)
    pub detail: Option<String>,          // 详细描述
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    AllocationRun,      // 分配运行
    AcademicImport,     // 导入学业数据
    RegistrationImport, // 导入报名数据
}

impl ActionType {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::AllocationRun => "AllocationRun",
            ActionType::AcademicImport => "AcademicImport",
            ActionType::RegistrationImport => "RegistrationImport",
        }
    }

    /// 从字符串解析
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "AllocationRun" => Some(ActionType::AllocationRun),
            "AcademicImport" => Some(ActionType::AcademicImport),
            "RegistrationImport" => Some(ActionType::RegistrationImport),
            _ => None,
        }
    }
}

// ==========================================
// RunSummary - 分配运行摘要
// ==========================================
// 用途: AllocationRun 日志负载 + 运行事件载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub pool_id: i64,              // 科目池ID
    pub timestamp: NaiveDateTime,  // 运行完成时间
    pub total_considered: u32,     // 进入排序的报名数
    pub total_allotted: u32,       // 分配成功数
    pub total_unallotted: u32,     // 显式未分配数
    pub total_skipped: u32,        // 因数据问题被跳过的报名数
}

impl RunSummary {
    /// 生成简短摘要文本
    pub fn summary_text(&self) -> String {
        format!(
            "池{}: 参与{}人, 分配{}人, 未分配{}人, 跳过{}人",
            self.pool_id,
            self.total_considered,
            self.total_allotted,
            self.total_unallotted,
            self.total_skipped
        )
    }
}

// ==========================================
// ActionLog 辅助方法
// ==========================================
impl ActionLog {
    /// 创建新的操作日志
    ///
    /// # 参数
    /// - `action_id`: 日志ID (通常使用UUID)
    /// - `action_type`: 操作类型
    /// - `actor`: 操作人
    pub fn new(action_id: String, action_type: ActionType, actor: String) -> Self {
        Self {
            action_id,
            action_type: action_type.as_str().to_string(),
            action_ts: chrono::Utc::now().naive_utc(),
            actor,
            pool_id: None,
            payload_json: None,
            detail: None,
        }
    }

    /// 设置关联科目池
    pub fn with_pool_id(mut self, pool_id: i64) -> Self {
        self.pool_id = Some(pool_id);
        self
    }

    /// 设置操作负载 (转换为JSON)
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Self {
        self.payload_json = serde_json::to_value(payload).ok();
        self
    }

    /// 设置详细描述
    pub fn with_detail(mut self, detail: String) -> Self {
        self.detail = Some(detail);
        self
    }
}

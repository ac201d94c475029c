// ==========================================
// 学生选课分配系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod academic;
pub mod action_log;
pub mod allotment;
pub mod pool;
pub mod registration;
pub mod types;

// 重导出核心类型
pub use academic::AcademicRecord;
pub use action_log::{ActionLog, ActionType, RunSummary};
pub use allotment::Allotment;
pub use pool::{SubjectEntry, SubjectPool};
pub use registration::Registration;
pub use types::{AllotmentOutcome, RegistrationStatus};

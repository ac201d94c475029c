// ==========================================
// 学生选课分配系统 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合分配协调器所需的所有 Repository
// 目标: 减少 RunCoordinator 的构造函数参数数量
// ==========================================

use std::sync::Arc;

use crate::repository::{
    AcademicRecordRepository, ActionLogRepository, AllotmentRepository, RegistrationRepository,
    SubjectPoolRepository,
};

/// 分配引擎仓储集合
///
/// 聚合分配运行所需的所有 Repository,简化依赖注入,
/// 便于集成测试构造完整的协调器。
#[derive(Clone)]
pub struct AllotmentRepositories {
    /// 科目池仓储
    pub pool_repo: Arc<SubjectPoolRepository>,
    /// 报名仓储
    pub registration_repo: Arc<RegistrationRepository>,
    /// 学业成绩仓储
    pub academic_repo: Arc<AcademicRecordRepository>,
    /// 分配结果仓储
    pub allotment_repo: Arc<AllotmentRepository>,
    /// 操作日志仓储
    pub action_log_repo: Arc<ActionLogRepository>,
}

impl AllotmentRepositories {
    /// 创建新的仓储集合
    pub fn new(
        pool_repo: Arc<SubjectPoolRepository>,
        registration_repo: Arc<RegistrationRepository>,
        academic_repo: Arc<AcademicRecordRepository>,
        allotment_repo: Arc<AllotmentRepository>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            pool_repo,
            registration_repo,
            academic_repo,
            allotment_repo,
            action_log_repo,
        }
    }

    /// 基于同一个共享连接构造全部仓储
    pub fn from_connection(
        conn: Arc<std::sync::Mutex<rusqlite::Connection>>,
    ) -> Self {
        Self {
            pool_repo: Arc::new(SubjectPoolRepository::new(conn.clone())),
            registration_repo: Arc::new(RegistrationRepository::new(conn.clone())),
            academic_repo: Arc::new(AcademicRecordRepository::new(conn.clone())),
            allotment_repo: Arc::new(AllotmentRepository::new(conn.clone())),
            action_log_repo: Arc::new(ActionLogRepository::new(conn)),
        }
    }
}

// ==========================================
// 学生选课分配系统 - 报表 API
// ==========================================
// 职责: 提供池级分配统计的聚合查询,供看板/报表系统调用
// 红线: 只读,不触发任何分配计算
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{
    AllotmentRepository, RegistrationRepository, SubjectPoolRepository,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ==========================================
// SubjectUtilization - 科目名额使用情况
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectUtilization {
    pub subject_code: String,  // 科目代码
    pub subject_name: String,  // 科目名称
    pub intake: u32,           // 招收名额
    pub allotted: u32,         // 已分配人数
    pub utilization_pct: f64,  // 名额使用率 (%)
}

// ==========================================
// PoolReport - 池级分配报表
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolReport {
    pub pool_id: i64,                       // 池ID
    pub pool_name: String,                  // 池名称
    pub is_active: bool,                    // 是否启用
    pub frozen_registrations: u32,          // frozen 报名数
    pub total_allotted: u32,                // 分配成功人数
    pub total_unallotted: u32,              // 显式未分配人数
    pub subjects: Vec<SubjectUtilization>,  // 按科目的名额使用情况
}

// ==========================================
// ReportApi - 报表 API
// ==========================================
pub struct ReportApi {
    pool_repo: Arc<SubjectPoolRepository>,
    registration_repo: Arc<RegistrationRepository>,
    allotment_repo: Arc<AllotmentRepository>,
}

impl ReportApi {
    /// 创建新的ReportApi实例
    pub fn new(
        pool_repo: Arc<SubjectPoolRepository>,
        registration_repo: Arc<RegistrationRepository>,
        allotment_repo: Arc<AllotmentRepository>,
    ) -> Self {
        Self {
            pool_repo,
            registration_repo,
            allotment_repo,
        }
    }

    /// 查询池级分配报表
    ///
    /// # 参数
    /// - pool_id: 池ID
    ///
    /// # 返回
    /// - Ok(PoolReport): 按科目的名额使用情况与池级汇总
    /// - Err(NotFound): 池不存在
    pub fn pool_report(&self, pool_id: i64) -> RepositoryResult<PoolReport> {
        let pool = self
            .pool_repo
            .find_by_id(pool_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "SubjectPool".to_string(),
                id: pool_id.to_string(),
            })?;

        let allotted_by_subject = self.allotment_repo.count_by_subject(pool_id)?;
        let frozen_registrations = self.registration_repo.count_frozen_by_pool(pool_id)?;
        let total_unallotted = self.allotment_repo.count_unallotted(pool_id)?;

        let subjects: Vec<SubjectUtilization> = pool
            .subjects
            .iter()
            .map(|entry| {
                let allotted = allotted_by_subject
                    .get(&entry.subject_code)
                    .copied()
                    .unwrap_or(0);
                let utilization_pct = if entry.intake > 0 {
                    ((allotted as f64 / entry.intake as f64) * 1000.0).round() / 10.0
                } else {
                    0.0
                };
                SubjectUtilization {
                    subject_code: entry.subject_code.clone(),
                    subject_name: entry.subject_name.clone(),
                    intake: entry.intake,
                    allotted,
                    utilization_pct,
                }
            })
            .collect();

        let total_allotted = subjects.iter().map(|s| s.allotted).sum();

        Ok(PoolReport {
            pool_id: pool.pool_id,
            pool_name: pool.pool_name,
            is_active: pool.is_active,
            frozen_registrations,
            total_allotted,
            total_unallotted,
            subjects,
        })
    }
}

// ==========================================
// 学生选课分配系统 - 分配引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约束: 每个变体对应一个机器可读的错误码,供 CLI 出口使用
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

// ==========================================
// AtCapacityError - 名额已满信号
// ==========================================
// 仅在求解器内部消费: 驱动扫描学生的下一志愿,不对外暴露
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("科目名额已满: {subject_code}")]
pub struct AtCapacityError {
    pub subject_code: String,
}

// ==========================================
// AllocationError - 分配引擎错误
// ==========================================
#[derive(Error, Debug)]
pub enum AllocationError {
    // ===== 前置条件错误 (计算开始前中止) =====
    #[error("科目池不存在: pool_id={0}")]
    PoolNotFound(i64),

    #[error("科目池未启用: pool_id={0}")]
    PoolInactive(i64),

    // ===== 单条报名数据错误 (隔离处理,不中止运行) =====
    #[error("报名数据无效 (regno={regno}): {message}")]
    InvalidInput { regno: String, message: String },

    // ===== 并发守卫 (可重试) =====
    #[error("科目池 {0} 已有分配运行在执行中")]
    RunInProgress(i64),

    // ===== 提交阶段错误 (整体回滚,可安全重试) =====
    #[error("分配结果提交失败: {0}")]
    CommitFailure(String),

    // ===== 读取阶段的仓储错误 (写入前中止) =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AllocationError {
    /// 机器可读错误码
    pub fn kind(&self) -> &'static str {
        match self {
            AllocationError::PoolNotFound(_) => "POOL_NOT_FOUND",
            AllocationError::PoolInactive(_) => "POOL_INACTIVE",
            AllocationError::InvalidInput { .. } => "INVALID_INPUT",
            AllocationError::RunInProgress(_) => "RUN_IN_PROGRESS",
            AllocationError::CommitFailure(_) => "COMMIT_FAILURE",
            AllocationError::Repository(_) => "REPOSITORY_ERROR",
        }
    }

    /// CLI 退出码 (0 保留给成功)
    pub fn exit_code(&self) -> i32 {
        match self {
            AllocationError::PoolNotFound(_) => 2,
            AllocationError::PoolInactive(_) => 3,
            AllocationError::InvalidInput { .. } => 4,
            AllocationError::RunInProgress(_) => 5,
            AllocationError::CommitFailure(_) => 6,
            AllocationError::Repository(_) => 7,
        }
    }

    /// 是否可直接重试 (状态未变化)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AllocationError::RunInProgress(_) | AllocationError::CommitFailure(_)
        )
    }
}

/// Result 类型别名
pub type AllocationResult<T> = Result<T, AllocationError>;

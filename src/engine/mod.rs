// ==========================================
// 学生选课分配系统 - 引擎层
// ==========================================
// 职责: 实现分配业务规则,不拼 SQL
// 红线: Engine 不拼 SQL; 同输入必得同输出
// ==========================================

pub mod capacity;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod merit;
pub mod normalizer;
pub mod repositories;
pub mod solver;

// 重导出核心引擎
pub use capacity::CapacityTracker;
pub use coordinator::{
    AllocationRunResult, PoolRunLockGuard, PoolRunLockRegistry, RunCoordinator,
};
pub use error::{AllocationError, AllocationResult, AtCapacityError};
pub use events::{NoOpEventPublisher, OptionalEventPublisher, RunEvent, RunEventPublisher};
pub use merit::MeritRanker;
pub use normalizer::{NormalizedPreferences, PreferenceNormalizer};
pub use repositories::AllotmentRepositories;
pub use solver::AllocationSolver;

// ==========================================
// 学生选课分配系统 - 分配运行协调器
// ==========================================
// 职责: 编排一次完整的池级分配运行
// 流程: 读取快照 → 规范化 → 排序 → 求解 → 原子提交 → 摘要
// 红线: 提交阶段之前的任何错误不产生写入;
//       提交事务失败整体回滚,旧结果保持可见
// ==========================================

use crate::domain::action_log::{ActionLog, ActionType, RunSummary};
use crate::domain::allotment::Allotment;
use crate::domain::types::AllotmentOutcome;
use crate::engine::capacity::CapacityTracker;
use crate::engine::error::{AllocationError, AllocationResult};
use crate::engine::events::{OptionalEventPublisher, RunEvent, RunEventPublisher};
use crate::engine::merit::MeritRanker;
use crate::engine::normalizer::PreferenceNormalizer;
use crate::engine::repositories::AllotmentRepositories;
use crate::engine::solver::AllocationSolver;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

// ==========================================
// PoolRunLockRegistry - 池级运行锁注册表
// ==========================================
// 红线: 同一池同一时刻至多一次运行在途
// 作用域: 进程内; 锁在守卫 Drop 时自动释放
pub struct PoolRunLockRegistry {
    in_flight: Mutex<HashSet<i64>>,
}

impl PoolRunLockRegistry {
    /// 创建空注册表
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            in_flight: Mutex::new(HashSet::new()),
        })
    }

    /// 获取指定池的独占运行锁
    ///
    /// # 返回
    /// - Ok(PoolRunLockGuard): 守卫存活期间持有锁
    /// - Err(RunInProgress): 该池已有运行在途
    pub fn acquire(self: &Arc<Self>, pool_id: i64) -> AllocationResult<PoolRunLockGuard> {
        let mut in_flight = self
            .in_flight
            .lock()
            .map_err(|e| AllocationError::CommitFailure(format!("运行锁状态损坏: {}", e)))?;

        if !in_flight.insert(pool_id) {
            return Err(AllocationError::RunInProgress(pool_id));
        }

        Ok(PoolRunLockGuard {
            registry: Arc::clone(self),
            pool_id,
        })
    }
}

/// 池级运行锁守卫 (RAII)
pub struct PoolRunLockGuard {
    registry: Arc<PoolRunLockRegistry>,
    pool_id: i64,
}

impl Drop for PoolRunLockGuard {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.registry.in_flight.lock() {
            in_flight.remove(&self.pool_id);
        }
    }
}

// ==========================================
// AllocationRunResult - 运行结果
// ==========================================
#[derive(Debug, Clone)]
pub struct AllocationRunResult {
    /// 科目池 ID
    pub pool_id: i64,
    /// 运行摘要
    pub summary: RunSummary,
    /// 按位次顺序的分配结局
    pub outcomes: Vec<(String, AllotmentOutcome)>,
    /// 因数据问题被跳过的报名 (学籍号, 原因)
    pub skipped: Vec<(String, String)>,
}

// ==========================================
// RunCoordinator - 分配运行协调器
// ==========================================
pub struct RunCoordinator {
    repos: AllotmentRepositories,
    normalizer: PreferenceNormalizer,
    ranker: MeritRanker,
    solver: AllocationSolver,
    lock_registry: Arc<PoolRunLockRegistry>,
    event_publisher: OptionalEventPublisher,
    actor: String,
}

impl RunCoordinator {
    /// 创建新的协调器实例
    ///
    /// # 参数
    /// - `repos`: 仓储集合
    /// - `event_publisher`: 运行事件发布器 (可选)
    /// - `actor`: 操作日志中的操作人标识
    pub fn new(
        repos: AllotmentRepositories,
        event_publisher: Option<Arc<dyn RunEventPublisher>>,
        actor: String,
    ) -> Self {
        let event_publisher = match event_publisher {
            Some(p) => OptionalEventPublisher::with_publisher(p),
            None => OptionalEventPublisher::none(),
        };

        Self {
            repos,
            normalizer: PreferenceNormalizer::new(),
            ranker: MeritRanker::new(),
            solver: AllocationSolver::new(),
            lock_registry: PoolRunLockRegistry::new(),
            event_publisher,
            actor,
        }
    }

    /// 使用外部共享的锁注册表
    ///
    /// 同一进程内存在多个协调器实例时,必须共享注册表,
    /// 否则池级守卫互不可见。
    pub fn with_lock_registry(mut self, registry: Arc<PoolRunLockRegistry>) -> Self {
        self.lock_registry = registry;
        self
    }

    /// 执行一次完整的池级分配运行
    ///
    /// 幂等性: 输入数据不变时重复执行,落库结果逐字节一致。
    ///
    /// # 参数
    /// - `pool_id`: 目标科目池ID
    ///
    /// # 返回
    /// - Ok(AllocationRunResult): 已提交的运行结果
    /// - Err: 见错误分类; 提交失败时旧结果保持不变
    pub fn run_allocation(&self, pool_id: i64) -> AllocationResult<AllocationRunResult> {
        info!(pool_id, "开始执行分配运行");

        // ==========================================
        // 步骤1: 读取并校验科目池
        // ==========================================
        let pool = self
            .repos
            .pool_repo
            .find_by_id(pool_id)?
            .ok_or(AllocationError::PoolNotFound(pool_id))?;

        if !pool.is_active {
            return Err(AllocationError::PoolInactive(pool_id));
        }

        if let Err(dup) = pool.validate_subject_codes() {
            // 池定义损坏属于外部管理端问题,按仓储数据校验失败处理
            return Err(AllocationError::Repository(
                crate::repository::RepositoryError::ValidationError(format!(
                    "池 {} 科目代码重复: {}",
                    pool_id, dup
                )),
            ));
        }

        // ==========================================
        // 并发守卫: 获取池级独占锁 (守卫随本函数结束释放)
        // ==========================================
        let _run_lock = self.lock_registry.acquire(pool_id)?;

        // ==========================================
        // 步骤2: 装载 frozen 报名与学业数据快照
        // ==========================================
        debug!("步骤2: 装载报名与学业数据");
        let registrations = self.repos.registration_repo.find_frozen_by_pool(pool_id)?;
        let regnos: Vec<String> = registrations.iter().map(|r| r.regno.clone()).collect();
        let records = self.repos.academic_repo.find_by_regnos(&regnos)?;

        info!(
            frozen_count = registrations.len(),
            records_count = records.len(),
            "快照装载完成"
        );

        // ==========================================
        // 步骤3: 志愿规范化
        // ==========================================
        debug!("步骤3: 执行志愿规范化");
        let mut preferences: HashMap<String, Vec<String>> = HashMap::new();
        let mut considered: Vec<String> = Vec::with_capacity(registrations.len());
        let mut skipped: Vec<(String, String)> = Vec::new();

        for registration in &registrations {
            match self.normalizer.normalize(registration, &pool) {
                Ok(normalized) => {
                    if !normalized.dropped_codes.is_empty() {
                        warn!(
                            regno = %normalized.regno,
                            dropped = ?normalized.dropped_codes,
                            "志愿中存在无效科目,已丢弃"
                        );
                    }
                    considered.push(normalized.regno.clone());
                    preferences.insert(normalized.regno, normalized.preferences);
                }
                Err(AllocationError::InvalidInput { regno, message }) => {
                    // 单条数据错误隔离处理,运行继续
                    warn!(regno = %regno, reason = %message, "报名数据无效,跳过该报名");
                    skipped.push((regno, message));
                }
                Err(e) => return Err(e),
            }
        }

        // ==========================================
        // 步骤4: 择优排序
        // ==========================================
        debug!("步骤4: 执行择优排序");
        let ordered = self.ranker.rank(&considered, &records);

        // ==========================================
        // 步骤5: 顺序分配求解
        // ==========================================
        debug!("步骤5: 执行顺序分配求解");
        let mut tracker = CapacityTracker::from_pool(&pool);
        let outcomes = self.solver.allocate(&ordered, &preferences, &mut tracker);

        // ==========================================
        // 步骤6: 原子提交 (整池替换)
        // ==========================================
        debug!("步骤6: 原子提交分配结果");
        let allotments: Vec<Allotment> = outcomes
            .iter()
            .map(|(regno, outcome)| Allotment::from_outcome(regno.clone(), pool_id, outcome))
            .collect();

        self.repos
            .allotment_repo
            .replace_for_pool(pool_id, &allotments)
            .map_err(|e| AllocationError::CommitFailure(e.to_string()))?;

        // ==========================================
        // 步骤7: 运行摘要 - 操作日志与事件
        // ==========================================
        let total_allotted = outcomes.iter().filter(|(_, o)| o.is_allotted()).count() as u32;
        let summary = RunSummary {
            pool_id,
            timestamp: chrono::Utc::now().naive_utc(),
            total_considered: considered.len() as u32,
            total_allotted,
            total_unallotted: outcomes.len() as u32 - total_allotted,
            total_skipped: skipped.len() as u32,
        };

        let log = ActionLog::new(
            Uuid::new_v4().to_string(),
            ActionType::AllocationRun,
            self.actor.clone(),
        )
        .with_pool_id(pool_id)
        .with_payload(&summary)
        .with_detail(summary.summary_text());

        // 结果已提交,摘要落盘失败只告警不回滚
        if let Err(e) = self.repos.action_log_repo.insert(&log) {
            warn!(pool_id, error = %e, "运行日志写入失败");
        }

        if let Err(e) = self.event_publisher.publish(RunEvent {
            pool_id,
            summary: summary.clone(),
        }) {
            warn!(pool_id, error = %e, "运行事件发布失败");
        }

        info!(
            pool_id,
            total_considered = summary.total_considered,
            total_allotted = summary.total_allotted,
            total_unallotted = summary.total_unallotted,
            total_skipped = summary.total_skipped,
            "分配运行完成"
        );

        Ok(AllocationRunResult {
            pool_id,
            summary,
            outcomes,
            skipped,
        })
    }
}

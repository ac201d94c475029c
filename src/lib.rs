// ==========================================
// 学生选课分配系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 按学业成绩择优的志愿分配引擎
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 分配业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// API 层 - 聚合查询
pub mod api;

// 配置层 - 路径与标识解析
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AllotmentOutcome, RegistrationStatus};

// 领域实体
pub use domain::{
    AcademicRecord, ActionLog, ActionType, Allotment, Registration, RunSummary, SubjectEntry,
    SubjectPool,
};

// 引擎
pub use engine::{
    AllocationError, AllocationRunResult, AllocationSolver, AllotmentRepositories,
    CapacityTracker, MeritRanker, PoolRunLockRegistry, PreferenceNormalizer, RunCoordinator,
};

// API
pub use api::ReportApi;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "学生选课分配系统";

// ==========================================
// 预编译检查
// ==========================================

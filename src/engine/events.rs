// ==========================================
// 学生选课分配系统 - 引擎层事件发布
// ==========================================
// 职责: 定义运行事件发布 trait,实现依赖倒置
// 说明: Engine 层定义 trait,外部活动日志系统提供适配器
// ==========================================

use crate::domain::action_log::RunSummary;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// 运行事件
// ==========================================

/// 分配运行事件
///
/// 一次成功提交的分配运行对外发布一条摘要事件,
/// 供外部活动日志/看板系统消费。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    /// 科目池 ID
    pub pool_id: i64,
    /// 运行摘要
    pub summary: RunSummary,
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 运行事件发布者 Trait
///
/// # 实现说明
/// - 外部活动日志系统实现此 trait 接收运行摘要
/// - 发布失败不回滚已提交的分配结果,由调用方记录告警
pub trait RunEventPublisher: Send + Sync {
    /// 发布运行事件
    ///
    /// # 参数
    /// - `event`: 运行事件
    fn publish(&self, event: RunEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
///
/// 用于不需要事件发布的场景（如单元测试）
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl RunEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: RunEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            pool_id = event.pool_id,
            "NoOpEventPublisher: 跳过事件发布"
        );
        Ok(())
    }
}

/// 可选的事件发布者包装
///
/// 简化 Option<Arc<dyn RunEventPublisher>> 的使用
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn RunEventPublisher>>,
}

impl OptionalEventPublisher {
    /// 创建带发布者的实例
    pub fn with_publisher(publisher: Arc<dyn RunEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    /// 创建空实例（不发布事件）
    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 发布事件（如果有发布者）
    pub fn publish(&self, event: RunEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        match &self.inner {
            Some(publisher) => publisher.publish(event),
            None => {
                tracing::debug!(
                    pool_id = event.pool_id,
                    "OptionalEventPublisher: 未配置发布者,跳过事件"
                );
                Ok(())
            }
        }
    }

    /// 检查是否配置了发布者
    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalEventPublisher {
    fn default() -> Self {
        Self::none()
    }
}

// ==========================================
// 学生选课分配系统 - 志愿规范化引擎
// ==========================================
// 职责: 校验并规范化单条报名的志愿列表
// 输入: frozen 报名 + 启用中的科目池
// 输出: 去重且仅含池内科目的志愿列表
// 红线: 纯函数,不触碰存储; 丢弃科目只产生诊断,不产生硬错误
// ==========================================

use crate::domain::pool::SubjectPool;
use crate::domain::registration::Registration;
use crate::engine::error::{AllocationError, AllocationResult};
use std::collections::HashSet;
use tracing::debug;

// ==========================================
// NormalizedPreferences - 规范化结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPreferences {
    pub regno: String,             // 学籍号
    pub preferences: Vec<String>,  // 规范化后的志愿 (保持首见顺序)
    pub dropped_codes: Vec<String>, // 被丢弃的科目代码 (非池内或重复)
}

impl NormalizedPreferences {
    /// 规范化后是否不含任何有效志愿
    pub fn is_empty(&self) -> bool {
        self.preferences.is_empty()
    }
}

// ==========================================
// PreferenceNormalizer - 志愿规范化引擎
// ==========================================
pub struct PreferenceNormalizer {
    // 无状态引擎,不需要注入依赖
}

impl PreferenceNormalizer {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    /// 规范化单条报名的志愿列表
    ///
    /// 处理规则:
    /// 1) 报名必须属于传入的科目池,否则 InvalidInput
    /// 2) 报名必须处于 frozen 状态,否则 InvalidInput
    /// 3) 科目池必须启用,否则 PoolInactive
    /// 4) 丢弃池内未开设的科目代码
    /// 5) 去重,保持首见顺序
    /// 6) 结果为空 ⇒ 合法输入(可参与排序,不可被分配)
    ///
    /// # 参数
    /// - `registration`: 报名记录
    /// - `pool`: 科目池定义
    ///
    /// # 返回
    /// - Ok(NormalizedPreferences): 规范化结果,dropped_codes 供上层记录诊断
    /// - Err: 前置条件不满足
    pub fn normalize(
        &self,
        registration: &Registration,
        pool: &SubjectPool,
    ) -> AllocationResult<NormalizedPreferences> {
        if registration.pool_id != pool.pool_id {
            return Err(AllocationError::InvalidInput {
                regno: registration.regno.clone(),
                message: format!(
                    "报名所属池 {} 与处理中的池 {} 不一致",
                    registration.pool_id, pool.pool_id
                ),
            });
        }

        if !registration.is_frozen() {
            return Err(AllocationError::InvalidInput {
                regno: registration.regno.clone(),
                message: format!("报名状态为 {},仅 frozen 可进入分配", registration.status),
            });
        }

        if !pool.is_active {
            return Err(AllocationError::PoolInactive(pool.pool_id));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut preferences = Vec::with_capacity(registration.priority_order.len());
        let mut dropped_codes = Vec::new();

        for code in &registration.priority_order {
            if !pool.offers(code) {
                dropped_codes.push(code.clone());
                continue;
            }
            if !seen.insert(code.as_str()) {
                dropped_codes.push(code.clone());
                continue;
            }
            preferences.push(code.clone());
        }

        if !dropped_codes.is_empty() {
            debug!(
                regno = %registration.regno,
                pool_id = pool.pool_id,
                dropped = ?dropped_codes,
                "规范化丢弃了无效或重复的志愿科目"
            );
        }

        Ok(NormalizedPreferences {
            regno: registration.regno.clone(),
            preferences,
            dropped_codes,
        })
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for PreferenceNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 学生选课分配系统 - 名额跟踪器
// ==========================================
// 红线: 名额状态只在单次分配运行内存活,由运行独占持有
// 说明: 不跨池、不跨运行共享,运行结束即丢弃
// ==========================================

use crate::domain::pool::SubjectPool;
use crate::engine::error::AtCapacityError;
use std::collections::HashMap;

// ==========================================
// CapacityTracker - 名额跟踪器
// ==========================================
#[derive(Debug, Clone)]
pub struct CapacityTracker {
    remaining: HashMap<String, u32>,
}

impl CapacityTracker {
    /// 由科目池的招收名额构造跟踪器
    pub fn from_pool(pool: &SubjectPool) -> Self {
        let remaining = pool
            .subjects
            .iter()
            .map(|s| (s.subject_code.clone(), s.intake))
            .collect();
        Self { remaining }
    }

    /// 查询科目剩余名额 (未知科目视为 0)
    pub fn remaining(&self, subject_code: &str) -> u32 {
        self.remaining.get(subject_code).copied().unwrap_or(0)
    }

    /// 预定一个名额
    ///
    /// 仅当剩余名额 > 0 时扣减一个,否则返回 AtCapacityError。
    ///
    /// # 参数
    /// - `subject_code`: 科目代码
    ///
    /// # 返回
    /// - Ok(()): 预定成功,剩余名额已减一
    /// - Err(AtCapacityError): 名额已满,状态未变化
    pub fn reserve(&mut self, subject_code: &str) -> Result<(), AtCapacityError> {
        match self.remaining.get_mut(subject_code) {
            Some(count) if *count > 0 => {
                *count -= 1;
                Ok(())
            }
            _ => Err(AtCapacityError {
                subject_code: subject_code.to_string(),
            }),
        }
    }

    /// 全部科目的剩余名额总和
    pub fn total_remaining(&self) -> u32 {
        self.remaining.values().sum()
    }
}

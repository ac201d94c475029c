// ==========================================
// 学生选课分配系统 - 顺序分配求解器
// ==========================================
// 职责: 按位次顺序为每名学生预定最优可用志愿
// 算法: 串行独裁 (serial dictatorship) —— 逐人取最优剩余选项
// 红线: 已预定的名额不回收,不回溯,不重排
// 复杂度: O(S·P), S=学生数, P=平均志愿长度
// ==========================================

use crate::domain::types::AllotmentOutcome;
use crate::engine::capacity::CapacityTracker;
use std::collections::HashMap;
use tracing::{debug, instrument};

// ==========================================
// AllocationSolver - 分配求解器
// ==========================================
pub struct AllocationSolver {
    // 无状态引擎,不需要注入依赖
}

impl AllocationSolver {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 执行一轮顺序分配
    ///
    /// 严格按传入的位次顺序处理学生; 对每名学生按志愿顺序
    /// 逐一尝试预定,首个成功的科目即为其分配结果; 所有志愿
    /// 均满则显式标记为未分配。
    ///
    /// # 参数
    /// - `ordered_students`: 位次排序后的学籍号 (高位次在前)
    /// - `preferences`: 按学籍号索引的规范化志愿列表
    /// - `tracker`: 本次运行独占的名额跟踪器 (会被修改)
    ///
    /// # 返回
    /// 按处理顺序的 (学籍号, 分配结局) 列表,每名学生恰好一条
    #[instrument(skip(self, ordered_students, preferences, tracker), fields(
        students_count = ordered_students.len(),
        total_capacity = tracker.total_remaining()
    ))]
    pub fn allocate(
        &self,
        ordered_students: &[String],
        preferences: &HashMap<String, Vec<String>>,
        tracker: &mut CapacityTracker,
    ) -> Vec<(String, AllotmentOutcome)> {
        let mut outcomes = Vec::with_capacity(ordered_students.len());

        for regno in ordered_students {
            let outcome = match preferences.get(regno) {
                Some(prefs) => self.allocate_single(regno, prefs, tracker),
                // 无志愿条目: 可排序不可分配
                None => AllotmentOutcome::Unallotted,
            };
            outcomes.push((regno.clone(), outcome));
        }

        outcomes
    }

    /// 为单名学生扫描志愿并预定
    fn allocate_single(
        &self,
        regno: &str,
        preferences: &[String],
        tracker: &mut CapacityTracker,
    ) -> AllotmentOutcome {
        for code in preferences {
            match tracker.reserve(code) {
                Ok(()) => {
                    debug!(regno = %regno, subject_code = %code, "志愿预定成功");
                    return AllotmentOutcome::Allotted(code.clone());
                }
                // 名额已满: 移向下一志愿
                Err(_) => continue,
            }
        }

        debug!(regno = %regno, "所有志愿均无剩余名额");
        AllotmentOutcome::Unallotted
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for AllocationSolver {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 学生选课分配系统 - 择优排序引擎
// ==========================================
// 红线: 排序必须是严格全序,同输入必得同位次
// ==========================================

use crate::domain::academic::AcademicRecord;
use std::cmp::Ordering;
use std::collections::HashMap;

// ==========================================
// MeritRanker - 择优排序引擎
// ==========================================
pub struct MeritRanker {
    // 无状态引擎,不需要注入依赖
}

impl MeritRanker {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 对学生列表按学业成绩排出严格全序
    ///
    /// 排序键:
    /// 1) cgpa 降序 (缺失按 -∞,排在任何数值之后)
    /// 2) backlogs 升序 (缺失按 +∞,排在任何数值之后)
    /// 3) regno 升序 (最终确定性决胜键)
    ///
    /// 无学业记录的学生等同于两个字段均缺失。
    ///
    /// # 参数
    /// - `regnos`: 待排序的学籍号列表
    /// - `records`: 按学籍号索引的学业记录
    ///
    /// # 返回
    /// 排序后的学籍号列表 (位次自高到低)
    pub fn rank(
        &self,
        regnos: &[String],
        records: &HashMap<String, AcademicRecord>,
    ) -> Vec<String> {
        let mut ordered: Vec<String> = regnos.to_vec();
        ordered.sort_by(|a, b| self.compare(a, b, records));
        ordered
    }

    /// 比较两名学生的位次
    ///
    /// # 返回
    /// Ordering::Less 表示 a 位次高于 b
    pub fn compare(
        &self,
        a: &str,
        b: &str,
        records: &HashMap<String, AcademicRecord>,
    ) -> Ordering {
        let (cgpa_a, backlogs_a) = Self::merit_key(a, records);
        let (cgpa_b, backlogs_b) = Self::merit_key(b, records);

        // 1. 比较 cgpa (降序,越高越优先)
        match cgpa_b.total_cmp(&cgpa_a) {
            Ordering::Equal => {}
            other => return other,
        }

        // 2. 比较 backlogs (升序,越少越优先)
        match backlogs_a.cmp(&backlogs_b) {
            Ordering::Equal => {}
            other => return other,
        }

        // 3. 比较 regno (升序,保证全序)
        let ord = a.cmp(b);
        // 学籍号池内唯一,不同学生不可能比较相等
        debug_assert!(a == b || ord != Ordering::Equal);
        ord
    }

    /// 提取排序键 (缺失值折算为极值)
    fn merit_key(regno: &str, records: &HashMap<String, AcademicRecord>) -> (f64, u64) {
        match records.get(regno) {
            Some(record) => (
                record.cgpa.unwrap_or(f64::NEG_INFINITY),
                record.backlogs.map(u64::from).unwrap_or(u64::MAX),
            ),
            None => (f64::NEG_INFINITY, u64::MAX),
        }
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for MeritRanker {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 学生选课分配系统 - 学业数据领域模型
// ==========================================
// 用途: 择优排序的成绩输入
// ==========================================

use serde::{Deserialize, Serialize};

/// CGPA 合法区间上界
pub const CGPA_MAX: f64 = 10.0;

// ==========================================
// AcademicRecord - 学业成绩记录
// ==========================================
// 约束: 每名学生至多一条; 两个字段均可缺失
// 缺失语义: cgpa 缺失按 -∞ 排序, backlogs 缺失按 +∞ 排序
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademicRecord {
    pub regno: String,          // 学籍号
    pub cgpa: Option<f64>,      // 平均绩点 (0.0 - 10.0)
    pub backlogs: Option<u32>,  // 挂科数 (>= 0)
}

impl AcademicRecord {
    /// 字段取值是否落在合法区间
    pub fn is_valid(&self) -> bool {
        match self.cgpa {
            Some(v) if !(0.0..=CGPA_MAX).contains(&v) || !v.is_finite() => false,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_bounds() {
        let mut record = AcademicRecord {
            regno: "21CS1001".to_string(),
            cgpa: Some(8.4),
            backlogs: Some(0),
        };
        assert!(record.is_valid());

        record.cgpa = Some(10.0);
        assert!(record.is_valid());

        record.cgpa = Some(10.5);
        assert!(!record.is_valid());

        record.cgpa = Some(-0.1);
        assert!(!record.is_valid());

        record.cgpa = None;
        assert!(record.is_valid());
    }
}

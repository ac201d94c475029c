// ==========================================
// 学生选课分配系统 - 科目池领域模型
// ==========================================
// 红线: 名额约束优先于学生志愿
// 用途: 名额管理,分配运行的容量来源
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// SubjectEntry - 池内科目条目
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectEntry {
    pub subject_code: String, // 科目代码 (池内唯一)
    pub subject_name: String, // 科目名称
    pub intake: u32,          // 招收名额
}

// ==========================================
// SubjectPool - 科目池
// ==========================================
// 红线: 分配运行期间池定义不可变
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectPool {
    // ===== 主键 =====
    pub pool_id: i64,              // 池ID
    pub pool_name: String,         // 池名称

    // ===== 科目与名额 =====
    pub subjects: Vec<SubjectEntry>, // 池内科目条目(代码池内唯一)

    // ===== 范围限定 =====
    pub semester: String,               // 学期
    pub batch: String,                  // 届别
    pub allowed_programmes: Vec<String>, // 允许报名的专业列表

    // ===== 状态 =====
    pub is_active: bool,           // 是否启用
}

impl SubjectPool {
    /// 池内是否开设指定科目
    pub fn offers(&self, subject_code: &str) -> bool {
        self.subjects.iter().any(|s| s.subject_code == subject_code)
    }

    /// 按代码查找科目条目
    pub fn subject(&self, subject_code: &str) -> Option<&SubjectEntry> {
        self.subjects.iter().find(|s| s.subject_code == subject_code)
    }

    /// 池内全部科目代码 (按定义顺序)
    pub fn subject_codes(&self) -> Vec<&str> {
        self.subjects.iter().map(|s| s.subject_code.as_str()).collect()
    }

    /// 池内总名额
    pub fn total_intake(&self) -> u32 {
        self.subjects.iter().map(|s| s.intake).sum()
    }

    /// 校验池定义的结构不变量
    ///
    /// # 返回
    /// - `Ok(())`: 科目代码池内唯一
    /// - `Err(code)`: 第一个重复的科目代码
    pub fn validate_subject_codes(&self) -> Result<(), String> {
        let mut seen = std::collections::HashSet::new();
        for entry in &self.subjects {
            if !seen.insert(entry.subject_code.as_str()) {
                return Err(entry.subject_code.clone());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pool() -> SubjectPool {
        SubjectPool {
            pool_id: 1,
            pool_name: "开放选修 A 组".to_string(),
            subjects: vec![
                SubjectEntry {
                    subject_code: "CS301".to_string(),
                    subject_name: "机器学习".to_string(),
                    intake: 60,
                },
                SubjectEntry {
                    subject_code: "EC305".to_string(),
                    subject_name: "数字信号处理".to_string(),
                    intake: 40,
                },
            ],
            semester: "5".to_string(),
            batch: "2023".to_string(),
            allowed_programmes: vec!["BTECH-CSE".to_string(), "BTECH-ECE".to_string()],
            is_active: true,
        }
    }

    #[test]
    fn test_offers_and_lookup() {
        let pool = sample_pool();
        assert!(pool.offers("CS301"));
        assert!(!pool.offers("ME210"));
        assert_eq!(pool.subject("EC305").unwrap().intake, 40);
        assert_eq!(pool.subject_codes(), vec!["CS301", "EC305"]);
        assert_eq!(pool.total_intake(), 100);
    }

    #[test]
    fn test_validate_subject_codes_detects_duplicate() {
        let mut pool = sample_pool();
        assert!(pool.validate_subject_codes().is_ok());

        pool.subjects.push(SubjectEntry {
            subject_code: "CS301".to_string(),
            subject_name: "重复条目".to_string(),
            intake: 10,
        });
        assert_eq!(pool.validate_subject_codes(), Err("CS301".to_string()));
    }
}

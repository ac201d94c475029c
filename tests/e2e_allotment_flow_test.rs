// ==========================================
// 端到端业务流程测试
// ==========================================
// 流程: 导入报名/学业 CSV → 分配运行 → 报表校验
// ==========================================


#[cfg(test)]
mod e2e_allotment_flow_test {
    use std::io::Write;
    use tempfile::NamedTempFile;

    use subject_allotment::api::ReportApi;
    use subject_allotment::engine::RunCoordinator;
    use subject_allotment::importer::{AcademicRecordImporter, RegistrationImporter};

    use crate::test_helpers::{make_pool, setup_repositories};

    #[test]
    fn test_full_flow_import_allocate_report() {
        let (_temp_file, repos) = setup_repositories();

        // 1. 管理端建池: {CS301: 2, EC305: 1}
        let pool = make_pool(1, &[("CS301", 2), ("EC305", 1)]);
        repos.pool_repo.insert(&pool).unwrap();

        // 2. 导入报名 CSV (R4 为草稿,不参与分配)
        let mut reg_csv = NamedTempFile::new().unwrap();
        writeln!(reg_csv, "regno,pool_id,email,mobile,status,priority_order").unwrap();
        writeln!(reg_csv, "R1,1,r1@example.edu,9876543210,frozen,CS301|EC305").unwrap();
        writeln!(reg_csv, "R2,1,r2@example.edu,9876543211,frozen,CS301|EC305").unwrap();
        writeln!(reg_csv, "R3,1,r3@example.edu,9876543212,frozen,CS301|EC305").unwrap();
        writeln!(reg_csv, "R4,1,r4@example.edu,9876543213,draft,CS301").unwrap();
        writeln!(reg_csv, "R5,1,r5@example.edu,9876543214,frozen,EC305").unwrap();

        let reg_importer = RegistrationImporter::new(
            repos.registration_repo.clone(),
            repos.action_log_repo.clone(),
            "admin".to_string(),
        );
        let reg_report = reg_importer.import_csv(reg_csv.path()).unwrap();
        assert_eq!(reg_report.imported, 5);
        assert_eq!(reg_report.rejected, 0);

        // 3. 导入学业 CSV (R3 无记录 ⇒ 位次垫底)
        let mut acad_csv = NamedTempFile::new().unwrap();
        writeln!(acad_csv, "regno,cgpa,backlogs").unwrap();
        writeln!(acad_csv, "R1,9.2,0").unwrap();
        writeln!(acad_csv, "R2,8.1,1").unwrap();
        writeln!(acad_csv, "R5,9.9,0").unwrap();

        let acad_importer = AcademicRecordImporter::new(
            repos.academic_repo.clone(),
            repos.action_log_repo.clone(),
            "admin".to_string(),
        );
        let acad_report = acad_importer.import_csv(acad_csv.path()).unwrap();
        assert_eq!(acad_report.imported, 3);

        // 4. 分配运行
        let coordinator = RunCoordinator::new(repos.clone(), None, "admin".to_string());
        let result = coordinator.run_allocation(1).unwrap();

        // 位次: R5 (9.9) > R1 (9.2) > R2 (8.1) > R3 (无记录)
        let order: Vec<&str> = result.outcomes.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(order, vec!["R5", "R1", "R2", "R3"]);

        // R5→EC305, R1→CS301, R2→CS301, R3 两志愿均满 ⇒ 未分配
        let stored = repos.allotment_repo.find_by_pool(1).unwrap();
        let find = |regno: &str| {
            stored
                .iter()
                .find(|a| a.regno == regno)
                .unwrap()
                .subject_code
                .clone()
        };
        assert_eq!(find("R5"), Some("EC305".to_string()));
        assert_eq!(find("R1"), Some("CS301".to_string()));
        assert_eq!(find("R2"), Some("CS301".to_string()));
        assert_eq!(find("R3"), None);

        // 5. 报表校验 (口径与落库一致)
        let report_api = ReportApi::new(
            repos.pool_repo.clone(),
            repos.registration_repo.clone(),
            repos.allotment_repo.clone(),
        );
        let report = report_api.pool_report(1).unwrap();

        assert_eq!(report.frozen_registrations, 4);
        assert_eq!(report.total_allotted, 3);
        assert_eq!(report.total_unallotted, 1);

        let cs301 = report
            .subjects
            .iter()
            .find(|s| s.subject_code == "CS301")
            .unwrap();
        assert_eq!(cs301.intake, 2);
        assert_eq!(cs301.allotted, 2);
        assert_eq!(cs301.utilization_pct, 100.0);

        let ec305 = report
            .subjects
            .iter()
            .find(|s| s.subject_code == "EC305")
            .unwrap();
        assert_eq!(ec305.allotted, 1);
        assert_eq!(ec305.utilization_pct, 100.0);

        // 6. 三类操作都进了操作日志 (两次导入 + 一次分配运行)
        let run_logs = repos.action_log_repo.find_recent_by_pool(1, 10).unwrap();
        assert_eq!(run_logs.len(), 1);
        assert_eq!(run_logs[0].action_type, "AllocationRun");
    }
}

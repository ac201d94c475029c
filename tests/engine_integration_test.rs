// ==========================================
// 分配引擎集成测试
// ==========================================
// 职责: 验证协调器端到端行为与引擎核心不变量
// ==========================================


#[cfg(test)]
mod engine_integration_test {
    use subject_allotment::domain::action_log::RunSummary;
    use subject_allotment::domain::types::AllotmentOutcome;
    use subject_allotment::engine::RunCoordinator;

    use crate::test_helpers::{
        make_academic, make_draft_registration, make_frozen_registration, make_pool,
        seed_pool_scenario, setup_repositories,
    };

    // ==========================================
    // 测试1: 典型示例场景端到端
    // ==========================================

    #[test]
    fn test_example_scenario_end_to_end() {
        let (_temp_file, repos) = setup_repositories();

        // 池 P: {A:1, B:1}
        let pool = make_pool(1, &[("A", 1), ("B", 1)]);
        let registrations = vec![
            make_frozen_registration("S1", 1, &["A", "B"]),
            make_frozen_registration("S2", 1, &["A", "B"]),
            make_frozen_registration("S3", 1, &["B"]),
        ];
        let records = vec![
            make_academic("S1", Some(9.0), Some(0)),
            make_academic("S2", Some(8.5), Some(0)),
            make_academic("S3", Some(9.5), Some(1)),
        ];
        seed_pool_scenario(&repos, &pool, &registrations, &records);

        let coordinator = RunCoordinator::new(repos.clone(), None, "test".to_string());
        let result = coordinator.run_allocation(1).unwrap();

        // 位次 S3, S1, S2
        let order: Vec<&str> = result.outcomes.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(order, vec!["S3", "S1", "S2"]);

        // S3→B, S1→A, S2 未分配
        assert_eq!(
            result.outcomes[0].1,
            AllotmentOutcome::Allotted("B".to_string())
        );
        assert_eq!(
            result.outcomes[1].1,
            AllotmentOutcome::Allotted("A".to_string())
        );
        assert_eq!(result.outcomes[2].1, AllotmentOutcome::Unallotted);

        // 落库结果一致
        let stored = repos.allotment_repo.find_by_pool(1).unwrap();
        assert_eq!(stored.len(), 3);
        let find = |regno: &str| {
            stored
                .iter()
                .find(|a| a.regno == regno)
                .unwrap()
                .subject_code
                .clone()
        };
        assert_eq!(find("S3"), Some("B".to_string()));
        assert_eq!(find("S1"), Some("A".to_string()));
        assert_eq!(find("S2"), None);

        // 运行摘要
        assert_eq!(result.summary.total_considered, 3);
        assert_eq!(result.summary.total_allotted, 2);
        assert_eq!(result.summary.total_unallotted, 1);
        assert_eq!(result.summary.total_skipped, 0);
    }

    // ==========================================
    // 测试2: 容量不变量
    // ==========================================

    #[test]
    fn test_capacity_invariant_never_exceeded() {
        let (_temp_file, repos) = setup_repositories();

        // 名额远小于报名数,且所有人志愿相同
        let pool = make_pool(1, &[("CS301", 3), ("EC305", 2)]);
        let mut registrations = Vec::new();
        let mut records = Vec::new();
        for i in 0..20 {
            let regno = format!("R{:03}", i);
            registrations.push(make_frozen_registration(&regno, 1, &["CS301", "EC305"]));
            records.push(make_academic(&regno, Some(5.0 + (i as f64) * 0.2), Some(0)));
        }
        seed_pool_scenario(&repos, &pool, &registrations, &records);

        let coordinator = RunCoordinator::new(repos.clone(), None, "test".to_string());
        coordinator.run_allocation(1).unwrap();

        let counts = repos.allotment_repo.count_by_subject(1).unwrap();
        assert!(counts.get("CS301").copied().unwrap_or(0) <= 3);
        assert!(counts.get("EC305").copied().unwrap_or(0) <= 2);
        assert_eq!(counts.values().sum::<u32>(), 5);
        assert_eq!(repos.allotment_repo.count_unallotted(1).unwrap(), 15);
    }

    // ==========================================
    // 测试3: 确定性与幂等替换
    // ==========================================

    #[test]
    fn test_repeated_runs_are_deterministic_and_idempotent() {
        let (_temp_file, repos) = setup_repositories();

        let pool = make_pool(1, &[("CS301", 2), ("EC305", 2), ("ME210", 1)]);
        let registrations = vec![
            make_frozen_registration("R1", 1, &["CS301", "EC305"]),
            make_frozen_registration("R2", 1, &["CS301", "ME210"]),
            make_frozen_registration("R3", 1, &["EC305"]),
            make_frozen_registration("R4", 1, &["ME210", "CS301", "EC305"]),
            make_frozen_registration("R5", 1, &["CS301"]),
        ];
        let records = vec![
            make_academic("R1", Some(8.2), Some(1)),
            make_academic("R2", Some(8.2), Some(1)),
            make_academic("R3", None, None),
            make_academic("R4", Some(9.9), Some(0)),
            // R5 无学业记录
        ];
        seed_pool_scenario(&repos, &pool, &registrations, &records);

        let coordinator = RunCoordinator::new(repos.clone(), None, "test".to_string());

        let first = coordinator.run_allocation(1).unwrap();
        let stored_first = repos.allotment_repo.find_by_pool(1).unwrap();

        let second = coordinator.run_allocation(1).unwrap();
        let stored_second = repos.allotment_repo.find_by_pool(1).unwrap();

        // 输入不变 ⇒ 结局与落库结果完全一致
        assert_eq!(first.outcomes, second.outcomes);
        assert_eq!(stored_first, stored_second);
        // 重跑不产生重复行
        assert_eq!(stored_second.len(), registrations.len());
    }

    // ==========================================
    // 测试4: 择优单调性
    // ==========================================

    #[test]
    fn test_merit_monotonicity_with_identical_preferences() {
        let (_temp_file, repos) = setup_repositories();

        // 所有人志愿完全相同 ⇒ 分配成功者必是位次前缀
        let pool = make_pool(1, &[("CS301", 2), ("EC305", 2)]);
        let mut registrations = Vec::new();
        let mut records = Vec::new();
        for i in 0..10 {
            let regno = format!("R{:03}", i);
            registrations.push(make_frozen_registration(&regno, 1, &["CS301", "EC305"]));
            records.push(make_academic(
                &regno,
                Some(4.0 + (i as f64) * 0.5),
                Some((10 - i) as u32),
            ));
        }
        seed_pool_scenario(&repos, &pool, &registrations, &records);

        let coordinator = RunCoordinator::new(repos.clone(), None, "test".to_string());
        let result = coordinator.run_allocation(1).unwrap();

        // outcomes 已按位次排列: 分配成功的必须连续出现在头部
        let statuses: Vec<bool> = result
            .outcomes
            .iter()
            .map(|(_, o)| o.is_allotted())
            .collect();
        let first_unallotted = statuses.iter().position(|s| !s).unwrap_or(statuses.len());
        assert!(
            statuses[first_unallotted..].iter().all(|s| !s),
            "低位次学生不得在高位次学生未分配时获得名额: {:?}",
            statuses
        );
        assert_eq!(first_unallotted, 4); // 总名额 = 4
    }

    // ==========================================
    // 测试5: 未分配完备性
    // ==========================================

    #[test]
    fn test_every_frozen_registration_has_exactly_one_row() {
        let (_temp_file, repos) = setup_repositories();

        let pool = make_pool(1, &[("CS301", 1)]);
        let registrations = vec![
            make_frozen_registration("R1", 1, &["CS301"]),
            make_frozen_registration("R2", 1, &["CS301"]),
            // R3 的志愿全部无效 ⇒ 仍需显式落一条未分配
            make_frozen_registration("R3", 1, &["XX999"]),
            // R4 志愿为空
            make_frozen_registration("R4", 1, &[]),
        ];
        seed_pool_scenario(&repos, &pool, &registrations, &[]);

        let coordinator = RunCoordinator::new(repos.clone(), None, "test".to_string());
        let result = coordinator.run_allocation(1).unwrap();
        assert_eq!(result.summary.total_considered, 4);

        let stored = repos.allotment_repo.find_by_pool(1).unwrap();
        let mut regnos: Vec<&str> = stored.iter().map(|a| a.regno.as_str()).collect();
        regnos.sort();
        assert_eq!(regnos, vec!["R1", "R2", "R3", "R4"]);

        // 恰好一人分配成功 (名额=1)
        assert_eq!(stored.iter().filter(|a| a.is_allotted()).count(), 1);
    }

    // ==========================================
    // 测试6: 草稿报名不参与分配
    // ==========================================

    #[test]
    fn test_draft_registrations_are_excluded() {
        let (_temp_file, repos) = setup_repositories();

        let pool = make_pool(1, &[("CS301", 5)]);
        seed_pool_scenario(
            &repos,
            &pool,
            &[make_frozen_registration("R1", 1, &["CS301"])],
            &[],
        );
        repos
            .registration_repo
            .upsert(&make_draft_registration("R2", 1, &["CS301"]))
            .unwrap();

        let coordinator = RunCoordinator::new(repos.clone(), None, "test".to_string());
        let result = coordinator.run_allocation(1).unwrap();

        assert_eq!(result.summary.total_considered, 1);
        let stored = repos.allotment_repo.find_by_pool(1).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].regno, "R1");
    }

    // ==========================================
    // 测试7: 前置条件错误
    // ==========================================

    #[test]
    fn test_pool_not_found() {
        let (_temp_file, repos) = setup_repositories();

        let coordinator = RunCoordinator::new(repos, None, "test".to_string());
        let err = coordinator.run_allocation(42).unwrap_err();
        assert_eq!(err.kind(), "POOL_NOT_FOUND");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_pool_inactive() {
        let (_temp_file, repos) = setup_repositories();

        let pool = make_pool(1, &[("CS301", 5)]);
        repos.pool_repo.insert(&pool).unwrap();
        repos.pool_repo.set_active(1, false).unwrap();

        let coordinator = RunCoordinator::new(repos.clone(), None, "test".to_string());
        let err = coordinator.run_allocation(1).unwrap_err();
        assert_eq!(err.kind(), "POOL_INACTIVE");

        // 前置条件失败 ⇒ 不产生任何写入
        assert!(repos.allotment_repo.find_by_pool(1).unwrap().is_empty());
    }

    // ==========================================
    // 测试8: 重算取代旧结果
    // ==========================================

    #[test]
    fn test_rerun_replaces_prior_allotments_atomically() {
        let (_temp_file, repos) = setup_repositories();

        let pool = make_pool(1, &[("CS301", 1), ("EC305", 1)]);
        seed_pool_scenario(
            &repos,
            &pool,
            &[make_frozen_registration("R1", 1, &["CS301"])],
            &[make_academic("R1", Some(9.0), Some(0))],
        );

        let coordinator = RunCoordinator::new(repos.clone(), None, "test".to_string());
        coordinator.run_allocation(1).unwrap();
        assert_eq!(repos.allotment_repo.find_by_pool(1).unwrap().len(), 1);

        // 新增一名更高位次的学生后重跑
        repos
            .registration_repo
            .upsert(&make_frozen_registration("R0", 1, &["CS301", "EC305"]))
            .unwrap();
        repos
            .academic_repo
            .upsert(&make_academic("R0", Some(9.8), Some(0)))
            .unwrap();

        coordinator.run_allocation(1).unwrap();

        let stored = repos.allotment_repo.find_by_pool(1).unwrap();
        assert_eq!(stored.len(), 2);
        let find = |regno: &str| {
            stored
                .iter()
                .find(|a| a.regno == regno)
                .unwrap()
                .subject_code
                .clone()
        };
        // R0 位次更高,取走 CS301; R1 落到 EC305
        assert_eq!(find("R0"), Some("CS301".to_string()));
        assert_eq!(find("R1"), Some("EC305".to_string()));
    }

    // ==========================================
    // 测试9: 运行摘要落日志
    // ==========================================

    #[test]
    fn test_run_summary_is_logged() {
        let (_temp_file, repos) = setup_repositories();

        let pool = make_pool(1, &[("CS301", 1)]);
        seed_pool_scenario(
            &repos,
            &pool,
            &[
                make_frozen_registration("R1", 1, &["CS301"]),
                make_frozen_registration("R2", 1, &["CS301"]),
            ],
            &[make_academic("R1", Some(9.0), Some(0))],
        );

        let coordinator = RunCoordinator::new(repos.clone(), None, "test".to_string());
        coordinator.run_allocation(1).unwrap();

        let logs = repos.action_log_repo.find_recent_by_pool(1, 10).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action_type, "AllocationRun");
        assert_eq!(logs[0].actor, "test");

        let summary: RunSummary =
            serde_json::from_value(logs[0].payload_json.clone().unwrap()).unwrap();
        assert_eq!(summary.pool_id, 1);
        assert_eq!(summary.total_considered, 2);
        assert_eq!(summary.total_allotted, 1);
        assert_eq!(summary.total_unallotted, 1);
    }
}

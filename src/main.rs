// ==========================================
// 学生选课分配系统 - CLI 主入口
// ==========================================
// 技术栈: Rust + SQLite
// 约定: 成功退出码 0; 失败时 stderr 输出机器可读错误码 JSON,
//       退出码与错误码一一对应
// ==========================================

use clap::{Parser, Subcommand};
use std::sync::{Arc, Mutex};

use subject_allotment::api::ReportApi;
use subject_allotment::engine::{AllocationError, AllotmentRepositories, RunCoordinator};
use subject_allotment::importer::{AcademicRecordImporter, RegistrationImporter};
use subject_allotment::{config, db, logging};

#[derive(Parser)]
#[command(
    name = "subject-allotment",
    about = "学生选课分配系统 - 择优志愿分配引擎",
    version,
    propagate_version = true,
)]
struct Cli {
    /// 数据库文件路径 (默认: 环境变量或用户数据目录)
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 对指定科目池执行一次分配运行 (幂等,可安全重跑)
    RunAllocation {
        /// 科目池 ID
        #[arg(long)]
        pool: i64,
    },
    /// 从 CSV 导入学业数据 (表头: regno,cgpa,backlogs)
    ImportAcademic {
        /// CSV 文件路径
        #[arg(long)]
        file: String,
    },
    /// 从 CSV 导入报名数据 (表头: regno,pool_id,email,mobile,status,priority_order)
    ImportRegistrations {
        /// CSV 文件路径
        #[arg(long)]
        file: String,
    },
    /// 输出指定科目池的分配报表 (JSON)
    Report {
        /// 科目池 ID
        #[arg(long)]
        pool: i64,
    },
}

fn main() {
    logging::init();

    let cli = Cli::parse();
    std::process::exit(run_cli(cli));
}

fn run_cli(cli: Cli) -> i32 {
    let db_path = cli.db.clone().unwrap_or_else(config::default_db_path);

    let repos = match open_repositories(&db_path) {
        Ok(repos) => repos,
        Err(e) => {
            print_error("DATABASE_OPEN_FAILED", &e.to_string());
            return 1;
        }
    };

    match cli.command {
        Commands::RunAllocation { pool } => run_allocation(&repos, pool),
        Commands::ImportAcademic { file } => import_academic(&repos, &file),
        Commands::ImportRegistrations { file } => import_registrations(&repos, &file),
        Commands::Report { pool } => report(&repos, pool),
    }
}

/// 打开数据库并构造仓储集合
fn open_repositories(db_path: &str) -> anyhow::Result<AllotmentRepositories> {
    tracing::info!(db_path, "使用数据库");
    let conn = db::open_and_init(db_path)?;
    Ok(AllotmentRepositories::from_connection(Arc::new(Mutex::new(
        conn,
    ))))
}

/// run-allocation 子命令
fn run_allocation(repos: &AllotmentRepositories, pool_id: i64) -> i32 {
    let coordinator = RunCoordinator::new(repos.clone(), None, config::default_actor());

    match coordinator.run_allocation(pool_id) {
        Ok(result) => {
            print_json(&result.summary);
            0
        }
        Err(e) => {
            print_allocation_error(&e);
            e.exit_code()
        }
    }
}

/// import-academic 子命令
fn import_academic(repos: &AllotmentRepositories, file: &str) -> i32 {
    let importer = AcademicRecordImporter::new(
        repos.academic_repo.clone(),
        repos.action_log_repo.clone(),
        config::default_actor(),
    );

    match importer.import_csv(file) {
        Ok(report) => {
            print_json(&report);
            0
        }
        Err(e) => {
            print_error("IMPORT_FAILED", &e.to_string());
            1
        }
    }
}

/// import-registrations 子命令
fn import_registrations(repos: &AllotmentRepositories, file: &str) -> i32 {
    let importer = RegistrationImporter::new(
        repos.registration_repo.clone(),
        repos.action_log_repo.clone(),
        config::default_actor(),
    );

    match importer.import_csv(file) {
        Ok(report) => {
            print_json(&report);
            0
        }
        Err(e) => {
            print_error("IMPORT_FAILED", &e.to_string());
            1
        }
    }
}

/// report 子命令
fn report(repos: &AllotmentRepositories, pool_id: i64) -> i32 {
    let api = ReportApi::new(
        repos.pool_repo.clone(),
        repos.registration_repo.clone(),
        repos.allotment_repo.clone(),
    );

    match api.pool_report(pool_id) {
        Ok(report) => {
            print_json(&report);
            0
        }
        Err(e) => {
            print_error("REPORT_FAILED", &e.to_string());
            1
        }
    }
}

/// 向 stdout 输出 JSON 结果
fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!(error = %e, "结果序列化失败"),
    }
}

/// 向 stderr 输出机器可读的错误
fn print_error(kind: &str, message: &str) {
    eprintln!(
        "{}",
        serde_json::json!({ "error_kind": kind, "message": message })
    );
}

fn print_allocation_error(e: &AllocationError) {
    print_error(e.kind(), &e.to_string());
}

use std::sync::Arc;

use dotenvy::dotenv;
use migration::MigratorTrait;
use service::session::{ExpirySweeper, SeaOrmSessionStore, SessionStore, SweepConfig};
use tracing::{error, info};
use uuid::Uuid;

fn init_logging(format: &str) {
    // 复用公共日志初始化工具，统一日志格式与级别处理
    common::utils::logging::init_logging(format);
    info!(service = "session-sweeper", event = "logger_init", "tracing subscriber initialized");
}

async fn run(cfg: configs::AppConfig) -> anyhow::Result<()> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    models::db::ping(&db).await?;
    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None).await?;
        info!(service = "session-sweeper", event = "migrated", "session schema up to date");
    }

    // payload stays opaque here; the sweeper only needs expiration
    let store: Arc<dyn SessionStore<serde_json::Value>> = Arc::new(SeaOrmSessionStore::<serde_json::Value>::new(db));
    let sweeper = ExpirySweeper::start(
        store,
        SweepConfig { interval: cfg.sweeper.interval(), sweep_on_start: true },
    );

    tokio::signal::ctrl_c().await?;
    info!(service = "session-sweeper", event = "shutdown_signal", "received Ctrl+C, shutting down");
    sweeper.shutdown().await;
    Ok(())
}

fn main() -> std::process::ExitCode {
    // 提前加载 .env，使得 RUST_LOG / DATABASE_URL 等环境变量生效
    dotenv().ok();

    let cfg = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(service = "session-sweeper", event = "config_invalid", error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };
    init_logging(&cfg.logging.format);

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "session-sweeper",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "session-sweeper", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "session-sweeper",
        event = "start",
        %service_id,
        pid,
        version,
        interval_secs = cfg.sweeper.interval_secs,
        session_ttl_secs = cfg.session.ttl_secs,
        "session sweeper starting"
    );

    rt.block_on(async move {
        match run(cfg).await {
            Ok(()) => {
                info!(service = "session-sweeper", event = "stop", %service_id, pid, "session sweeper stopped normally");
                std::process::ExitCode::SUCCESS
            }
            Err(e) => {
                error!(service = "session-sweeper", event = "run_failed", error = %e, "session sweeper failed");
                std::process::ExitCode::FAILURE
            }
        }
    })
}

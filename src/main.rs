//! imgprompts 服务入口
//!
//! 默认启动 HTTP 服务，其余子命令用于数据库维护。

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use imgprompts::{build_router, logging, AppState};
use imgprompts_core::models::AppSettings;
use imgprompts_core::services::DEFAULT_CONFIG_PATH;
use imgprompts_core::{Database, SettingsManager, UploadStore};

#[derive(Parser)]
#[command(name = "imgprompts")]
#[command(about = "AI 图像生成提示词管理服务", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// 覆盖监听端口
    #[arg(short, long)]
    port: Option<u16>,

    /// 覆盖数据库文件路径
    #[arg(short, long, value_name = "PATH")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// 启动 HTTP 服务（默认）
    Serve,
    /// 初始化或升级数据库结构，并写入初始标签
    Migrate,
    /// 写入示例提示词（已有数据时跳过）
    Sample,
    /// 打印数据库统计
    Stats,
    /// 检查孤立的标签关联
    Validate,
    /// 物理删除已软删除的提示词
    Purge,
    /// 删除并重建所有数据表
    Reset {
        /// 确认删除全部数据
        #[arg(long)]
        yes: bool,
    },
}

fn load_settings(cli: &Cli) -> anyhow::Result<AppSettings> {
    let manager = SettingsManager::from_path(cli.config.clone());
    let mut settings = manager
        .load()
        .with_context(|| format!("无法加载配置文件 {}", cli.config.display()))?;

    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    if let Some(path) = &cli.database {
        settings.database.path = path.clone();
    }

    Ok(settings)
}

fn open_database(settings: &AppSettings) -> anyhow::Result<Database> {
    tracing::info!("数据库路径: {:?}", settings.database.path);

    let db = Database::open(settings.database.path.clone()).context("无法打开数据库")?;
    db.init().context("无法初始化数据库")?;
    Ok(db)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    let _log_guard = logging::init(&settings.logging);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(settings).await,
        Commands::Migrate => {
            let db = open_database(&settings)?;
            let seeded = db.seed_initial_tags();
            println!("数据库已就绪，schema 版本 {}，新增初始标签 {} 个", db.schema_version()?, seeded);
            Ok(())
        }
        Commands::Sample => {
            let db = open_database(&settings)?;
            let created = db.create_sample_data()?;
            if created == 0 {
                println!("已存在提示词，跳过示例数据");
            } else {
                println!("已创建 {} 条示例提示词", created);
            }
            Ok(())
        }
        Commands::Stats => {
            let db = open_database(&settings)?;
            let stats = db.stats()?;
            println!("提示词总数:   {}", stats.total_prompts);
            println!("  公开:       {}", stats.public_prompts);
            println!("  私有:       {}", stats.private_prompts);
            println!("  最近 7 天:  {}", stats.recent_prompts);
            println!("  已删除:     {}", stats.deleted_prompts);
            println!("标签总数:     {}", stats.total_tags);
            println!("数据库大小:   {} 字节", stats.db_size);
            Ok(())
        }
        Commands::Validate => {
            let db = open_database(&settings)?;
            let report = db.validate_data()?;
            if !report.is_clean() {
                bail!(
                    "发现孤立关联：缺失提示词 {} 条，缺失标签 {} 条",
                    report.orphan_prompt_links,
                    report.orphan_tag_links
                );
            }
            println!("数据完整性检查通过");
            Ok(())
        }
        Commands::Purge => {
            let db = open_database(&settings)?;
            let purged = db.purge_deleted_prompts()?;
            println!("已清理 {} 条软删除的提示词", purged);
            Ok(())
        }
        Commands::Reset { yes } => {
            if !yes {
                bail!("重置会删除全部数据，请使用 --yes 确认");
            }
            let db = open_database(&settings)?;
            db.reset()?;
            tracing::warn!("数据库已重置");
            println!("数据库已重置");
            Ok(())
        }
    }
}

async fn serve(settings: AppSettings) -> anyhow::Result<()> {
    tracing::info!("imgprompts 启动中...");

    let db = open_database(&settings)?;
    let seeded = db.seed_initial_tags();
    tracing::info!("数据库初始化完成，新增初始标签 {} 个", seeded);

    let uploads = UploadStore::new(&settings.server.upload_path, settings.server.max_file_size);
    uploads.ensure_dir().context("无法创建上传目录")?;
    tracing::info!("上传目录: {:?}", uploads.root());

    let state = AppState::new(db, uploads)
        .with_public_base_url(settings.server.public_base_url.clone());
    let app = build_router(state);

    let addr = settings.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("无法监听 {}", addr))?;
    tracing::info!("服务已启动: http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("服务异常退出")?;

    tracing::info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("无法监听 Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("无法监听 SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("收到退出信号，正在关闭服务");
}

use std::io::{self, BufRead, Write};

use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use novel_notify::{Config, Delivery, NotificationEvent, NotificationService};

/// 从标准输入逐行读取 JSON 事件，经通知管道处理后逐行输出结果
fn main() -> anyhow::Result<()> {
    // 加载配置
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    // 初始化日志，输出到 stderr 以免混入结果
    init_tracing(&config);

    info!(
        "Starting notification replay in {} mode",
        config.environment
    );

    let service = NotificationService::new(&config)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut processed = 0usize;
    let mut failed = 0usize;

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let output = match process_line(&service, &line) {
            Ok(delivery) => {
                processed += 1;
                serde_json::to_value(&delivery)?
            }
            Err(e) => {
                failed += 1;
                warn!("Skipping event: {}", e);
                json!({
                    "error": {
                        "code": e.error_code(),
                        "message": e.to_string()
                    }
                })
            }
        };

        writeln!(out, "{}", output)?;
    }

    out.flush()?;
    info!(processed, failed, "Notification replay finished");

    Ok(())
}

fn process_line(service: &NotificationService, line: &str) -> novel_notify::Result<Delivery> {
    let event: NotificationEvent = serde_json::from_str(line)?;
    service.ingest(event)
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::new(&config.log_level);

    if config.json_logs() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

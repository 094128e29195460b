//! zends-copilot CLI 진입점

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    // 로깅 초기화
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // CLI 실행
    let cli = zends_copilot::cli::Cli::parse();

    // 요청은 하나씩 순서대로 처리하므로 단일 스레드 런타임
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(zends_copilot::cli::run(cli))
}

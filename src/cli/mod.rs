//! CLI 모듈
//!
//! zends-copilot CLI 명령어 정의 및 구현

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::config::{default_config_path, ClassifierBackend, CopilotConfig};
use crate::copilot::{AnalysisReport, CopilotError, SupportCopilot};
use crate::inference::{has_api_token, Priority};
use crate::knowledge::{KnowledgeStore, PolicyRetriever};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "zends-copilot")]
#[command(version, about = "ZENDS AI 고객지원 코파일럿", long_about = None)]
pub struct Cli {
    /// 설정 파일 경로 (기본: <로컬 데이터 디렉토리>/.zends-copilot/config.toml, `status`로 확인)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 고객 쿼리 분석 (의도, 감정, 우선순위, 정책, 응답)
    Analyze {
        /// 고객 쿼리
        query: String,

        /// JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 표준 입력에서 한 줄씩 쿼리를 읽어 분석
    Interactive,

    /// 정책 검색만 수행 (점수 포함)
    Query {
        /// 검색 쿼리
        query: String,

        /// 결과 개수 제한
        #[arg(short, long, default_value = "3")]
        limit: usize,
    },

    /// 로드된 정책 목록
    Policies {
        /// 결과 개수 제한
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// 상태 확인
    Status,
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub async fn run(cli: Cli) -> Result<()> {
    let config = CopilotConfig::load(cli.config.as_deref()).context("설정 로드 실패")?;

    match cli.command {
        Commands::Analyze { query, json } => cmd_analyze(&config, &query, json).await,
        Commands::Interactive => cmd_interactive(&config).await,
        Commands::Query { query, limit } => cmd_query(&config, &query, limit),
        Commands::Policies { limit } => cmd_policies(&config, limit),
        Commands::Status => cmd_status(&config),
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

/// 분석 명령어 (analyze)
async fn cmd_analyze(config: &CopilotConfig, query: &str, json: bool) -> Result<()> {
    if query.trim().is_empty() {
        bail!("Please enter a customer query.");
    }

    let copilot = SupportCopilot::from_config(config).context("코파일럿 초기화 실패")?;
    let report = copilot.analyze(query).await.context("분석 실패")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

/// 대화형 명령어 (interactive)
///
/// 컨텍스트는 한 번만 만들고 입력마다 재사용합니다.
async fn cmd_interactive(config: &CopilotConfig) -> Result<()> {
    let copilot = SupportCopilot::from_config(config).context("코파일럿 초기화 실패")?;

    println!("ZENDS AI Customer Support Copilot");
    println!("Type a customer query and press Enter ('exit' to quit).");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let query = line.trim();
        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            break;
        }

        match copilot.analyze(query).await {
            Ok(report) => print_report(&report),
            Err(CopilotError::EmptyQuery) => println!("[!] Please enter a customer query."),
            Err(e) => println!("[!] 분석 실패: {}", e),
        }
    }

    Ok(())
}

/// 검색 명령어 (query)
fn cmd_query(config: &CopilotConfig, query: &str, limit: usize) -> Result<()> {
    let store = KnowledgeStore::load(&config.knowledge_base).context("지식베이스 로드 실패")?;
    let retriever = PolicyRetriever::new(store)?;

    println!("[*] 검색 중: \"{}\"", query);

    let results = retriever.rank(query, limit);
    if results.is_empty() {
        println!("\n[!] 검색 결과가 없습니다.");
        return Ok(());
    }

    println!("\n[OK] 검색 결과 ({} 건):\n", results.len());

    for (i, result) in results.iter().enumerate() {
        println!(
            "{}. [점수: {:.4}] Policy #{}",
            i + 1,
            result.score,
            result.document.index
        );
        println!("   내용: {}", truncate_text(&result.document.text, 200));
        println!();
    }

    Ok(())
}

/// 정책 목록 명령어 (policies)
fn cmd_policies(config: &CopilotConfig, limit: usize) -> Result<()> {
    let store = KnowledgeStore::load(&config.knowledge_base).context("지식베이스 로드 실패")?;

    println!("[OK] 로드된 정책 ({} 건):\n", store.len());

    for doc in store.documents().iter().take(limit) {
        println!("  #{:<4} {}", doc.index, truncate_text(&doc.text, 80));
        println!("        {} chars", doc.text.chars().count());
    }

    if store.len() > limit {
        println!("\n  ... 외 {} 건", store.len() - limit);
    }

    Ok(())
}

/// 상태 명령어 (status)
fn cmd_status(config: &CopilotConfig) -> Result<()> {
    println!("zends-copilot v{}", env!("CARGO_PKG_VERSION"));
    println!();

    match &config.source {
        Some(path) => println!("[*] 설정 파일: {}", path.display()),
        None => println!(
            "[*] 설정 파일: 없음 (기본값 사용, 기본 위치: {})",
            default_config_path().display()
        ),
    }

    println!("[*] 지식베이스: {}", config.knowledge_base.display());

    match KnowledgeStore::load(&config.knowledge_base) {
        Ok(store) => {
            let stats = store.stats();
            println!("[OK] 정책 블록: {} 건", stats.document_count);
            println!("     총 콘텐츠: {}", format_bytes(stats.total_content_bytes));

            if let Ok(retriever) = PolicyRetriever::new(store) {
                println!("[OK] TF-IDF 어휘: {} 용어", retriever.space().column_count());
            }
        }
        Err(e) => {
            println!("[!] 지식베이스 로드 실패: {}", e);
        }
    }

    match config.classifier.backend {
        ClassifierBackend::Keyword => {
            println!("[OK] 분류기: keyword (오프라인)");
        }
        ClassifierBackend::Huggingface => {
            println!("[*] 분류기: huggingface");
            println!("     의도 모델: {}", config.classifier.intent_model);
            println!(
                "     감정 모델: {} ({:?})",
                config.classifier.sentiment_model, config.classifier.sentiment_scheme
            );
            if has_api_token() {
                println!("[OK] API 토큰: 설정됨");
            } else {
                println!("[!] API 토큰: 미설정");
                println!("    설정: export HF_API_TOKEN=your-token");
            }
        }
    }

    Ok(())
}

// ============================================================================
// Rendering
// ============================================================================

/// 분석 결과 출력 (의도 / 감정 / 우선순위 + 정책 + 응답)
fn print_report(report: &AnalysisReport) {
    let rule = "-".repeat(60);

    println!("{}", rule);
    println!("AI Analysis");
    println!("{}", rule);
    println!(
        "[Intent]     {} (confidence: {:.2})",
        report.intent.label, report.intent.score
    );
    println!(
        "[Sentiment]  {} (confidence: {:.2})",
        report.sentiment.display_text(),
        report.sentiment_raw.score
    );

    let marker = match report.priority {
        Priority::High => "[!!]",
        Priority::Normal => "[OK]",
    };
    println!("[Priority]   {} {}", marker, report.priority.display_text());

    println!("{}", rule);
    println!(
        "Retrieved Policy (RAG) #{} [score: {:.4}]",
        report.policy.document.index, report.policy.score
    );
    println!("{}", indent(&report.policy.document.text));
    println!();
    println!("AI Suggested Response");
    println!("{}", indent(report.response.trim_end()));
    println!("{}", rule);
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 각 줄 앞에 들여쓰기
fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 텍스트 자르기 (UTF-8 안전)
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

/// 바이트 크기 포맷팅
fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

// ============================================================================
// Tests
// ============================================================================

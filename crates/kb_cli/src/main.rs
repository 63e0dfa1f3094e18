use clap::Parser;
use kb_core::{Result, Summarizer};
use kb_inference::{Config, SummarizerKind};
use kb_search::Corpus;
use kb_storage::InMemorySearchStore;
use kb_web::{AppState, SearchService};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod logging;

#[derive(Debug, Clone, Copy, PartialEq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total = Duration::ZERO;
        let mut current_number = String::new();
        let mut chars = s.trim().chars().peekable();
        let mut has_number = false;

        while let Some(c) = chars.next() {
            if c.is_ascii_digit() {
                current_number.push(c);
                continue;
            }
            if c.is_whitespace() {
                continue;
            }
            let num: u64 = current_number
                .parse()
                .map_err(|_| format!("Expected a number before '{}'", c))?;
            let unit = match c {
                'm' if chars.peek() == Some(&'s') => {
                    chars.next();
                    Some(Duration::from_millis(num))
                }
                's' => Some(Duration::from_secs(num)),
                'm' => num.checked_mul(60).map(Duration::from_secs),
                'h' => num.checked_mul(3600).map(Duration::from_secs),
                'd' => num.checked_mul(86400).map(Duration::from_secs),
                _ => return Err(format!("Invalid duration unit: {}", c)),
            };
            total = unit
                .and_then(|unit| total.checked_add(unit))
                .ok_or_else(|| format!("Duration too large: {}", s))?;
            current_number.clear();
            has_number = true;
        }

        // A trailing bare number is seconds
        if !current_number.is_empty() {
            let num: u64 = current_number
                .parse()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total = total
                .checked_add(Duration::from_secs(num))
                .ok_or_else(|| format!("Duration too large: {}", s))?;
            has_number = true;
        }

        if !has_number {
            return Err("Duration must include a number".to_string());
        }
        Ok(HumanDuration(total))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Answer support questions from a knowledge base", long_about = None)]
pub struct Cli {
    #[arg(long, env = "KB_SUMMARIZER", default_value = "local", help = "Summarizer backend. Available: local (default), openai")]
    summarizer: String,
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "OPENAI_MODEL", help = "Remote model name, defaults to gpt-4o-mini")]
    model: Option<String>,
    #[arg(long, help = "Base URL of an OpenAI compatible API")]
    base_url: Option<String>,
    /// JSON file with [{"id", "title", "content"}, ...]; the built-in articles are used otherwise
    #[arg(long)]
    corpus: Option<PathBuf>,
    /// Articles passed to the summarizer per query
    #[arg(long, default_value_t = kb_web::service::DEFAULT_TOP_N)]
    top_n: usize,
    /// Summarization deadline (e.g. 3s, 500ms, 1m)
    #[arg(long, default_value = "3s")]
    timeout: HumanDuration,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Answer a single query and exit
    Ask {
        query: String,
    },
    /// List the articles in the corpus
    Articles,
}

fn load_corpus(path: Option<&PathBuf>) -> Result<Corpus> {
    match path {
        Some(path) => Corpus::from_json_file(path),
        None => Ok(Corpus::sample()),
    }
}

fn build_service(cli: &Cli, corpus: Arc<Corpus>) -> Result<SearchService> {
    let config = Config {
        kind: cli.summarizer.parse::<SummarizerKind>()?,
        api_key: cli.api_key.clone(),
        model_name: cli.model.clone(),
        base_url: cli.base_url.clone(),
        ..Config::default()
    };
    let summarizer = kb_inference::create_summarizer(&config)?;
    info!("🧠 Summarizer initialized successfully (using {})", summarizer.name());

    info!("💾 Search history kept in memory");

    Ok(SearchService::new(corpus, summarizer, Arc::new(InMemorySearchStore::new()))
        .with_top_n(cli.top_n)
        .with_timeout(cli.timeout.0))
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();
    let cli = Cli::parse();

    let corpus = Arc::new(load_corpus(cli.corpus.as_ref())?);
    info!("📚 Loaded {} articles", corpus.len());

    match &cli.command {
        Commands::Articles => {
            for article in corpus.all() {
                println!("{}  {}", article.id, article.title);
            }
        }
        Commands::Ask { query } => {
            let service = build_service(&cli, corpus)?;
            let summary = service.search(query).await?;
            println!("{}", summary.answer);
            if !summary.relevant_ids.is_empty() {
                println!();
                println!("Relevant articles: {}", summary.relevant_ids.join(", "));
            }
        }
        Commands::Serve { host, port } => {
            let service = build_service(&cli, corpus)?;
            kb_web::serve(SocketAddr::new(*host, *port), AppState::new(service)).await?;
        }
    }

    Ok(())
}

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use search_cli::{build_server, load_corpus, paginate, LogDuration, RequestQueue};
use search_core::{remove_duplicates, DocId, DocumentStatus, ExecutionPolicy, SearchConfig, SearchServer};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "search-cli")]
#[command(about = "Index a corpus in memory and run TF-IDF queries against it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// Input path (JSON/JSONL file or directory)
    #[arg(long)]
    input: PathBuf,
    /// Space separated stop words
    #[arg(long, default_value = "")]
    stop_words: String,
    /// Maximum number of results per query
    #[arg(long, default_value_t = search_core::config::MAX_RESULT_DOCUMENT_COUNT)]
    max_results: usize,
    /// Lock shards used by parallel ranking
    #[arg(long, default_value_t = search_core::config::DEFAULT_ACCUMULATOR_SHARDS)]
    shards: usize,
    /// Use the rayon thread pool for ranking, matching and removal
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

impl CorpusArgs {
    fn policy(&self) -> ExecutionPolicy {
        if self.parallel {
            ExecutionPolicy::Parallel
        } else {
            ExecutionPolicy::Sequential
        }
    }

    fn load(&self) -> Result<SearchServer> {
        let _timer = LogDuration::new("load corpus");
        let docs = load_corpus(&self.input)?;
        let config = SearchConfig {
            max_result_document_count: self.max_results,
            accumulator_shards: self.shards,
            ..SearchConfig::default()
        };
        build_server(&docs, &self.stop_words, config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run queries and print paged results
    Search {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Query text; repeat for several queries
        #[arg(long = "query", required = true)]
        queries: Vec<String>,
        /// Only return documents with this status
        #[arg(long, default_value = "actual")]
        status: DocumentStatus,
        /// Results per printed page
        #[arg(long, default_value_t = 2)]
        page_size: usize,
        /// Remove duplicate documents before searching
        #[arg(long, default_value_t = false)]
        dedup: bool,
        /// Print results as JSON lines
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show which query words occur in a document
    Match {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[arg(long)]
        query: String,
        #[arg(long)]
        id: DocId,
    },
    /// Remove documents with identical word sets and report them
    Dedup {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { corpus, queries, status, page_size, dedup, json } => {
            search(&corpus, &queries, status, page_size, dedup, json)
        }
        Commands::Match { corpus, query, id } => match_document(&corpus, &query, id),
        Commands::Dedup { corpus } => {
            let mut server = corpus.load()?;
            let _timer = LogDuration::new("remove duplicates");
            for id in remove_duplicates(&mut server) {
                println!("Found duplicate document id {id}");
            }
            println!("{} documents left", server.document_count());
            Ok(())
        }
    }
}

fn search(
    corpus: &CorpusArgs,
    queries: &[String],
    status: DocumentStatus,
    page_size: usize,
    dedup: bool,
    json: bool,
) -> Result<()> {
    let mut server = corpus.load()?;
    if dedup {
        let removed = remove_duplicates(&mut server);
        tracing::info!(removed = removed.len(), "duplicates removed");
    }

    let mut queue = RequestQueue::new(&server);
    for query in queries {
        let _timer = LogDuration::new(format!("query {query:?}"));
        let found = queue
            .add_find_request_with(corpus.policy(), query, |_, document_status, _| document_status == status)
            .with_context(|| format!("query {query:?} rejected"))?;
        if json {
            for doc in &found {
                println!("{}", serde_json::to_string(doc)?);
            }
            continue;
        }
        println!("Results for {query:?}:");
        for page in paginate(&found, page_size)? {
            println!("{page}");
            println!("Page break");
        }
    }
    println!("Requests without results: {}", queue.no_result_requests());
    Ok(())
}

fn match_document(corpus: &CorpusArgs, query: &str, id: DocId) -> Result<()> {
    let server = corpus.load()?;
    let _timer = LogDuration::new("match document");
    let (words, status) = server
        .match_document_with(corpus.policy(), query, id)
        .with_context(|| format!("matching document {id}"))?;
    println!("{{ document_id = {id}, status = {status:?}, words = {} }}", words.join(" "));
    Ok(())
}

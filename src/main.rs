use anyhow::Result;
use clap::Parser;
use estate_analyst::analyst::Analyst;
use estate_analyst::llm::LlmClient;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "estate-analyst")]
#[command(about = "Natural-language analytics over real-estate transaction records")]
struct Args {
    /// The question in natural language
    query: String,

    /// Path to the transaction CSV export
    #[arg(short, long, default_value = "Sample_data.csv")]
    data_file: PathBuf,

    /// Groq API key (or set GROQ_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    info!("Query: {}", args.query);

    let api_key = args
        .api_key
        .or_else(|| std::env::var("GROQ_API_KEY").ok())
        .unwrap_or_default();
    let llm = LlmClient::new(api_key);

    let analyst = Analyst::new(llm, args.data_file);
    let response = analyst.analyze(&args.query).await;

    println!("\n=== Summary ===");
    println!("{}", response.summary);
    println!("\n=== Full Response ===");
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}

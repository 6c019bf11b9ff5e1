use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use llm_assist::{
    ChatClient, Config, ConfigBuilder, EmailReply, Error, FinancialExtractor, LlmPreset,
    NewsBrief, OutputFormat, Provider, Report, StudyAssistant, SummaryStyle, TaskKind, Tone,
    Writer, load_document, output_path, prompt_line, read_all, render, split_items, tone_menu,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "llm-assist",
    version,
    author,
    about = "Small LLM assistants for documents, articles and emails",
    long_about = "Small LLM assistants for documents, articles and emails.\n\n\
    Answers questions about a document from its best-matching chunk, writes news briefs \
    and keeps the summary that best covers the article, drafts email replies, and \
    extracts financial measures from news text. API keys are read from GROQ_API_KEY / \
    OPENAI_API_KEY (a .env file is loaded when present).\n\n\
    USAGE EXAMPLES:\n  \
      # Ask a question about document.txt\n  \
      llm-assist ask --question \"what is mitosis?\"\n\n  \
      # Summarize an article three ways and save a Markdown brief\n  \
      llm-assist brief --article article.txt --format markdown --output brief.md\n\n  \
      # Draft a friendly reply\n  \
      llm-assist reply --email \"Can you send pricing?\" \\\n    \
        --points \"thank them, attach list\" --tone 2\n\n  \
      # Extract financial data from stdin\n  \
      cat news.txt | llm-assist extract --format json"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// API key used for every request (overrides GROQ_API_KEY / OPENAI_API_KEY)
    #[arg(long, value_name = "KEY", global = true)]
    api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, value_name = "URL", env = "LLM_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Send every task to this provider instead of the task default
    #[arg(long, value_enum, global = true)]
    provider: Option<CliProvider>,

    /// Model id overriding the task preset
    #[arg(long, value_name = "ID", global = true)]
    model: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer a question from the best-matching chunk of a document
    Ask(AskArgs),
    /// Summarize an article in several styles and pick the best summary
    Brief(BriefArgs),
    /// Draft a reply to an email
    Reply(ReplyArgs),
    /// Extract financial measures from a news article
    Extract(ExtractArgs),
}

#[derive(Args, Debug)]
struct AskArgs {
    /// Document to answer from
    #[arg(short, long, default_value = "document.txt", value_name = "PATH")]
    document: PathBuf,

    /// Question to ask (prompted for when omitted)
    #[arg(short, long)]
    question: Option<String>,

    /// Words per chunk
    #[arg(long, value_name = "WORDS")]
    chunk_size: Option<usize>,

    /// Words shared by consecutive chunks
    #[arg(long, value_name = "WORDS")]
    overlap: Option<usize>,

    /// Print the selected chunk before the answer
    #[arg(long)]
    show_context: bool,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: CliFormat,

    /// Write the result to a file instead of stdout (extension follows --format when omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BriefArgs {
    /// Article to summarize
    #[arg(short, long, default_value = "article.txt", value_name = "PATH")]
    article: PathBuf,

    /// Bullet points / sentences per summary
    #[arg(short, long, value_name = "N")]
    count: Option<usize>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct ReplyArgs {
    /// Incoming email text (prompted for when omitted)
    #[arg(short, long)]
    email: Option<String>,

    /// Comma-separated key points (prompted for when omitted)
    #[arg(short, long)]
    points: Option<String>,

    /// Tone choice: 1 formal, 2 friendly, 3 concise, 4 detailed
    #[arg(short, long, value_name = "1-4")]
    tone: Option<String>,

    /// Print the generated prompt before the reply
    #[arg(long)]
    show_prompt: bool,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Article to read (stdin when omitted)
    #[arg(short, long, value_name = "PATH")]
    article: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliFormat {
    Text,
    Markdown,
    Json,
}

impl From<CliFormat> for OutputFormat {
    fn from(f: CliFormat) -> Self {
        match f {
            CliFormat::Text => Self::Text,
            CliFormat::Markdown => Self::Markdown,
            CliFormat::Json => Self::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliProvider {
    Groq,
    Openai,
}

impl From<CliProvider> for Provider {
    fn from(p: CliProvider) -> Self {
        match p {
            CliProvider::Groq => Self::Groq,
            CliProvider::Openai => Self::OpenAi,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    let mut builder = ConfigBuilder::from_env();

    if let Some(key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(url) = cli.base_url {
        builder = builder.base_url(url);
    }
    if let Some(provider) = cli.provider {
        builder = builder.provider(provider.into());
    }
    if let Some(model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.timeout_secs(secs);
    }

    match cli.command {
        Command::Ask(args) => ask(builder, args),
        Command::Brief(args) => brief(builder, args),
        Command::Reply(args) => reply(builder, args),
        Command::Extract(args) => extract(builder, args),
    }
}

fn ask(mut builder: ConfigBuilder, args: AskArgs) -> anyhow::Result<()> {
    if let Some(size) = args.chunk_size {
        builder = builder.chunk_size(size);
    }
    if let Some(overlap) = args.overlap {
        builder = builder.chunk_overlap(overlap);
    }
    let config = builder.build().context("Failed to build configuration")?;

    info!("Loading document {}", args.document.display());
    let document = load_document(&args.document);
    if document.is_empty() {
        bail!("document is empty: {}", args.document.display());
    }

    let question = match args.question {
        Some(question) => question,
        None => ask_stdin("Enter your question: ")?,
    };

    let client = client_for(&config, TaskKind::StudyAnswer)?;
    let result = StudyAssistant::new(&config, client)
        .context("Failed to create study assistant")?
        .answer(&document, &question)
        .context("Failed to answer question")?;

    let mut stdout = io::stdout().lock();
    if args.show_context {
        writeln!(
            stdout,
            "Context ({}, score {:.4}):\n{}\n",
            result.context.label, result.context.score, result.context.text
        )?;
    }
    writeln!(stdout, "Answer:\n{}", result.answer)?;
    Ok(())
}

fn brief(mut builder: ConfigBuilder, args: BriefArgs) -> anyhow::Result<()> {
    if let Some(count) = args.count {
        builder = builder.summary_count(count);
    }
    let config = builder.build().context("Failed to build configuration")?;

    let article = load_document(&args.article);
    if article.is_empty() {
        bail!("article is empty: {}", args.article.display());
    }

    let task = TaskKind::Summary(SummaryStyle::BulletPoints);
    let config = with_prompted_key(config, task)?;

    let client = client_for(&config, task)?;
    let report = NewsBrief::new(&config, client)
        .context("Failed to create news brief generator")?
        .run(&article)
        .context("Failed to generate news brief")?;

    emit(&report, &args.output)
}

fn reply(builder: ConfigBuilder, args: ReplyArgs) -> anyhow::Result<()> {
    let config = builder.build().context("Failed to build configuration")?;

    let email = match args.email {
        Some(email) => email,
        None => ask_stdin("Paste the incoming email text:\n")?,
    };
    let points = match args.points {
        Some(points) => points,
        None => ask_stdin("Enter the bullet points in comma-separated:\n")?,
    };
    let tone = match args.tone {
        Some(choice) => Tone::from_choice(&choice),
        None => {
            eprint!("{}", tone_menu());
            Tone::from_choice(&ask_stdin("Enter your choice (1-4): ")?)
        }
    };

    let client = client_for(&config, TaskKind::EmailReply)?;
    let drafted = EmailReply::new(&config, client)
        .context("Failed to create email drafter")?
        .draft(&email, &split_items(&points), tone)
        .context("Failed to draft reply")?;

    let mut stdout = io::stdout().lock();
    if args.show_prompt {
        writeln!(stdout, "Generated Prompt:\n{}\n", drafted.prompt)?;
    }
    writeln!(stdout, "Drafted Reply:\n{}", drafted.reply)?;
    Ok(())
}

fn extract(builder: ConfigBuilder, args: ExtractArgs) -> anyhow::Result<()> {
    let config = builder.build().context("Failed to build configuration")?;

    let article = match &args.article {
        Some(path) => load_document(path),
        None => read_all(&mut io::stdin().lock()).context("Failed to read article from stdin")?,
    };
    if article.is_empty() {
        bail!("article is empty");
    }

    let client = client_for(&config, TaskKind::FinancialExtraction)?;
    let report = FinancialExtractor::new(&config, client)
        .context("Failed to create financial extractor")?
        .extract(&article)
        .context("Failed to extract financial data")?;

    emit(&report, &args.output)
}

/// Builds an HTTP client for the provider the task's preset prefers.
fn client_for(config: &Config, task: TaskKind) -> anyhow::Result<ChatClient> {
    let preset = LlmPreset::for_task(task);
    ChatClient::new(config, preset.provider)
        .with_context(|| format!("Failed to create client for {}", preset.id))
}

/// Asks for an API key on stdin when none is configured for the task's provider.
fn with_prompted_key(config: Config, task: TaskKind) -> anyhow::Result<Config> {
    let provider = config
        .provider
        .unwrap_or(LlmPreset::for_task(task).provider);

    match config.endpoint(provider) {
        Err(Error::MissingApiKey { .. }) => {
            let name = match provider {
                Provider::Groq => "Groq",
                Provider::OpenAi => "OpenAI",
            };
            let key = ask_stdin(&format!("Enter your {name} API key: "))?;
            Ok(config.with_api_key(key))
        }
        _ => Ok(config),
    }
}

/// Prints a report to stdout or writes it to the requested file.
fn emit<R: Report>(report: &R, output: &OutputArgs) -> anyhow::Result<()> {
    let content = render(report, output.format.into()).context("Failed to render result")?;

    match &output.output {
        Some(path) => write_output(&output_path(path, output.format.into()), &content),
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", content.trim_end())?;
            Ok(())
        }
    }
}

fn write_output(path: &Path, content: &str) -> anyhow::Result<()> {
    Writer::default()
        .write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    eprintln!("Wrote {}", path.display());
    Ok(())
}

/// Prompts on stderr so stdout carries only results.
fn ask_stdin(message: &str) -> anyhow::Result<String> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let line = prompt_line(&mut reader, &mut io::stderr(), message)?;
    Ok(line)
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("llm_assist=info"),
        1 => EnvFilter::new("llm_assist=debug"),
        _ => EnvFilter::new("llm_assist=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_thread_ids(false),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

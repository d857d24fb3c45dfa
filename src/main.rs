//! CLI entry point for `inboxpilot`.

use std::io::Read;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use inboxpilot::agent::Agent;
use inboxpilot::gateway::{GeminiGateway, LlmGateway, MockGateway, ProviderError};
use inboxpilot::model::email::{Category, Email};
use inboxpilot::store::prompts::PromptKey;

#[derive(Parser)]
#[command(name = "inboxpilot", version)]
#[command(about = "LLM-powered inbox assistant for the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding inbox.json, prompts.json and results.json
    #[arg(short, long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List the inbox
    Inbox {
        /// Only show emails that still need attention (not archived)
        #[arg(long)]
        active: bool,
        /// Only show high-priority emails
        #[arg(long)]
        priority: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show one email in full
    Show {
        id: String,
    },
    /// Run the ingestion pipeline: categorize + extract for every email
    Run {
        #[arg(long)]
        json: bool,
    },
    /// Categorize one email
    Categorize {
        id: String,
    },
    /// Extract action items from one email
    Extract {
        id: String,
    },
    /// Draft a reply to one email (printed for review; --save to keep it)
    Draft {
        id: String,
        /// Save the generated draft without editing
        #[arg(long)]
        save: bool,
    },
    /// Ask a question about one email
    Chat {
        id: String,
        question: String,
    },
    /// Show the prompt templates
    Prompts {
        #[arg(long)]
        json: bool,
    },
    /// Replace one prompt template
    SetPrompt {
        /// categorize, extract, draft-reply or chat
        key: String,
        /// New template text; reads stdin when omitted
        text: Option<String>,
    },
    /// Show saved drafts and analysis history
    Results {
        #[arg(long)]
        json: bool,
    },
    /// Archive one email
    Archive {
        id: String,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = inboxpilot::config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level);

    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| inboxpilot::config::data_dir(&config));

    // Pick the gateway: real provider when the key is configured, the
    // offline mock otherwise.
    let gateway: Box<dyn LlmGateway> = match GeminiGateway::from_config(&config.gateway) {
        Ok(gw) => Box::new(gw),
        Err(ProviderError::MissingCredential(var)) => {
            tracing::warn!(var = %var, "No API key set; using offline mock responses");
            Box::new(MockGateway)
        }
        Err(e) => return Err(e.into()),
    };

    let agent = Agent::new(&data_dir, gateway.as_ref());

    match cli.command {
        Commands::Inbox {
            active,
            priority,
            json,
        } => cmd_inbox(&agent, active, priority, json),
        Commands::Show { id } => cmd_show(&agent, &id),
        Commands::Run { json } => cmd_run(&agent, json),
        Commands::Categorize { id } => cmd_categorize(&agent, &id),
        Commands::Extract { id } => cmd_extract(&agent, &id),
        Commands::Draft { id, save } => cmd_draft(&agent, &id, save),
        Commands::Chat { id, question } => cmd_chat(&agent, &id, &question),
        Commands::Prompts { json } => cmd_prompts(&agent, json),
        Commands::SetPrompt { key, text } => cmd_set_prompt(&agent, &key, text),
        Commands::Results { json } => cmd_results(&agent, json),
        Commands::Archive { id } => cmd_archive(&agent, &id),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = inboxpilot::config::cache_dir();
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "inboxpilot.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "inboxpilot", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// List the inbox as a table or JSON.
fn cmd_inbox(agent: &Agent, active: bool, priority: bool, json: bool) -> anyhow::Result<()> {
    let mut emails = agent.load_inbox()?;
    if active {
        emails.retain(|e| !e.archived);
    }
    if priority {
        emails.retain(is_high_priority);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&emails)?);
        return Ok(());
    }

    println!();
    println!(
        "  {:<7} {:<12} {:<22} {:<40} {:<10} {:>5}",
        "Id", "Date", "From", "Subject", "Category", "Todos"
    );
    println!("  {}", "-".repeat(100));
    for e in &emails {
        let from_trunc: String = e.from.chars().take(21).collect();
        let subj_trunc: String = e.subject.chars().take(39).collect();
        println!(
            "  {:<7} {:<12} {:<22} {:<40} {:<10} {:>5}",
            e.id,
            e.date.format("%Y-%m-%d"),
            from_trunc,
            subj_trunc,
            e.category_label(),
            e.action_items.len()
        );
    }
    println!();
    println!("  {} email(s)", emails.len());
    println!();
    Ok(())
}

/// Priority filter: flagged, categorized Important, or "urgent" in the
/// subject.
fn is_high_priority(e: &Email) -> bool {
    e.priority
        || e.category == Some(Category::Important)
        || e.subject.to_lowercase().contains("urgent")
}

/// Print one email in full.
fn cmd_show(agent: &Agent, id: &str) -> anyhow::Result<()> {
    let e = agent.get_email(id)?;
    println!();
    println!("  {:<12} {}", "Id", e.id);
    println!("  {:<12} {}", "From", e.from);
    println!("  {:<12} {}", "To", e.to);
    println!("  {:<12} {}", "Date", e.date.format("%Y-%m-%d %H:%M"));
    println!("  {:<12} {}", "Subject", e.subject);
    println!("  {:<12} {}", "Category", e.category_label());
    println!("  {:<12} {}", "Archived", e.archived);
    if !e.action_items.is_empty() {
        println!("  Action items:");
        for (i, item) in e.action_items.iter().enumerate() {
            println!("    {}. {}", i + 1, item);
        }
    }
    println!();
    println!("{}", e.body);
    println!();
    Ok(())
}

/// Run the pipeline with a progress bar.
fn cmd_run(agent: &Agent, json: bool) -> anyhow::Result<()> {
    let total = agent.load_inbox()?.len() as u64;

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Processing [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let report = agent.run_pipeline(Some(&|current, total| {
        pb.set_length(total);
        pb.set_position(current);
    }))?;

    pb.finish_and_clear();

    if json {
        let out = serde_json::json!({
            "processed": report.processed,
            "succeeded": report.succeeded,
            "failed": report.failed,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  Pipeline run complete:");
    println!("  {:<15} {}", "Processed", report.processed);
    println!("  {:<15} {}", "Succeeded", report.succeeded);
    println!("  {:<15} {}", "Failed", report.failed);
    println!();
    Ok(())
}

fn cmd_categorize(agent: &Agent, id: &str) -> anyhow::Result<()> {
    let email = agent.categorize_one(id)?;
    println!("  {} → {}", email.id, email.category_label());
    Ok(())
}

fn cmd_extract(agent: &Agent, id: &str) -> anyhow::Result<()> {
    let email = agent.extract_one(id)?;
    print_action_items(&email);
    Ok(())
}

fn print_action_items(email: &Email) {
    if email.action_items.is_empty() {
        println!("  No action items found in {}", email.id);
        return;
    }
    println!("  Action items for {}:", email.id);
    for (i, item) in email.action_items.iter().enumerate() {
        println!("    {}. {}", i + 1, item);
    }
}

/// Generate a draft reply; persist it only with `--save`.
fn cmd_draft(agent: &Agent, id: &str, save: bool) -> anyhow::Result<()> {
    let text = agent.draft_reply(id)?;
    println!();
    println!("{text}");
    println!();
    if save {
        let draft = agent.confirm_draft(id, &text)?;
        println!("  Draft saved: {}", draft.subject);
    } else {
        println!("  (not saved — rerun with --save to keep it)");
    }
    Ok(())
}

fn cmd_chat(agent: &Agent, id: &str, question: &str) -> anyhow::Result<()> {
    let answer = agent.chat(id, question)?;
    println!();
    println!("{answer}");
    println!();
    Ok(())
}

fn cmd_prompts(agent: &Agent, json: bool) -> anyhow::Result<()> {
    let prompts = agent.get_prompts()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prompts)?);
        return Ok(());
    }

    for key in PromptKey::ALL {
        println!();
        println!("  ── {key} ──");
        println!("{}", prompts.get(key));
    }
    println!();
    Ok(())
}

/// Replace one prompt template, reading from stdin when no text was given.
fn cmd_set_prompt(agent: &Agent, key: &str, text: Option<String>) -> anyhow::Result<()> {
    let text = match text {
        Some(t) => t,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    agent.set_prompt(key, text.trim_end())?;
    println!("  Prompt '{key}' updated");
    Ok(())
}

fn cmd_results(agent: &Agent, json: bool) -> anyhow::Result<()> {
    let results = agent.load_results()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!();
    println!("  {:<15} {}", "Saved drafts", results.drafts.len());
    println!("  {:<15} {}", "Analyses", results.analyses.len());

    if !results.drafts.is_empty() {
        println!();
        println!("  Drafts:");
        for d in &results.drafts {
            println!(
                "    {} [{}] {}",
                d.created_at.format("%Y-%m-%d %H:%M"),
                d.email_id,
                d.subject
            );
        }
    }
    println!();
    Ok(())
}

fn cmd_archive(agent: &Agent, id: &str) -> anyhow::Result<()> {
    let email = agent.archive(id)?;
    println!("  Archived {}", email.id);
    Ok(())
}

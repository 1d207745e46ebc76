use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::history::HistoryAction;
use crate::commands::summarize::{SummarizeOptions, TextSource};
use crate::commands::{self, CommandReport};

#[derive(Debug, Parser)]
#[command(
    name = "ai-sum",
    version,
    about = "Summarize text or web articles with hosted language models"
)]
struct Cli {
    /// Print the command report as JSON.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Summarize text from --text, --file, --url or stdin.
    Summarize(SummarizeArgs),
    /// Extract the main text of a web page.
    Extract {
        #[arg(long)]
        url: String,
    },
    /// List the selectable models.
    Models,
    /// Inspect or edit the summary history.
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },
    /// Show resolved paths and configuration.
    Status,
}

#[derive(Debug, Args)]
#[group(multiple = false)]
struct SourceArgs {
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    file: Option<PathBuf>,
    #[arg(long)]
    url: Option<String>,
}

#[derive(Debug, Args)]
struct SummarizeArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Model id or catalog alias; defaults to the configured model.
    #[arg(long)]
    model: Option<String>,
}

#[derive(Debug, Subcommand)]
enum HistoryCommand {
    List,
    Show { id: i64 },
    Delete { id: i64 },
    Clear,
}

impl SourceArgs {
    fn into_source(self) -> TextSource {
        if let Some(text) = self.text {
            TextSource::Inline(text)
        } else if let Some(path) = self.file {
            TextSource::File(path)
        } else if let Some(url) = self.url {
            TextSource::Url(url)
        } else {
            TextSource::Stdin
        }
    }
}

impl From<HistoryCommand> for HistoryAction {
    fn from(cmd: HistoryCommand) -> Self {
        match cmd {
            HistoryCommand::List => HistoryAction::List,
            HistoryCommand::Show { id } => HistoryAction::Show { id },
            HistoryCommand::Delete { id } => HistoryAction::Delete { id },
            HistoryCommand::Clear => HistoryAction::Clear,
        }
    }
}

fn emit(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        if let Some(output) = &report.output {
            println!("{output}");
        }
        for detail in &report.details {
            eprintln!("{}: {detail}", report.command);
        }
        for issue in &report.issues {
            eprintln!("{}: issue: {issue}", report.command);
        }
    }

    if report.ok {
        Ok(())
    } else {
        Err(anyhow!(
            "{} reported {} issue(s)",
            report.command,
            report.issues.len()
        ))
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let report = match cli.command {
        Command::Summarize(args) => commands::summarize::run(&SummarizeOptions {
            source: args.source.into_source(),
            model: args.model,
        })?,
        Command::Extract { url } => commands::extract::run(&url)?,
        Command::Models => commands::models::run()?,
        Command::History { action } => commands::history::run(&action.into())?,
        Command::Status => commands::status::run()?,
    };
    emit(&report, cli.json)
}

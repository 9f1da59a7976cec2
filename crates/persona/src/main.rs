//! Chat with a persona in the terminal.

#[macro_use]
extern crate tracing;

mod cli;

use std::io::Write as _;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use persona::PersonaBuilder;
use persona_model::Message;
use persona_openai_model::OpenAIProvider;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt};

use cli::Cli;

const BAR_CHAR: &str = "▎";

const EXAMPLE_QUESTIONS: [&str; 4] = [
    "What are your key skills and expertise?",
    "Tell me about your recent projects",
    "What sets you apart professionally?",
    "How can I get in touch with you?",
];

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            err.print().ok();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let profile = cli.profile_store().load();
    let model_provider = OpenAIProvider::new(cli.model_config());
    let persona = PersonaBuilder::with_model_provider(model_provider, &cli.name)
        .with_profile(profile)
        .with_notifier(cli.notifier())
        .with_max_iterations(cli.max_iterations())
        .build();

    let progress_style = match ProgressStyle::with_template("{spinner} {wide_msg}")
    {
        Ok(style) => style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        Err(err) => {
            eprintln!("invalid progress template: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "{}👋 Hi, I'm {}. Ask me about my career, skills and projects.",
        BAR_CHAR.bright_cyan(),
        persona.name().bold()
    );
    println!("{}", hints().dimmed());

    // One reader for the whole session, so buffered lines aren't lost.
    let mut stdin = io::BufReader::new(io::stdin());
    let mut history: Vec<Message> = Vec::new();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line(&mut stdin).await else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(progress_style.clone());
        progress_bar.set_message("🤔 Thinking...");
        progress_bar.enable_steady_tick(Duration::from_millis(100));

        let result = persona.chat(message, &history).await;

        // Finish the progress bar before printing anything else.
        progress_bar.finish_and_clear();

        match result {
            Ok(reply) => {
                println!("{}💬 {}", BAR_CHAR.bright_cyan(), reply.bright_white());
                history.push(Message::user(message));
                history.push(Message::assistant(reply));
            }
            Err(err) => {
                error!("turn failed: {err}");
                println!(
                    "{}Something went wrong, please try again.",
                    BAR_CHAR.bright_red()
                );
            }
        }
    }

    ExitCode::SUCCESS
}

fn hints() -> String {
    let mut hints = String::from("Try asking:\n");
    for question in EXAMPLE_QUESTIONS {
        hints.push_str(&format!("  • {question}\n"));
    }
    hints.push_str("Press Ctrl-D to leave.");
    hints
}

async fn read_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
) -> Option<String> {
    let mut line = String::new();

    match reader.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}

//! Shell command - interactive playground
//!
//! Reads one command per line from stdin. Query commands take the same
//! arguments as their one-shot counterparts; `retry`, `debug`,
//! `clear-cache`, `theme`, `lang`, `status`, `help` and `quit` act on the
//! live playground. The engine starts loading as soon as the shell opens,
//! and the header is shown again whenever the theme, language or session
//! changes. A theme saved by another process is picked up between lines.

use crate::cli::commands::{
    dataset, geocode, location, lookup, reverse, status, suggest, theme, GeocodeArgs,
    NumberArgs, PointArgs, PostcodeArgs, PostcodesArgs, ReverseArgs, StatusArgs, SuggestArgs,
    ThemeArgs, TilesArgs,
};
use crate::cli::header;
use crate::cli::output::{colors, print_error, print_notice, print_success};
use crate::cli::OutputFormat;
use crate::core::language::Language;
use crate::core::services::Playground;
use crate::core::session::SessionStatus;
use crate::core::types::LogLevel;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Arguments for the shell command
#[derive(Args, Debug)]
pub struct ShellArgs {
    /// Do not print a prompt (for piped input)
    #[arg(long)]
    pub no_prompt: bool,
}

/// One line of shell input
#[derive(Parser, Debug)]
#[command(name = "shell", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug)]
pub enum ShellCommand {
    /// Forward geocode free text
    #[command(alias = "g")]
    Geocode(GeocodeArgs),
    /// Type-ahead suggestions
    #[command(alias = "s")]
    Suggest(SuggestArgs),
    /// Addresses near a point
    #[command(alias = "r")]
    Reverse(ReverseArgs),
    /// Addresses with a postcode
    Postcode(PostcodeArgs),
    /// Addresses with a building number
    Number(NumberArgs),
    /// Administrative units at a point
    Admin(PointArgs),
    /// Country at a point
    Country(PointArgs),
    /// List postcodes
    Postcodes(PostcodesArgs),
    /// List tiles
    Tiles(TilesArgs),
    /// Drop the engine and initialize it again
    Retry,
    /// Turn engine debug logging on or off
    Debug {
        switch: Switch,
        /// Lowest level logged while on
        #[arg(long, short = 'l')]
        level: Option<LogLevel>,
    },
    /// Forget loaded tiles; they are read again on demand
    #[command(name = "clear-cache")]
    ClearCache,
    /// Show, set or toggle the theme
    Theme(ThemeArgs),
    /// Switch language (toggles when no language is given)
    Lang {
        /// en or ar
        language: Option<Language>,
    },
    /// Show the session status
    Status,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

/// What the loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The command already printed a fresh header
    Rendered,
    Quit,
}

/// Split a line on whitespace, keeping double-quoted runs together
pub fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut pending = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                pending = true;
            }
            c if c.is_whitespace() && !quoted => {
                if pending {
                    words.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if pending {
        words.push(current);
    }
    words
}

/// Parse and run one line
pub async fn run_line(
    line: &str,
    playground: &Playground,
    format: OutputFormat,
) -> Result<Flow, Box<dyn std::error::Error>> {
    let words = split_words(line);
    if words.is_empty() {
        return Ok(Flow::Continue);
    }

    let parsed = match ShellLine::try_parse_from(words) {
        Ok(parsed) => parsed,
        Err(e) => {
            // Covers `help` as well as bad input
            e.print()?;
            return Ok(Flow::Continue);
        }
    };

    dispatch(parsed.command, playground, format).await
}

async fn dispatch(
    command: ShellCommand,
    playground: &Playground,
    format: OutputFormat,
) -> Result<Flow, Box<dyn std::error::Error>> {
    match command {
        ShellCommand::Geocode(args) => geocode::execute(args, playground, format).await?,
        ShellCommand::Suggest(args) => suggest::execute(args, playground, format).await?,
        ShellCommand::Reverse(args) => reverse::execute(args, playground, format).await?,
        ShellCommand::Postcode(args) => lookup::execute_postcode(args, playground, format).await?,
        ShellCommand::Number(args) => lookup::execute_number(args, playground, format).await?,
        ShellCommand::Admin(args) => location::execute_admin(args, playground, format).await?,
        ShellCommand::Country(args) => location::execute_country(args, playground, format).await?,
        ShellCommand::Postcodes(args) => {
            dataset::execute_postcodes(args, playground, format).await?
        }
        ShellCommand::Tiles(args) => dataset::execute_tiles(args, playground, format).await?,
        ShellCommand::Retry => {
            let state = playground.session.retry().await;
            if format == OutputFormat::Human {
                println!("{}", header::render(playground));
                match header::failure_hint(&state) {
                    Some(hint) => print_error(&hint),
                    None => print_success("Engine ready"),
                }
            } else {
                status::execute(StatusArgs { no_acquire: true }, playground, format).await?;
            }
            return Ok(Flow::Rendered);
        }
        ShellCommand::Debug { switch, level } => {
            let engine = playground.session.engine()?;
            let enabled = switch == Switch::On;
            engine.set_debug(enabled, level);
            if format == OutputFormat::Human {
                let level = level.map(|l| format!(" ({l})")).unwrap_or_default();
                println!("Engine debug: {}{level}", if enabled { "on" } else { "off" });
            }
            return Ok(Flow::Continue);
        }
        ShellCommand::ClearCache => {
            let engine = playground.session.engine()?;
            let dropped = engine.loaded_tiles().len();
            engine.clear_cache();
            if format == OutputFormat::Human {
                print_success(&format!("Dropped {dropped} loaded tile(s)"));
            }
            return Ok(Flow::Continue);
        }
        ShellCommand::Theme(args) => {
            theme::execute(args, playground, format).await?;
            return Ok(Flow::Continue);
        }
        ShellCommand::Lang { language } => {
            let store = &playground.language;
            let language = match language {
                Some(language) => {
                    store.set_language(language);
                    language
                }
                None => store.toggle_language(),
            };
            if format == OutputFormat::Human {
                println!("Language: {} ({})", language, language.direction());
            }
            return Ok(Flow::Continue);
        }
        ShellCommand::Status => {
            status::execute(StatusArgs { no_acquire: true }, playground, format).await?;
            return Ok(Flow::Rendered);
        }
        ShellCommand::Quit => return Ok(Flow::Quit),
    }

    // Query commands print the header before their results
    Ok(if format == OutputFormat::Human {
        Flow::Rendered
    } else {
        Flow::Continue
    })
}

/// Print session transitions as notifications on the language's side
fn spawn_notifier(playground: Playground) -> tokio::task::JoinHandle<()> {
    let mut rx = playground.session.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            let anchor = playground.language.notification_anchor();
            match state.status {
                SessionStatus::Ready => {
                    let tiles = state.stats.map(|s| s.total_tiles).unwrap_or(0);
                    print_notice(&format!("engine ready ({tiles} tiles)"), anchor);
                }
                SessionStatus::Error => print_notice("engine failed, type `retry`", anchor),
                SessionStatus::Idle | SessionStatus::Loading => {}
            }
        }
    })
}

/// Execute the shell command
pub async fn execute(
    args: ShellArgs,
    playground: &Playground,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut theme_rx = playground.theme.subscribe();
    let mut language_rx = playground.language.subscribe();
    let mut session_rx = playground.session.subscribe();
    let notifier = spawn_notifier(playground.clone());

    // Acquire on open; queries typed meanwhile join the same attempt
    {
        let session = playground.session.clone();
        tokio::spawn(async move {
            session.acquire().await;
        });
    }

    let human = format == OutputFormat::Human;
    if human {
        println!("{}", header::render(playground));
        println!("{}", colors::dim("Type `help` for commands, `quit` to leave."));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if human && !args.no_prompt {
            print!("{} ", colors::accent(">", playground.theme.theme()));
            std::io::stdout().flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let flow = match run_line(line.trim(), playground, format).await {
            Ok(flow) => flow,
            Err(e) => {
                print_error(&e.to_string());
                Flow::Continue
            }
        };
        if flow == Flow::Quit {
            break;
        }

        playground.theme.refresh();
        let changed = theme_rx.has_changed().unwrap_or(false)
            | language_rx.has_changed().unwrap_or(false)
            | session_rx.has_changed().unwrap_or(false);
        theme_rx.mark_unchanged();
        language_rx.mark_unchanged();
        session_rx.mark_unchanged();

        if changed && human && flow != Flow::Rendered {
            println!("{}", header::render(playground));
        }
    }

    notifier.abort();
    Ok(())
}

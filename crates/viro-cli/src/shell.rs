use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::commands::{CLEAR_CONFIRMATION, is_affirmative};
use crate::render;
use crate::session::CliSession;
use viro_core::ViroError;
use viro_core::config::ViroConfig;
use viro_core::identity::UserIdentity;

const SIGN_IN_HINT: &str = "Inicia sesión con :login para usar tu historial";

const COMMANDS: &[&str] = &[
    ":login", ":logout", ":history", ":show", ":delete", ":clear", ":help", ":quit",
];

/// A parsed shell line.
#[derive(Debug, PartialEq, Eq)]
pub enum ShellCommand {
    Login(Option<UserIdentity>),
    Logout,
    History,
    Show(usize),
    Delete { index: usize, topic: String },
    Clear,
    Help,
    Quit,
    Generate(String),
    Unknown(String),
}

impl ShellCommand {
    /// Whether the command works on the signed-in user's history.
    pub fn requires_sign_in(&self) -> bool {
        matches!(
            self,
            Self::History | Self::Show(_) | Self::Delete { .. } | Self::Clear
        )
    }

    /// Parses one input line. Lines not starting with `:` are topics.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if !trimmed.starts_with(':') {
            return Self::Generate(trimmed.to_string());
        }

        let (command, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (trimmed, ""),
        };
        match command {
            ":login" => {
                let account = match rest.split_once(char::is_whitespace) {
                    Some((uid, name)) => Some(UserIdentity::new(uid, name.trim())),
                    None if !rest.is_empty() => Some(UserIdentity::new(rest, rest)),
                    None => None,
                };
                Self::Login(account)
            }
            ":logout" => Self::Logout,
            ":history" => Self::History,
            ":show" => match rest.parse::<usize>() {
                Ok(index) => Self::Show(index),
                Err(_) => Self::Unknown(trimmed.to_string()),
            },
            ":delete" => {
                let parsed = rest
                    .split_once(char::is_whitespace)
                    .and_then(|(index, topic)| Some((index.parse::<usize>().ok()?, topic.trim())));
                match parsed {
                    Some((index, topic)) if !topic.is_empty() => Self::Delete {
                        index,
                        topic: topic.to_string(),
                    },
                    _ => Self::Unknown(trimmed.to_string()),
                }
            }
            ":clear" => Self::Clear,
            ":help" => Self::Help,
            ":quit" | ":exit" => Self::Quit,
            _ => Self::Unknown(trimmed.to_string()),
        }
    }
}

/// Completion, highlighting and hints for `:` commands.
#[derive(Clone)]
struct ShellHelper;

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with(':') || line.contains(' ') {
            return Ok((0, vec![]));
        }
        let candidates = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ShellHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with(':') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.starts_with(':') && !line.contains(' ') {
            COMMANDS
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for ShellHelper {}

pub async fn run(config: &ViroConfig, account: Option<UserIdentity>) -> Result<()> {
    let mut session = CliSession::open(config, account.clone()).await?;
    if account.is_some() {
        login(&mut session).await;
    }

    let mut rl: Editor<ShellHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ShellHelper));

    println!("{}", "=== VIRO ===".bright_magenta().bold());
    print_help();
    println!();

    loop {
        let prompt = match session.controller.current_user().await {
            Some(user) => format!("{}> ", user.display_name),
            None => "viro> ".to_string(),
        };

        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detectado. Escribe ':quit' para salir.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(&line);

        let command = ShellCommand::parse(&line);
        if command.requires_sign_in() && !session.is_signed_in().await {
            render::print_info(SIGN_IN_HINT);
            continue;
        }

        match command {
            ShellCommand::Login(account) => {
                if let Some(account) = account {
                    session.set_account(account);
                }
                login(&mut session).await;
            }
            ShellCommand::Logout => match session.logout().await {
                Ok(()) => render::print_info("Sesión cerrada"),
                Err(e) => render::print_error(&e.user_message()),
            },
            ShellCommand::History => {
                render::print_history(&session.controller.grouped_history().await);
            }
            ShellCommand::Show(index) => {
                let history = session.controller.snapshot().await.history;
                match history.entries().get(index) {
                    Some(entry) => render::print_entry(index, entry),
                    None => render::print_error(&format!(
                        "No hay ninguna entrada en la posición {index}"
                    )),
                }
            }
            ShellCommand::Delete { index, topic } => {
                if let Err(e) = session.controller.delete_entry(&topic, index).await {
                    render::print_error(&e.user_message());
                }
            }
            ShellCommand::Clear => {
                let answer = rl.readline(&format!("{CLEAR_CONFIRMATION} (s/N) "));
                if matches!(answer, Ok(ref a) if is_affirmative(a)) {
                    match session.controller.clear_all().await {
                        Ok(()) => render::print_info("Historial borrado"),
                        Err(e) => render::print_error(&e.user_message()),
                    }
                } else {
                    render::print_info("Cancelado");
                }
            }
            ShellCommand::Help => print_help(),
            ShellCommand::Quit => break,
            ShellCommand::Generate(topic) => generate(&session, &topic).await,
            ShellCommand::Unknown(input) => {
                render::print_error(&format!("Comando desconocido: {input}"));
            }
        }
    }

    println!("{}", "¡Hasta pronto!".bright_green());
    Ok(())
}

async fn login(session: &mut CliSession) {
    match session.login().await {
        Ok(user) => println!("{}", user.greeting().bright_green()),
        Err(e) => render::print_error(&e.user_message()),
    }
}

async fn generate(session: &CliSession, topic: &str) {
    println!("{}", "Generando...".bright_black());
    match session.controller.submit(topic).await {
        Ok(text) => render::print_result(&text),
        Err(ViroError::Superseded) => {}
        Err(e) => render::print_error(&e.user_message()),
    }
}

fn print_help() {
    println!(
        "{}",
        "Escribe un tema para generar ideas. Comandos: :login [uid [nombre]], :logout, \
         :history, :show <posición>, :delete <posición> <tema>, :clear, :help, :quit"
            .bright_black()
    );
}

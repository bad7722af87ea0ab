//! One-shot subcommands.

use crate::render;
use crate::session::CliSession;
use anyhow::{Result, bail};
use colored::Colorize;
use rustyline::DefaultEditor;
use viro_core::ViroError;
use viro_core::config::ViroConfig;
use viro_core::identity::UserIdentity;

pub const CLEAR_CONFIRMATION: &str = "¿Seguro que deseas borrar todo el historial?";

pub async fn generate(config: &ViroConfig, account: Option<UserIdentity>, tema: &str) -> Result<()> {
    let signed_in = account.is_some();
    let session = open(config, account).await?;
    if !signed_in {
        render::print_info("Sin sesión iniciada: el resultado no se guardará en el historial");
    }

    let text = session
        .controller
        .submit(tema)
        .await
        .map_err(into_user_error)?;
    println!("{}", format!("Ideas para \"{}\"", tema.trim()).bright_magenta().bold());
    render::print_result(&text);
    Ok(())
}

pub async fn history(config: &ViroConfig, account: Option<UserIdentity>) -> Result<()> {
    let session = open_signed_in(config, account).await?;
    render::print_history(&session.controller.grouped_history().await);
    Ok(())
}

pub async fn show(config: &ViroConfig, account: Option<UserIdentity>, index: usize) -> Result<()> {
    let session = open_signed_in(config, account).await?;
    let history = session.controller.snapshot().await.history;
    match history.entries().get(index) {
        Some(entry) => render::print_entry(index, entry),
        None => bail!("No hay ninguna entrada en la posición {index}"),
    }
    Ok(())
}

pub async fn delete(
    config: &ViroConfig,
    account: Option<UserIdentity>,
    topic: &str,
    index: usize,
) -> Result<()> {
    let session = open_signed_in(config, account).await?;
    let before = session.controller.snapshot().await.history.len();
    session
        .controller
        .delete_entry(topic, index)
        .await
        .map_err(into_user_error)?;
    if session.controller.snapshot().await.history.len() == before {
        render::print_info(&format!("No hay ninguna entrada de \"{topic}\" en la posición {index}"));
    } else {
        render::print_info("Entrada eliminada");
    }
    Ok(())
}

pub async fn clear(config: &ViroConfig, account: Option<UserIdentity>, yes: bool) -> Result<()> {
    let session = open_signed_in(config, account).await?;
    if !yes && !confirm(CLEAR_CONFIRMATION)? {
        render::print_info("Cancelado");
        return Ok(());
    }
    session
        .controller
        .clear_all()
        .await
        .map_err(into_user_error)?;
    render::print_info("Historial borrado");
    Ok(())
}

/// Asks a yes/no question on the terminal. Anything but an explicit yes
/// counts as no.
pub fn confirm(question: &str) -> Result<bool> {
    let mut editor = DefaultEditor::new()?;
    match editor.readline(&format!("{question} (s/N) ")) {
        Ok(answer) => Ok(is_affirmative(&answer)),
        Err(rustyline::error::ReadlineError::Interrupted)
        | Err(rustyline::error::ReadlineError::Eof) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "si" | "sí" | "y" | "yes"
    )
}

/// Converts a domain error into the message shown to the user.
pub fn into_user_error(e: ViroError) -> anyhow::Error {
    anyhow::anyhow!(e.user_message())
}

async fn open(config: &ViroConfig, account: Option<UserIdentity>) -> Result<CliSession> {
    let signed_in = account.is_some();
    let mut session = CliSession::open(config, account).await?;
    if signed_in {
        let user = session.login().await.map_err(into_user_error)?;
        tracing::debug!(uid = %user.uid, "cli session signed in");
    }
    Ok(session)
}

async fn open_signed_in(config: &ViroConfig, account: Option<UserIdentity>) -> Result<CliSession> {
    if account.is_none() {
        bail!("Inicia sesión con --user para usar el historial");
    }
    open(config, account).await
}

//! Line-oriented console front end standing in for the login, register and dashboard pages.

use std::fmt::Write as _;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use inline_colorization::*;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::models::Credentials;
use crate::navigation::{Route, LOGIN_PATH};
use crate::startup::App;

/// One line typed at the prompt.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "command", disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Sign in and open the dashboard
    Login { username: String, password: String },
    /// Create an account, then go to the login page
    Register { username: String, password: String },
    /// End the session in this and every sibling context
    Logout,
    /// List employees (dashboard only)
    Employees,
    /// Navigate to a path, e.g. `/` or `/register`
    Open { path: String },
    /// Show who is signed in
    Whoami,
    /// Leave the console
    #[command(alias = "exit")]
    Quit,
}

impl Command {
    /// Parses a prompt line. `help` and malformed input come back as a clap error
    /// whose text is ready to print.
    pub fn parse_line(line: &str) -> Result<Command, clap::Error> {
        Line::try_parse_from(line.split_whitespace()).map(|parsed| parsed.command)
    }
}

fn usage() -> String {
    Line::command().render_help().to_string()
}

/// Runs one command against `app` and renders what the page would show.
pub async fn execute(app: &App, command: &Command) -> String {
    let store = app.store();
    match command {
        Command::Login { username, password } => {
            let credentials = Credentials::new(username.as_str(), password.as_str());
            if store.login(&credentials).await {
                format!("{color_green}signed in as {}{color_reset}", credentials.username)
            } else {
                format!("{color_red}login failed{color_reset}")
            }
        }
        Command::Register { username, password } => {
            let credentials = Credentials::new(username.as_str(), password.as_str());
            if store.register(&credentials).await {
                format!(
                    "{color_green}account {} created, please sign in{color_reset}",
                    credentials.username
                )
            } else {
                format!("{color_red}registration failed{color_reset}")
            }
        }
        Command::Logout => {
            store.logout();
            "signed out".to_string()
        }
        Command::Employees => {
            // The dashboard is the only page that lists employees.
            if app.router().current_route() != Some(Route::Dashboard) {
                return format!("{color_yellow}open / first{color_reset}");
            }
            match store.get_employees().await {
                Some(employees) => {
                    let mut out = format!("{style_bold}{} employees{style_reset}", employees.len());
                    for employee in employees {
                        let _ = write!(
                            out,
                            "\n  {:>4}  {} {}",
                            employee.id, employee.firstname, employee.lastname
                        );
                    }
                    out
                }
                None => format!("{color_red}could not load employees{color_reset}"),
            }
        }
        Command::Open { path } => {
            let location = app.router().navigate(path);
            if location.path == LOGIN_PATH && path.as_str() != LOGIN_PATH {
                format!("{color_yellow}{} requires a session, showing {}{color_reset}", path, location.route.name())
            } else {
                format!("showing {}", location.route.name())
            }
        }
        Command::Whoami => {
            let session = store.session();
            if session.is_authenticated() {
                format!("{color_cyan}{}{color_reset} (signed in)", display_name(&session.username))
            } else {
                "anonymous".to_string()
            }
        }
        Command::Quit => "bye".to_string(),
    }
}

fn display_name(username: &str) -> &str {
    if username.is_empty() {
        "<restored session>"
    } else {
        username
    }
}

fn prompt(app: &App) -> String {
    let route = app
        .router()
        .current_route()
        .map(|route| route.name())
        .unwrap_or("-");
    format!("{style_bold}{}{style_reset}> ", route)
}

/// Reads commands from stdin until `quit` or end of input.
pub async fn run(app: &App) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout.write_all(format!("{}\n", usage()).as_bytes()).await?;
    loop {
        stdout.write_all(prompt(app).as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match Command::parse_line(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => {
                let output = execute(app, &command).await;
                stdout.write_all(format!("{}\n", output).as_bytes()).await?;
            }
            Err(e) if e.kind() == ErrorKind::DisplayHelp => {
                stdout.write_all(e.to_string().as_bytes()).await?;
            }
            Err(e) => {
                stdout
                    .write_all(format!("{color_red}{}{color_reset}", e).as_bytes())
                    .await?;
            }
        }
    }
    Ok(())
}

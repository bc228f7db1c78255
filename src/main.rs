//! KerjainWoy CLI — the UI boundary over the client SDK.
//!
//! Owns the concerns the SDK leaves to the caller: password prompts,
//! delete confirmation, re-listing after every successful write, and
//! printing store errors verbatim.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use dialoguer::{Confirm, Password};

use kerjainwoy::dashboard::DashboardAggregator;
use kerjainwoy::store::models::Todo;
use kerjainwoy::{
    AuthSession, AuthState, Config, CryptoCodec, Scope, SessionTracker, SignUpOutcome,
    StoreClient, TodoRepository,
};

#[derive(Parser)]
#[command(name = "kerjainwoy", version, about = "Todo list client with encrypted descriptions")]
struct Cli {
    /// Account email (required by every command except verify/resend).
    #[arg(long, global = true)]
    email: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account; prompts for the password twice.
    Register,
    /// Verify a signup OTP code.
    Verify { code: String },
    /// Resend the signup OTP for an email.
    Resend,
    /// Show the signed-in identity and role.
    Whoami,
    /// List todos, newest first.
    List {
        /// List every user's todos (admin only).
        #[arg(long)]
        all: bool,
        /// Completion filter.
        #[arg(long, value_enum, default_value_t = CompletionFilter::All)]
        filter: CompletionFilter,
    },
    /// Add a todo.
    Add {
        title: String,
        #[arg(default_value = "")]
        description: String,
    },
    /// Mark a todo completed.
    Done { id: String },
    /// Mark a todo not completed.
    Undone { id: String },
    /// Edit a todo's title and description.
    Edit {
        id: String,
        title: String,
        #[arg(default_value = "")]
        description: String,
    },
    /// Delete a todo (asks for confirmation).
    Rm {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Summary counts (admin only).
    Stats,
    /// Login-log listing (admin only).
    Logs {
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CompletionFilter {
    All,
    Pending,
    Completed,
}

impl CompletionFilter {
    fn keeps(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !todo.completed,
            Self::Completed => todo.completed,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("kerjainwoy=warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let store = Arc::new(StoreClient::new(&config)?);

    match cli.command {
        Command::Register => {
            let email = require_email(&cli.email)?;
            let password = Password::new().with_prompt("Password").interact()?;
            let confirm = Password::new().with_prompt("Confirm password").interact()?;
            if password != confirm {
                bail!("passwords do not match");
            }
            if password.len() < 6 {
                bail!("password must be at least 6 characters");
            }
            match store.sign_up(&email, &password).await? {
                SignUpOutcome::VerificationPending(_) => {
                    println!("Registered. Check {email} for the verification OTP.");
                }
                SignUpOutcome::SignedIn(session) => {
                    println!("Registered and signed in as {}.", display_email(&session.user.email));
                }
            }
        }
        Command::Verify { code } => {
            let email = require_email(&cli.email)?;
            let session = store.verify_otp(&email, &code).await?;
            println!("Verified. You can now sign in as {}.", display_email(&session.user.email));
        }
        Command::Resend => {
            let email = require_email(&cli.email)?;
            store.resend_signup_otp(&email).await?;
            println!("OTP resent to {email}.");
        }
        command => run_authenticated(cli.email, command, config, store).await?,
    }

    Ok(())
}

/// Sign in, run one command against the session, sign out.
async fn run_authenticated(
    email: Option<String>,
    command: Command,
    config: Config,
    store: Arc<StoreClient>,
) -> anyhow::Result<()> {
    let email = require_email(&email)?;
    let password = Password::new().with_prompt("Password").interact()?;
    if password.len() < 6 {
        bail!("password must be at least 6 characters");
    }

    let tracker = Arc::new(SessionTracker::new(Arc::clone(&store))?);
    let session = AuthSession::start(Arc::clone(&store), Arc::clone(&tracker));

    store.sign_in_with_password(&email, &password).await?;
    let state = wait_authenticated(&session).await?;

    let crypto = CryptoCodec::new(&config.encryption_key);
    let repo = TodoRepository::new(Arc::clone(&store), crypto);
    let user_id = state
        .user()
        .map(|u| u.id.clone())
        .context("no user on authenticated state")?;

    // Sign out and tear down even when the command failed; the error (with
    // the remote message verbatim) propagates afterwards.
    let result = dispatch(&command, &state, &user_id, &repo, &store).await;

    store.sign_out().await?;
    session.shutdown();
    // Give the detached login-log write a chance to land before exit
    tokio::time::sleep(Duration::from_millis(300)).await;

    result.map_err(Into::into)
}

async fn dispatch(
    command: &Command,
    state: &AuthState,
    user_id: &str,
    repo: &TodoRepository,
    store: &Arc<StoreClient>,
) -> kerjainwoy::Result<()> {
    match command {
        Command::Whoami => {
            let email = state.user().and_then(|u| u.email.clone());
            let role = if state.is_admin() { "admin" } else { "user" };
            println!("{} ({role})", display_email(&email));
        }
        Command::List { all, filter } => {
            let scope = scope_for(state, *all)?;
            print_todos(&repo.list(&scope).await?, *filter);
        }
        Command::Add { title, description } => {
            let todo = repo.create(user_id, title, description).await?;
            println!("Added \"{}\".", todo.title);
            print_todos(&repo.list(&Scope::Owner(user_id.to_string())).await?, CompletionFilter::All);
        }
        Command::Done { id } => {
            repo.set_completed(id, true).await?;
            print_todos(&repo.list(&Scope::Owner(user_id.to_string())).await?, CompletionFilter::All);
        }
        Command::Undone { id } => {
            repo.set_completed(id, false).await?;
            print_todos(&repo.list(&Scope::Owner(user_id.to_string())).await?, CompletionFilter::All);
        }
        Command::Edit {
            id,
            title,
            description,
        } => {
            repo.update(id, title, description).await?;
            print_todos(&repo.list(&Scope::Owner(user_id.to_string())).await?, CompletionFilter::All);
        }
        Command::Rm { id, yes } => {
            let confirmed = *yes
                || Confirm::new()
                    .with_prompt(format!("Delete todo {id}?"))
                    .default(false)
                    .interact()
                    .unwrap_or(false);
            if !confirmed {
                println!("Kept.");
                return Ok(());
            }
            repo.delete(id).await?;
            print_todos(&repo.list(&Scope::Owner(user_id.to_string())).await?, CompletionFilter::All);
        }
        Command::Stats => {
            require_admin(state)?;
            let stats = DashboardAggregator::new(Arc::clone(store)).stats().await?;
            println!("Users:     {}", stats.total_users);
            println!("Todos:     {}", stats.total_todos);
            println!("Completed: {}", stats.completed_todos);
            println!("Pending:   {}", stats.pending_todos);
        }
        Command::Logs { page } => {
            require_admin(state)?;
            let views = DashboardAggregator::new(Arc::clone(store))
                .login_log_page(*page)
                .await?;
            if views.is_empty() {
                println!("No login logs on page {page}.");
            }
            for view in views {
                let time = view
                    .log
                    .login_time
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "-".into());
                let ip = view.log.ip_address.as_deref().unwrap_or("-");
                println!("{time}  {} ({})  {ip}", view.email, view.role);
            }
        }
        Command::Register | Command::Verify { .. } | Command::Resend => unreachable!(),
    }
    Ok(())
}

fn scope_for(state: &AuthState, all: bool) -> kerjainwoy::Result<Scope> {
    if !all {
        let user = state
            .user()
            .ok_or_else(|| kerjainwoy::Error::Store("not signed in".into()))?;
        return Ok(Scope::Owner(user.id.clone()));
    }
    require_admin(state)?;
    Ok(Scope::All)
}

fn require_admin(state: &AuthState) -> kerjainwoy::Result<()> {
    if state.is_admin() {
        Ok(())
    } else {
        Err(kerjainwoy::Error::Validation(
            "admin role required".into(),
        ))
    }
}

fn require_email(email: &Option<String>) -> anyhow::Result<String> {
    let email = email
        .as_deref()
        .context("--email is required for this command")?;
    validate_email(email)?;
    Ok(email.to_string())
}

/// Same shape check the original login form applied: something@something.tld
/// with no whitespace.
fn validate_email(email: &str) -> anyhow::Result<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        bail!("please enter a valid email address");
    }
}

async fn wait_authenticated(session: &AuthSession) -> anyhow::Result<AuthState> {
    let mut rx = session.subscribe();
    let state = tokio::time::timeout(Duration::from_secs(15), async {
        loop {
            let state = rx.borrow().clone();
            if state.is_authenticated() {
                return anyhow::Ok(state);
            }
            rx.changed()
                .await
                .map_err(|_| anyhow::anyhow!("session handle closed before authenticating"))?;
        }
    })
    .await
    .context("timed out waiting for the session to authenticate")??;
    Ok(state)
}

fn print_todos(todos: &[Todo], filter: CompletionFilter) {
    let mut shown = 0;
    for todo in todos.iter().filter(|t| filter.keeps(t)) {
        shown += 1;
        let mark = if todo.completed { "x" } else { " " };
        let created = todo
            .created_at
            .map(|t| t.format(" (%Y-%m-%d %H:%M)").to_string())
            .unwrap_or_default();
        println!("[{mark}] {}  {}{created}", todo.id, todo.title);
        if let Some(description) = todo.description.as_deref() {
            if !description.is_empty() {
                println!("      {description}");
            }
        }
    }
    if shown == 0 {
        println!("No todos.");
    }
}

fn display_email(email: &Option<String>) -> String {
    email.clone().unwrap_or_else(|| "<no email>".into())
}

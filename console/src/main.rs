//! Admin console entry-point: wires settings, the HTTP transport, and the
//! screen workflows into a command-line surface.

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{self, WrapErr, eyre};
use ortho_config::OrthoConfig;
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use minihome_console::ConsoleSettings;
use minihome_console::domain::{
    ContentForm, ContentGateway, FieldErrors, NewUser, QueryClient, RecordId, RegistrationForm,
    TokenStore, UserListFilter, UserPatch,
};
use minihome_console::outbound::{
    ApiTransport, FileTokenStore, HttpAuthGateway, HttpProjectsGateway, HttpTemplatesGateway,
    HttpUsersGateway, TransportIdentity,
};
use minihome_console::pages::{ContentPage, LoginPage, RegisterPage, UsersPage};

/// Command-line surface of the admin console.
#[derive(Debug, Parser)]
#[command(name = "minihome-console", version, about = "MiniHome admin console")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and persist the session token.
    Login {
        /// Login handle.
        username: String,
        /// Account password.
        password: String,
    },
    /// Drop the persisted session token.
    Logout,
    /// Register a new account; it awaits approval afterwards.
    Register(RegisterArgs),
    /// Administer accounts.
    #[command(subcommand)]
    Users(UsersCommand),
    /// Administer portfolio projects.
    #[command(subcommand)]
    Projects(ContentCommand),
    /// Administer portfolio templates.
    #[command(subcommand)]
    Templates(ContentCommand),
}

#[derive(Debug, Args)]
struct RegisterArgs {
    /// Public display name.
    #[arg(long)]
    display_name: String,
    /// Address to register under.
    #[arg(long)]
    email: String,
    /// Login handle.
    #[arg(long)]
    username: String,
    /// Account password.
    #[arg(long)]
    password: String,
    /// Password repeated for confirmation.
    #[arg(long)]
    confirm_password: String,
    /// Accept the terms of service.
    #[arg(long)]
    accept_terms: bool,
}

#[derive(Debug, Subcommand)]
enum UsersCommand {
    /// List accounts, optionally narrowed by tri-state flags and search.
    List {
        /// Only accounts with this approval state.
        #[arg(long)]
        approved: Option<bool>,
        /// Only accounts with this active state.
        #[arg(long)]
        active: Option<bool>,
        /// Only accounts with this master state.
        #[arg(long)]
        master: Option<bool>,
        /// Free-text search across email, username, and display name.
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one account.
    Get {
        /// Account id.
        id: RecordId,
    },
    /// Create an account.
    Create {
        /// Address to register under.
        #[arg(long)]
        email: String,
        /// Login handle.
        #[arg(long)]
        username: String,
        /// Initial password.
        #[arg(long)]
        password: String,
        /// Public display name.
        #[arg(long)]
        display_name: Option<String>,
        /// Pre-approve the account.
        #[arg(long)]
        approved: bool,
        /// Grant master privileges.
        #[arg(long)]
        master: bool,
    },
    /// Patch an account; absent flags leave fields untouched.
    Update {
        /// Account id.
        id: RecordId,
        /// Replace the display name.
        #[arg(long)]
        display_name: Option<String>,
        /// Toggle sign-in permission.
        #[arg(long)]
        active: Option<bool>,
        /// Toggle master privileges.
        #[arg(long)]
        master: Option<bool>,
        /// Toggle administrator approval.
        #[arg(long)]
        approved: Option<bool>,
    },
    /// Delete an account.
    Delete {
        /// Account id.
        id: RecordId,
    },
    /// Approve a pending account.
    Approve {
        /// Account id.
        id: RecordId,
    },
}

#[derive(Debug, Subcommand)]
enum ContentCommand {
    /// List records, optionally narrowed by a client-side search term.
    List {
        /// Substring matched against title, category, and description.
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one record.
    Get {
        /// Record id.
        id: RecordId,
    },
    /// Create a record.
    Create(ContentArgs),
    /// Replace a record's editable fields.
    Update {
        /// Record id.
        id: RecordId,
        #[command(flatten)]
        fields: ContentArgs,
    },
    /// Delete a record.
    Delete {
        /// Record id.
        id: RecordId,
    },
}

#[derive(Debug, Args)]
struct ContentArgs {
    /// Grouping category (required).
    #[arg(long)]
    category: String,
    /// Display title (required).
    #[arg(long)]
    title: String,
    /// Long description.
    #[arg(long, default_value = "")]
    desc: String,
    /// Preview image URL.
    #[arg(long, default_value = "")]
    img_url: String,
    /// Link to the live project.
    #[arg(long, default_value = "")]
    project_url: String,
    /// Comma-separated badge labels.
    #[arg(long, default_value = "")]
    badge: String,
}

impl From<ContentArgs> for ContentForm {
    fn from(args: ContentArgs) -> Self {
        Self {
            category: args.category,
            title: args.title,
            desc: args.desc,
            img_url: args.img_url,
            project_url: args.project_url,
            badge: args.badge,
        }
    }
}

/// Application bootstrap.
#[tokio::main]
async fn main() -> eyre::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
    color_eyre::install()?;

    let cli = Cli::parse();
    // Settings come from CONSOLE_* variables and the discovered config file;
    // the command line is clap's alone.
    let settings = ConsoleSettings::load_from_iter([OsString::from("minihome-console")])
        .wrap_err("failed to load settings")?;

    let tokens = Arc::new(
        FileTokenStore::open(&settings.profile_dir()).wrap_err("failed to open the profile")?,
    );
    let base_url =
        Url::parse(settings.api_base_url()).wrap_err("invalid api_base_url setting")?;
    let identity = TransportIdentity {
        request_timeout: Duration::from_secs(settings.request_timeout_secs),
        ..TransportIdentity::default()
    };
    let transport = Arc::new(
        ApiTransport::with_identity(
            base_url,
            Arc::clone(&tokens) as Arc<dyn TokenStore>,
            identity,
        )
        .wrap_err("failed to build the HTTP client")?,
    );
    let queries = QueryClient::new(settings.retry_limit);

    match cli.command {
        Command::Login { username, password } => {
            let page = LoginPage::new(Arc::new(HttpAuthGateway::new(transport)), tokens);
            let user = page
                .submit(&username, &password)
                .await
                .map_err(field_errors)?;
            print_json(&user)
        }
        Command::Logout => {
            tokens.clear();
            Ok(())
        }
        Command::Register(args) => {
            let page = RegisterPage::new(Arc::new(HttpAuthGateway::new(transport)));
            let form = RegistrationForm {
                display_name: args.display_name,
                email: args.email,
                username: args.username,
                password: args.password,
                confirm_password: args.confirm_password,
                agree_to_terms: args.accept_terms,
            };
            let user = page.submit(&form).await.map_err(field_errors)?;
            print_json(&user)
        }
        Command::Users(command) => {
            let page = UsersPage::new(Arc::new(HttpUsersGateway::new(transport)), queries);
            run_users(page, command).await
        }
        Command::Projects(command) => {
            let page = ContentPage::new(Arc::new(HttpProjectsGateway::new(transport)), queries);
            run_content(page, command).await
        }
        Command::Templates(command) => {
            let page = ContentPage::new(Arc::new(HttpTemplatesGateway::new(transport)), queries);
            run_content(page, command).await
        }
    }
}

async fn run_users<G>(mut page: UsersPage<G>, command: UsersCommand) -> eyre::Result<()>
where
    G: minihome_console::domain::UsersGateway + 'static,
{
    match command {
        UsersCommand::List {
            approved,
            active,
            master,
            search,
        } => {
            let filter = UserListFilter {
                approved,
                active,
                master,
                search: None,
            }
            .with_search(search.unwrap_or_default());
            page.set_filter(filter);
            let snapshot = page.load().await;
            if let Some(error) = snapshot.error {
                return Err(eyre!(error));
            }
            let listing = snapshot
                .data
                .ok_or_else(|| eyre!("the users list never loaded"))?;
            print_json(&listing.users)?;
            if let Some(stats) = listing.stats {
                print_json(&stats)?;
            }
            Ok(())
        }
        UsersCommand::Get { id } => print_json(&page.get(id).await?),
        UsersCommand::Create {
            email,
            username,
            password,
            display_name,
            approved,
            master,
        } => {
            let new_user = NewUser {
                email,
                username,
                password,
                display_name,
                is_approved: approved.then_some(true),
                is_master: master.then_some(true),
                is_active: None,
            };
            print_json(&page.create(&new_user).await?)
        }
        UsersCommand::Update {
            id,
            display_name,
            active,
            master,
            approved,
        } => {
            let patch = UserPatch {
                display_name,
                is_active: active,
                is_master: master,
                is_approved: approved,
            };
            print_json(&page.update(id, &patch).await?)
        }
        UsersCommand::Delete { id } => {
            page.request_delete(id);
            confirm_users_action(&mut page).await
        }
        UsersCommand::Approve { id } => {
            page.request_approve(id);
            confirm_users_action(&mut page).await
        }
    }
}

async fn confirm_users_action<G>(page: &mut UsersPage<G>) -> eyre::Result<()>
where
    G: minihome_console::domain::UsersGateway + 'static,
{
    match page.confirm_pending().await? {
        Some(user) => print_json(&user),
        None => Ok(()),
    }
}

async fn run_content<G>(mut page: ContentPage<G>, command: ContentCommand) -> eyre::Result<()>
where
    G: ContentGateway + 'static,
{
    match command {
        ContentCommand::List { search } => {
            let snapshot = page.load().await;
            if let Some(error) = snapshot.error {
                return Err(eyre!(error));
            }
            page.set_search(search.unwrap_or_default());
            print_json(&page.filtered())
        }
        ContentCommand::Get { id } => print_json(&page.get(id).await?),
        ContentCommand::Create(args) => {
            print_json(&page.create(&ContentForm::from(args)).await?)
        }
        ContentCommand::Update { id, fields } => {
            print_json(&page.update(id, &ContentForm::from(fields)).await?)
        }
        ContentCommand::Delete { id } => {
            page.request_delete(id);
            match page.confirm_delete().await? {
                Some(record) => print_json(&record),
                None => Ok(()),
            }
        }
    }
}

/// Fold per-field validation messages into one report.
fn field_errors(errors: FieldErrors) -> eyre::Report {
    let lines: Vec<String> = errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect();
    eyre!(lines.join("\n"))
}

fn print_json(value: &impl Serialize) -> eyre::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

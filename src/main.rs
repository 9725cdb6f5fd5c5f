use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use storyboard::config::loader;
use storyboard::notify::NotificationBus;
use storyboard::pagination::{LoadState, PaginationController};
use storyboard::repository::Resource;
use storyboard::service::{AuthService, Fixtures, ResourceService, Services};
use storyboard::session::{FileSessionStore, SessionHandle};
use storyboard::transport::TransportClient;
use storyboard::types::{Credentials, GenerationRequest, Id};

#[derive(Parser)]
#[command(name = "storyboard", version, about = "Project tracker client")]
struct Cli {
    /// Path to config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,

    /// Serve data from a fixtures JSON file instead of the tracker service.
    #[arg(long, value_name = "FILE")]
    fixtures: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session.
    Login {
        #[arg(short, long)]
        username: String,
    },
    /// Forget the persisted session.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// List one page of resources under a parent.
    List {
        kind: Kind,
        parent_id: Id,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
    },
    /// List id, code and name of the resources under a parent.
    Short { kind: Kind, parent_id: Id },
    /// List every epic across a user's projects.
    UserEpics { user_id: Id },
    /// Show one resource.
    Get { kind: Kind, id: Id },
    /// Delete one resource.
    Delete { kind: Kind, id: Id },
    /// Show the test scenarios and test cases of a user story.
    Suite { user_story_id: Id },
    /// Generate test cases for a user story from a database file.
    Generate {
        user_story_id: Id,
        /// Database file uploaded with the request.
        #[arg(long, value_name = "FILE")]
        db: PathBuf,
        /// Extra instructions for the generator.
        #[arg(long, default_value = "")]
        prompt: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Project,
    Epic,
    Story,
    Message,
    Settings,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config = loader::load_config(cli.config.as_deref())?;
    let state_file = config
        .session
        .state_file
        .clone()
        .unwrap_or_else(loader::default_state_file);
    let session = Arc::new(
        SessionHandle::restore(Arc::new(FileSessionStore::open(&state_file)))
            .context("restoring session")?,
    );
    let client = TransportClient::new(&config.api, Arc::clone(&session))?;
    let bus = NotificationBus::new(config.notifications.dismiss_after());

    tracing::info!("storyboard starting against {}", client.base_url());

    match cli.command {
        Commands::Login { username } => {
            let password = read_password()?;
            let user = AuthService::new(client)
                .login(&Credentials { username, password })
                .await?;
            println!("Logged in as {} (id {})", user.display_name(), user.id);
        }
        Commands::Logout => {
            AuthService::new(client).logout()?;
            println!("Logged out");
        }
        Commands::Whoami => match session.current_user() {
            Some(user) if session.is_authenticated() => {
                println!("{} (id {})", user.display_name(), user.id);
            }
            _ => println!("Not logged in"),
        },
        Commands::List {
            kind,
            parent_id,
            page,
            size,
        } => {
            let services = services(&cli.fixtures, &client)?;
            let size = size.unwrap_or(config.pagination.page_size);
            match kind {
                Kind::Project => list(services.projects, parent_id, page, size).await?,
                Kind::Epic => list(services.epics, parent_id, page, size).await?,
                Kind::Story => list(services.user_stories, parent_id, page, size).await?,
                Kind::Message => list(services.messages, parent_id, page, size).await?,
                Kind::Settings => list(services.settings, parent_id, page, size).await?,
            }
        }
        Commands::Get { kind, id } => {
            let services = services(&cli.fixtures, &client)?;
            match kind {
                Kind::Project => print_json(&services.projects.get(id).await?)?,
                Kind::Epic => print_json(&services.epics.get(id).await?)?,
                Kind::Story => print_json(&services.user_stories.get(id).await?)?,
                Kind::Message => print_json(&services.messages.get(id).await?)?,
                Kind::Settings => print_json(&services.settings.get(id).await?)?,
            }
        }
        Commands::Delete { kind, id } => {
            let services = services(&cli.fixtures, &client)?;
            let deleted = match kind {
                Kind::Project => delete(&services.projects, id, &bus).await,
                Kind::Epic => delete(&services.epics, id, &bus).await,
                Kind::Story => delete(&services.user_stories, id, &bus).await,
                Kind::Message => delete(&services.messages, id, &bus).await,
                Kind::Settings => delete(&services.settings, id, &bus).await,
            };
            if let Some(message) = bus.current() {
                println!("[{:?}] {}", message.severity, message.text);
            }
            deleted?;
        }
        Commands::Short { kind, parent_id } => {
            let services = services(&cli.fixtures, &client)?;
            let rows = match kind {
                Kind::Project => services.projects.list_short(parent_id).await?,
                Kind::Epic => services.epics.list_short(parent_id).await?,
                Kind::Story => services.user_stories.list_short(parent_id).await?,
                Kind::Message => services.messages.list_short(parent_id).await?,
                Kind::Settings => services.settings.list_short(parent_id).await?,
            };
            for row in &rows {
                println!("{}", serde_json::to_string(row)?);
            }
        }
        Commands::UserEpics { user_id } => {
            let services = services(&cli.fixtures, &client)?;
            for epic in services.epics_for_user(user_id).await? {
                println!("{}", serde_json::to_string(&epic)?);
            }
        }
        Commands::Suite { user_story_id } => {
            let services = services(&cli.fixtures, &client)?;
            print_json(&services.test_cases.suite(user_story_id).await?)?;
        }
        Commands::Generate {
            user_story_id,
            db,
            prompt,
        } => {
            let db_file =
                std::fs::read(&db).with_context(|| format!("reading {}", db.display()))?;
            let db_file_name = db
                .file_name()
                .map_or_else(|| "database.db".to_owned(), |n| n.to_string_lossy().into_owned());
            let services = services(&cli.fixtures, &client)?;
            let generated = services
                .test_cases
                .generate(GenerationRequest {
                    user_story_id,
                    prompt_extra: prompt,
                    db_file_name,
                    db_file,
                })
                .await;
            match &generated {
                Ok(receipt) => bus.success(receipt.message.clone()),
                Err(e) => bus.error(e.to_string()),
            };
            if let Some(message) = bus.current() {
                println!("[{:?}] {}", message.severity, message.text);
            }
            generated?;
        }
    }

    Ok(())
}

fn services(fixtures: &Option<PathBuf>, client: &TransportClient) -> Result<Services> {
    let Some(path) = fixtures else {
        return Ok(Services::remote(client));
    };
    let json =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let fixtures = Fixtures::from_json(&json)
        .with_context(|| format!("parsing fixtures from {}", path.display()))?;
    Ok(Services::in_memory(fixtures))
}

/// Password from `$STORYBOARD_PASSWORD`, else the first line of stdin.
fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var("STORYBOARD_PASSWORD")
        && !password.is_empty()
    {
        return Ok(password);
    }
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_owned();
    if password.is_empty() {
        bail!("empty password");
    }
    Ok(password)
}

async fn list<T: Resource + Serialize>(
    service: ResourceService<T>,
    parent_id: Id,
    page: u32,
    size: u32,
) -> Result<()> {
    let mut pager = PaginationController::for_scope(service, parent_id, size);
    if page > 1 {
        pager.set_page(page);
    } else {
        pager.activate();
    }
    pager.settle().await;

    if pager.state() == LoadState::Failed {
        let err = pager.error().map_or_else(String::new, ToString::to_string);
        bail!("could not load {} list: {err}", T::KIND);
    }
    for item in pager.items() {
        println!("{}", serde_json::to_string(item)?);
    }
    eprintln!(
        "page {}/{} ({} total, {} per page)",
        pager.page(),
        pager.pages(),
        pager.total(),
        pager.page_size()
    );
    Ok(())
}

/// Delete and raise a toast either way. The error is still returned so the
/// process exits non-zero.
async fn delete<T: Resource>(
    service: &ResourceService<T>,
    id: Id,
    bus: &NotificationBus,
) -> Result<()> {
    let deleted = service.delete(id).await;
    match &deleted {
        Ok(()) => bus.success(format!("{} {id} deleted", T::KIND)),
        Err(e) => bus.error(format!("Could not delete {} {id}: {e}", T::KIND)),
    };
    Ok(deleted?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use storyboard::notify::Severity;

    use super::*;

    #[tokio::test]
    async fn failed_delete_shows_toast_and_returns_error() {
        let services = Services::in_memory(Fixtures::default());
        let bus = NotificationBus::new(Duration::from_secs(3));

        let result = delete(&services.projects, 42, &bus).await;
        assert!(result.is_err());
        let toast = bus.current().unwrap();
        assert_eq!(toast.severity, Severity::Error);
        assert_eq!(toast.text, "Could not delete project 42: project 42 not found");
    }

    #[tokio::test]
    async fn successful_delete_shows_toast() {
        let json = r#"{"epics": [{"id": 3, "project_id": 1, "code": "EP-3", "name": "Checkout",
            "created_at": "2024-01-12T09:10:00Z"}]}"#;
        let services = Services::in_memory(Fixtures::from_json(json).unwrap());
        let bus = NotificationBus::new(Duration::from_secs(3));

        delete(&services.epics, 3, &bus).await.unwrap();
        assert_eq!(bus.current().unwrap().text, "epic 3 deleted");
    }
}

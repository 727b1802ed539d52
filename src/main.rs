use std::sync::Arc;

use clap::{Parser, Subcommand};
use todo_desk::client::Todo;
use todo_desk::form::SubmitOutcome;
use todo_desk::notify::Toaster;
use todo_desk::pagination::{PageQuery, PageSize, SortOrder};
use todo_desk::session::FileSessionStore;
use todo_desk::{
    ClientConfig, LoginPage, QueryCache, RegisterPage, Revision, TodoClient, TodoDesk, TodosPage,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "todo-desk", about = "Manage your todos from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and store the session
    Login {
        #[arg(long)]
        identifier: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and store the session
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show one page of all todos
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// 10, 50 or 100
        #[arg(long)]
        page_size: Option<u32>,
        /// ASC (oldest first) or DESC (latest first)
        #[arg(long, default_value = "DESC")]
        sort: SortOrder,
    },
    /// Show your own todos
    Mine,
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
    },
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: String,
    },
    /// Create a batch of placeholder todos
    Generate {
        #[arg(long)]
        count: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".to_string().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env();
    tracing::debug!("Using API at {}", config.base_url);

    let sessions = Arc::new(FileSessionStore::new(&config.session_file));
    let client = TodoClient::with_config(&config, sessions)?;
    let notifier = Arc::new(Toaster::new());
    let revision = Revision::new();
    let cache = QueryCache::new(client.clone());

    let ok = match cli.command {
        Command::Login { identifier, password } => {
            let mut page = LoginPage::new();
            page.set("identifier", identifier);
            page.set("password", password);
            report(page.submit(&client, notifier.as_ref()).await)
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            let mut page = RegisterPage::new();
            page.set("username", username);
            page.set("email", email);
            page.set("password", password);
            report(page.submit(&client, notifier.as_ref()).await)
        }
        Command::Logout => {
            client.logout()?;
            println!("Logged out");
            true
        }
        Command::List {
            page,
            page_size,
            sort,
        } => {
            let page_size = match page_size {
                Some(value) => PageSize::from_value(value)
                    .ok_or_else(|| anyhow::anyhow!("page size must be 10, 50 or 100"))?,
                None => config.page_size,
            };
            let mut todos = TodosPage::new(cache, revision)
                .with_query(PageQuery::new(page, page_size, sort));
            let state = todos.load().await;
            print!("{}", todos.view());
            state.error.is_none()
        }
        Command::Mine => {
            let mut desk = TodoDesk::new(client, cache, revision, notifier.clone());
            let state = desk.load().await;
            match (state.data, state.error) {
                (_, Some(error)) => {
                    println!("Error: {}", error);
                    false
                }
                (Some(user), None) if user.todos.is_empty() => {
                    println!("{}", todo_desk::desk::EMPTY_MESSAGE);
                    true
                }
                (Some(user), None) => {
                    for todo in &user.todos {
                        println!("  [{}] {}", todo.path_id(), todo.title);
                    }
                    true
                }
                (None, None) => false,
            }
        }
        Command::Create { title, description } => {
            let mut desk = TodoDesk::new(client, cache, revision, notifier.clone());
            desk.open_create();
            desk.set("title", title);
            desk.set("description", description);
            report(desk.submit().await)
        }
        Command::Edit {
            id,
            title,
            description,
        } => {
            let mut desk = TodoDesk::new(client, cache, revision, notifier.clone());
            let todo = find_todo(&mut desk, &id).await?;
            desk.open_edit(&todo);
            if let Some(title) = title {
                desk.set("title", title);
            }
            if let Some(description) = description {
                desk.set("description", description);
            }
            report(desk.submit().await)
        }
        Command::Delete { id } => {
            let mut desk = TodoDesk::new(client, cache, revision, notifier.clone());
            let todo = find_todo(&mut desk, &id).await?;
            desk.open_remove(&todo);
            report(desk.submit().await)
        }
        Command::Generate { count } => {
            let mut desk = TodoDesk::new(client, cache, revision, notifier.clone());
            let summary = desk.generate(count.unwrap_or(config.generate_count)).await;
            println!(
                "Created {} of {} todos ({} failed)",
                summary.created, summary.requested, summary.failed
            );
            summary.created > 0
        }
    };

    for notification in notifier.drain() {
        println!("{}", notification.message);
    }

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

async fn find_todo(desk: &mut TodoDesk, id: &str) -> anyhow::Result<Todo> {
    let state = desk.load().await;
    if let Some(error) = state.error {
        anyhow::bail!("Failed to load your todos: {}", error);
    }
    state
        .data
        .and_then(|user| user.todos.into_iter().find(|todo| todo.path_id() == id))
        .ok_or_else(|| anyhow::anyhow!("No todo with id {} in your list", id))
}

fn report(outcome: SubmitOutcome) -> bool {
    match outcome {
        SubmitOutcome::Submitted => true,
        SubmitOutcome::Invalid(errors) => {
            for (field, message) in errors.iter() {
                eprintln!("{}: {}", field, message);
            }
            false
        }
        // Already shown as a notification.
        SubmitOutcome::Failed(_) => false,
        SubmitOutcome::Ignored => false,
    }
}

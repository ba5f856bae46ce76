//! deptwatch CLI
//!
//! Local entry point and stand-in for the chat platform dispatcher: each
//! subcommand maps 1:1 onto a core operation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use deptwatch::{
    config::Config,
    delivery::{ConsoleSink, NoticeSink, WebhookSink},
    error::Result,
    services::{
        BindOutcome, ChannelBindings, DepartmentRegistry, FetchNotices, NoticeFetcher,
        NoticeStore, QueryOutcome, QueryService, ViewSession,
    },
    storage::{LocalStore, StateStore},
    sync::Poller,
};

/// deptwatch - Department Notice Board Watcher
#[derive(Parser, Debug)]
#[command(
    name = "deptwatch",
    version,
    about = "Watches department notice boards and relays new notices"
)]
struct Cli {
    /// Path to storage directory containing config and state files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the periodic poller
    Run,

    /// Run a single poll tick and exit
    Poll,

    /// Show current notices for a channel's department
    List {
        /// Channel whose binding to use
        #[arg(long, default_value = "cli")]
        channel: String,

        /// Page to show
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Search stored notices by keyword
    Search {
        keyword: String,

        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Show stored notices published on a date (YYYY-MM-DD)
    Date {
        date: String,

        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Bind a channel to a department
    Bind {
        department: String,

        #[arg(long, default_value = "cli")]
        channel: String,
    },

    /// List all registered departments
    Departments,

    /// Validate configuration and state files
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Everything the commands need, loaded from the storage directory.
struct App {
    config: Config,
    registry: Arc<DepartmentRegistry>,
    bindings: Arc<ChannelBindings>,
    notices: Arc<NoticeStore>,
    fetcher: Arc<dyn FetchNotices>,
}

impl App {
    async fn load(storage_dir: &PathBuf) -> Result<Self> {
        let config = Config::load_or_default(storage_dir.join("config.toml"));
        let store: Arc<dyn StateStore> = Arc::new(LocalStore::new(storage_dir));

        let registry = Arc::new(DepartmentRegistry::new(
            store.load_departments().await?,
            config.default_department.clone(),
        ));
        let bindings = Arc::new(ChannelBindings::load(Arc::clone(&store)).await?);
        let notices = Arc::new(NoticeStore::load(Arc::clone(&store)).await?);
        let fetcher: Arc<dyn FetchNotices> =
            Arc::new(NoticeFetcher::new(&config.crawler, &config.selectors)?);

        Ok(Self {
            config,
            registry,
            bindings,
            notices,
            fetcher,
        })
    }

    fn queries(&self) -> QueryService {
        QueryService::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.bindings),
            Arc::clone(&self.notices),
            Arc::clone(&self.fetcher),
            self.config.view.clone(),
        )
    }

    fn poller(&self) -> Result<Poller> {
        let sink: Arc<dyn NoticeSink> = if self.config.delivery.webhooks.is_empty() {
            Arc::new(ConsoleSink::new(self.config.view.preview_chars))
        } else {
            Arc::new(WebhookSink::new(
                reqwest::Client::builder()
                    .user_agent(&self.config.crawler.user_agent)
                    .timeout(Duration::from_secs(self.config.crawler.timeout_secs))
                    .build()?,
                self.config.delivery.webhooks.clone(),
                self.config.view.preview_chars,
            ))
        };

        Ok(Poller::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.bindings),
            Arc::clone(&self.notices),
            Arc::clone(&self.fetcher),
            sink,
            Duration::from_secs(self.config.poll.interval_secs),
        ))
    }
}

/// Print one page of a view session, navigating to the requested page first.
fn print_view(heading: &str, mut session: ViewSession, page: usize) {
    for _ in 1..page {
        if session.next().is_err() {
            break;
        }
    }
    let Ok(view) = session.current() else {
        return;
    };

    println!("{heading} (page {}/{})", view.page, view.max_page);
    for (i, notice) in view.items().iter().enumerate() {
        println!("  {}. {} ({})", i + 1, notice.title, notice.date);
        let preview = view.preview(notice);
        if !preview.is_empty() {
            println!("     {preview}");
        }
        println!("     {}", notice.url);
    }
}

fn print_outcome(outcome: QueryOutcome, page: usize) {
    match outcome {
        QueryOutcome::View { heading, session } => print_view(&heading, session, page),
        QueryOutcome::Nothing(message) => println!("{message}"),
        QueryOutcome::BadInput(message) => println!("{message}"),
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let app = App::load(&cli.storage_dir).await?;

    match cli.command {
        Command::Run => {
            app.config.validate()?;
            log::info!(
                "deptwatch starting: {} departments, polling every {}s",
                app.registry.len(),
                app.config.poll.interval_secs
            );
            app.poller()?.run().await;
        }

        Command::Poll => {
            let summary = app.poller()?.poll_once().await?;
            log::info!(
                "poll tick: {} bindings, {} new, {} delivered, {} skipped",
                summary.bindings,
                summary.new_notices,
                summary.delivered,
                summary.skipped
            );
        }

        Command::List { channel, page } => {
            let outcome = app.queries().list(&channel).await?;
            print_outcome(outcome, page);
        }

        Command::Search { keyword, page } => {
            let outcome = app.queries().search(&keyword).await?;
            print_outcome(outcome, page);
        }

        Command::Date { date, page } => {
            let outcome = app.queries().on_date(&date).await?;
            print_outcome(outcome, page);
        }

        Command::Bind {
            department,
            channel,
        } => match app.queries().bind(&channel, &department).await? {
            BindOutcome::Bound => {
                println!("channel '{channel}' now follows '{department}'");
            }
            BindOutcome::UnknownDepartment => {
                println!(
                    "'{department}' is not registered; run 'departments' for the known list"
                );
            }
        },

        Command::Departments => {
            let names = app.queries().departments();
            if names.is_empty() {
                println!("no departments registered");
            } else {
                for name in names {
                    println!("{name}");
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            app.config.validate()?;
            log::info!("✓ Config OK");
            log::info!(
                "Registry: {} departments, store: {} notices",
                app.registry.len(),
                app.notices.len().await
            );
            log::info!("All validations passed!");
        }
    }

    Ok(())
}

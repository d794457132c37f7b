//! Command implementations for the CLI interface.
//!
//! The printing commands render the same derived views the dashboard shows, so
//! `tb list --search api` prints exactly what the list pane would.

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use clap_complete::{generate, Shell};
use tracing::info;

use crate::api::ApiClient;
use crate::chat::{ChatSession, Role};
use crate::config::Config;
use crate::display::{parse_month_input, render_board, render_calendar, render_detail, render_list};
use crate::fields::ViewType;
use crate::store::TaskStore;
use crate::tui::app::App;
use crate::tui::run::run_dashboard;
use crate::views::{board_view, calendar_view, list_view};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive dashboard.
    Ui {
        /// View to open with: list | board | calendar. Defaults to the config's default_view.
        #[arg(long, value_enum)]
        view: Option<ViewType>,
    },

    /// Print the list view.
    List {
        /// Only tasks whose title or description contains this text (case-insensitive).
        #[arg(long)]
        search: Option<String>,
    },

    /// Print the board, one column per status.
    Board {
        /// Only tasks whose title or description contains this text (case-insensitive).
        #[arg(long)]
        search: Option<String>,
    },

    /// Print a calendar month with tasks on their due dates.
    Calendar {
        /// Month to show as YYYY-MM. Defaults to the current month.
        #[arg(long)]
        month: Option<String>,
        /// Only tasks whose title or description contains this text (case-insensitive).
        #[arg(long)]
        search: Option<String>,
    },

    /// Show every field of one task. Prints nothing if the id is unknown.
    View {
        /// Task id.
        id: String,
    },

    /// Send one message to the AI assistant and print its reply.
    Chat {
        /// Message text; multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn apply_search(store: &mut TaskStore, search: Option<String>) {
    if let Some(q) = search {
        store.set_search_query(q);
    }
}

/// Launch the dashboard.
pub fn cmd_ui(mut store: TaskStore, config: &Config, view: Option<ViewType>) {
    store.set_view_type(view.unwrap_or(config.default_view));
    let client = ApiClient::from_config(config);
    let mut app = App::new(store, client, today());
    info!("dashboard started");
    if let Err(e) = run_dashboard(&mut app) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Print the list view.
pub fn cmd_list(store: &mut TaskStore, search: Option<String>) {
    apply_search(store, search);
    store.set_view_type(ViewType::List);
    let tasks = list_view(store);
    print!("{}", render_list(store, &tasks, today()));
}

/// Print the board.
pub fn cmd_board(store: &mut TaskStore, search: Option<String>) {
    apply_search(store, search);
    store.set_view_type(ViewType::Board);
    let board = board_view(store);
    print!("{}", render_board(store, &board));
}

/// Print a calendar month.
pub fn cmd_calendar(store: &mut TaskStore, month: Option<String>, search: Option<String>) {
    let today = today();
    let month = match month {
        Some(m) => match parse_month_input(&m) {
            Some(d) => d,
            None => {
                eprintln!("Invalid month '{m}'. Use YYYY-MM.");
                std::process::exit(1);
            }
        },
        None => today,
    };
    apply_search(store, search);
    store.set_view_type(ViewType::Calendar);
    let cal = calendar_view(store, month, today);
    print!("{}", render_calendar(&cal));
}

/// Print one task through the same selection the detail drawer uses.
pub fn cmd_view(store: &mut TaskStore, id: String) {
    store.open_detail(id);
    if let Some(task) = store.selected_task() {
        print!("{}", render_detail(task, today()));
    }
}

/// One chat round-trip against the configured backend.
pub fn cmd_chat(config: &Config, message: Vec<String>) {
    let client = ApiClient::from_config(config);
    if !client.has_token() {
        eprintln!("Warning: no auth_token cookie configured; the backend may reject the request.");
    }
    let mut chat = ChatSession::new();
    if !chat.send(&client, &message.join(" ")) {
        eprintln!("Nothing to send.");
        std::process::exit(1);
    }
    if let Some(toast) = chat.toast() {
        eprintln!("{toast}");
        std::process::exit(1);
    }
    if let Some(reply) = chat.messages().iter().rev().find(|m| m.role == Role::Assistant) {
        println!("{}", reply.content);
    }
    if let Some(id) = chat.conversation_id() {
        info!(conversation_id = %id, "chat finished");
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

//! # tb - Task Board
//!
//! A terminal task dashboard over an in-memory task list, with three views of
//! the same collection and an AI chat pane backed by a JSON HTTP API.
//!
//! ## Key Features
//!
//! - **Three views**: a list table, a kanban board with one column per status,
//!   and a month calendar placing tasks on their due dates
//! - **Live search**: a case-insensitive filter over title and description that
//!   every view respects
//! - **Detail drawer**: every field of the selected task, with status changes and
//!   deletion
//! - **New-task form**: title, description, status, priority, assignee, project
//!   and due date
//! - **AI chat**: a conversation with the backend assistant, threaded by
//!   conversation id
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the dashboard
//! tb ui
//!
//! # Print the views
//! tb list --search api
//! tb board
//! tb calendar --month 2026-10
//!
//! # Ask the assistant
//! tb chat "What are my pending tasks?"
//! ```
//!
//! Tasks live only in memory. They start from a built-in seed list, or from a
//! JSON file given with `--seed`, and nothing is written back.
//!
//! Settings are read from `~/.taskboard/config.toml`; `TB_APP_URL` and
//! `TB_COOKIE` override the backend URL and cookie, and `TB_LOG` sets the log
//! filter.

use clap::Parser;

pub mod api;
pub mod chat;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod display;
pub mod error;
pub mod fields;
pub mod logging;
pub mod store;
pub mod task;
pub mod views;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::{default_config_path, Config};
use store::{load_seed_file, TaskStore};

fn main() {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = match Config::resolve(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    // The dashboard owns the terminal, so it only logs to a file.
    match (&cli.command, &config.log_file) {
        (Commands::Ui { .. }, Some(path)) => logging::init_file(path),
        (Commands::Ui { .. }, None) => {}
        _ => logging::init_stderr(),
    }

    let seed_path = cli.seed.clone().or_else(|| config.seed_file.clone());
    let mut store = match seed_path {
        Some(path) => match load_seed_file(&path) {
            Ok(tasks) => TaskStore::new(tasks),
            Err(e) => {
                eprintln!("Failed to load seed tasks: {e}");
                std::process::exit(1);
            }
        },
        None => TaskStore::with_seed(),
    };

    match cli.command {
        Commands::Ui { view } => cmd_ui(store, &config, view),
        Commands::List { search } => cmd_list(&mut store, search),
        Commands::Board { search } => cmd_board(&mut store, search),
        Commands::Calendar { month, search } => cmd_calendar(&mut store, month, search),
        Commands::View { id } => cmd_view(&mut store, id),
        Commands::Chat { message } => cmd_chat(&config, message),
        Commands::Completions { shell } => cmd_completions(shell),
    }
}

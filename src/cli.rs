use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Task dashboard over an in-memory task list.
/// Tasks start from a built-in seed list or the JSON file passed via --seed.
#[derive(Parser)]
#[command(name = "tb", version, about = "Task dashboard with list, board and calendar views")]
pub struct Cli {
    /// Path to the TOML config file. Defaults to ~/.taskboard/config.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON array of tasks to start from instead of the built-in seed list.
    #[arg(long, global = true)]
    pub seed: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tb", "list", "--seed", "tasks.json", "--search", "api"])
            .unwrap();
        assert_eq!(cli.seed, Some(PathBuf::from("tasks.json")));
        match cli.command {
            Commands::List { search } => assert_eq!(search.as_deref(), Some("api")),
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_chat_requires_a_message() {
        assert!(Cli::try_parse_from(["tb", "chat"]).is_err());
        let cli = Cli::try_parse_from(["tb", "chat", "add", "a", "task"]).unwrap();
        match cli.command {
            Commands::Chat { message } => assert_eq!(message.join(" "), "add a task"),
            _ => panic!("expected chat"),
        }
    }

    #[test]
    fn test_ui_view_flag() {
        let cli = Cli::try_parse_from(["tb", "ui", "--view", "board"]).unwrap();
        match cli.command {
            Commands::Ui { view } => assert_eq!(view, Some(crate::fields::ViewType::Board)),
            _ => panic!("expected ui"),
        }
    }
}

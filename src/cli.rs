use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Weekly planner with a slot timeline and a kanban board.
/// Data lives in ~/.weekplan unless --dir is given.
#[derive(Parser)]
#[command(name = "wp", version, about = "Weekly task planner")]
pub struct Cli {
    /// Data directory holding one JSON file per user.
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// User whose planner to open. Defaults to the most recently used one.
    #[arg(long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Duration, Status};

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["wp", "list", "--user", "ada", "--dir", "/tmp/wp"]).unwrap();
        assert_eq!(cli.user.as_deref(), Some("ada"));
        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/wp")));
        assert!(matches!(cli.command, Commands::List { open: false, .. }));
    }

    #[test]
    fn test_subcommand_arguments() {
        let cli = Cli::try_parse_from(["wp", "add", "Write report", "--duration", "90m", "--urgent"]).unwrap();
        match cli.command {
            Commands::Add { title, duration, urgent, .. } => {
                assert_eq!(title, "Write report");
                assert_eq!(duration, Some(Duration::M90));
                assert!(urgent);
            }
            _ => panic!("expected add"),
        }

        let cli = Cli::try_parse_from(["wp", "status", "3", "in-review", "--index", "0"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Status { id: 3, status: Status::InReview, index: Some(0) }
        ));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Cli::try_parse_from(["wp", "resize", "1", "50"]).is_err());
        assert!(Cli::try_parse_from(["wp", "update", "1", "--due", "today", "--clear-due"]).is_err());
    }
}

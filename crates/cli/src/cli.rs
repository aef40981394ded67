//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "torrdispatcher",
    version,
    about = "Dispatch your torrents to your different watchdirs"
)]
pub struct Cli {
    /// Configuration file (defaults to the user configuration directory)
    #[arg(short, long, global = true, env = "TORRDISPATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Set the debug level
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Limit to group names (repeatable)
    #[arg(short = 'l', long = "limit-to", value_name = "NAME", global = true)]
    pub limit_to: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan and dispatch the torrent files
    Move(MoveArgs),
    /// Search in downloads
    Search(SearchArgs),
    /// Check if watch directories already have a torrent with the same content
    Have(HaveArgs),
    /// List torrent groups
    List,
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    /// Only log what would be done
    #[arg(short = 'D', long)]
    pub dryrun: bool,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Terms to search
    #[arg(required = true, num_args = 1..)]
    pub terms: Vec<String>,

    /// Hide group names in the results
    #[arg(short = 'H', long)]
    pub hide_groups: bool,
}

#[derive(Debug, Args)]
pub struct HaveArgs {
    /// Torrents to look for
    #[arg(required = true, num_args = 1..)]
    pub torrents: Vec<PathBuf>,

    /// Hide group names in the results
    #[arg(short = 'H', long)]
    pub hide_groups: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_with_global_flags() {
        let cli = Cli::try_parse_from([
            "torrdispatcher",
            "move",
            "-D",
            "-d",
            "-l",
            "music",
            "--limit-to",
            "movies",
        ])
        .unwrap();

        assert!(cli.debug);
        assert_eq!(cli.limit_to, vec!["music", "movies"]);
        assert!(matches!(cli.command, Some(Command::Move(MoveArgs { dryrun: true }))));
    }

    #[test]
    fn test_search_requires_terms() {
        assert!(Cli::try_parse_from(["torrdispatcher", "search"]).is_err());

        let cli = Cli::try_parse_from(["torrdispatcher", "search", "-H", "foo", "bar"]).unwrap();
        match cli.command {
            Some(Command::Search(args)) => {
                assert_eq!(args.terms, vec!["foo", "bar"]);
                assert!(args.hide_groups);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["torrdispatcher", "--config", "/tmp/c.toml"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }
}

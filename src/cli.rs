//! Command-line interface for asmdex.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "asmdex")]
#[command(about = "Symbol index and definition lookup for fasm-style assembly", long_about = None)]
pub struct Cli {
    /// Workspace root
    #[arg(long, short, global = true, default_value = ".")]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write default settings to .asmdex/config/settings.json
    Init {
        /// Overwrite existing settings
        #[arg(long)]
        force: bool,
    },
    /// Index the workspace and write the symbol cache
    Scan,
    /// Print whether a name is a label or a value
    Kind { name: String },
    /// List the definitions a name resolves to
    #[command(alias = "def")]
    Goto { name: String },
    /// Resolve the identifier at a 1-based line and column of a file
    At {
        file: PathBuf,
        line: u32,
        column: u32,
    },
    /// Keep the index and cache up to date until interrupted
    Watch {
        /// Quiet period before on-disk changes are applied, in milliseconds
        #[arg(long, default_value_t = 500)]
        debounce_ms: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_goto() {
        let cli = Cli::try_parse_from(["asmdex", "--root", "/w", "def", "start"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("/w"));
        assert!(matches!(cli.command, Command::Goto { name } if name == "start"));
    }

    #[test]
    fn test_parse_at() {
        let cli = Cli::try_parse_from(["asmdex", "at", "main.asm", "3", "7"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(matches!(
            cli.command,
            Command::At { line: 3, column: 7, .. }
        ));
    }

    #[test]
    fn test_watch_default_debounce() {
        let cli = Cli::try_parse_from(["asmdex", "watch"]).unwrap();
        assert!(matches!(cli.command, Command::Watch { debounce_ms: 500 }));
    }

    #[test]
    fn test_parse_init() {
        let cli = Cli::try_parse_from(["asmdex", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Command::Init { force: true }));
    }

    #[test]
    fn test_missing_subcommand() {
        assert!(Cli::try_parse_from(["asmdex"]).is_err());
    }
}

//! CLI command definitions and dispatch for the `focusflow` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod session;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat with a local model and keep every conversation.
#[derive(Parser)]
#[command(name = "focusflow", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to `server.port` from config.toml).
        #[arg(long, short)]
        port: Option<u16>,

        /// Address to bind (defaults to `server.host` from config.toml).
        #[arg(long)]
        host: Option<String>,
    },

    /// Send one prompt and print the reply.
    Chat {
        /// The prompt to send.
        prompt: String,

        /// Continue an existing session instead of opening a new one.
        #[arg(long, short)]
        session: Option<String>,
    },

    /// List sessions grouped by recency.
    #[command(alias = "ls")]
    Sessions {
        /// Only show sessions whose title contains this keyword.
        #[arg(long, short)]
        query: Option<String>,
    },

    /// Print the full history of a session.
    History {
        /// Session ID.
        id: String,
    },

    /// Rename a session.
    Rename {
        /// Session ID.
        id: String,

        /// New title.
        title: String,
    },

    /// Delete a session and all of its messages.
    #[command(alias = "rm")]
    Delete {
        /// Session ID.
        id: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate for.
        shell: Shell,
    },
}

/// Parse a session ID argument.
pub(crate) fn parse_session_id(s: &str) -> anyhow::Result<uuid::Uuid> {
    s.trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("'{s}' is not a valid session ID"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_with_session() {
        let cli = Cli::try_parse_from([
            "focusflow",
            "chat",
            "How do I use Docker?",
            "--session",
            "0192f0c1-0000-7000-8000-000000000000",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Chat { prompt, session } => {
                assert_eq!(prompt, "How do I use Docker?");
                assert!(session.is_some());
            }
            _ => panic!("expected chat command"),
        }
    }

    #[test]
    fn test_parse_verbosity_and_aliases() {
        let cli = Cli::try_parse_from(["focusflow", "-vv", "ls", "-q", "docker"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Sessions { query: Some(ref q) } if q == "docker"));

        let cli = Cli::try_parse_from(["focusflow", "rm", "abc", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Delete { force: true, .. }));
    }

    #[test]
    fn test_parse_session_id() {
        assert!(parse_session_id(" 0192f0c1-0000-7000-8000-000000000000 ").is_ok());
        assert!(parse_session_id("docker").is_err());
    }
}

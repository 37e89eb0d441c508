use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Event Corner: email-link approval service for community events
#[derive(Parser)]
#[command(name = "event-corner", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind (defaults to PORT, then 5000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage event approvals
    Approval {
        #[command(subcommand)]
        command: ApprovalCommands,
    },

    /// Check that the SMTP relay accepts our credentials
    CheckEmail,

    /// Run the banner OCR analyzer
    Banner {
        #[command(subcommand)]
        command: BannerCommands,
    },
}

#[derive(Subcommand)]
pub enum ApprovalCommands {
    /// List events awaiting their contact's decision
    List,
    /// Email a fresh approve/reject link to the event's contact
    Request { event_id: i64 },
    /// Show recorded decisions for an event
    History { event_id: i64 },
}

#[derive(Subcommand)]
pub enum BannerCommands {
    /// Extract event details from a banner image
    Analyze { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["event-corner"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_approval_request_parses_event_id() {
        let cli = Cli::try_parse_from(["event-corner", "approval", "request", "42"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Approval {
                command: ApprovalCommands::Request { event_id: 42 }
            })
        ));
    }

    #[test]
    fn test_serve_port_flag() {
        let cli = Cli::try_parse_from(["event-corner", "serve", "--port", "8080"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { port: Some(8080) })));
    }

    #[test]
    fn test_check_email_is_kebab_case() {
        let cli = Cli::try_parse_from(["event-corner", "check-email"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::CheckEmail)));
    }
}

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "credint")]
#[command(author = "Credint Team")]
#[command(version)]
#[command(about = "Explainable credit-risk scoring service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration directory (default.toml plus per-environment files)
    #[arg(short, long, default_value = "config", env = "CREDINT_CONFIG_DIR")]
    pub config: String,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP API with periodic refreshes (default)
    Serve {
        /// Override api.port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run a single refresh and print the batch summary
    Refresh,
    /// Score one entity from fresh signals without persisting
    Score {
        /// Entity identifier, e.g. AAPL
        entity: String,
    },
    /// Print the stored score history of an entity
    History {
        /// Entity identifier, e.g. AAPL
        entity: String,
    },
}

impl Cli {
    /// The subcommand to run; `serve` when none was given.
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Serve { port: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_is_the_default() {
        let cli = Cli::parse_from(["credint"]);
        assert_eq!(cli.command(), Commands::Serve { port: None });
        assert_eq!(cli.config, "config");
    }

    #[test]
    fn test_parses_subcommands() {
        let cli = Cli::parse_from(["credint", "--config", "/etc/credint", "score", "aapl"]);
        assert_eq!(cli.config, "/etc/credint");
        assert_eq!(
            cli.command(),
            Commands::Score {
                entity: "aapl".to_string()
            }
        );

        let cli = Cli::parse_from(["credint", "serve", "--port", "9100"]);
        assert_eq!(cli.command(), Commands::Serve { port: Some(9100) });
    }
}

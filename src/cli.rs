//! Command-line interface definition for the Parley demo binary

use clap::Parser;

/// Parley demo - drives the session layer against in-process collaborators
#[derive(Parser, Debug)]
#[command(name = "parley", version, about)]
pub struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, env = "PARLEY_CONFIG")]
    pub config: Option<String>,

    /// Email to register the demo account with
    #[arg(long, default_value = "ada@example.com")]
    pub email: String,

    /// Password for the demo account
    #[arg(long, default_value = "s3cret!")]
    pub password: String,

    /// Participant id to open a conversation with
    #[arg(long, default_value = "uid-peer")]
    pub peer: String,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

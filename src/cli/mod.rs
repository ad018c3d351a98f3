//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "netcfg",
    version,
    about = "Parse, redact and compare network device configurations",
    long_about = "netcfg splits Cisco and Aruba configuration files into redacted, metadata-tagged \
                  blocks, retrieves the blocks relevant to a question, and compares a golden \
                  configuration against a candidate with strictly separated contexts."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/netcfg/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a config file and print its redacted blocks
    Parse {
        /// Config file to parse
        file: PathBuf,

        /// Role recorded in the chunk metadata
        #[arg(short, long, value_parser = ["golden", "candidate", "unspecified"], default_value = "unspecified")]
        role: String,

        /// Print chunks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print content fingerprints
    Fingerprint {
        /// Files to fingerprint
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Retrieve the blocks most relevant to a question
    Ask {
        /// Question or search text
        query: String,

        /// Config files to search
        #[arg(short, long = "file", required = true)]
        files: Vec<PathBuf>,

        /// Number of blocks to return (defaults to retrieval.top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Only return blocks of this section type (e.g. "interface", "router_ospf")
        #[arg(short, long)]
        section: Option<String>,
    },

    /// Compare a candidate config against a golden config
    Compare {
        /// Golden (reference) config
        golden: PathBuf,

        /// Candidate config
        candidate: PathBuf,

        /// Focus of the comparison
        #[arg(short, long, default_value = "Compare VLANs, interfaces, routing and access lists")]
        query: String,

        /// Blocks retrieved per file (defaults to retrieval.compare_top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Only compare blocks of this section type
        #[arg(short, long)]
        section: Option<String>,

        /// Report mode (defaults to retrieval.compare_mode)
        #[arg(short, long, value_parser = ["quick", "deep"])]
        mode: Option<String>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration and the redaction rules template
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

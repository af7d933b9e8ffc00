use clap::{Args, Parser, Subcommand};
use record_import_client::{BlobQueryInput, BlobState};
use std::path::PathBuf;

const USAGE_EXAMPLES: &str = "\
Examples:
  $ record-import profiles create <id> [file]
  $ record-import blobs create [file] -p <id> -t <contentType>
  $ record-import blobs query -s transformed
  $ record-import blobs query -a 2022-05-12 -b 2022-05-13

Every option can also be given with a RECORD_IMPORT_* environment variable \
(RECORD_IMPORT_API_URL, RECORD_IMPORT_LOG_LEVEL, ...). Connection settings \
may also come from a config.toml file.";

#[derive(Parser, Debug)]
#[clap(
    name = "record-import",
    author,
    version,
    about = "Command-line client for the record import service",
    arg_required_else_help = true,
    after_help = USAGE_EXAMPLES
)]
pub struct Cli {
    #[clap(flatten)]
    pub connection: ConnectionArgs,

    #[clap(long, short, env = "RECORD_IMPORT_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionArgs {
    #[clap(long, env = "RECORD_IMPORT_API_URL", global = true, help = "Base URL of the record import API")]
    pub api_url: Option<String>,

    #[clap(long, env = "RECORD_IMPORT_API_USERNAME", global = true)]
    pub api_username: Option<String>,

    #[clap(long, env = "RECORD_IMPORT_API_PASSWORD", hide_env_values = true, global = true)]
    pub api_password: Option<String>,

    #[clap(long, env = "RECORD_IMPORT_USER_AGENT", global = true)]
    pub user_agent: Option<String>,

    #[clap(long, env = "RECORD_IMPORT_TIMEOUT", global = true, help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[clap(
        long,
        env = "RECORD_IMPORT_CONFIG",
        global = true,
        help = "Configuration file (defaults to record-import/config.toml in the user config directory)"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Operate on profiles
    Profiles {
        #[clap(subcommand)]
        action: ProfileCommands,
    },
    /// Operate on blobs
    Blobs {
        #[clap(subcommand)]
        action: BlobCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Create or update a profile
    #[clap(visible_aliases = ["create", "update"])]
    Modify {
        id: String,
        #[clap(help = "JSON file with the profile, read from stdin when omitted")]
        file: Option<PathBuf>,
    },
    /// Query profiles
    Query,
    /// Read a profile
    Read { id: String },
    /// Delete a profile
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum BlobCommands {
    /// Create a blob
    Create {
        #[clap(help = "Blob content, read from stdin when omitted")]
        file: Option<PathBuf>,
        #[clap(short, long)]
        profile: String,
        #[clap(short = 't', long = "contentType")]
        content_type: String,
    },
    /// Read a blob
    Read { id: String },
    /// Delete a blob
    Delete { id: String },
    /// Read blob content
    #[clap(name = "readContent")]
    ReadContent { id: String, file: Option<PathBuf> },
    /// Delete blob content
    #[clap(name = "deleteContent")]
    DeleteContent { id: String },
    /// Abort blob processing
    Abort { id: String },
    /// Query blobs
    #[clap(after_help = blob_query_help())]
    Query(BlobQueryArgs),
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobQueryArgs {
    #[clap(short, long, help = "Query blobs by state")]
    pub state: Option<String>,

    #[clap(short = 'b', long = "createdBefore", conflicts_with = "created_day", help = "Query blobs created before time")]
    pub created_before: Option<String>,

    #[clap(short = 'a', long = "createdAfter", conflicts_with = "created_day", help = "Query blobs created after time")]
    pub created_after: Option<String>,

    #[clap(short = 'B', long = "modifiedBefore", conflicts_with = "modified_day", help = "Query blobs modified before time")]
    pub modified_before: Option<String>,

    #[clap(short = 'A', long = "modifiedAfter", conflicts_with = "modified_day", help = "Query blobs modified after time")]
    pub modified_after: Option<String>,

    #[clap(short = 'd', long = "createdDay", help = "Query blobs created by day")]
    pub created_day: Option<String>,

    #[clap(short = 'D', long = "modifiedDay", help = "Query blobs modified by day")]
    pub modified_day: Option<String>,
}

impl From<BlobQueryArgs> for BlobQueryInput {
    fn from(args: BlobQueryArgs) -> Self {
        BlobQueryInput {
            state: args.state,
            created_after: args.created_after,
            created_before: args.created_before,
            modified_after: args.modified_after,
            modified_before: args.modified_before,
            created_day: args.created_day,
            modified_day: args.modified_day,
        }
    }
}

fn blob_query_help() -> String {
    let states = BlobState::ALL
        .iter()
        .map(BlobState::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "States: {}\nTimestamp formats: YYYY-MM-DD or YYYY-MM-DDThh:mm:ss±hh (day options accept dates only)",
        states
    )
}

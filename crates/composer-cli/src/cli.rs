use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "composer")]
#[command(about = "Stage, compress and send chat attachments from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the composer config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress an image the way it is compressed before upload
    Compress {
        /// Image file to compress
        input: PathBuf,
        /// Output path (defaults to `<stem>.compressed.jpg` next to the input)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Size budget in bytes
        #[arg(long, value_name = "BYTES")]
        budget: Option<u64>,
        /// JPEG quality, 1-100
        #[arg(long, value_name = "Q")]
        quality: Option<u8>,
    },
    /// Validate files into a staging list and print it
    Stage {
        /// Files to stage
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Print the file list markup instead of a table
        #[arg(long)]
        html: bool,
    },
    /// Send a message and attachments to a room
    Send {
        /// Message text
        #[arg(short, long)]
        text: Option<String>,
        /// Files to attach
        files: Vec<PathBuf>,
        /// Chat server base URL
        #[arg(long, value_name = "URL")]
        server: Option<String>,
        /// Room id
        #[arg(long, value_name = "ID")]
        room: Option<u64>,
        /// CSRF token sent with every request
        #[arg(long, value_name = "TOKEN")]
        csrf_token: Option<String>,
    },
    /// Show or write the composer config
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the resolved config as JSON
    Show,
    /// Initialize or update the config file
    Init {
        /// Chat server base URL
        #[arg(long, value_name = "URL")]
        server_url: Option<String>,
        /// Default room id
        #[arg(long, value_name = "ID")]
        room_id: Option<u64>,
        /// Compression size budget in bytes
        #[arg(long, value_name = "BYTES")]
        budget: Option<u64>,
        /// JPEG quality, 1-100
        #[arg(long, value_name = "Q")]
        quality: Option<u8>,
        /// Thumbnail edge in pixels
        #[arg(long, value_name = "PX")]
        thumbnail_size: Option<u32>,
    },
}

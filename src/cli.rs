use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about = "AI quality and virality report for YouTube videos", long_about = None)]
pub struct Args {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a video and store the report in its history.
    /// Requires GEMINI_API_KEY.
    Analyze {
        /// A YouTube video url
        url: String,

        /// Print the selected analysis as JSON
        #[clap(long, default_value = "false")]
        json: bool,
    },
    /// List stored analyses of a video, or show one of them.
    History {
        /// A YouTube video url or an 11-character video id
        video: String,

        /// Show the entry with this timestamp or list index (0 is newest)
        #[clap(short, long)]
        select: Option<String>,

        /// Print as JSON
        #[clap(long, default_value = "false")]
        json: bool,
    },
    /// Print the video id found in a url.
    VideoId {
        url: String,
    },
}

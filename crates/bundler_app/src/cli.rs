use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bundler")]
#[command(about = "Save web pages as single self-contained HTML files")]
#[command(
    after_help = "Config file keys (output_dir, cache_dir, log_file, options, connect_timeout_secs, request_timeout_secs, redirect_limit, user_agent) are read from ./bundler.ron unless --config is given. CLI flags override config."
)]
pub struct Args {
    /// Page URLs. Input without a scheme gets https:// prepended.
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Directory receiving index.html and report.json (overrides config).
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// RON config file. Default: ./bundler.ron when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Do not stamp title, URL and date into a leading comment.
    #[arg(long)]
    pub no_comment: bool,

    /// Drop every <script> element instead of inlining external ones.
    #[arg(long)]
    pub no_scripts: bool,

    /// Leave <a> and <link> references relative.
    #[arg(long)]
    pub keep_relative: bool,

    /// Basic-auth user name; used together with --password.
    #[arg(long, requires = "password")]
    pub username: Option<String>,

    /// Basic-auth password; used together with --username.
    #[arg(long, requires = "username")]
    pub password: Option<String>,

    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Clone, Debug)]
#[clap(version = "0.1", about = "Mint a Void Society door from your wallet")]
pub struct Opts {
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Subcommand, Clone, Debug)]
pub enum SubCommand {
    Init(InitArgs),
    Status(StatusArgs),
    Connect(ConnectArgs),
    Mint(MintArgs),
    Watch(WatchArgs),
}

#[derive(Args, Clone, Debug)]
pub struct InitArgs {
    #[clap(short = 'f', long)]
    pub force: bool,
    #[clap(long, default_value = "~/.void-mint/config.toml")]
    pub config_path: String,
    #[clap(long, default_value = "rinkeby")]
    pub default_network: String,
    #[clap(long)]
    pub provider_url: Option<String>,
    #[clap(long, default_value = "0x4")]
    pub chain_id: String,
}

#[derive(Args, Clone, Debug)]
pub struct StatusArgs {
    #[clap(long, default_value = "~/.void-mint/config.toml")]
    pub config_path: String,
    #[clap(long)]
    pub network: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct ConnectArgs {
    #[clap(long, default_value = "~/.void-mint/config.toml")]
    pub config_path: String,
    #[clap(long)]
    pub network: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct MintArgs {
    #[clap(long, default_value = "~/.void-mint/config.toml")]
    pub config_path: String,
    #[clap(long)]
    pub network: Option<String>,
    /// Seconds to keep listening for the mint event after confirmation.
    #[clap(long, default_value = "60")]
    pub event_wait: u64,
}

#[derive(Args, Clone, Debug)]
pub struct WatchArgs {
    #[clap(long, default_value = "~/.void-mint/config.toml")]
    pub config_path: String,
    #[clap(long)]
    pub network: Option<String>,
    /// How often to re-read the wallet's accounts, in seconds.
    #[clap(long, default_value = "5")]
    pub account_poll_interval: u64,
}

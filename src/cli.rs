use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "imgbatch")]
#[command(about = "Batch image compression and upload service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Server(ServerArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServerArgs {
    /// Address to bind the HTTP server to (overrides server.bind_addr)
    #[arg(long)]
    pub address: Option<SocketAddr>,

    /// Configuration file (overrides IMGBATCH_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_args() {
        let cli = Cli::parse_from([
            "imgbatch",
            "server",
            "--address",
            "127.0.0.1:9000",
            "--config",
            "custom.toml",
        ]);

        let Commands::Server(args) = cli.command;
        assert_eq!(args.address.unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(args.config.unwrap(), PathBuf::from("custom.toml"));
    }

    #[test]
    fn server_args_are_optional() {
        let cli = Cli::parse_from(["imgbatch", "server"]);
        let Commands::Server(args) = cli.command;
        assert!(args.address.is_none());
        assert!(args.config.is_none());
    }
}

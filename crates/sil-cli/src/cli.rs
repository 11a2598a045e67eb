use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sil",
    about = "School-records Integrity Ledger — fingerprinting, audit, and verification",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the SIL HTTP server
    Serve(ServeArgs),
    /// Run the fingerprint/verify pipeline on seeded demo data
    Demo(DemoArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Config file (TOML); flags below override it
    #[arg(long)]
    pub config: Option<String>,
    #[arg(long)]
    pub bind: Option<String>,
    /// Bearer token for the admin surface
    #[arg(long)]
    pub admin_token: Option<String>,
    /// Birth transactions as pending instead of confirmed
    #[arg(long)]
    pub async_confirm: bool,
    /// Seed demo records so the API has something to show
    #[arg(long)]
    pub demo: bool,
}

#[derive(Args)]
pub struct DemoArgs {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve() {
        let cli = Cli::try_parse_from(["sil", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve(_)));
    }

    #[test]
    fn parse_serve_with_flags() {
        let cli = Cli::try_parse_from([
            "sil",
            "serve",
            "--bind",
            "0.0.0.0:9000",
            "--admin-token",
            "secret",
            "--async-confirm",
            "--demo",
        ])
        .unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, Some("0.0.0.0:9000".into()));
            assert_eq!(args.admin_token, Some("secret".into()));
            assert!(args.async_confirm);
            assert!(args.demo);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_demo() {
        let cli = Cli::try_parse_from(["sil", "demo"]).unwrap();
        assert!(matches!(cli.command, Command::Demo(_)));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["sil", "--verbose", "demo"]).unwrap();
        assert!(cli.verbose);
    }
}

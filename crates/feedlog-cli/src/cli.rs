use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "feedlog",
    about = "Append-only message feeds: create, append, read, follow and snapshot",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Daemon base URL. Overrides the config file.
    #[arg(long, global = true)]
    pub daemon_url: Option<String>,

    /// Client configuration (TOML).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Feed name registry file.
    #[arg(long, global = true, default_value = ".feedlog/registry.json")]
    pub registry: PathBuf,

    /// Snapshot blob directory.
    #[arg(long, global = true, default_value = ".feedlog/blobs")]
    pub blobs: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a new feed, optionally registering a name for it
    CreateFeed(CreateFeedArgs),
    /// Print the feed id registered for a name
    FeedId(FeedIdArgs),
    /// Delete a feed by name or feed:// URI
    DeleteFeed(DeleteFeedArgs),
    /// Append JSON messages to a subfeed
    Append(AppendArgs),
    /// Print the messages of a subfeed
    Print(PrintArgs),
    /// Print the number of messages in a subfeed
    Count(CountArgs),
    /// Freeze subfeeds into an immutable snapshot
    Snapshot(SnapshotArgs),
    /// Check that the daemon is reachable
    Probe,
    /// Run the in-memory development daemon
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct CreateFeedArgs {
    pub name: Option<String>,
}

#[derive(Args)]
pub struct FeedIdArgs {
    pub name: String,
    #[arg(long)]
    pub create: bool,
}

#[derive(Args)]
pub struct DeleteFeedArgs {
    pub feed: String,
}

#[derive(Args)]
pub struct AppendArgs {
    /// Feed name or feed:// URI
    pub feed: String,
    pub subfeed: String,
    /// One JSON document per message
    #[arg(required = true)]
    pub messages: Vec<String>,
}

#[derive(Args)]
pub struct PrintArgs {
    /// Feed name, feed:// URI or sha1:// snapshot URI
    pub feed: String,
    pub subfeed: String,
    /// Print signed envelopes
    #[arg(long)]
    pub signed: bool,
    /// Keep waiting for new messages
    #[arg(short, long)]
    pub follow: bool,
    #[arg(long, default_value = "0")]
    pub position: u64,
}

#[derive(Args)]
pub struct CountArgs {
    pub feed: String,
    pub subfeed: String,
}

#[derive(Args)]
pub struct SnapshotArgs {
    pub feed: String,
    #[arg(required = true)]
    pub subfeeds: Vec<String>,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Overrides the server config file.
    #[arg(long)]
    pub bind: Option<String>,
    /// Server configuration (TOML).
    #[arg(long)]
    pub server_config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_create_feed() {
        let cli = Cli::try_parse_from(["feedlog", "create-feed"]).unwrap();
        if let Command::CreateFeed(args) = cli.command {
            assert_eq!(args.name, None);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_feed_id_create() {
        let cli = Cli::try_parse_from(["feedlog", "feed-id", "alerts", "--create"]).unwrap();
        if let Command::FeedId(args) = cli.command {
            assert!(args.create);
            assert_eq!(args.name, "alerts");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_append() {
        let cli = Cli::try_parse_from(["feedlog", "append", "alerts", "events", "{\"t\":1}", "2"]).unwrap();
        if let Command::Append(args) = cli.command {
            assert_eq!(args.subfeed, "events");
            assert_eq!(args.messages, vec!["{\"t\":1}", "2"]);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn append_requires_a_message() {
        assert!(Cli::try_parse_from(["feedlog", "append", "alerts", "events"]).is_err());
    }

    #[test]
    fn parse_print_follow() {
        let cli = Cli::try_parse_from(["feedlog", "print", "feed://abc", "events", "-f", "--position", "3"]).unwrap();
        if let Command::Print(args) = cli.command {
            assert!(args.follow);
            assert!(!args.signed);
            assert_eq!(args.position, 3);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_snapshot() {
        let cli = Cli::try_parse_from(["feedlog", "snapshot", "alerts", "a", "b"]).unwrap();
        if let Command::Snapshot(args) = cli.command {
            assert_eq!(args.subfeeds, vec!["a", "b"]);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "feedlog", "probe", "--daemon-url", "http://h:1", "--registry", "r.json", "-v",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Probe));
        assert_eq!(cli.daemon_url.as_deref(), Some("http://h:1"));
        assert_eq!(cli.registry, PathBuf::from("r.json"));
        assert!(cli.verbose);
    }

    #[test]
    fn parse_serve() {
        let cli = Cli::try_parse_from(["feedlog", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind.as_deref(), Some("0.0.0.0:8080"));
        } else { panic!("wrong command"); }
    }
}

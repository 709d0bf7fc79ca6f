use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use feedlog_registry::FileRegistry;
use feedlog_sdk::{ClientConfig, FeedClient, FetchOptions, LoadOptions, Message, Subfeed, SubfeedName};
use feedlog_server::{FeedServer, ServerConfig};
use feedlog_store::LocalBlobStore;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    if let Command::Serve(args) = cli.command {
        return cmd_serve(args).await;
    }
    let client = build_client(&cli)?;
    match cli.command {
        Command::CreateFeed(args) => cmd_create_feed(&client, args).await,
        Command::FeedId(args) => cmd_feed_id(&client, args).await,
        Command::DeleteFeed(args) => cmd_delete_feed(&client, args).await,
        Command::Append(args) => cmd_append(&client, args).await,
        Command::Print(args) => cmd_print(&client, args).await,
        Command::Count(args) => cmd_count(&client, args).await,
        Command::Snapshot(args) => cmd_snapshot(&client, args).await,
        Command::Probe => cmd_probe(&client).await,
        Command::Serve(_) => Ok(()),
    }
}

fn build_client(cli: &Cli) -> anyhow::Result<FeedClient> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ClientConfig::default(),
    };
    if let Some(url) = &cli.daemon_url {
        config.daemon_url = url.clone();
    }
    let registry = FileRegistry::open(&cli.registry)
        .with_context(|| format!("opening registry {}", cli.registry.display()))?;
    let blobs = LocalBlobStore::new(&cli.blobs);
    tracing::debug!(daemon = %config.daemon_url, "client configured");
    Ok(FeedClient::connect(config, Arc::new(blobs), Arc::new(registry))?)
}

async fn open_subfeed(
    client: &FeedClient,
    feed: &str,
    subfeed: &str,
    create: bool,
) -> anyhow::Result<Subfeed> {
    let feed = client.load_feed(feed, LoadOptions { create }).await?;
    Ok(feed.load_subfeed(subfeed)?)
}

async fn cmd_create_feed(client: &FeedClient, args: CreateFeedArgs) -> anyhow::Result<()> {
    let feed = client.create_feed(args.name.as_deref()).await?;
    println!("{} Created feed {}", "✓".green().bold(), feed.uri().cyan());
    if let Some(name) = args.name {
        println!("  Name: {}", name.yellow());
    }
    Ok(())
}

async fn cmd_feed_id(client: &FeedClient, args: FeedIdArgs) -> anyhow::Result<()> {
    let feed_id = client.get_feed_id(&args.name, args.create).await?;
    println!("{feed_id}");
    Ok(())
}

async fn cmd_delete_feed(client: &FeedClient, args: DeleteFeedArgs) -> anyhow::Result<()> {
    client.delete_feed(&args.feed).await?;
    println!("{} Deleted feed {}", "✓".green().bold(), args.feed.yellow());
    Ok(())
}

async fn cmd_append(client: &FeedClient, args: AppendArgs) -> anyhow::Result<()> {
    let messages = args
        .messages
        .iter()
        .map(|raw| {
            serde_json::from_str::<Message>(raw).with_context(|| format!("not valid JSON: {raw}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let subfeed = open_subfeed(client, &args.feed, &args.subfeed, false).await?;
    let count = messages.len();
    subfeed.append(messages).await?;
    println!(
        "{} Appended {} message(s) to {}",
        "✓".green().bold(),
        count.to_string().bold(),
        subfeed.uri().cyan()
    );
    Ok(())
}

async fn cmd_print(client: &FeedClient, args: PrintArgs) -> anyhow::Result<()> {
    let mut subfeed = open_subfeed(client, &args.feed, &args.subfeed, false).await?;
    subfeed.set_position(args.position);

    if args.follow {
        let mut stream = subfeed.stream(args.signed);
        loop {
            let position = stream.position();
            match stream.next().await? {
                Some(message) => print_message(position, &message),
                None => return Ok(()),
            }
        }
    }

    let options = FetchOptions::wait(0);
    if args.signed {
        let start = subfeed.position();
        for (i, envelope) in subfeed.fetch_next_signed(options).await?.iter().enumerate() {
            print_message(start + i as u64, &serde_json::to_value(envelope)?);
        }
    } else {
        let start = subfeed.position();
        for (i, message) in subfeed.fetch_next(options).await?.iter().enumerate() {
            print_message(start + i as u64, message);
        }
    }
    Ok(())
}

fn print_message(position: u64, message: &Message) {
    println!("{} {}", format!("{position:>6}").dimmed(), message);
}

async fn cmd_count(client: &FeedClient, args: CountArgs) -> anyhow::Result<()> {
    let subfeed = open_subfeed(client, &args.feed, &args.subfeed, false).await?;
    println!("{}", subfeed.num_local_messages().await?);
    Ok(())
}

async fn cmd_snapshot(client: &FeedClient, args: SnapshotArgs) -> anyhow::Result<()> {
    let feed = client.load_feed(&args.feed, LoadOptions::default()).await?;
    let names: Vec<SubfeedName> = args.subfeeds.iter().map(|s| SubfeedName::from(s.as_str())).collect();
    let snapshot = feed.create_snapshot(&names).await?;
    println!("{} Snapshot {}", "✓".green().bold(), snapshot.uri().cyan());
    for name in &names {
        let count = snapshot.load_subfeed(name.clone())?.num_local_messages().await?;
        println!("  {}: {} message(s)", name.to_string().yellow(), count);
    }
    Ok(())
}

async fn cmd_probe(client: &FeedClient) -> anyhow::Result<()> {
    let probe = client.probe().await?;
    if probe.success {
        let version = probe.daemon_version.unwrap_or_else(|| "unknown".into());
        println!("{} Daemon reachable (version {})", "✓".green().bold(), version.cyan());
        Ok(())
    } else {
        anyhow::bail!("daemon answered probe without success")
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.server_config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading server config {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.bind_addr = bind.parse().with_context(|| format!("bad bind address {bind}"))?;
    }
    println!("Feed daemon on {}", config.bind_addr.to_string().bold());
    FeedServer::new(config).serve().await?;
    Ok(())
}

use clap::{Arg, ArgAction, Command};
use std::fs::File;
use std::io::{self, Write};
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use portscribe::{
    config::{ConfigManager, ConfigValidator},
    network::{parse_ports, Port, Protocol},
    output::{HostResult, OutputFormat, OutputManager},
    platform::Platform,
    resolver::{HickoryDnsClient, HostResolver},
    runner::{resolve_target, write_results, RunStats},
    utils::Logger,
};

fn build_cli() -> Command {
    Command::new("portscribe")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Resolve scan targets and write discovered ports as text, JSON Lines or CSV")
        .arg(
            Arg::new("targets")
                .value_name("TARGET")
                .help("Hostnames or IP addresses")
                .required(true)
                .num_args(1..),
        )
        .arg(
            Arg::new("ports")
                .short('p')
                .long("ports")
                .value_name("PORTS")
                .help("Ports to report, e.g. 22,80,8000-8010,U:53")
                .required(true),
        )
        .arg(
            Arg::new("udp")
                .long("udp")
                .help("Treat unprefixed ports as UDP")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Output format: text, json, csv")
                .value_parser(clap::value_parser!(OutputFormat)),
        )
        .arg(
            Arg::new("csv-header")
                .long("csv-header")
                .help("Write the CSV header row")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-csv-header")
                .long("no-csv-header")
                .help("Omit the CSV header row")
                .conflicts_with("csv-header")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("cdn")
                .long("cdn")
                .help("Mark every result as served from a CDN range")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("cdn-name")
                .long("cdn-name")
                .value_name("NAME")
                .help("Annotate every result as served by this CDN provider"),
        )
        .arg(
            Arg::new("resolvers")
                .short('r')
                .long("resolvers")
                .value_name("IPS")
                .help("Comma separated nameservers to use instead of the system ones")
                .value_delimiter(',')
                .value_parser(clap::value_parser!(IpAddr)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Write results to FILE instead of stdout"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (default ~/.portscribe.toml)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Verbose logging")
                .action(ArgAction::SetTrue),
        )
}

fn main() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();

    let manager = ConfigManager::new(matches.get_one::<PathBuf>("config").cloned())?;
    let mut config = manager.into_config();

    if let Some(format) = matches.get_one::<OutputFormat>("format") {
        config.format = *format;
    }
    if matches.get_flag("csv-header") {
        config.csv_header = true;
    }
    if matches.get_flag("no-csv-header") {
        config.csv_header = false;
    }
    if let Some(output) = matches.get_one::<String>("output") {
        config.output = Some(output.clone());
    }
    if let Some(resolvers) = matches.get_many::<IpAddr>("resolvers") {
        config.resolvers = resolvers.copied().collect();
    }
    if matches.get_flag("verbose") {
        config.logging.level = "debug".to_string();
    }

    Logger::init(Logger::parse_level(&config.logging.level));

    let problems = ConfigValidator::validate(&config);
    if !problems.is_empty() {
        anyhow::bail!("invalid configuration: {}", problems.join("; "));
    }

    let platform = Platform::current();
    if !platform.is_supported() {
        log::warn!("Raw socket scanning is not supported on {}", platform);
    }

    let default_protocol = if matches.get_flag("udp") {
        Protocol::Udp
    } else {
        Protocol::Tcp
    };
    let port_spec = matches
        .get_one::<String>("ports")
        .map(String::as_str)
        .unwrap_or_default();
    let ports = parse_ports(port_spec, default_protocol)?;
    let cdn_name = matches.get_one::<String>("cdn-name").cloned();
    let cdn = matches.get_flag("cdn") || cdn_name.is_some();

    let targets: Vec<String> = matches
        .get_many::<String>("targets")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let sink: Box<dyn Write + Send> = match &config.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };

    // The blocking resolver owns its own runtime, so it is created and
    // dropped here rather than inside an async task.
    let client = if config.resolvers.is_empty() {
        HickoryDnsClient::from_system_conf()?
    } else {
        HickoryDnsClient::with_nameservers(&config.resolvers)?
    };
    let resolver = Arc::new(HostResolver::new(client));

    let started = Instant::now();
    let runtime = tokio::runtime::Runtime::new()?;
    let stats = runtime.block_on(run(
        targets,
        ports,
        cdn,
        cdn_name,
        Arc::clone(&resolver),
        OutputManager::new(config.output_config()),
        sink,
    ))?;
    Logger::log_run_complete(started.elapsed(), stats.hosts, stats.records);

    Ok(())
}

/// Resolve every target concurrently and stream its hosts to one writer task
async fn run(
    targets: Vec<String>,
    ports: Vec<Port>,
    cdn: bool,
    cdn_name: Option<String>,
    resolver: Arc<HostResolver<HickoryDnsClient>>,
    manager: OutputManager,
    sink: Box<dyn Write + Send>,
) -> anyhow::Result<RunStats> {
    let (tx, rx) = mpsc::channel::<HostResult>(64);
    let writer = tokio::spawn(write_results(rx, manager, sink));

    let mut tasks = Vec::with_capacity(targets.len());
    for target in targets {
        let tx = tx.clone();
        let resolver = Arc::clone(&resolver);
        let ports = ports.clone();
        let cdn_name = cdn_name.clone();

        tasks.push(tokio::spawn(async move {
            let ips = match resolve_target(resolver, target.clone()).await {
                Ok(ips) => ips,
                Err(e) => {
                    log::warn!("Skipping {}: {}", target, e);
                    return;
                }
            };
            Logger::log_resolved(&target, ips.len());

            for ip in ips {
                let result = HostResult::new(target.clone(), ip, ports.clone())
                    .with_cdn(cdn, cdn_name.clone());
                if tx.send(result).await.is_err() {
                    // Writer has stopped; its error is reported below
                    return;
                }
            }
        }));
    }
    drop(tx);
    drop(resolver);

    for task in tasks {
        task.await?;
    }

    let (_, stats) = writer.await??;
    Ok(stats)
}

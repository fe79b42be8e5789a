//! CLI for critpath

use critpath::audit::AuditConfig;
use critpath::from_json::read_from_file;
use critpath::locator::{AdRequestMatcher, FilterListMatcher, GptAdRequestMatcher};

use anyhow::Context;
use clap::{Arg, Command};
use std::fs::File;
use std::io::{BufRead, BufReader};
use tracing_subscriber::EnvFilter;

mod audit;
mod deps;
mod locate;
mod tree;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("critpath CLI")
        .version("1.0")
        .arg(Arg::new("records_file")
            .short('f')
            .value_name("FILE")
            .help("Set the JSON file of network records to analyze")
            .takes_value(true)
            .required(true))
        .arg(Arg::new("config")
            .long("config")
            .value_name("FILE")
            .help("Set a JSON configuration file")
            .takes_value(true))
        .arg(Arg::new("threshold")
            .short('t')
            .long("threshold")
            .value_name("N")
            .help("Largest number of distinct scripts on the critical path that still passes")
            .takes_value(true))
        .arg(Arg::new("filter_rule")
            .short('r')
            .long("rule")
            .help("Identify the ad request with an adblock rule, using ABP syntax")
            .takes_value(true)
            .global(true)
            .conflicts_with("path_to_filterlist"))
        .arg(Arg::new("path_to_filterlist")
            .short('l')
            .long("list")
            .help("Identify the ad request with a filterlist file (newline-separated adblock rules)")
            .takes_value(true)
            .global(true))
        .arg(Arg::new("source_url")
            .short('s')
            .long("source")
            .value_name("URL")
            .help("URL of the page the records were captured from, used by adblock rules")
            .takes_value(true)
            .global(true))
        .subcommand(Command::new("audit")
            .about("Build and score the critical path of the ad request (default)"))
        .subcommand(Command::new("tree")
            .about("Print the critical path tree of the ad request"))
        .subcommand(Command::new("locate")
            .about("Print the URL of the ad request"))
        .subcommand(Command::new("deps")
            .about("Print script dependencies between all records, and whether any of them loop"))
        .get_matches();

    let mut config = match matches.value_of("config") {
        Some(path) => {
            let json = std::fs::read_to_string(path).with_context(|| format!("could not read config file {}", path))?;
            AuditConfig::from_json(&json).with_context(|| format!("invalid config file {}", path))?
        }
        None => AuditConfig::default(),
    };
    if let Some(threshold) = matches.value_of("threshold") {
        config.pass_threshold = threshold.parse().context("Threshold should be parseable as a number")?;
    }

    let matcher: Box<dyn AdRequestMatcher> = if let Some(rule) = matches.value_of("filter_rule") {
        Box::new(filter_list_matcher(vec![rule.to_string()], matches.value_of("source_url")))
    } else if let Some(filterlist) = matches.value_of("path_to_filterlist") {
        let file = File::open(filterlist).with_context(|| format!("could not open filterlist {}", filterlist))?;
        let rules = BufReader::new(file).lines().collect::<Result<Vec<_>, _>>()?;
        Box::new(filter_list_matcher(rules, matches.value_of("source_url")))
    } else {
        Box::new(GptAdRequestMatcher)
    };

    let records_file = matches.value_of("records_file").context("records file is required")?;
    let records = read_from_file(records_file, config.max_stack_depth)
        .with_context(|| format!("could not load network records from {}", records_file))?;

    match matches.subcommand() {
        Some(("tree", _)) => tree::main(&records, matcher.as_ref(), &config),
        Some(("locate", _)) => locate::main(&records, matcher.as_ref()),
        Some(("deps", _)) => deps::main(&records, &config),
        _ => audit::main(&records, matcher.as_ref(), &config),
    }
}

fn filter_list_matcher(rules: Vec<String>, source_url: Option<&str>) -> FilterListMatcher {
    let matcher = FilterListMatcher::new(&rules);
    match source_url {
        Some(source_url) => matcher.with_source_url(source_url),
        None => matcher,
    }
}

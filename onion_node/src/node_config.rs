use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::num::ParseIntError;
use std::str::FromStr;

use anyhow::{anyhow, Error};
use config::{Config, File as CfgFile, FileFormat as CfgFileFormat};
use serde::{de, Deserialize, Deserializer};
use serde_yaml::Value;
use clap::{Arg, ArgAction, ArgMatches, builder::PossibleValue, Command, ValueEnum, value_parser};
use itertools::Itertools;
use onion::core::network::{NetworkConfig, TransportKind};
use onion::packet::address::*;

/// Config for threading.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
pub enum Threads {
    /// Detect number of threads automatically by the number of CPU cores.
    Auto,
    /// Exact number of threads.
    N(u16)
}

impl FromStr for Threads {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "auto" {
            Ok(Threads::Auto)
        } else {
            u16::from_str(s).map(Threads::N)
        }
    }
}

/// Specifies where to write logs.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
pub enum LogType {
    Stderr,
    Stdout,
    Syslog,
    None,
}

impl ValueEnum for LogType {
    fn value_variants<'a>() -> &'a [Self] {
        use self::LogType::*;
        &[Stderr, Stdout, Syslog, None]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        use self::LogType::*;
        Some(match self {
            Stderr => PossibleValue::new("Stderr"),
            Stdout => PossibleValue::new("Stdout"),
            Syslog => PossibleValue::new("Syslog"),
            None => PossibleValue::new("None")
        })
    }
}

/// How actors of the network reach each other.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
pub enum TransportType {
    /// In-process mailboxes.
    Local,
    /// TCP connections to `host`, address is the port.
    Tcp,
}

impl ValueEnum for TransportType {
    fn value_variants<'a>() -> &'a [Self] {
        &[TransportType::Local, TransportType::Tcp]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            TransportType::Local => PossibleValue::new("Local"),
            TransportType::Tcp => PossibleValue::new("Tcp"),
        })
    }
}

/// Message to send once the network is running.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
pub struct MessageConfig {
    /// Id of the sending user.
    pub from: UserId,
    /// Id of the receiving user.
    pub to: UserId,
    /// Plaintext.
    pub text: String,
}

fn de_threads<'de, D>(deserializer: D) -> Result<Threads, D::Error> where D: Deserializer<'de> {
    let s = String::deserialize(deserializer)?;

    Threads::from_str(&s)
        .map_err(|e| de::Error::custom(format!("threads: {:?}", e)))
}

/// Config parsed from command line arguments or a config file.
#[derive(Clone, Debug, Deserialize)]
pub struct NodeConfig {
    /// Number of relays to run.
    pub relays: u32,
    /// Number of users to run.
    pub users: u32,
    /// How envelopes are delivered.
    pub transport: TransportType,
    /// Host all actors listen on when TCP transport is used.
    pub host: IpAddr,
    /// First address of users.
    #[serde(rename = "user-base")]
    pub user_base: u64,
    /// First address of relays.
    #[serde(rename = "relay-base")]
    pub relay_base: u64,
    /// Number of addresses of each kind.
    pub span: u64,
    /// Number of threads for execution.
    #[serde(deserialize_with = "de_threads")]
    pub threads: Threads,
    /// Specifies where to write logs.
    #[serde(rename = "log-type")]
    pub log_type: LogType,
    /// Messages sent after start.
    #[serde(default)]
    pub messages: Vec<MessageConfig>,
    /// Unused fields while parsing config file
    #[serde(flatten)]
    pub unused: HashMap<String, Value>,
}

impl NodeConfig {
    /// Parameters of the network to launch.
    pub fn network_config(&self) -> Result<NetworkConfig, AddressError> {
        let transport = match self.transport {
            TransportType::Local => TransportKind::Local,
            TransportType::Tcp => TransportKind::Tcp(self.host),
        };

        Ok(NetworkConfig {
            relays: self.relays,
            users: self.users,
            address_space: AddressSpace::new(self.user_base, self.relay_base, self.span)?,
            transport,
        })
    }
}

fn app() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .args_conflicts_with_subcommands(true)
        .subcommand(Command::new("config")
            .arg(Arg::new("cfg-file")
                .index(1)
                .help("Load settings from saved config file. \
                    Config file format is YAML")
                .num_args(1)
                .required(true)))
        // here go args without subcommands
        .arg(Arg::new("relays")
            .short('r')
            .long("relays")
            .help("Number of relays to run")
            .num_args(1)
            .value_parser(value_parser!(u32))
            .default_value("5"))
        .arg(Arg::new("users")
            .short('u')
            .long("users")
            .help("Number of users to run")
            .num_args(1)
            .value_parser(value_parser!(u32))
            .default_value("2"))
        .arg(Arg::new("transport")
            .short('t')
            .long("transport")
            .help("How relays and users reach each other")
            .num_args(1)
            .value_parser(value_parser!(TransportType))
            .default_value("Local"))
        .arg(Arg::new("host")
            .long("host")
            .help("Host to listen on with TCP transport. Every relay and \
                   user listens on the port equal to its address")
            .num_args(1)
            .value_parser(value_parser!(IpAddr))
            .default_value("127.0.0.1"))
        .arg(Arg::new("user-base")
            .long("user-base")
            .help("First address of users")
            .num_args(1)
            .value_parser(value_parser!(u64))
            .default_value("3000"))
        .arg(Arg::new("relay-base")
            .long("relay-base")
            .help("First address of relays")
            .num_args(1)
            .value_parser(value_parser!(u64))
            .default_value("4000"))
        .arg(Arg::new("span")
            .long("span")
            .help("Number of addresses reserved for relays and for users")
            .num_args(1)
            .value_parser(value_parser!(u64))
            .default_value("1000"))
        .arg(Arg::new("message")
            .short('m')
            .long("message")
            .help("Message to send through the network after start")
            .num_args(3)
            .action(ArgAction::Append)
            .value_names(["from", "to", "text"]))
        .arg(Arg::new("threads")
            .short('j')
            .long("threads")
            .help("Number of threads to use. The value 'auto' means that the \
                   number of threads will be determined automatically by the \
                   number of CPU cores")
            .num_args(1)
            .value_parser(value_parser!(Threads))
            .default_value("1"))
        .arg(Arg::new("log-type")
            .short('l')
            .long("log-type")
            .help("Where to write logs")
            .num_args(1)
            .value_parser(value_parser!(LogType))
            .default_value("Stderr"))
}

/// Parse command line arguments.
pub fn cli_parse() -> Result<NodeConfig, Error> {
    let matches = app().get_matches();

    match matches.subcommand() {
        Some(("config", m)) => run_config(m),
        _ => run_args(&matches),
    }
}

/// Parse settings from a saved file.
fn parse_config(config_path: &str) -> Result<NodeConfig, Error> {
    let config_file = Config::builder()
        .set_default("relays", 5i64)?
        .set_default("users", 2i64)?
        .set_default("transport", "Local")?
        .set_default("host", "127.0.0.1")?
        .set_default("user-base", 3000i64)?
        .set_default("relay-base", 4000i64)?
        .set_default("span", 1000i64)?
        .set_default("threads", "1")?
        .set_default("log-type", "Stderr")?
        .add_source(CfgFile::new(config_path, CfgFileFormat::Yaml))
        .build()
        .map_err(|e| anyhow!("Can't build config file {}: {}", config_path, e))?;

    config_file.try_deserialize()
        .map_err(|e| anyhow!("Can't deserialize config: {}", e))
}

fn run_config(matches: &ArgMatches) -> Result<NodeConfig, Error> {
    let config_path = matches.get_one::<String>("cfg-file")
        .ok_or_else(|| anyhow!("Config file is not specified"))?;

    parse_config(config_path)
}

fn parse_message((from, to, text): (&String, &String, &String)) -> Result<MessageConfig, Error> {
    Ok(MessageConfig {
        from: from.parse().map_err(|e| anyhow!("Invalid sender id {:?}: {}", from, e))?,
        to: to.parse().map_err(|e| anyhow!("Invalid recipient id {:?}: {}", to, e))?,
        text: text.clone(),
    })
}

fn run_args(matches: &ArgMatches) -> Result<NodeConfig, Error> {
    let missing = |id: &str| anyhow!("Missing value for `{}`", id);

    let relays = matches.get_one::<u32>("relays").copied().ok_or_else(|| missing("relays"))?;
    let users = matches.get_one::<u32>("users").copied().ok_or_else(|| missing("users"))?;
    let transport = matches.get_one("transport").copied().ok_or_else(|| missing("transport"))?;
    let host = matches.get_one("host").copied()
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
    let user_base = matches.get_one::<u64>("user-base").copied().unwrap_or(DEFAULT_USER_BASE);
    let relay_base = matches.get_one::<u64>("relay-base").copied().unwrap_or(DEFAULT_RELAY_BASE);
    let span = matches.get_one::<u64>("span").copied().unwrap_or(DEFAULT_SPAN);

    let messages = matches
        .get_many::<String>("message")
        .into_iter()
        .flatten()
        .tuples()
        .map(parse_message)
        .collect::<Result<Vec<_>, _>>()?;

    let threads = matches.get_one("threads").copied().ok_or_else(|| missing("threads"))?;

    let log_type = matches.get_one("log-type").copied().ok_or_else(|| missing("log-type"))?;

    Ok(NodeConfig {
        relays,
        users,
        transport,
        host,
        user_base,
        relay_base,
        span,
        threads,
        log_type,
        messages,
        unused: HashMap::new(),
    })
}

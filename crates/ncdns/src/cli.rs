//! Command-line surface
//!
//! Argument definitions only; `main.rs` maps each command onto a core
//! operation.

use clap::{Args, Parser, Subcommand};
use ncdns_core::record::RecordType;

#[derive(Debug, Parser)]
#[command(
    name = "ncdns",
    about = "Manage registrar DNS hosts, mail forwards, nameservers and locks",
    version
)]
pub struct Cli {
    /// Use the sandbox API for this invocation (persisted by `auth login`)
    #[arg(long, global = true)]
    pub sandbox: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage stored credentials
    #[command(subcommand)]
    Auth(AuthCommand),

    /// Manage DNS host records
    #[command(subcommand)]
    Dns(DnsCommand),

    /// Manage mail forwarding
    #[command(subcommand)]
    Email(EmailCommand),

    /// Manage nameserver delegation
    #[command(subcommand)]
    Ns(NsCommand),

    /// Manage the registrar transfer lock
    #[command(subcommand)]
    Lock(LockCommand),

    /// List domains in the account
    #[command(subcommand)]
    Domains(DomainsCommand),
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Verify and save credentials to the profile
    Login(LoginArgs),
    /// Remove saved credentials (the sandbox preference is kept)
    Logout,
    /// Show which credentials would be used
    Status,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// API user
    #[arg(long, value_name = "user")]
    pub api_user: String,

    /// API key
    #[arg(long, value_name = "key")]
    pub api_key: String,

    /// Account user name (defaults to the API user)
    #[arg(long, value_name = "user")]
    pub username: Option<String>,

    /// Allow-listed client IP (detected when omitted)
    #[arg(long, value_name = "ip")]
    pub client_ip: Option<String>,

    /// Save without calling the API first
    #[arg(long)]
    pub no_verify: bool,
}

#[derive(Debug, Subcommand)]
pub enum DnsCommand {
    /// List host records
    List {
        /// Domain (subdomains are reduced to the registrable zone)
        domain: String,
    },
    /// Add a host record
    Add(AddRecordArgs),
    /// Change fields of an existing host record
    Update(UpdateRecordArgs),
    /// Delete a host record
    Delete {
        domain: String,
        /// Host id as shown by `dns list`
        host_id: String,
    },
}

#[derive(Debug, Args)]
pub struct AddRecordArgs {
    pub domain: String,

    /// Host label (`@` for the apex)
    #[arg(long)]
    pub name: String,

    /// Record type (A, AAAA, CNAME, MX, TXT, NS, SRV, CAA, ALIAS, URL, URL301, FRAME)
    #[arg(long = "type", value_name = "type")]
    pub record_type: RecordType,

    /// Value or target
    #[arg(long)]
    pub address: String,

    /// TTL in seconds
    #[arg(long)]
    pub ttl: Option<u32>,

    /// MX preference
    #[arg(long)]
    pub mx_pref: Option<u32>,
}

#[derive(Debug, Args)]
pub struct UpdateRecordArgs {
    pub domain: String,

    /// Host id as shown by `dns list`
    pub host_id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long = "type", value_name = "type")]
    pub record_type: Option<RecordType>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub ttl: Option<u32>,

    #[arg(long)]
    pub mx_pref: Option<u32>,
}

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    /// List mail forwards
    List { domain: String },
    /// Forward a mailbox to an address
    Add {
        domain: String,
        /// Local part, e.g. `info`
        mailbox: String,
        /// Destination address
        forward_to: String,
    },
    /// Stop forwarding a mailbox
    Remove { domain: String, mailbox: String },
}

#[derive(Debug, Subcommand)]
pub enum NsCommand {
    /// Show nameservers
    List { domain: String },
    /// Use the registrar's nameservers
    SetDefault { domain: String },
    /// Use custom nameservers
    SetCustom {
        domain: String,
        #[arg(required = true, num_args = 1..)]
        nameservers: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum LockCommand {
    /// Show lock state
    Status { domain: String },
    /// Block transfers
    Lock { domain: String },
    /// Allow transfers
    Unlock { domain: String },
}

#[derive(Debug, Subcommand)]
pub enum DomainsCommand {
    /// List one page of domains
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 20)]
        page_size: u32,

        /// Keyword filter
        #[arg(long)]
        search: Option<String>,
    },
}

// # ncdns - registrar DNS command-line client
//
// This is a THIN integration layer only: argument parsing, credential
// source selection, and JSON output. All registrar logic lives in
// ncdns-core; all HTTP lives in ncdns-http.
//
// ## Configuration
//
// ### Credentials (take precedence over the saved profile when complete)
// - `NAMECHEAP_API_USER`, `NAMECHEAP_API_KEY`, `NAMECHEAP_CLIENT_IP`
// - `NAMECHEAP_USERNAME`: defaults to the API user
// - `NAMECHEAP_SANDBOX`: `true`/`1` selects the sandbox endpoint
//
// ### Client
// - `NCDNS_PROFILE`: profile path (default `<config dir>/ncdns/profile.json`)
// - `NCDNS_LOG_LEVEL`: trace, debug, info, warn, error (default `warn`)
//
// ## Example
//
// ```bash
// ncdns auth login --api-user alice --api-key ... --sandbox
// ncdns dns add example.com --name www --type A --address 203.0.113.10
// ncdns email add example.com info me@example.net
// ```

mod cli;

use anyhow::Result;
use clap::Parser;
use ncdns_core::config::{self, ClientConfig, Credentials, Endpoint};
use ncdns_core::domains::{DomainAdmin, ListDomainsQuery, LockAction};
use ncdns_core::record::{DnsRecordInput, DnsRecordPatch};
use ncdns_core::store::{FileCredentialStore, MemoryCredentialStore};
use ncdns_core::sync::ZoneSync;
use ncdns_core::traits::{CredentialStore, Transport};
use ncdns_core::{ApiClient, ApiErrorKind, ClientFactory};
use ncdns_http::HttpTransport;
use serde::Serialize;
use serde_json::json;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

use cli::{
    AuthCommand, Cli, Command, DnsCommand, DomainsCommand, EmailCommand, LockCommand, LoginArgs,
    NsCommand,
};

/// Exit codes
///
/// - 0: Success
/// - 1: Configuration, authentication or input error
/// - 2: Runtime error (API or transport)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NcdnsExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<NcdnsExitCode> for ExitCode {
    fn from(code: NcdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl NcdnsExitCode {
    fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ncdns_core::Error>() {
            Some(
                ncdns_core::Error::Validation(_)
                | ncdns_core::Error::InvalidFormat(_)
                | ncdns_core::Error::NotAuthenticated(_)
                | ncdns_core::Error::Config(_)
                | ncdns_core::Error::CredentialStore(_),
            ) => NcdnsExitCode::ConfigError,
            _ => NcdnsExitCode::RuntimeError,
        }
    }
}

/// Process-level settings read from the environment
struct Settings {
    log_level: String,
    profile_path: PathBuf,
    env_credentials: Option<Credentials>,
    env_sandbox: Option<bool>,
}

impl Settings {
    fn from_env() -> Result<Self> {
        let lookup = |key: &str| env::var(key).ok();

        let profile_path = match env::var("NCDNS_PROFILE") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_profile_path()?,
        };

        Ok(Self {
            log_level: env::var("NCDNS_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string()),
            profile_path,
            env_credentials: Credentials::from_lookup(lookup),
            env_sandbox: config::sandbox_from_lookup(lookup),
        })
    }

    fn validate(&self) -> Result<()> {
        parse_log_level(&self.log_level)?;

        if let Some(creds) = &self.env_credentials {
            creds.validate().map_err(|e| {
                anyhow::anyhow!("NAMECHEAP_* environment credentials are invalid: {}", e)
            })?;
        }
        Ok(())
    }
}

fn default_profile_path() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Cannot determine the configuration directory. \
            Set NCDNS_PROFILE to a profile path."
        )
    })?;
    Ok(base.join("ncdns").join("profile.json"))
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "NCDNS_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                NcdnsExitCode::ConfigError.into()
            } else {
                NcdnsExitCode::Success.into()
            };
        }
    };

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return NcdnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = settings.validate() {
        eprintln!("Configuration validation error: {}", e);
        return NcdnsExitCode::ConfigError.into();
    }

    let log_level = parse_log_level(&settings.log_level).unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return NcdnsExitCode::ConfigError.into();
    }

    // One short sequence of awaited calls per invocation
    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {}", e);
            return NcdnsExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run(cli, settings).await {
            Ok(()) => NcdnsExitCode::Success,
            Err(e) => {
                report_error(&e);
                NcdnsExitCode::for_error(&e)
            }
        }
    });

    code.into()
}

fn report_error(err: &anyhow::Error) {
    eprintln!("Error: {}", err);

    let entries = err
        .downcast_ref::<ncdns_core::Error>()
        .and_then(|e| e.api_errors())
        .unwrap_or_default();
    for entry in entries {
        if let Some(hint) = api_hint(entry.kind()) {
            eprintln!("  [{}] {}", entry.code, hint);
        }
    }
}

fn api_hint(kind: ApiErrorKind) -> Option<&'static str> {
    match kind {
        ApiErrorKind::Authentication => {
            Some("check the API user and key, and that API access is enabled")
        }
        ApiErrorKind::IpNotAllowed => Some("add this machine's public IP to the API allow-list"),
        ApiErrorKind::DomainNotFound => Some("check the domain is registered in this account"),
        ApiErrorKind::RateLimited => Some("too many requests; try again later"),
        _ => None,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Run one command
async fn run(cli: Cli, settings: Settings) -> Result<()> {
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::with_default_timeout()?);

    if let Command::Auth(auth) = cli.command {
        return run_auth(auth, cli.sandbox, &settings, transport).await;
    }

    let store = credential_source(&settings, cli.sandbox).await?;
    let factory = ClientFactory::new(store, transport);
    let client = factory.client().await?;
    debug!("Using {:?} endpoint", client.endpoint());

    match cli.command {
        Command::Dns(cmd) => run_dns(cmd, ZoneSync::new(client)).await,
        Command::Email(cmd) => run_email(cmd, ZoneSync::new(client)).await,
        Command::Ns(cmd) => run_ns(cmd, DomainAdmin::new(client)).await,
        Command::Lock(cmd) => run_lock(cmd, DomainAdmin::new(client)).await,
        Command::Domains(cmd) => run_domains(cmd, DomainAdmin::new(client)).await,
        Command::Auth(_) => Ok(()),
    }
}

/// Pick the credential store for API commands
///
/// Complete `NAMECHEAP_*` credentials win over the profile. The sandbox
/// flag is `--sandbox`, then `NAMECHEAP_SANDBOX`, then the profile.
async fn credential_source(
    settings: &Settings,
    sandbox_flag: bool,
) -> Result<Arc<dyn CredentialStore>> {
    if let Some(creds) = &settings.env_credentials {
        debug!("Using credentials from the environment");
        let sandbox = sandbox_flag || settings.env_sandbox.unwrap_or(false);
        let store = MemoryCredentialStore::with_credentials(creds.clone()).sandbox(sandbox);
        return Ok(Arc::new(store));
    }

    let profile = FileCredentialStore::new(&settings.profile_path).await?;
    debug!("Using profile {}", profile.path().display());

    let override_sandbox = sandbox_flag || settings.env_sandbox == Some(true);
    if !override_sandbox && settings.env_sandbox.is_none() {
        return Ok(Arc::new(profile));
    }

    // Per-invocation override; the profile itself is left untouched
    let overlay = MemoryCredentialStore::new().sandbox(override_sandbox);
    if let Some(creds) = profile.credentials().await? {
        overlay.save_credentials(&creds).await?;
    }
    Ok(Arc::new(overlay))
}

async fn run_auth(
    cmd: AuthCommand,
    sandbox_flag: bool,
    settings: &Settings,
    transport: Arc<dyn Transport>,
) -> Result<()> {
    let profile = Arc::new(FileCredentialStore::new(&settings.profile_path).await?);

    match cmd {
        AuthCommand::Login(args) => login(args, sandbox_flag, profile, transport).await,
        AuthCommand::Logout => {
            let factory = ClientFactory::new(profile.clone(), transport);
            factory.logout().await?;
            print_json(&json!({
                "logged_out": true,
                "profile": profile.path(),
            }))
        }
        AuthCommand::Status => {
            let (source, creds, sandbox) = match &settings.env_credentials {
                Some(creds) => (
                    "environment",
                    Some(creds.clone()),
                    sandbox_flag || settings.env_sandbox.unwrap_or(false),
                ),
                None => (
                    "profile",
                    profile.credentials().await?,
                    sandbox_flag || settings.env_sandbox.unwrap_or(profile.is_sandbox().await?),
                ),
            };

            print_json(&json!({
                "authenticated": creds.is_some(),
                "source": source,
                "api_user": creds.as_ref().map(|c| c.api_user.as_str()),
                "user_name": creds.as_ref().map(|c| c.user_name.as_str()),
                "client_ip": creds.as_ref().map(|c| c.client_ip.as_str()),
                "endpoint": Endpoint::from_sandbox(sandbox).url(),
                "profile": profile.path(),
            }))
        }
    }
}

async fn login(
    args: LoginArgs,
    sandbox: bool,
    profile: Arc<FileCredentialStore>,
    transport: Arc<dyn Transport>,
) -> Result<()> {
    let client_ip = match args.client_ip {
        Some(ip) => ip,
        None => {
            let ip = ncdns_http::public_ip::detect_public_ip().await?;
            eprintln!("Detected public IP {}", ip);
            ip.to_string()
        }
    };

    let user_name = args.username.unwrap_or_else(|| args.api_user.clone());
    let creds = Credentials::new(args.api_user, args.api_key, user_name, client_ip);
    creds.validate()?;

    if !args.no_verify {
        let config = ClientConfig::new(Endpoint::from_sandbox(sandbox));
        let client = ApiClient::new(creds.clone(), config, transport)?;
        DomainAdmin::new(Arc::new(client)).verify_access().await?;
    }

    profile.save_credentials(&creds).await?;
    profile.set_sandbox(sandbox).await?;

    print_json(&json!({
        "logged_in": true,
        "api_user": creds.api_user,
        "user_name": creds.user_name,
        "client_ip": creds.client_ip,
        "sandbox": sandbox,
        "verified": !args.no_verify,
        "profile": profile.path(),
    }))
}

async fn run_dns(cmd: DnsCommand, sync: ZoneSync) -> Result<()> {
    match cmd {
        DnsCommand::List { domain } => print_json(&sync.list_dns_records(&domain).await?),
        DnsCommand::Add(args) => {
            let input = DnsRecordInput {
                name: args.name,
                record_type: args.record_type,
                address: args.address,
                ttl: args.ttl,
                mx_pref: args.mx_pref,
            };
            print_json(&sync.add_dns_record(&args.domain, input).await?)
        }
        DnsCommand::Update(args) => {
            let patch = DnsRecordPatch {
                name: args.name,
                record_type: args.record_type,
                address: args.address,
                ttl: args.ttl,
                mx_pref: args.mx_pref,
            };
            print_json(&sync.update_dns_record(&args.domain, &args.host_id, patch).await?)
        }
        DnsCommand::Delete { domain, host_id } => {
            print_json(&sync.delete_dns_record(&domain, &host_id).await?)
        }
    }
}

async fn run_email(cmd: EmailCommand, sync: ZoneSync) -> Result<()> {
    match cmd {
        EmailCommand::List { domain } => print_json(&sync.list_mail_forwards(&domain).await?),
        EmailCommand::Add {
            domain,
            mailbox,
            forward_to,
        } => print_json(&sync.add_mail_forward(&domain, &mailbox, &forward_to).await?),
        EmailCommand::Remove { domain, mailbox } => {
            print_json(&sync.remove_mail_forward(&domain, &mailbox).await?)
        }
    }
}

async fn run_ns(cmd: NsCommand, admin: DomainAdmin) -> Result<()> {
    match cmd {
        NsCommand::List { domain } => print_json(&admin.get_nameservers(&domain).await?),
        NsCommand::SetDefault { domain } => {
            admin.set_default_nameservers(&domain).await?;
            print_json(&json!({ "domain": domain, "nameservers": "default" }))
        }
        NsCommand::SetCustom { domain, nameservers } => {
            admin.set_custom_nameservers(&domain, &nameservers).await?;
            print_json(&json!({ "domain": domain, "nameservers": nameservers }))
        }
    }
}

async fn run_lock(cmd: LockCommand, admin: DomainAdmin) -> Result<()> {
    let status = match cmd {
        LockCommand::Status { domain } => admin.get_registrar_lock(&domain).await?,
        LockCommand::Lock { domain } => admin.set_registrar_lock(&domain, LockAction::Lock).await?,
        LockCommand::Unlock { domain } => {
            admin.set_registrar_lock(&domain, LockAction::Unlock).await?
        }
    };
    print_json(&status)
}

async fn run_domains(cmd: DomainsCommand, admin: DomainAdmin) -> Result<()> {
    match cmd {
        DomainsCommand::List { page, page_size, search } => {
            let query = ListDomainsQuery { page, page_size, search };
            print_json(&admin.list_domains(&query).await?)
        }
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use anaf::core::{AnafConfig, EfacturaEndpoints, Invoice, Profile, parse_cui};
use anaf::efactura::{
    DEFAULT_LIST_DAYS, EinvoiceClient, MessageFilter, OAuthCredential, Standard, TokenManager,
    UploadOptions,
};
use anaf::lookup::FiscalLookup;
use anaf::transport::ReqwestTransport;
use anaf::ubl::to_ubl_xml;

mod callback;
mod output;

#[derive(Parser, Debug)]
#[command(name = "anaf", version, about = "ANAF VAT registry and e-Factura client")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the e-Factura test environment
    #[arg(long, global = true)]
    testing: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up the VAT status of one or more CUIs
    Lookup {
        /// Comma-separated CUIs, with or without the RO prefix
        #[arg(value_delimiter = ',', required = true)]
        cuis: Vec<String>,
        /// Batch limit
        #[arg(long)]
        limit: Option<usize>,
        /// Date to evaluate the status at (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Run the OAuth2 authorization-code flow and print the token pair
    ///
    /// The authorize URL is printed, not opened: open it in a browser that
    /// holds your ANAF certificate and log in to trigger the redirect.
    Auth {
        #[command(flatten)]
        client: ClientArgs,
        /// Local port the redirect URI points to
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// List e-Factura messages
    Messages {
        #[command(flatten)]
        credential: CredentialArgs,
        #[arg(long)]
        cif: String,
        /// Days to look back (simple listing)
        #[arg(long, default_value_t = DEFAULT_LIST_DAYS)]
        days: u32,
        /// E, P, T or R
        #[arg(long)]
        filter: Option<String>,
        /// Start of the interval in epoch milliseconds (paginated listing)
        #[arg(long, requires = "end")]
        start: Option<i64>,
        /// End of the interval in epoch milliseconds
        #[arg(long, requires = "start")]
        end: Option<i64>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Upload an invoice XML document
    Upload {
        #[command(flatten)]
        credential: CredentialArgs,
        #[arg(long)]
        cif: String,
        #[arg(long)]
        file: PathBuf,
        /// UBL, CN, CII or RASP
        #[arg(long, default_value = "UBL")]
        standard: String,
        /// Buyer is not a Romanian taxpayer
        #[arg(long)]
        external: bool,
        /// Self-billed invoice
        #[arg(long)]
        self_invoice: bool,
    },
    /// Print the UBL XML for a JSON-serialized invoice
    Ubl {
        invoice: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ClientArgs {
    #[arg(long, env = "ANAF_CLIENT_ID")]
    client_id: String,
    #[arg(long, env = "ANAF_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,
    #[arg(long, env = "ANAF_REDIRECT_URI")]
    redirect_uri: String,
}

#[derive(Args, Debug)]
struct CredentialArgs {
    #[command(flatten)]
    client: ClientArgs,
    #[arg(long, env = "ANAF_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,
    #[arg(long, env = "ANAF_REFRESH_TOKEN", hide_env_values = true)]
    refresh_token: Option<String>,
}

impl ClientArgs {
    fn credential(&self) -> OAuthCredential {
        OAuthCredential::new(&self.client_id, &self.client_secret, &self.redirect_uri)
    }
}

impl CredentialArgs {
    fn credential(&self) -> OAuthCredential {
        let mut credential = self.client.credential();
        credential.access_token = self.access_token.clone();
        credential.refresh_token = self.refresh_token.clone();
        credential
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::Lookup { cuis, limit, date } => lookup(&config, &cuis, limit, date)?,
        Command::Auth { client, port } => auth(&config, &client, port)?,
        Command::Messages {
            credential,
            cif,
            days,
            filter,
            start,
            end,
            page,
        } => {
            let filter = filter.as_deref().map(str::parse::<MessageFilter>).transpose()?;
            let mut client = EinvoiceClient::new(&config, credential.credential())?;
            match (start, end) {
                (Some(start), Some(end)) => {
                    let list = client.list_messages_paginated(&cif, start, end, page, filter)?;
                    if let Some(err) = &list.error {
                        println!("{err}");
                    }
                    output::print_messages(&list.messages);
                    println!(
                        "page {}/{} ({} of {} messages)",
                        list.current_page, list.total_pages, list.count_in_page, list.total_count
                    );
                }
                _ => {
                    let list = client.list_messages(&cif, days, filter)?;
                    if let Some(err) = &list.error {
                        println!("{err}");
                    }
                    output::print_messages(&list.messages);
                }
            }
            report_rotation(&credential, client.tokens());
        }
        Command::Upload {
            credential,
            cif,
            file,
            standard,
            external,
            self_invoice,
        } => {
            let standard: Standard = standard.parse()?;
            let xml = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let mut client = EinvoiceClient::new(&config, credential.credential())?;
            let response = client.upload_invoice(
                &xml,
                standard,
                &cif,
                UploadOptions {
                    external,
                    self_invoice,
                },
            )?;
            output::print_upload(&response);
            report_rotation(&credential, client.tokens());
        }
        Command::Ubl { invoice: path } => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let invoice: Invoice = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", path.display()))?;
            println!("{}", to_ubl_xml(&invoice)?);
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<AnafConfig> {
    let mut config = match &cli.config {
        Some(path) => AnafConfig::from_json_file(path)?.with_env_overrides(),
        None => AnafConfig::from_env(),
    };
    if cli.testing {
        config.profile = Profile::Testing;
        config.efactura.api_url = EfacturaEndpoints::for_profile(Profile::Testing).api_url;
    }
    Ok(config)
}

fn lookup(
    config: &AnafConfig,
    cuis: &[String],
    limit: Option<usize>,
    date: Option<NaiveDate>,
) -> Result<()> {
    let mut batch = FiscalLookup::new(config);
    if let Some(limit) = limit {
        batch.set_limit(limit)?;
    }
    let date = date.unwrap_or_else(|| Utc::now().date_naive());

    for raw in cuis {
        let added = parse_cui(raw).and_then(|cui| batch.add_cui(cui, date));
        if let Err(e) = added {
            warn!(cui = %raw, error = %e, "skipping CUI");
        }
    }
    if batch.is_empty() {
        return Err(anyhow!("no valid CUIs to look up"));
    }

    let transport = ReqwestTransport::new()?;
    let result = batch.query(&transport)?;
    output::print_lookup(&result);
    Ok(())
}

fn auth(config: &AnafConfig, client: &ClientArgs, port: u16) -> Result<()> {
    let transport = Arc::new(ReqwestTransport::new()?);
    let mut tokens = TokenManager::new(&config.efactura, client.credential(), transport);

    println!("Open this URL in a browser with your certificate:");
    println!("{}", tokens.oauth().authorize_url()?);

    let credential = callback::receive_code(port, move |code| {
        tokens.authorize(&code).cloned()
    })??;

    let pair = serde_json::json!({
        "access_token": credential.access_token,
        "refresh_token": credential.refresh_token,
        "expires_at": credential.expires_at(),
    });
    println!("{}", serde_json::to_string_pretty(&pair)?);
    Ok(())
}

/// Refreshing rotates both tokens; the caller has to store the new pair.
fn report_rotation(before: &CredentialArgs, tokens: &TokenManager) {
    let current = tokens.credential();
    if current.access_token != before.access_token {
        info!("access token was refreshed; update ANAF_ACCESS_TOKEN and ANAF_REFRESH_TOKEN");
        let pair = serde_json::json!({
            "access_token": current.access_token,
            "refresh_token": current.refresh_token,
        });
        eprintln!("{pair}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn auth_help_tells_the_user_to_open_the_url() {
        let cli = Cli::command();
        let auth = cli.find_subcommand("auth").unwrap();
        let help = auth
            .get_long_about()
            .or(auth.get_about())
            .unwrap()
            .to_string();
        assert!(help.contains("The authorize URL is printed, not opened"));
    }
}

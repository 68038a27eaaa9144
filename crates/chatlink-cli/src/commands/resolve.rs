use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use anyhow::{Context as _, Result};
use chatlink_config::CrmConfig;
use chatlink_core::PhoneToContactMap;
use chatlink_sync::http::build_client;
use chatlink_sync::{
    ContactResolver, ContactSearch, Credentials, HubSpotSearch, OAuthRefresher, SyncError,
    ZohoSearch,
};
use clap::{Args, ValueEnum};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Platform {
    Hubspot,
    Zoho,
    All,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    #[arg(long, value_enum, default_value_t = Platform::All)]
    pub platform: Platform,
    /// JSON array of phone numbers; non-string entries are skipped
    #[arg(long)]
    pub file: Option<PathBuf>,
    pub phones: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PlatformReport {
    platform: &'static str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    matches: PhoneToContactMap,
    failed_chunks: Vec<FailedChunk>,
}

#[derive(Debug, Serialize)]
struct FailedChunk {
    index: usize,
    terms: usize,
    error: String,
}

pub fn resolve(ctx: &Context<'_>, args: ResolveArgs) -> Result<()> {
    let mut phones = args.phones;
    if let Some(path) = args.file.as_deref() {
        phones.extend(read_phone_file(path)?);
    }

    let client = build_client(None)?;
    let delay = ctx.config.chunk_delay;
    let hubspot = match args.platform {
        Platform::Hubspot | Platform::All => ctx.config.hubspot.as_ref(),
        Platform::Zoho => None,
    };
    let zoho = match args.platform {
        Platform::Zoho | Platform::All => ctx.config.zoho.as_ref(),
        Platform::Hubspot => None,
    };
    match args.platform {
        Platform::Hubspot if hubspot.is_none() => {
            return Err(invalid_input("hubspot is not configured"));
        }
        Platform::Zoho if zoho.is_none() => return Err(invalid_input("zoho is not configured")),
        Platform::All if hubspot.is_none() && zoho.is_none() => {
            return Err(invalid_input("no CRM is configured"));
        }
        _ => {}
    }

    let hubspot = hubspot
        .map(|cfg| {
            let search = HubSpotSearch::new(
                client.clone(),
                &cfg.base_url,
                cfg.phone_fields.clone(),
                cfg.chunk_size,
            )?;
            build_resolver(search, &client, cfg, delay)
        })
        .transpose()?;
    let zoho = zoho
        .map(|cfg| {
            let search = ZohoSearch::new(
                client.clone(),
                &cfg.base_url,
                cfg.phone_fields.clone(),
                cfg.chunk_size,
            )?;
            build_resolver(search, &client, cfg, delay)
        })
        .transpose()?;

    // One thread: both platforms interleave at their network calls and chunk pauses.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .with_context(|| "start runtime")?;
    let outcomes = runtime.block_on(async {
        let (hubspot, zoho) = tokio::join!(
            run_platform(hubspot.as_ref(), &phones),
            run_platform(zoho.as_ref(), &phones)
        );
        [hubspot, zoho].into_iter().flatten().collect::<Vec<_>>()
    });

    let mut reports = Vec::new();
    let mut errors = Vec::new();
    for (platform, outcome) in outcomes {
        match outcome {
            Ok(report) => reports.push(report),
            Err(err) => {
                reports.push(PlatformReport {
                    platform,
                    status: "failed",
                    error: Some(err.to_string()),
                    matches: PhoneToContactMap::new(),
                    failed_chunks: Vec::new(),
                });
                errors.push(err);
            }
        }
    }

    if ctx.json {
        print_json(&reports)?;
    } else {
        print_reports(&reports);
    }

    if errors.len() == reports.len() {
        if let Some(err) = errors.into_iter().next() {
            return Err(anyhow::Error::new(err).context("resolve contacts"));
        }
    }
    Ok(())
}

fn build_resolver<S: ContactSearch>(
    search: S,
    client: &Client,
    cfg: &CrmConfig,
    delay: Duration,
) -> Result<ContactResolver<S>> {
    let mut credentials = Credentials::new(cfg.access_token.clone());
    let refresher = match &cfg.refresh {
        Some(refresh) => {
            credentials = credentials.with_refresh_token(refresh.refresh_token.clone());
            Some(OAuthRefresher::new(
                client.clone(),
                &refresh.token_url,
                refresh.client_id.clone(),
                refresh.client_secret.clone(),
            )?)
        }
        None => None,
    };

    let mut resolver = ContactResolver::new(search, credentials).with_chunk_delay(delay);
    if let Some(refresher) = refresher {
        resolver = resolver.with_refresher(Box::new(refresher));
    }
    Ok(resolver)
}

async fn run_platform<S: ContactSearch>(
    resolver: Option<&ContactResolver<S>>,
    phones: &[String],
) -> Option<(&'static str, std::result::Result<PlatformReport, SyncError>)> {
    let resolver = resolver?;
    let platform = resolver.platform();
    let outcome = resolver.resolve(phones).await.map(|resolution| {
        let failed_chunks = resolution
            .failed_chunks()
            .filter_map(|chunk| {
                chunk.outcome.as_ref().err().map(|err| FailedChunk {
                    index: chunk.index,
                    terms: chunk.terms,
                    error: err.to_string(),
                })
            })
            .collect();
        PlatformReport {
            platform,
            status: "ok",
            error: None,
            matches: resolution.matches,
            failed_chunks,
        }
    });
    Some((platform, outcome))
}

fn read_phone_file(path: &Path) -> Result<Vec<String>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read phone file {}", path.display()))?;
    let parsed: Value = serde_json::from_str(&data)
        .map_err(|err| invalid_input(format!("{}: {err}", path.display())))?;
    let Value::Array(items) = parsed else {
        return Err(invalid_input(format!(
            "{}: expected a JSON array of phone numbers",
            path.display()
        )));
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(phone) => Some(phone),
            other => {
                debug!(entry = %other, "skipping non-string phone entry");
                None
            }
        })
        .collect())
}

fn print_reports(reports: &[PlatformReport]) {
    for report in reports {
        match &report.error {
            Some(error) => println!("{}: failed: {}", report.platform, error),
            None => println!(
                "{}: {} matched, {} failed chunks",
                report.platform,
                report.matches.len(),
                report.failed_chunks.len()
            ),
        }
        for (phone, found) in &report.matches {
            println!("  {phone} -> {}", found.contact_id);
        }
        for chunk in &report.failed_chunks {
            println!("  chunk {} ({} terms): {}", chunk.index, chunk.terms, chunk.error);
        }
    }
}

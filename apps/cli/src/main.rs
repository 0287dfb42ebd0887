use std::sync::Arc;

use anyhow::Context;
use cashback_core::{
    ActivityService, ConvertLinkOptions, ListQuery, MemoryCache, Platform, PlatformService,
    ProviderFeature, ReqwestHttpClient, ServiceConfig,
};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "cashback")]
#[command(version, about = "Query rebate activities and convert links across suppliers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List activities on a platform
    List {
        /// Platform code (meituan, eleme, douyin)
        #[arg(value_parser = parse_platform)]
        platform: Platform,

        /// Page number, starting at 1
        #[arg(short, long)]
        page: Option<i64>,

        /// Items per page
        #[arg(short = 's', long)]
        page_size: Option<i64>,

        /// Restrict the list to one activity
        #[arg(long)]
        activity_id: Option<String>,
    },

    /// Show one activity with its links
    Detail {
        #[arg(value_parser = parse_platform)]
        platform: Platform,

        /// Activity id
        id: String,

        /// Supplier link type code
        #[arg(short, long)]
        link_type: Option<i64>,
    },

    /// Convert a share link into a rebate link
    Convert {
        #[arg(value_parser = parse_platform)]
        platform: Platform,

        /// Link or share text to convert
        content: String,

        /// Caller tag forwarded to the supplier
        #[arg(long)]
        external_info: Option<String>,
    },

    /// Print configured suppliers and what each platform supports
    Capabilities,

    /// Probe the provider selected for each platform
    Health {
        /// Only probe this platform
        #[arg(value_parser = parse_platform)]
        platform: Option<Platform>,
    },
}

fn parse_platform(value: &str) -> Result<Platform, String> {
    Platform::ALL
        .into_iter()
        .find(|platform| platform.as_str().eq_ignore_ascii_case(value.trim()))
        .ok_or_else(|| format!("unknown platform '{}'", value))
}

fn init_tracing() {
    let log_format = std::env::var("CASHBACK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{}", rendered);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("Failed to load .env file");
        }
    }
    init_tracing();
    let cli = Cli::parse();

    let config = ServiceConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        "Loaded {} supplier config(s), strategy {}",
        config.providers.len(),
        config.selection_strategy
    );

    let http = Arc::new(ReqwestHttpClient::default());
    let platforms = Arc::new(PlatformService::new(&config, http));
    let activities = ActivityService::new(
        Arc::clone(&platforms),
        Arc::new(MemoryCache::new()),
        config.cache_ttl,
    );

    match cli.command {
        Commands::List {
            platform,
            page,
            page_size,
            activity_id,
        } => {
            let query = ListQuery {
                page,
                page_size,
                activity_id,
            };
            print_json(&activities.fetch_list(platform, query).await?)?;
        }
        Commands::Detail {
            platform,
            id,
            link_type,
        } => {
            print_json(&activities.fetch_detail(platform, &id, link_type).await?)?;
        }
        Commands::Convert {
            platform,
            content,
            external_info,
        } => {
            let mut options = ConvertLinkOptions::new(content, "");
            options.external_info = external_info;
            print_json(&platforms.convert_link(platform, options).await?)?;
        }
        Commands::Capabilities => {
            let features: Vec<_> = Platform::ALL
                .iter()
                .map(|platform| {
                    let supported: Vec<&str> = ProviderFeature::ALL
                        .iter()
                        .filter(|feature| platforms.supports_feature(*platform, **feature))
                        .map(|feature| feature.as_str())
                        .collect();
                    json!({
                        "platform": platform,
                        "features": supported,
                        "linkTypes": platforms.supported_link_types(*platform),
                    })
                })
                .collect();
            print_json(&json!({
                "providers": platforms.provider_metas(),
                "platforms": features,
            }))?;
        }
        Commands::Health { platform } => {
            let targets = match platform {
                Some(platform) => vec![platform],
                None => Platform::ALL.to_vec(),
            };
            let checks = targets
                .iter()
                .map(|platform| platforms.health_check(*platform));
            let results = join_all(checks).await;
            let report: serde_json::Map<String, serde_json::Value> = targets
                .iter()
                .zip(results)
                .map(|(platform, healthy)| (platform.to_string(), json!(healthy)))
                .collect();
            print_json(&report)?;
        }
    }

    Ok(())
}

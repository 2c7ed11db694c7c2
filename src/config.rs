use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::rates::{FixedRateProvider, RateProvider, SGS_CDI_ANNUAL_URL, SgsRateProvider};

#[derive(Debug, Parser)]
#[command(
    name = "finsim",
    about = "Personal-finance calculators (goal time, projections, CDB net yield, retirement) over HTTP"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the calculator JSON API.
    Serve(ServeArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[arg(long, short, default_value_t = 8080, help = "Port to listen on")]
    pub port: u16,
    #[arg(long, default_value = "0.0.0.0", help = "Address to bind")]
    pub bind: IpAddr,
    #[arg(
        long,
        default_value = SGS_CDI_ANNUAL_URL,
        help = "SGS endpoint returning [{data, valor}] records for the benchmark rate"
    )]
    pub rate_url: String,
    #[arg(
        long,
        default_value_t = 10,
        help = "Timeout for the one-off benchmark rate fetch, in seconds"
    )]
    pub rate_timeout_secs: u64,
    #[arg(
        long,
        help = "Annual benchmark rate in percent, e.g. 13.75; skips the network fetch"
    )]
    pub benchmark_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RateSource {
    Manual(f64),
    Sgs { url: String, timeout: Duration },
}

impl RateSource {
    pub fn provider(&self) -> Result<Arc<dyn RateProvider>, reqwest::Error> {
        Ok(match self {
            RateSource::Manual(percent) => Arc::new(FixedRateProvider::new(*percent)),
            RateSource::Sgs { url, timeout } => Arc::new(SgsRateProvider::new(url.clone(), *timeout)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServeConfig {
    pub addr: SocketAddr,
    pub rate_source: RateSource,
}

impl TryFrom<ServeArgs> for ServeConfig {
    type Error = String;

    fn try_from(args: ServeArgs) -> Result<Self, Self::Error> {
        if args.rate_timeout_secs == 0 {
            return Err("--rate-timeout-secs must be > 0".to_string());
        }

        let rate_source = match args.benchmark_rate {
            Some(percent) => {
                if !percent.is_finite() || percent < 0.0 {
                    return Err("--benchmark-rate must be >= 0".to_string());
                }
                RateSource::Manual(percent)
            }
            None => {
                if !(args.rate_url.starts_with("http://") || args.rate_url.starts_with("https://"))
                {
                    return Err("--rate-url must be an http(s) URL".to_string());
                }
                RateSource::Sgs {
                    url: args.rate_url,
                    timeout: Duration::from_secs(args.rate_timeout_secs),
                }
            }
        };

        Ok(Self {
            addr: SocketAddr::new(args.bind, args.port),
            rate_source,
        })
    }
}

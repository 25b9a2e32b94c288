use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::warn;

use lro_core::{
    CancellationToken, OperationHandle, OperationScope, WaitSpec,
    wait_for_operation_with_cancellation,
};
use lro_provider_aws::beanstalk::environment_activity;
use lro_provider_aws::{
    AwsClients, EnvironmentPoller, RequestStatusPoller, environment_ready_spec,
    environment_terminated_spec, request_status_spec,
};
use lro_provider_google::config::DEFAULT_ENDPOINT;
use lro_provider_google::wait::DEFAULT_TIMEOUT;
use lro_provider_google::{
    ApiVersion, ComputeClient, ComputeConfig, ComputeOperationPoller, compute_wait_spec,
};

#[derive(Parser)]
#[command(name = "lro")]
#[command(about = "Wait for long-running cloud operations to finish", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for a Compute Engine operation
    Compute {
        /// Operation name (e.g., operation-1481000000000-abc)
        operation: String,

        /// Project the operation belongs to
        #[arg(long, env = "GOOGLE_PROJECT")]
        project: String,

        /// Region of a regional operation
        #[arg(long, conflicts_with = "zone")]
        region: Option<String>,

        /// Zone of a zonal operation
        #[arg(long)]
        zone: Option<String>,

        /// Compute API version the operation was created through
        #[arg(long, default_value = "v1")]
        api_version: ApiVersion,

        /// OAuth2 access token sent as a bearer token
        #[arg(long, env = "GOOGLE_OAUTH_ACCESS_TOKEN", hide_env_values = true)]
        access_token: Option<String>,

        /// Compute API endpoint
        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        endpoint: String,

        /// Print the final operation as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        wait: WaitArgs,
    },
    /// Wait for an Elastic Beanstalk environment to settle
    Beanstalk {
        /// Environment id (e.g., e-abcdef1234)
        environment_id: String,

        #[arg(long, env = "AWS_REGION")]
        region: String,

        /// State to wait for
        #[arg(long, value_enum, default_value_t = Until::Ready)]
        until: Until,

        #[command(flatten)]
        wait: WaitArgs,
    },
    /// Wait for a Cloud Control resource request
    Cloudcontrol {
        /// Request token returned by CreateResource/UpdateResource/DeleteResource
        request_token: String,

        #[arg(long, env = "AWS_REGION")]
        region: String,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Until {
    Ready,
    Terminated,
}

/// Overrides for the provider's wait timing
#[derive(Args, Debug, Default)]
struct WaitArgs {
    /// Give up after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Seconds to wait before the first poll
    #[arg(long, value_name = "SECS")]
    delay: Option<u64>,

    /// Seconds between polls
    #[arg(long, value_name = "SECS")]
    poll_interval: Option<u64>,

    /// Description used in error messages
    #[arg(long)]
    activity: Option<String>,
}

impl WaitArgs {
    fn apply(&self, mut spec: WaitSpec) -> WaitSpec {
        if let Some(secs) = self.timeout {
            spec = spec.with_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.delay {
            spec = spec.with_delay(Duration::from_secs(secs));
        }
        if let Some(secs) = self.poll_interval {
            spec = spec.with_min_poll_interval(Duration::from_secs(secs));
        }
        spec
    }

    fn activity_or(&self, default: String) -> String {
        self.activity.clone().unwrap_or(default)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let cancel = cancel_on_ctrl_c();

    let result = match cli.command {
        Commands::Compute {
            operation,
            project,
            region,
            zone,
            api_version,
            access_token,
            endpoint,
            json,
            wait,
        } => {
            let config = ComputeConfig {
                project,
                api_version,
                endpoint: endpoint.trim_end_matches('/').to_string(),
                access_token,
            };
            run_compute(&operation, region, zone, config, json, &wait, cancel).await
        }
        Commands::Beanstalk {
            environment_id,
            region,
            until,
            wait,
        } => run_beanstalk(&environment_id, &region, until, &wait, cancel).await,
        Commands::Cloudcontrol {
            request_token,
            region,
            wait,
        } => run_cloudcontrol(&request_token, &region, &wait, cancel).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e.trim_end());
        std::process::exit(1);
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Token cancelled on the first Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling wait");
            child.cancel();
        }
    });
    token
}

/// Build the handle for a Compute operation from the location flags
fn compute_handle(
    operation: &str,
    region: Option<String>,
    zone: Option<String>,
) -> Result<OperationHandle, String> {
    let scope = match (&region, &zone) {
        (Some(_), _) => OperationScope::Regional,
        (_, Some(_)) => OperationScope::Zonal,
        _ => OperationScope::Global,
    };
    OperationHandle::new(operation, scope, region, zone).map_err(|e| e.to_string())
}

async fn run_compute(
    operation: &str,
    region: Option<String>,
    zone: Option<String>,
    config: ComputeConfig,
    json: bool,
    wait: &WaitArgs,
    cancel: CancellationToken,
) -> Result<(), String> {
    let handle = compute_handle(operation, region, zone)?.with_project(config.project.clone());
    let client = ComputeClient::new(config)
        .map_err(|e| format!("Failed to create HTTP client: {}", e))?;
    let poller = ComputeOperationPoller::new(client, &handle).map_err(|e| e.to_string())?;

    let spec = wait.apply(compute_wait_spec(DEFAULT_TIMEOUT));
    let activity = wait.activity_or(format!("operation {}", operation));

    let op = wait_for_operation_with_cancellation(&poller, &spec, &activity, cancel)
        .await
        .map_err(|e| e.to_string())?;

    if json {
        let out = serde_json::to_string_pretty(&op).map_err(|e| e.to_string())?;
        println!("{}", out);
    } else {
        print_done(&activity, &op.status, op.target_link.as_deref());
    }
    Ok(())
}

async fn run_beanstalk(
    environment_id: &str,
    region: &str,
    until: Until,
    wait: &WaitArgs,
    cancel: CancellationToken,
) -> Result<(), String> {
    let clients = AwsClients::new(region).await;
    let handle = OperationHandle::regional(environment_id, region).map_err(|e| e.to_string())?;
    let poller = EnvironmentPoller::new(clients.elasticbeanstalk.clone(), &handle);

    let (spec, goal) = match until {
        Until::Ready => (environment_ready_spec(), "become ready"),
        Until::Terminated => (environment_terminated_spec(), "become terminated"),
    };
    let spec = wait.apply(spec);
    let activity = wait.activity_or(environment_activity(environment_id, goal));

    let env = wait_for_operation_with_cancellation(&poller, &spec, &activity, cancel)
        .await
        .map_err(|e| e.to_string())?;

    let status = env.status().map(|s| s.as_str()).unwrap_or_default();
    print_done(&activity, status, env.cname());
    Ok(())
}

async fn run_cloudcontrol(
    request_token: &str,
    region: &str,
    wait: &WaitArgs,
    cancel: CancellationToken,
) -> Result<(), String> {
    let clients = AwsClients::new(region).await;
    let handle = OperationHandle::regional(request_token, region).map_err(|e| e.to_string())?;
    let poller = RequestStatusPoller::new(clients.cloudcontrol.clone(), &handle);

    let spec = wait.apply(request_status_spec());
    let activity = wait.activity_or(format!("Cloud Control request {}", request_token));

    let progress = wait_for_operation_with_cancellation(&poller, &spec, &activity, cancel)
        .await
        .map_err(|e| e.to_string())?;

    let status = progress
        .operation_status()
        .map(|s| s.as_str())
        .unwrap_or_default();
    print_done(&activity, status, progress.identifier());
    Ok(())
}

fn print_done(activity: &str, status: &str, detail: Option<&str>) {
    match detail {
        Some(detail) => println!(
            "{} {} ({}): {}",
            "Done".green().bold(),
            activity,
            status,
            detail
        ),
        None => println!("{} {} ({})", "Done".green().bold(), activity, status),
    }
}

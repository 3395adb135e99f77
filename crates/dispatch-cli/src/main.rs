use clap::{Parser, Subcommand};
use dispatch_core::classify::classify;
use dispatch_core::config::DispatchConfig;
use dispatch_core::derive::derive_parameters;
use dispatch_core::event::UNKNOWN_PLACEHOLDER;

#[derive(Parser)]
#[command(
    name = "easypim-dispatch",
    about = "Route Key Vault secret-change events to GitHub Actions or Azure DevOps pipeline triggers",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 3141, env = "EASYPIM_PORT")]
        port: u16,
    },

    /// Show the routing decision for a secret name (dry run, no trigger)
    Classify {
        /// Secret name as it would arrive in a change notification
        secret_name: String,
    },

    /// Show the execution parameters derived for a secret name (dry run).
    /// Honors the same EASYPIM_* override environment as the server.
    Derive {
        /// Secret name as it would arrive in a change notification
        secret_name: String,

        /// Vault name used in the run description
        #[arg(long, default_value = UNKNOWN_PLACEHOLDER)]
        vault: String,
    },

    /// Report which trigger platforms have a complete credential set
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let config = DispatchConfig::from_env();

    match cli.command {
        Commands::Serve { port } => dispatch_server::serve(config, port).await,
        Commands::Classify { secret_name } => {
            let decision = classify(&secret_name);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&decision)?);
            } else {
                println!("{}", decision.platform);
            }
            Ok(())
        }
        Commands::Derive { secret_name, vault } => {
            let decision = classify(&secret_name);
            let params = derive_parameters(&secret_name, &vault, &config.overrides);
            if cli.json {
                let out = serde_json::json!({
                    "platform": decision.platform,
                    "parameters": params,
                    "overrides": config.overrides,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("platform:     {}", decision.platform);
                println!("preview_only: {}", params.preview_only);
                println!("mode:         {}", params.mode);
                println!("verbose:      {}", params.verbose);
                println!("description:  {}", params.description);
            }
            Ok(())
        }
        Commands::Check => {
            let github_missing = config.github.missing();
            let ado_missing = config.ado.missing();
            if cli.json {
                let out = serde_json::json!({
                    "github_actions": {
                        "configured": github_missing.is_empty(),
                        "missing": github_missing,
                    },
                    "azure_devops": {
                        "configured": ado_missing.is_empty(),
                        "missing": ado_missing,
                    },
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_platform_status("github_actions", &github_missing);
                print_platform_status("azure_devops", &ado_missing);
            }
            Ok(())
        }
    }
}

fn print_platform_status(platform: &str, missing: &[&str]) {
    if missing.is_empty() {
        println!("{platform}: configured");
    } else {
        println!("{platform}: missing {}", missing.join(", "));
    }
}

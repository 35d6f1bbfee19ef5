use std::path::PathBuf;
use std::process::ExitCode;

use ::config::{Config as cfg, ConfigError, Environment, File, FileFormat};
use clap::{Parser, ValueEnum};
use error_stack::ResultExt;
use tracing::{error, info};

use relayer::commands::{xrpl_to_evm, SubCommand};
use relayer::config::Config;
use relayer::Error;

#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Set the paths for config file lookup. Can be defined multiple times (configs get merged)
    #[arg(short, long, default_values_os_t = vec![std::path::PathBuf::from("config.toml")])]
    pub config: Vec<PathBuf>,

    /// Set the output style of the logs
    #[arg(short, long, value_enum, default_value_t = Output::Text)]
    pub output: Output,

    #[clap(subcommand)]
    pub cmd: SubCommand,
}

#[derive(Debug, Clone, ValueEnum)]
enum Output {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Args = Args::parse();
    set_up_logger(&args.output);

    let cfg = init_config(&args.config);

    let result = match args.cmd {
        SubCommand::XrplToEvm(cmd_args) => {
            info!("starting relay");
            xrpl_to_evm::run(cfg, cmd_args).await
        }
    };

    match result {
        Ok(response) => {
            if let Some(resp) = response {
                info!("{}", resp);
            }
            ExitCode::SUCCESS
        }
        Err(report) => {
            error!("{report:#}");

            // print the detailed error report as the last output
            eprintln!("{report:?}");

            ExitCode::FAILURE
        }
    }
}

fn set_up_logger(output: &Output) {
    match output {
        Output::Json => {
            tracing_subscriber::fmt().json().flatten_event(true).init();
        }
        Output::Text => {
            tracing_subscriber::fmt().compact().init();
        }
    };
}

fn init_config(config_paths: &[PathBuf]) -> Config {
    parse_config(config_paths)
        .change_context(Error::LoadConfig)
        .inspect_err(|report| error!("{report}"))
        .unwrap_or_else(|_| Config::default())
}

fn parse_config(config_paths: &[PathBuf]) -> Result<Config, ConfigError> {
    config_paths
        .iter()
        .map(|path| File::from(path.as_path()).format(FileFormat::Toml).required(false))
        .fold(cfg::builder(), |builder, file| builder.add_source(file))
        .add_source(Environment::with_prefix("RELAYER"))
        .build()?
        .try_deserialize::<Config>()
}

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sessiontron::config::{figment_for, load_config_from, print_schema, DEFAULT_CONFIG_FILE};
use sessiontron::startup;
use sessiontron::utils::logger::init_logging;

#[derive(Parser, Debug)]
#[command(name = "sessiontron", version, about = "Customer login, register and dashboard console")]
struct Cli {
    /// Print the JSON schema of the configuration and exit
    #[arg(long)]
    schema: bool,

    /// YAML configuration file; SESSIONTRON_* environment variables override it
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

// -- Entrypoint

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.schema {
        print_schema();
        return;
    }

    let config = match load_config_from(figment_for(&cli.config)) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Error loading configuration from {}: {}", cli.config.display(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Error initialising logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = startup::run(config).await {
        tracing::error!("sessiontron stopped: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_local_config_file() {
        let cli = Cli::try_parse_from(["sessiontron"]).unwrap();
        assert!(!cli.schema);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn test_schema_flag_and_config_path() {
        let cli = Cli::try_parse_from(["sessiontron", "--schema", "--config", "/etc/sessiontron.yaml"])
            .unwrap();
        assert!(cli.schema);
        assert_eq!(cli.config, PathBuf::from("/etc/sessiontron.yaml"));
    }
}

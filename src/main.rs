use anyhow::{Context, Result};
use identity_manager::config::{load_config, validate_config, LoggingConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingConfig) {
    // RUST_LOG wins over the configured level
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(logging.with_target)
        .init();
}

fn main() -> Result<()> {
    let config = load_config().context("failed to load configuration")?;
    validate_config(&config).context("invalid configuration")?;
    init_logging(&config.logging);

    info!("Starting identity-probe v{}", identity_manager::VERSION);

    #[cfg(not(windows))]
    {
        anyhow::bail!("identity-probe only supports the Windows platform");
    }

    #[cfg(windows)]
    {
        use identity_manager::identity::IdentityManager;
        use identity_manager::windows::Win32TokenApi;
        use std::rc::Rc;

        let manager = IdentityManager::from_config(Rc::new(Win32TokenApi::new()), &config)
            .context("failed to capture the thread's baseline identity")?;

        let snapshot = manager.snapshot();
        info!(level = %snapshot.integrity_level, "captured identity snapshot");
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        Ok(())
    }
}

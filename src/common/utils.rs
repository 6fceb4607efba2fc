use lambda_runtime::Error;

const LOG_LEVEL_VAR: &str = "LOG_LEVEL";

pub fn init_tracing() {
    let level = std::env::var(LOG_LEVEL_VAR)
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(tracing::Level::INFO);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .without_time() // CloudWatch will add the ingestion time
        .with_target(false)
        .init();
}

pub fn required_env(name: &str) -> Result<String, Error> {
    std::env::var(name).map_err(|err| format!("{name}: {err}").into())
}

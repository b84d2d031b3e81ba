use groupcal::logger::*;

fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    println!("bootstrap filter: {:?}", logger.current_filter());
    debug!("hidden at bootstrap");
    warn!("bootstrap warn log");

    let config = LogConfig {
        filter: "groupcal=debug".to_string(),
    };
    logger.reload_from_config(&config)?;
    println!("reloaded filter: {:?}", logger.current_filter());
    debug!(uid = "u-1", "profile fetch started");
    info!("session ready");

    let bad = LogConfig {
        filter: "groupcal=loud".to_string(),
    };
    println!("bad filter rejected: {}", logger.reload_from_config(&bad).is_err());

    Ok(())
}

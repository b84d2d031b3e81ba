use groupcal::settings::*;

// $ cargo run --bin settings_demo
// $ GROUPCAL_API__BACKEND=http cargo run --bin settings_demo -- settings/release.toml
fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1);
    let settings = parse_settings(path.as_deref())?;
    println!("Loaded settings: {settings:#?}");
    println!("Profile retry backoff: {:?}", settings.session.retry_backoff());

    let is_err = parse_settings(Some("")).is_err();
    println!("Error on invalid path: {is_err}");
    Ok(())
}

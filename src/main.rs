use clap::Parser;
use commodity_dashboard::{shared_dataset, Cli, OutputFormat, Session};
use eyre::WrapErr;

fn init_log() {
    let (global_level, my_code_level) = if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Error, log::LevelFilter::Warn)
    };

    env_logger::Builder::new()
        .filter(None, global_level)
        .filter(Some("commodity_dashboard"), my_code_level)
        .parse_default_env()
        .init();
}

fn main() -> eyre::Result<()> {
    init_log();

    let cli = Cli::parse();
    let loader = cli.loader();

    let dataset = shared_dataset(&loader)
        .wrap_err_with(|| format!("failed to load prices from {}", cli.data.display()))?;

    let criteria = cli.criteria(dataset).wrap_err("invalid selection")?;
    let session = Session::with_criteria(dataset, cli.dashboard_config(), criteria);
    let view = session.view();

    match cli.format {
        OutputFormat::Table => println!("{}", view.render_text()),
        OutputFormat::Json => println!("{}", view.to_json()?),
    }

    Ok(())
}

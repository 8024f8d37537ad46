use clap::Parser;
use mesa_board::{BoardController, Cli, Config, RedbStatusStore, TableRegistry, ui, utils};

fn main() -> anyhow::Result<()> {
    // 1. Environment (.env) and configuration
    dotenvy::dotenv().ok();
    let config = Config::from_cli(Cli::parse());

    std::fs::create_dir_all(&config.work_dir)?;

    // 2. Logging (file-only, the TUI owns the terminal)
    let _guard = utils::logger::init(&config.log_dir(), &config.log_level)?;
    tracing::info!(work_dir = %config.work_dir.display(), "Mesa board starting");

    // 3. Registry and status store
    let registry = match &config.layout {
        Some(path) => TableRegistry::load(path)?,
        None => TableRegistry::default_board(),
    };
    let store = RedbStatusStore::open(config.db_path())?;

    // 4. Run the board until the user quits
    let controller = BoardController::new(registry, store);
    ui::run(controller, config.export_dir.clone())?;

    tracing::info!("Mesa board stopped");
    Ok(())
}

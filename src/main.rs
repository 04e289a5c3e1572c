use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use farmdash::chart_export::export_dashboard_charts;
use farmdash::error_display::user_message_from_report;
use farmdash::{
    App, AppConfig, AppEvent, Args, ConfigManager, LoadOptions, SelectionOverrides, Theme,
};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::sync::mpsc::channel;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: AppConfig) -> Result<()> {
    let poll_interval = Duration::from_millis(config.display.event_poll_interval_ms);
    let theme = Theme::from_config(&config.theme)?;
    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::with_config(tx.clone(), config, theme);
    if args.debug {
        app.enable_debug();
    }
    app.set_load_options(args.into());
    app.set_initial_selection(args.into());
    render(&mut terminal, &mut app)?;
    if let Some(path) = &args.path {
        tx.send(AppEvent::Open(path.clone()))?;
    }

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

/// Log to `--log-file` when given; headless runs fall back to stderr. The interface owns the
/// terminal, so without a log file it logs nothing.
fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_env(farmdash::LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if let Some(path) = &args.log_file {
        let file = File::create(path)
            .map_err(|e| eyre!("Failed to open log file {}: {}", path.display(), e))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
    } else if args.headless() {
        builder.with_writer(std::io::stderr).try_init()
    } else {
        return Ok(());
    };
    result.map_err(|e| eyre!("Failed to initialize logging: {}", e))
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        match ConfigManager::new(farmdash::APP_NAME) {
            Ok(config_manager) => match config_manager.write_default_config(args.force) {
                Ok(config_path) => {
                    println!("Configuration file written to: {}", config_path.display());
                    return Ok(Some(()));
                }
                Err(e) => {
                    eprintln!("Error writing configuration file: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error initializing config manager: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

/// `--report` and `--export-charts`: load, derive, write, exit.
fn run_headless(args: &Args, config: &AppConfig) -> Result<()> {
    let path = args
        .path
        .as_ref()
        .ok_or_else(|| eyre!("A workbook path is required"))?;
    let options: LoadOptions = args.into();
    let overrides: SelectionOverrides = args.into();
    let views = match farmdash::load_and_derive(path, &options, config, &overrides) {
        Ok(views) => views,
        Err(e) => {
            eprintln!("Error: {}", user_message_from_report(&e, Some(path)));
            std::process::exit(1);
        }
    };

    if let Some(dir) = &args.export_charts {
        let size = (config.chart_export.width, config.chart_export.height);
        for written in export_dashboard_charts(dir, &views, size)? {
            eprintln!("Wrote {}", written.display());
        }
    }

    if args.report {
        println!("{}", serde_json::to_string_pretty(&views)?);
    }
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    init_tracing(&args)?;
    let config = AppConfig::load(farmdash::APP_NAME)?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting farmdash");

    if args.headless() {
        return run_headless(&args, &config);
    }

    let terminal = ratatui::init();
    let result = run(terminal, &args, config);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmdash::GenderFilter;

    #[test]
    fn test_args_to_options_and_selection() {
        let args = Args::parse_from([
            "farmdash",
            "farmers.xlsx",
            "--sheet",
            "1",
            "--crop",
            "Rice",
            "--crop",
            "Wheat",
            "--gender",
            "f",
            "--village",
            "Pulivendula",
        ]);
        let opts: LoadOptions = (&args).into();
        assert_eq!(opts.sheet.as_deref(), Some("1"));
        let sel: SelectionOverrides = (&args).into();
        assert_eq!(sel.crops, vec!["Rice", "Wheat"]);
        assert_eq!(sel.gender, GenderFilter::F);
        assert_eq!(sel.village.as_deref(), Some("Pulivendula"));
    }
}

//! `securecheck` - CLI for the police vehicle-stop dashboard
//!
//! This binary initializes and fills the stop records database, prints the
//! overview, charts and catalog queries, predicts stop outcomes and writes
//! the dashboard as an HTML page.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};

use securecheck::charts::{self, Dimension};
use securecheck::cli::{
    ChartsCommand, Cli, Command, ConfigCommand, ImportCommand, OutputFormat, OverviewCommand,
    PredictCommand, QueryCommand, ReportCommand,
};
use securecheck::dashboard::NoticeLevel;
use securecheck::store::BASE_QUERY;
use securecheck::{
    catalog, html, import, init_logging, predict, Config, Dashboard, DashboardRequest, Predictor,
    Store, Table,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration; --database wins over every other source
    let mut config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    if let Some(path) = cli.database.clone() {
        config.store.database_path = Some(path);
    }
    let store = Store::from_config(&config);

    match cli.command {
        Command::Init => handle_init(&config),
        Command::Import(cmd) => handle_import(&store, &cmd),
        Command::Status(cmd) => handle_status(&store, cmd.json),
        Command::Overview(cmd) => handle_overview(&store, &config, &cmd),
        Command::Charts(cmd) => handle_charts(&store, &cmd),
        Command::Queries => {
            handle_queries();
            Ok(())
        }
        Command::Query(cmd) => handle_query(&store, &config, &cmd),
        Command::Predict(cmd) => handle_predict(&store, &config, &cmd),
        Command::Report(cmd) => handle_report(&store, &config, cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn handle_init(config: &Config) -> anyhow::Result<()> {
    let path = config.database_path();
    Store::initialize(&path)
        .with_context(|| format!("initializing database at {}", path.display()))?;
    println!("Database ready at {}", path.display());
    Ok(())
}

fn handle_import(store: &Store, cmd: &ImportCommand) -> anyhow::Result<()> {
    let summary = import::import_csv(store, &cmd.file)
        .with_context(|| format!("importing {}", cmd.file.display()))?;
    println!(
        "Imported {} stop records from {}",
        summary.inserted,
        cmd.file.display()
    );
    Ok(())
}

fn handle_status(store: &Store, json: bool) -> anyhow::Result<()> {
    let stats = store.stats()?;
    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string());

    if json {
        let status = serde_json::json!({
            "database_path": store.path(),
            "total_stops": stats.total_stops,
            "first_stop": date(stats.first_stop),
            "last_stop": date(stats.last_stop),
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("securecheck status");
        println!("------------------");
        println!("Database:      {}", store.path().display());
        println!("Stop records:  {}", stats.total_stops);
        println!(
            "First stop:    {}",
            date(stats.first_stop).unwrap_or_else(|| "-".to_string())
        );
        println!(
            "Last stop:     {}",
            date(stats.last_stop).unwrap_or_else(|| "-".to_string())
        );
        println!("Size:          {} bytes", stats.db_size_bytes);
    }
    Ok(())
}

fn handle_overview(store: &Store, config: &Config, cmd: &OverviewCommand) -> anyhow::Result<()> {
    let data = store.try_fetch(BASE_QUERY)?;
    let shown = match cmd.limit.or_else(|| config.overview_limit()) {
        Some(limit) => data.head(limit),
        None => data,
    };
    print_table(&shown, cmd.format)
}

fn handle_charts(store: &Store, cmd: &ChartsCommand) -> anyhow::Result<()> {
    let data = store.try_fetch(BASE_QUERY)?;
    let dimensions = match cmd.dimension {
        Some(dimension) => vec![Dimension::from(dimension)],
        None => Dimension::ALL.to_vec(),
    };

    for (i, dimension) in dimensions.into_iter().enumerate() {
        if i > 0 {
            println!();
        }
        match charts::frequency(&data, dimension) {
            Ok(table) => print!("{}", charts::render_text(&table)),
            Err(unavailable) => println!("{unavailable}"),
        }
    }
    Ok(())
}

fn handle_queries() {
    let width = catalog::CATALOG
        .iter()
        .map(|entry| entry.key.len())
        .max()
        .unwrap_or(0);
    for entry in &catalog::CATALOG {
        println!("{:<width$}  {}", entry.key, entry.description);
    }
}

fn handle_query(store: &Store, config: &Config, cmd: &QueryCommand) -> anyhow::Result<()> {
    let entry = catalog::select(&cmd.key)?;
    let panel = Dashboard::new(store, &config.dashboard).run_query(entry);

    match panel.notice {
        Some(notice) if notice.level == NoticeLevel::Error => bail!(notice.message),
        Some(notice) => {
            println!("{}", notice.message);
            Ok(())
        }
        None => print_table(&panel.table, cmd.format),
    }
}

fn handle_predict(store: &Store, config: &Config, cmd: &PredictCommand) -> anyhow::Result<()> {
    let data = store.try_fetch(BASE_QUERY)?;
    let durations = predict::duration_choices(&data);
    let form = cmd.form.to_form(&durations)?;
    form.validate(&durations)?;

    let prediction = Predictor::from_config(&config.dashboard).predict(&form, &data);
    let summary = prediction.summary(&form);

    let saved_id = if cmd.save {
        let id = store.insert(&form.to_record(&prediction))?;
        info!(id, "saved submitted stop");
        Some(id)
    } else {
        None
    };

    if cmd.json {
        let output = serde_json::json!({
            "form": form,
            "prediction": prediction,
            "summary": summary,
            "saved_id": saved_id,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Prediction Summary");
        println!("==================");
        println!("Predicted Violation:    {}", prediction.violation);
        println!("Predicted Stop Outcome: {}", prediction.outcome);
        if prediction.used_fallback {
            println!("(no similar stops found; default prediction)");
        } else {
            println!("(based on {} similar stops)", prediction.matched_rows);
        }
        println!();
        println!("{summary}");
        if let Some(id) = saved_id {
            println!();
            println!("Saved as stop record {id}.");
        }
    }
    Ok(())
}

fn handle_report(store: &Store, config: &Config, cmd: ReportCommand) -> anyhow::Result<()> {
    let query = cmd.query.as_deref().map(catalog::select).transpose()?;
    // the page picks the default duration from the dataset it loads
    let form = if cmd.predict {
        Some(cmd.form.to_form(&[])?)
    } else {
        None
    };

    let request = DashboardRequest {
        query,
        form,
        overview_limit: cmd.limit.or_else(|| config.overview_limit()),
    };
    let page = Dashboard::new(store, &config.dashboard).render(&request);
    for notice in &page.notices {
        warn!("{}", notice.message);
    }

    let output = cmd
        .output
        .unwrap_or_else(|| config.report.output_path.clone());
    std::fs::write(&output, html::render_page(&page, &config.dashboard))
        .with_context(|| format!("writing report to {}", output.display()))?;
    println!("Wrote dashboard to {}", output.display());
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Store]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Dashboard]");
                println!("  Title:              {}", config.dashboard.title);
                println!(
                    "  Overview limit:     {}",
                    config
                        .overview_limit()
                        .map_or_else(|| "all rows".to_string(), |n| n.to_string())
                );
                println!("  Fallback outcome:   {}", config.dashboard.fallback_outcome);
                println!(
                    "  Fallback violation: {}",
                    config.dashboard.fallback_violation
                );
                println!();
                println!("[Report]");
                println!(
                    "  Output path:        {}",
                    config.report.output_path.display()
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn print_table(table: &Table, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => print!("{}", table.render_text()),
        OutputFormat::Json => println!("{}", table.to_json()?),
        OutputFormat::Csv => print!("{}", table.to_csv()?),
    }
    Ok(())
}

use chrono::Local;
use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use gridwise::error_display::user_message_from_report;
use gridwise::export::{default_export_path, write_sheet};
use gridwise::render::{render_page, types_json, RenderOptions};
use gridwise::source::{self, LoadOptions};
use gridwise::{
    AppConfig, Args, ConfigManager, ExportFormat, RowId, SortDirection, TableSession, Theme,
    APP_NAME,
};
use indexmap::IndexMap;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let config_manager = ConfigManager::new(APP_NAME)?;
        match config_manager.write_default_config(args.force) {
            Ok(path) => {
                println!("Wrote default configuration to {}", path.display());
                return Ok(Some(()));
            }
            Err(e) => {
                eprintln!("Error generating config: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

/// Command-line flags take precedence over the config file.
fn apply_cli_overrides(config: &mut AppConfig, args: &Args) -> Result<()> {
    if let Some(page_size) = args.page_size {
        config.display.page_size = page_size;
    }
    if args.row_numbers {
        config.display.row_numbers = true;
    }
    if let Some(numeric) = args.numeric_colors {
        config.coloring.numeric = numeric;
    }
    if args.no_color {
        config.coloring.color_mode = "never".to_string();
    }
    if args.debug {
        config.debug.enabled = true;
    }
    config.validate()
}

/// Group `COL=VALUE` specs by column, keeping first-seen column order.
fn parse_filters(specs: &[String]) -> Result<IndexMap<String, Vec<String>>> {
    let mut filters: IndexMap<String, Vec<String>> = IndexMap::new();
    for spec in specs {
        let (column, value) = spec
            .split_once('=')
            .ok_or_else(|| eyre!("Invalid filter '{}'. Expected COL=VALUE", spec))?;
        filters
            .entry(column.to_string())
            .or_default()
            .push(value.to_string());
    }
    Ok(filters)
}

fn export(session: &TableSession, target: &Path, args: &Args, config: &AppConfig) -> Result<()> {
    let sheet = session.export_view()?;

    let format = match args.export_format.or_else(|| ExportFormat::from_path(target)) {
        Some(format) => format,
        None => config.export.export_format()?,
    };
    let path = if target.as_os_str().is_empty() {
        default_export_path(&config.export.file_prefix, format, Local::now().date_naive())
    } else {
        target.to_path_buf()
    };

    write_sheet(&sheet, &path, format)?;
    println!(
        "Exported {} rows as {} to {}",
        sheet.len() - 1,
        format.as_str(),
        path.display()
    );
    Ok(())
}

fn run(args: &Args, config: &AppConfig) -> Result<()> {
    let path = args
        .path
        .as_deref()
        .ok_or_else(|| eyre!("A data file path is required"))?;

    let options = LoadOptions::from_args(args, config);
    let rows = match source::load(path, &options) {
        Ok(rows) => rows,
        Err(e) => return Err(eyre!(user_message_from_report(&e, Some(path)))),
    };

    let mut session = TableSession::from_config(config)?;
    session.ingest(rows)?;

    if !args.delete_column.is_empty() {
        session.delete_columns(&args.delete_column)?;
    }
    if !args.delete_row.is_empty() {
        let ids: Vec<RowId> = args.delete_row.iter().copied().map(RowId).collect();
        session.delete_rows(&ids)?;
    }
    for (column, values) in parse_filters(&args.filter)? {
        session.set_filter(&column, values)?;
    }
    if let Some(column) = &args.sort {
        let direction = if args.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        session.sort(column, direction)?;
    }
    debug!(stats = ?session.stats(), "view ready");

    if args.types {
        println!("{}", types_json(&session)?);
        return Ok(());
    }

    if let Some(target) = &args.export {
        return export(&session, target, args, config);
    }

    if let Some(page) = args.page {
        session.set_page(page);
    }
    let theme = Theme::from_config(&config.coloring)?;
    let options = RenderOptions {
        row_numbers: config.display.row_numbers,
    };
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    match render_page(&mut out, &session, &theme, options).and_then(|_| out.flush()) {
        Ok(()) => Ok(()),
        // output piped into e.g. `head`
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;

    let mut config = match AppConfig::load(APP_NAME) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = apply_cli_overrides(&mut config, &args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    gridwise::logging::init(config.debug.enabled);

    if let Err(e) = run(&args, &config) {
        eprintln!("Error: {}", user_message_from_report(&e, None));
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filters_groups_by_column() {
        let specs = vec![
            "Team=Red".to_string(),
            "Year=2024".to_string(),
            "Team=Blue".to_string(),
            "Note=a=b".to_string(),
        ];
        let filters = parse_filters(&specs).unwrap();
        let columns: Vec<&str> = filters.keys().map(String::as_str).collect();
        assert_eq!(columns, vec!["Team", "Year", "Note"]);
        assert_eq!(filters["Team"], vec!["Red", "Blue"]);
        assert_eq!(filters["Note"], vec!["a=b"]);
    }

    #[test]
    fn test_parse_filters_rejects_missing_equals() {
        assert!(parse_filters(&["Team".to_string()]).is_err());
    }

    #[test]
    fn test_cli_overrides_and_validation() {
        let args = Args::try_parse_from([
            "gridwise",
            "a.csv",
            "--page-size",
            "5",
            "--no-color",
            "--numeric-colors",
            "false",
        ])
        .unwrap();
        let mut config = AppConfig::default();
        apply_cli_overrides(&mut config, &args).unwrap();
        assert_eq!(config.display.page_size, 5);
        assert_eq!(config.coloring.color_mode, "never");
        assert!(!config.coloring.numeric);

        let args = Args::try_parse_from(["gridwise", "a.csv", "--page-size", "0"]).unwrap();
        assert!(apply_cli_overrides(&mut AppConfig::default(), &args).is_err());
    }
}

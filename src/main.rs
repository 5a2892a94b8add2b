mod app;
mod view;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use localwx_core::{AppError, Config, ConfigError};

use app::{App, Route};

#[derive(Parser, Debug)]
#[command(author, version, about = "Search localities and show their current weather")]
struct Args {
    /// Config file (default: <config dir>/localwx/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the localities whose name contains QUERY
    Search {
        query: String,
    },

    /// Fetch and print the current weather for a locality id
    Show {
        locality_id: String,
    },

    /// Line-based search session (default)
    Interactive,
}

fn main() -> Result<()> {
    localwx_core::init()?;
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let err = match e.downcast::<ConfigError>() {
                Ok(config_err) => AppError::Config(config_err),
                Err(other) => AppError::Other(other),
            };
            tracing::error!("{}", err);
            eprintln!("{}", err.user_message());
            return Err(err.into());
        }
    };

    let mut app = App::new(config)?;
    tracing::info!("localwx started (weather endpoint: {})", app.config().weather.api_url);

    match args.command.unwrap_or(Command::Interactive) {
        Command::Search { query } => search(&mut app, &query),
        Command::Show { locality_id } => open(&mut app, &locality_id, &mut std::io::stdout())?,
        Command::Interactive => interactive(&mut app)?,
    }

    app.shutdown();
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.into_validated()
}

fn search(app: &mut App, query: &str) {
    app.open_search();
    app.wait();
    if let Some(status) = view::render_catalog_status(app.localities()) {
        println!("{}", status);
        return;
    }

    app.set_query(query);
    let suggestions = app.suggestions();
    if suggestions.is_empty() {
        println!("No localities match {:?}", query);
    } else {
        print!("{}", view::render_suggestions(&suggestions));
    }
}

const HELP: &str = "Type to search. #<n> opens a suggestion, :go <id> opens a locality id,\n\
:back returns to search, :reload retries the catalog, :quit exits.";

fn interactive(app: &mut App) -> Result<()> {
    println!("Weather Search");
    println!("{}", HELP);
    app.open_search();

    let stdin = std::io::stdin();
    let mut last_ids: Vec<String> = Vec::new();

    loop {
        match app.route() {
            Route::Weather { locality_id } => print!("{}> ", locality_id),
            Route::Search { .. } => print!("> "),
        }
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);
        app.poll();

        if line == ":quit" || line == ":q" {
            break;
        } else if line == ":help" {
            println!("{}", HELP);
        } else if line == ":back" {
            app.open_search();
            last_ids.clear();
        } else if line == ":reload" {
            app.open_search();
            app.wait();
            if let Some(status) = view::render_catalog_status(app.localities()) {
                println!("{}", status);
            } else {
                let count = app.localities().data.as_ref().map_or(0, Vec::len);
                println!("{} localities loaded", count);
            }
        } else if let Some(id) = line.strip_prefix(":go ") {
            open(app, id.trim(), &mut std::io::stdout())?;
            println!("(:back to search another location)");
        } else if let Some(n) = line.strip_prefix('#') {
            let picked = n
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| last_ids.get(i))
                .cloned();
            match picked {
                Some(id) => {
                    open(app, &id, &mut std::io::stdout())?;
                    println!("(:back to search another location)");
                }
                None => println!("No suggestion {}", n.trim()),
            }
        } else {
            app.set_query(line);
            if let Some(status) = view::render_catalog_status(app.localities()) {
                println!("{}", status);
            }
            let suggestions = app.suggestions();
            last_ids = suggestions.iter().map(|r| r.locality_id.clone()).collect();
            print!("{}", view::render_suggestions(&suggestions));
        }
    }

    Ok(())
}

/// Show the detail view for `locality_id`: the pending state first, then
/// whatever the fetch settles to.
fn open(app: &mut App, locality_id: &str, out: &mut impl Write) -> std::io::Result<()> {
    app.select(locality_id);
    writeln!(out, "{}", view::render_weather(locality_id, app.weather()))?;
    out.flush()?;

    app.wait();
    writeln!(out, "{}", view::render_weather(locality_id, app.weather()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_shows_loading_before_result() {
        let mut config = Config::default();
        config.catalog.source = "/no/such/localities.json".to_string();
        config.weather.api_url = "http://127.0.0.1:9/weather".to_string();
        config.weather.api_key = Some("test-key".to_string());
        config.weather.timeout_secs = 2;
        let mut app = App::new(config).unwrap();

        let mut out = Vec::new();
        open(&mut app, "X1", &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        let (first, rest) = out.split_once('\n').unwrap();
        assert_eq!(first, "Loading...");
        assert!(rest.starts_with("Error: "), "unexpected output: {out:?}");
        assert!(!app.weather().loading);
        app.shutdown();
    }

    #[test]
    fn test_load_config_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            format!(
                "config_dir = {:?}\n[weather]\napi_url = \"not-a-url\"\n",
                dir.path().display().to_string()
            ),
        )
        .unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Invalid(_))
        ));
    }
}

use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use cityweather_core::{App, Config, Place, UnitSystem};
use inquire::{CustomType, CustomUserError, InquireError, Select, Text, validator::Validation};
use serde_json::json;
use tracing::debug;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Current weather for any city")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the places matching a search, e.g. "Delhi, IN".
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show current conditions for a place.
    Show {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Pick the Nth candidate (1-based) instead of prompting.
        #[arg(long)]
        pick: Option<usize>,

        /// "metric" or "imperial"; defaults to the configured units.
        #[arg(long)]
        units: Option<UnitSystem>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Search, pick and switch units in a prompt loop.
    Interactive {
        #[arg(long)]
        units: Option<UnitSystem>,
    },

    /// List recent searches.
    Recent {
        /// Forget all recent searches.
        #[arg(long)]
        clear: bool,
    },

    /// Set default units and how many recent searches to keep.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Search { query, json } => search(&query.join(" "), json).await,
            Command::Show {
                query,
                pick,
                units,
                json,
            } => show(&query.join(" "), pick, units, json).await,
            Command::Interactive { units } => interactive(units).await,
            Command::Recent { clear } => recent(clear),
            Command::Configure => configure(),
        }
    }
}

fn load_app(units: Option<UnitSystem>) -> anyhow::Result<App> {
    let mut config = Config::load()?;
    if let Some(units) = units {
        config.units = units;
    }
    debug!(units = %config.units, recent_limit = config.recent_limit, "loaded configuration");
    App::from_config(&config)
}

/// Run a search and return its candidates, failing on network errors.
async fn search_places(app: &mut App, text: &str) -> anyhow::Result<Vec<Place>> {
    if !app.search(text).await {
        bail!("Nothing to search for. Try something like \"Delhi, IN\".");
    }

    let session = app.session();
    if let Some(err) = session.error() {
        bail!("{err}");
    }

    Ok(session.results().unwrap_or_default().to_vec())
}

async fn search(text: &str, as_json: bool) -> anyhow::Result<()> {
    let mut app = load_app(None)?;
    let places = search_places(&mut app, text).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&places)?);
    } else if places.is_empty() {
        println!("No places found for '{}'.", text.trim());
    } else {
        println!("{}", render::candidates(&places));
    }

    Ok(())
}

async fn show(
    text: &str,
    pick: Option<usize>,
    units: Option<UnitSystem>,
    as_json: bool,
) -> anyhow::Result<()> {
    let mut app = load_app(units)?;
    let places = search_places(&mut app, text).await?;

    if places.is_empty() {
        bail!("No places found for '{}'.", text.trim());
    }

    let index = match pick {
        Some(n) => n
            .checked_sub(1)
            .filter(|i| *i < places.len())
            .ok_or_else(|| anyhow!("--pick must be between 1 and {}", places.len()))?,
        None if places.len() == 1 => 0,
        None => match prompt_candidate(&places)? {
            Some(index) => index,
            None => return Ok(()),
        },
    };

    app.select(index).await;

    let session = app.session();
    if let Some(err) = session.error() {
        bail!("{err}");
    }

    let (Some(place), Some(conditions)) = (session.selected_place(), session.conditions()) else {
        bail!("No conditions available for the selected place");
    };

    if as_json {
        let out = json!({ "place": place, "conditions": conditions });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", render::conditions(place, conditions));
    }

    Ok(())
}

/// `None` when the user backs out of the prompt.
fn prompt_candidate(places: &[Place]) -> anyhow::Result<Option<usize>> {
    let options: Vec<String> = places.iter().map(render::candidate).collect();

    match Select::new("Which place?", options).raw_prompt() {
        Ok(choice) => Ok(Some(choice.index)),
        Err(e) if is_cancel(&e) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn is_cancel(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NextStep {
    SwitchUnits,
    OtherPlace,
    NewSearch,
    Quit,
}

impl NextStep {
    fn label(&self, units: UnitSystem) -> String {
        match self {
            NextStep::SwitchUnits => format!("Switch to {}", units.toggled()),
            NextStep::OtherPlace => "Pick another place".to_string(),
            NextStep::NewSearch => "New search".to_string(),
            NextStep::Quit => "Quit".to_string(),
        }
    }
}

async fn interactive(units: Option<UnitSystem>) -> anyhow::Result<()> {
    let mut app = load_app(units)?;

    'search: loop {
        let recent = app.resolver().recent();
        let help = format!("Recent: {}", recent.join(" | "));
        let mut prompt = Text::new("Search for a city (blank to quit):");
        if !recent.is_empty() {
            prompt = prompt.with_help_message(&help);
        }

        let text = match prompt.prompt() {
            Ok(text) => text,
            Err(e) if is_cancel(&e) => break,
            Err(e) => return Err(e.into()),
        };

        if text.trim().is_empty() {
            break;
        }

        let places = match search_places(&mut app, &text).await {
            Ok(places) => places,
            Err(e) => {
                eprintln!("Error: {e}");
                continue;
            }
        };

        if places.is_empty() {
            println!("No places found for '{}'.", text.trim());
            continue;
        }

        'place: loop {
            let Some(index) = prompt_candidate(&places)? else {
                continue 'search;
            };

            app.select(index).await;

            loop {
                let session = app.session();
                match (session.selected_place(), session.conditions()) {
                    (Some(place), Some(conditions)) => {
                        println!("\n{}\n", render::conditions(place, conditions));
                    }
                    _ => {
                        eprintln!("Error: {}", session.error().unwrap_or("no conditions available"));
                        continue 'place;
                    }
                }

                let current = session.units();
                let steps = [
                    NextStep::SwitchUnits,
                    NextStep::OtherPlace,
                    NextStep::NewSearch,
                    NextStep::Quit,
                ];
                let labels: Vec<String> = steps.iter().map(|s| s.label(current)).collect();

                let step = match Select::new("Next?", labels).raw_prompt() {
                    Ok(choice) => steps[choice.index],
                    Err(e) if is_cancel(&e) => NextStep::Quit,
                    Err(e) => return Err(e.into()),
                };

                match step {
                    NextStep::SwitchUnits => app.set_units(current.toggled()).await,
                    NextStep::OtherPlace => continue 'place,
                    NextStep::NewSearch => continue 'search,
                    NextStep::Quit => break 'search,
                }
            }
        }
    }

    Ok(())
}

fn recent(clear: bool) -> anyhow::Result<()> {
    let app = load_app(None)?;
    let resolver = app.resolver();

    if clear {
        resolver.clear_recent().context("Failed to clear recent searches")?;
        println!("Recent searches cleared.");
        return Ok(());
    }

    let entries = resolver.recent();
    if entries.is_empty() {
        println!("No recent searches.");
    } else {
        for entry in entries {
            println!("{entry}");
        }
    }

    Ok(())
}

fn validate_recent_limit(limit: &usize) -> Result<Validation, CustomUserError> {
    if *limit >= 1 {
        Ok(Validation::Valid)
    } else {
        Ok(Validation::Invalid("Keep at least one recent search".into()))
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let options = UnitSystem::all().to_vec();
    let cursor = options.iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Default units:", options)
        .with_starting_cursor(cursor)
        .prompt()?;

    config.recent_limit = CustomType::<usize>::new("Recent searches to keep:")
        .with_default(config.recent_limit)
        .with_error_message("Please enter a whole number")
        .with_validator(validate_recent_limit)
        .prompt()?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_joins_query_words_and_parses_units() {
        let cli = Cli::parse_from([
            "cityweather", "show", "Delhi,", "IN", "--units", "Imperial", "--pick", "2",
        ]);
        let Command::Show {
            query, pick, units, json,
        } = cli.command
        else {
            panic!("expected show");
        };
        assert_eq!(query.join(" "), "Delhi, IN");
        assert_eq!(pick, Some(2));
        assert_eq!(units, Some(UnitSystem::Imperial));
        assert!(!json);
    }

    #[test]
    fn rejects_unknown_units() {
        let res = Cli::try_parse_from(["cityweather", "show", "Oslo", "--units", "kelvin"]);
        assert!(res.is_err());
    }

    #[test]
    fn recent_limit_prompt_rejects_zero() {
        assert!(matches!(validate_recent_limit(&0), Ok(Validation::Invalid(_))));
        assert!(matches!(validate_recent_limit(&1), Ok(Validation::Valid)));
        assert!(matches!(validate_recent_limit(&20), Ok(Validation::Valid)));
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["cityweather", "recent", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Recent { clear: false }));
    }
}

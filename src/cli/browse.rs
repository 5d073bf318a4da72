//! Interactive browsing: one intent per line on stdin, redraw after each.

use std::io::Write as _;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;
use crate::locate::{self, LocationProvider};
use crate::model::Coordinate;
use crate::source::{Near, TruckQuery, TruckSource};
use crate::storage::Storage;
use crate::store::{Concern, TruckStore};

use super::format::{format_detail, format_listing, format_status, short_id};
use super::match_prefix;

const HELP: &str = "\
Commands:
  search <text>          filter by name, description, cuisine, address
  cuisine <tag>[,<tag>]  filter by cuisine tags (no tags clears, `all` disables)
  near [LAT,LNG]         rank by distance from a point (default-center if omitted)
  locate                 find your location, then refresh nearby trucks
  refresh                fetch trucks again
  select <id>            select a truck by id prefix
  unselect               clear the selection
  show                   details of the selected truck
  clear                  start over: no filters, no location
  help                   this text
  quit                   leave";

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Intent {
    Search(String),
    Cuisine(Vec<String>),
    Near(Option<Coordinate>),
    Locate,
    Refresh,
    Select(String),
    Unselect,
    Show,
    Clear,
    Help,
    Quit,
}

/// Parses one input line. Blank lines are `Ok(None)`.
pub(super) fn parse_intent(line: &str) -> Result<Option<Intent>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));

    let intent = match word.to_lowercase().as_str() {
        "search" | "s" => Intent::Search(rest.to_string()),
        "cuisine" | "c" => Intent::Cuisine(
            rest.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        "near" => {
            if rest.is_empty() {
                Intent::Near(None)
            } else {
                Intent::Near(Some(rest.parse()?))
            }
        }
        "locate" => Intent::Locate,
        "refresh" => Intent::Refresh,
        "select" => {
            if rest.is_empty() {
                return Err("select needs a truck id".to_string());
            }
            Intent::Select(rest.to_string())
        }
        "unselect" => Intent::Unselect,
        "show" => Intent::Show,
        "clear" => Intent::Clear,
        "help" | "?" => Intent::Help,
        "quit" | "exit" | "q" => Intent::Quit,
        other => return Err(format!("unknown command '{other}' (try `help`)")),
    };
    Ok(Some(intent))
}

/// Runs a browse session until `quit` or end of input.
pub(super) async fn run(
    config: &Config,
    storage: &Storage,
    near: Option<Coordinate>,
) -> Result<(), String> {
    let timeout = Duration::from_secs(config.locate_timeout_secs);
    let mut store = TruckStore::new();

    // Locating and the first fetch overlap; the fetch is redone once a
    // location is known so the radius applies.
    let provider = locate::resolve_provider(near, config);
    let everything = server_query(config, None);
    let fetch = store.begin_fetch();
    let located = store.begin_locate();
    let (trucks, position) = tokio::join!(
        TruckSource::fetch_trucks(storage, &everything),
        locate_with(provider.as_deref(), timeout),
    );
    store.complete_fetch(fetch, trucks);
    store.complete_locate(located, position);
    if let Some(observer) = store.observer() {
        store.refresh(storage, &server_query(config, Some(observer))).await;
    }
    print!("{}", render(&store));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| format!("failed to read input: {e}"))?
        else {
            return Ok(());
        };

        let intent = match parse_intent(&line) {
            Ok(Some(intent)) => intent,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match intent {
            Intent::Search(text) => store.set_query(text),
            Intent::Cuisine(tags) => store.set_cuisine_selection(tags),
            Intent::Near(coordinate) => {
                let coordinate = coordinate.unwrap_or_else(|| config.default_center());
                store.set_observer_coordinate(Some(coordinate));
                store.refresh(storage, &server_query(config, Some(coordinate))).await;
            }
            Intent::Locate => {
                let provider = locate::resolve_provider(None, config);
                let ticket = store.begin_locate();
                let position = locate_with(provider.as_deref(), timeout).await;
                store.complete_locate(ticket, position);
                if store.status(Concern::Location).error.is_none() {
                    let query = server_query(config, store.observer());
                    store.refresh(storage, &query).await;
                }
            }
            Intent::Refresh => {
                let query = server_query(config, store.observer());
                store.refresh(storage, &query).await;
            }
            Intent::Select(reference) => match match_prefix(store.trucks(), &reference).cloned() {
                Ok(truck) => store.set_selected(Some(truck)),
                Err(e) => {
                    println!("{e}");
                    continue;
                }
            },
            Intent::Unselect => store.set_selected(None),
            Intent::Show => {
                match store.selected() {
                    Some(truck) => {
                        println!("{}", format_detail(truck, truck.weekly_hours.is_open_now()));
                    }
                    None => println!("Nothing selected"),
                }
                continue;
            }
            Intent::Clear => {
                store.reset();
                store.refresh(storage, &server_query(config, None)).await;
            }
            Intent::Help => {
                println!("{HELP}");
                continue;
            }
            Intent::Quit => return Ok(()),
        }

        print!("{}", render(&store));
    }
}

/// What browse asks storage for: everything active, or everything nearby.
///
/// Text and cuisine narrowing happen locally so they can change without a
/// round trip.
fn server_query(config: &Config, observer: Option<Coordinate>) -> TruckQuery {
    TruckQuery {
        near: observer.map(|coordinate| Near {
            coordinate,
            radius_meters: config.search_radius,
        }),
        limit: Some(config.limit),
        ..TruckQuery::default()
    }
}

async fn locate_with(
    provider: Result<&dyn LocationProvider, &locate::LocationError>,
    timeout: Duration,
) -> Result<Coordinate, locate::LocationError> {
    match provider {
        Ok(provider) => locate::locate_within(provider, timeout).await,
        Err(e) => Err(e.clone()),
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

/// The whole screen: filters, status slots, listings and selection.
fn render(store: &TruckStore) -> String {
    let mut lines = Vec::new();

    let mut filters = Vec::new();
    if !store.query().is_empty() {
        filters.push(format!("search \"{}\"", store.query()));
    }
    if !store.cuisines().is_empty() {
        let tags: Vec<&str> = store.cuisines().iter().map(String::as_str).collect();
        filters.push(format!("cuisine {}", tags.join(", ")));
    }
    if let Some(observer) = store.observer() {
        filters.push(format!("near {observer}"));
    }
    if !filters.is_empty() {
        lines.push(format!("Filters: {}", filters.join("; ")));
    }

    lines.extend(format_status("trucks", store.status(Concern::Trucks)));
    lines.extend(format_status("location", store.status(Concern::Location)));

    if store.listings().is_empty() {
        lines.push("No trucks".to_string());
    } else {
        for listing in store.listings() {
            lines.push(format_listing(
                listing,
                listing.truck.weekly_hours.is_open_now(),
            ));
        }
    }

    if let Some(selected) = store.selected() {
        lines.push(format!(
            "Selected: {} {}",
            short_id(&selected.id),
            selected.name
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::model::Truck;
    use crate::seed;

    #[test]
    fn parses_every_intent() {
        let cases = [
            ("search taco truck", Intent::Search("taco truck".into())),
            ("search", Intent::Search(String::new())),
            (
                "cuisine Italian, Korean",
                Intent::Cuisine(vec!["Italian".into(), "Korean".into()]),
            ),
            ("cuisine", Intent::Cuisine(vec![])),
            (
                "near 40.7,-74.0",
                Intent::Near(Some(Coordinate::new(40.7, -74.0))),
            ),
            ("near", Intent::Near(None)),
            ("locate", Intent::Locate),
            ("refresh", Intent::Refresh),
            ("select 3f2a", Intent::Select("3f2a".into())),
            ("unselect", Intent::Unselect),
            ("show", Intent::Show),
            ("clear", Intent::Clear),
            ("help", Intent::Help),
            ("quit", Intent::Quit),
            ("  QUIT  ", Intent::Quit),
        ];
        for (line, expected) in cases {
            assert_eq!(parse_intent(line).unwrap(), Some(expected), "{line:?}");
        }
    }

    #[test]
    fn blank_line_is_nothing() {
        assert_eq!(parse_intent("   ").unwrap(), None);
    }

    #[test]
    fn bad_lines_are_errors() {
        assert!(parse_intent("dance").unwrap_err().contains("unknown command 'dance'"));
        assert!(parse_intent("select").is_err());
        assert!(parse_intent("near here").is_err());
    }

    #[test]
    fn server_query_narrows_by_location_only() {
        let config = Config::default();
        let query = server_query(&config, None);
        assert_eq!(query.near, None);
        assert_eq!(query.limit, Some(config.limit));
        assert!(query.search_text.is_none() && query.cuisine.is_none());

        let here = Coordinate::new(40.7, -74.0);
        let query = server_query(&config, Some(here));
        assert_eq!(
            query.near,
            Some(Near {
                coordinate: here,
                radius_meters: config.search_radius,
            })
        );
    }

    #[test]
    fn render_shows_filters_status_and_selection() {
        let trucks: Vec<Truck> = seed::sample_trucks()
            .into_iter()
            .map(|t| t.into_truck(Timestamp::UNIX_EPOCH))
            .collect();
        let mut store = TruckStore::new();
        store.replace_full_list(trucks);
        store.set_query("pizza");
        store.set_error(Concern::Location, Some("Location error: denied".into()));
        let pick = store.listings()[0].truck.clone();
        store.set_selected(Some(pick));

        let screen = render(&store);
        let lines: Vec<&str> = screen.lines().collect();

        assert_eq!(lines[0], "Filters: search \"pizza\"");
        assert_eq!(lines[1], "location: Location error: denied");
        assert!(lines[2].contains("Little Italy Express"));
        assert!(lines[3].starts_with("Selected: "));
        assert!(lines[3].ends_with(" Little Italy Express"));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn render_empty_store() {
        assert_eq!(render(&TruckStore::new()), "No trucks\n");
    }
}

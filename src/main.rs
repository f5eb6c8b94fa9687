// Entry point and interactive console flow.
//
// [1] loads the spreadsheet (falling back to sample data), [2] prints the
// statistics for the current filter, [3]/[4] edit the filter, [5] searches
// the whole dataset and [6] exports the filtered view.
use disability_monitor::config::{AppConfig, CONFIG_FILE};
use disability_monitor::output;
use disability_monitor::prefs::{JsonFilePreferences, PreferenceStore, ViewPreferences};
use disability_monitor::reports;
use disability_monitor::util::format_int;
use disability_monitor::{Controller, FilterPatch, Gender};
use std::io::{self, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    prompt("Enter choice: ")
}

/// Blank keeps the current value, `-` clears it, anything else sets it.
fn prompt_field(label: &str) -> Option<Option<String>> {
    match prompt(label).as_str() {
        "" => None,
        "-" => Some(None),
        v => Some(Some(v.to_string())),
    }
}

fn parse_year_range(s: &str) -> Option<(i32, i32)> {
    let (start, end) = s.split_once('-').unwrap_or((s, s));
    Some((start.trim().parse().ok()?, end.trim().parse().ok()?))
}

fn handle_load(controller: &mut Controller) {
    println!("Processing dataset...");
    let outcome = controller.load_dataset();
    let summary = &outcome.dataset.summary;
    println!(
        "({} records loaded across {} regions and {} disability types, {} people)",
        format_int(summary.total_records),
        format_int(summary.regions.len()),
        format_int(summary.disability_types.len()),
        format_int(summary.total_count)
    );
    println!("Loaded at {}", outcome.loaded_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(w) = &outcome.warning {
        println!("Note: {}", w);
    }
    println!();
}

fn handle_stats(controller: &Controller, prefs: &ViewPreferences) {
    if controller.dataset().is_none() {
        println!("Error: No data loaded. Please load the dataset first (option 1).\n");
        return;
    }
    let result = controller.result();
    let stats = &result.stats;
    println!(
        "Filtered records: {}  |  People (male + female): {}\n",
        format_int(result.records.len()),
        format_int(stats.total_count)
    );
    let n = prefs.preview_rows;
    let note = Some("male + female only");
    output::preview_table("By Region", note, &reports::region_rows(stats), n);
    output::preview_table("By Gender", None, &reports::gender_rows(stats), n);
    output::preview_table("By Disability Type", note, &reports::type_rows(stats), n);
    if stats.yearly_trend.is_some() {
        output::preview_table("Yearly Trend", None, &reports::trend_rows(stats), n);
    }
}

fn handle_set_filter(controller: &mut Controller) {
    if controller.dataset().is_none() {
        println!("Error: No data loaded. Please load the dataset first (option 1).\n");
        return;
    }
    println!("(Enter to keep, '-' to clear)");
    let mut patch = FilterPatch {
        region: prompt_field("Region: "),
        disability_type: prompt_field("Disability type: "),
        search_text: prompt_field("Search text: "),
        ..Default::default()
    };
    patch.gender =
        prompt_field("Gender (male/female/total): ").map(|v| v.and_then(|g| Gender::parse(&g)));
    patch.year_range = prompt_field("Year range (e.g. 2022-2024): ")
        .map(|v| v.and_then(|r| parse_year_range(&r)));
    controller.set_filter(patch);
    println!("Filter: {:?}\n", controller.filter());
}

fn handle_search(controller: &Controller, prefs: &ViewPreferences) {
    let query = prompt("Search: ");
    let found = controller.search(&query);
    println!("{} matches", format_int(found.len()));
    let rows = reports::record_rows(&found);
    output::preview_table("Search Results", None, &rows, prefs.preview_rows);
}

fn handle_export(controller: &Controller) {
    if controller.dataset().is_none() {
        println!("Error: No data loaded. Please load the dataset first (option 1).\n");
        return;
    }
    let result = controller.result();
    let files: [(&str, Result<(), Box<dyn std::error::Error>>); 4] = [
        (
            "filtered_records.csv",
            output::write_csv(
                Path::new("filtered_records.csv"),
                &reports::record_rows(&result.records),
            ),
        ),
        (
            "region_stats.csv",
            output::write_csv(Path::new("region_stats.csv"), &reports::region_rows(&result.stats)),
        ),
        (
            "type_stats.csv",
            output::write_csv(Path::new("type_stats.csv"), &reports::type_rows(&result.stats)),
        ),
        ("stats.json", output::write_json(Path::new("stats.json"), &result.stats)),
    ];
    for (name, res) in files {
        match res {
            Ok(()) => println!("Saved {}", name),
            Err(e) => eprintln!("Write error ({}): {}", name, e),
        }
    }
    println!();
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load(Path::new(CONFIG_FILE)).unwrap_or_else(|e| {
        eprintln!("Invalid {}: {} (using defaults)", CONFIG_FILE, e);
        AppConfig::default()
    });
    let store = JsonFilePreferences::new(config.preferences_path.clone());
    let mut prefs = match store.load() {
        Ok(p) => p.unwrap_or_default(),
        Err(e) => {
            eprintln!("Ignoring saved preferences: {}", e);
            ViewPreferences::default()
        }
    };
    let mut controller = Controller::from_config(&config);

    loop {
        println!("Disability Statistics Monitor");
        println!("[1] Load the dataset");
        println!("[2] Show statistics");
        println!("[3] Set filter");
        println!("[4] Clear filter");
        println!("[5] Search records");
        println!("[6] Export results");
        println!("[7] Set preview rows");
        println!("[0] Exit\n");
        match read_choice().as_str() {
            "1" => handle_load(&mut controller),
            "2" => handle_stats(&controller, &prefs),
            "3" => handle_set_filter(&mut controller),
            "4" => {
                controller.clear_filter();
                println!("Filter cleared.\n");
            }
            "5" => handle_search(&controller, &prefs),
            "6" => handle_export(&controller),
            "7" => match prompt("Rows per table: ").parse::<usize>() {
                Ok(n) if n > 0 => prefs.preview_rows = n,
                _ => println!("Invalid number.\n"),
            },
            "0" => {
                if let Err(e) = store.save(&prefs) {
                    eprintln!("Could not save preferences: {}", e);
                }
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-7.\n"),
        }
    }
}

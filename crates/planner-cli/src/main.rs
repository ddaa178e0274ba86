use std::env;
use std::fs;

use contracts::{ScorableItem, SimulationRequest, StoredItem};
use planner_api::config::{self, ServerConfig};
use planner_api::{serve, PlannerApi};
use planner_core::score;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(String),
    Runtime(String),
}

fn print_usage() {
    println!("planner <command>");
    println!("commands:");
    println!("  score <priority> <price>");
    println!("  simulate <items.json> <initial_budget> <monthly_income> [deadline_months] [max_price]");
    println!("    simulates inline items and prints the monthly plan as json");
    println!("  import <user_id> <items.json> [sqlite_path]");
    println!("  top <user_id> [limit] [sqlite_path]");
    println!("  plan <user_id> <initial_budget> <monthly_income> [sqlite_path]");
    println!("  serve [addr] [sqlite_path]");
    println!("    default addr: {}", config::DEFAULT_ADDR);
    println!("env: {} {} {}", config::SQLITE_PATH_ENV, config::ADDR_ENV, config::LOG_ENV);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(config::LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn required<'a>(value: Option<&'a String>, label: &str) -> Result<&'a str, CliError> {
    value
        .map(String::as_str)
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| CliError::Usage(format!("missing {label}")))
}

fn parse_f64(value: Option<&String>, label: &str) -> Result<f64, CliError> {
    let raw = required(value, label)?;
    raw.parse::<f64>()
        .map_err(|_| CliError::Usage(format!("invalid {label}: {raw}")))
}

fn parse_optional<T: std::str::FromStr>(
    value: Option<&String>,
    label: &str,
) -> Result<Option<T>, CliError> {
    value
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| CliError::Usage(format!("invalid {label}: {raw}")))
        })
        .transpose()
}

fn parse_sqlite_path(value: Option<&String>) -> String {
    value
        .map(String::to_string)
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(config::default_sqlite_path)
}

fn read_json_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, CliError> {
    let raw = fs::read_to_string(path)
        .map_err(|err| CliError::Runtime(format!("failed to read {path}: {err}")))?;
    serde_json::from_str(&raw)
        .map_err(|err| CliError::Runtime(format!("failed to parse {path}: {err}")))
}

fn open_api(sqlite_path: &str) -> Result<PlannerApi, CliError> {
    let mut api = PlannerApi::new();
    api.attach_sqlite_store(sqlite_path)
        .map_err(|err| CliError::Runtime(format!("failed to attach sqlite store: {err}")))?;
    Ok(api)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::Runtime(format!("failed to render json: {err}")))?;
    println!("{rendered}");
    Ok(())
}

fn run_score(args: &[String]) -> Result<(), CliError> {
    let priority = parse_f64(args.get(2), "priority")?;
    let price = parse_f64(args.get(3), "price")?;

    let value = score(priority, price);
    if value.is_finite() {
        println!("score={value}");
    } else {
        println!("score=Infinity");
    }
    Ok(())
}

fn run_inline_simulation(args: &[String]) -> Result<(), CliError> {
    let items_path = required(args.get(2), "items file")?;
    let mut request = SimulationRequest::new(
        parse_f64(args.get(3), "initial_budget")?,
        parse_f64(args.get(4), "monthly_income")?,
    );
    request.deadline_months = parse_optional::<i64>(args.get(5), "deadline_months")?;
    request.max_price_threshold = parse_optional::<f64>(args.get(6), "max_price")?;

    let items: Vec<ScorableItem> = read_json_file(items_path)?;
    let result = PlannerApi::new()
        .simulate(&items, &request)
        .map_err(|err| CliError::Runtime(err.to_string()))?;

    tracing::info!(%result, "inline simulation finished");
    print_json(&result)
}

fn run_import(args: &[String]) -> Result<(), CliError> {
    let user_id = required(args.get(2), "user_id")?;
    let items_path = required(args.get(3), "items file")?;
    let sqlite_path = parse_sqlite_path(args.get(4));

    let items: Vec<StoredItem> = read_json_file(items_path)?;
    let mut api = open_api(&sqlite_path)?;
    let imported = api
        .import_items(user_id, &items)
        .map_err(|err| CliError::Runtime(format!("import failed: {err}")))?;

    println!("imported user_id={user_id} items={imported} sqlite={sqlite_path}");
    Ok(())
}

fn run_top(args: &[String]) -> Result<(), CliError> {
    let user_id = required(args.get(2), "user_id")?;
    let limit = parse_optional::<usize>(args.get(3), "limit")?;
    let sqlite_path = parse_sqlite_path(args.get(4));

    let api = open_api(&sqlite_path)?;
    let response = api
        .top_items_for_user(user_id, limit)
        .map_err(|err| CliError::Runtime(err.to_string()))?;

    for (rank, scored) in response.items.iter().enumerate() {
        println!(
            "{}. {} ({}) price={:.2} score={:.4}",
            rank + 1,
            scored.item.name,
            scored.item.id,
            scored.item.price,
            scored.score
        );
    }
    Ok(())
}

fn run_plan(args: &[String]) -> Result<(), CliError> {
    let user_id = required(args.get(2), "user_id")?;
    let request = SimulationRequest::new(
        parse_f64(args.get(3), "initial_budget")?,
        parse_f64(args.get(4), "monthly_income")?,
    );
    let sqlite_path = parse_sqlite_path(args.get(5));

    let api = open_api(&sqlite_path)?;
    let result = api
        .simulate_for_user(user_id, &request)
        .map_err(|err| CliError::Runtime(err.to_string()))?;

    for month in &result.monthly_purchases {
        let names = month
            .items
            .iter()
            .map(|scored| scored.item.name.as_str())
            .collect::<Vec<_>>();
        println!(
            "month {}: {} spent={:.2} remaining={:.2}",
            month.month,
            names.join(", "),
            month.spent,
            month.remaining
        );
    }
    println!("{result}");
    if !result.is_fully_purchased() {
        let names = result
            .unpurchased
            .iter()
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>();
        println!("still unaffordable: {}", names.join(", "));
    }
    Ok(())
}

fn parse_serve_config(args: &[String]) -> Result<ServerConfig, CliError> {
    ServerConfig::resolve(
        args.get(2).map(String::as_str),
        args.get(3).map(String::as_str),
    )
    .map_err(CliError::Usage)
}

async fn run_serve(args: &[String]) -> Result<(), CliError> {
    let config = parse_serve_config(args)?;
    let api = open_api(&config.sqlite_path)?;

    println!(
        "serving api on http://{} sqlite={}",
        config.addr, config.sqlite_path
    );
    serve(config.addr, api)
        .await
        .map_err(|err| CliError::Runtime(format!("server error: {err}")))
}

#[tokio::main]
async fn main() {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    let outcome = match command {
        Some("score") => run_score(&args),
        Some("simulate") => run_inline_simulation(&args),
        Some("import") => run_import(&args),
        Some("top") => run_top(&args),
        Some("plan") => run_plan(&args),
        Some("serve") => run_serve(&args).await,
        _ => {
            print_usage();
            Ok(())
        }
    };

    match outcome {
        Ok(()) => {}
        Err(CliError::Usage(err)) => {
            eprintln!("error: {err}");
            print_usage();
            std::process::exit(2);
        }
        Err(CliError::Runtime(err)) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn serve_accepts_addr_and_sqlite_path() {
        let config = parse_serve_config(&args(&[
            "planner",
            "serve",
            "127.0.0.1:9100",
            "wishlist.sqlite",
        ]))
        .expect("serve config");

        assert_eq!(config.addr.port(), 9100);
        assert_eq!(config.sqlite_path, "wishlist.sqlite");
    }

    #[test]
    fn serve_rejects_bad_addr_as_usage_error() {
        let error = parse_serve_config(&args(&["planner", "serve", "not-an-addr"]))
            .expect_err("bad addr");
        assert!(matches!(error, CliError::Usage(message) if message.contains("not-an-addr")));
    }

    #[test]
    fn optional_numbers_report_the_label() {
        let error = parse_optional::<i64>(Some(&"soon".to_string()), "deadline_months")
            .expect_err("not a number");
        assert!(matches!(error, CliError::Usage(message) if message == "invalid deadline_months: soon"));
        assert_eq!(parse_optional::<i64>(None, "deadline_months").expect("absent"), None);
    }
}

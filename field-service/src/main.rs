use anyhow::{anyhow, bail, Context, Result};
use field_service::{
    config::AppConfig,
    dashboard::Overview,
    observability,
    search::{BillStatus, ReadingStatus},
    sinks::export_file_name,
    views::{self, ActivityKind, ActivityView, BillsView, Notice, ReadingField, ReadingsView},
};
use meter_client::domain::LogEntry;
use meter_client::{BillRepository, LogRepository, ReadingRepository, RecordRepository, StoreClient};
use serde::Serialize;
use std::{env, path::PathBuf};
use time::OffsetDateTime;
use tokio::io::{AsyncBufReadExt, BufReader};

const USAGE: &str = "usage: field-desk <command>

commands:
  import-readings <file>       import a route sheet (.xlsx, .xls, .csv, .dat)
  import-bills <file>          import a bill sheet
  export-readings [target]     export readings (.xlsx or .csv)
  export-bills [target]        export bills (.xlsx or .csv)
  readings [--search q] [--status all|read|unread]
  bills [--search q] [--status all|paid|unpaid]
  record <id> <value>          record a meter value
  note <id> <text>             set the observation on a reading
  flag <id>                    toggle the flag on a reading
  pay <id>                     toggle the payment status of a bill
  overview                     progress and collected totals
  logs                         activity log, newest first
  reset [--yes]                erase all readings, bills and logs";

#[derive(Serialize)]
struct LogLine<'a> {
    kind: ActivityKind,
    #[serde(flatten)]
    entry: &'a LogEntry,
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        bail!(USAGE);
    };

    let cfg = AppConfig::load()?;
    let store = StoreClient::open(&cfg.store.path, cfg.store.max_connections)
        .await
        .with_context(|| format!("opening {}", cfg.store.path.display()))?;

    let result = run(&cfg, &store, command, rest).await;
    store.close().await;
    result
}

async fn run(cfg: &AppConfig, store: &StoreClient, command: &str, rest: &[String]) -> Result<()> {
    let readings = ReadingRepository::new(store.clone());
    let bills = BillRepository::new(store.clone());
    let logs = LogRepository::new(store.clone());

    match command {
        "import-readings" => {
            let file = path_arg(rest, "import-readings <file>")?;
            let mut view = ReadingsView::load(readings, logs).await?;
            report(view.import(&file).await)
        }
        "import-bills" => {
            let file = path_arg(rest, "import-bills <file>")?;
            let mut view = BillsView::load(bills, logs).await?;
            report(view.import(&file).await)
        }
        "export-readings" => {
            let target = export_target(cfg, rest, "readings");
            let view = ReadingsView::load(readings, logs).await?;
            let notice = view.export(&target).await;
            if !notice.is_error() {
                println!("{}", target.display());
            }
            report(notice)
        }
        "export-bills" => {
            let target = export_target(cfg, rest, "bills");
            let view = BillsView::load(bills, logs).await?;
            let notice = view.export(&target).await;
            if !notice.is_error() {
                println!("{}", target.display());
            }
            report(notice)
        }
        "readings" => {
            let (search, status) = list_args(rest)?;
            let status: ReadingStatus = match status {
                Some(s) => s.parse().map_err(|e: String| anyhow!(e))?,
                None => ReadingStatus::default(),
            };
            let view = ReadingsView::load(readings, logs).await?;
            println!("{}", serde_json::to_string_pretty(&view.filtered(&search, status))?);
            Ok(())
        }
        "bills" => {
            let (search, status) = list_args(rest)?;
            let status: BillStatus = match status {
                Some(s) => s.parse().map_err(|e: String| anyhow!(e))?,
                None => BillStatus::default(),
            };
            let view = BillsView::load(bills, logs).await?;
            println!("{}", serde_json::to_string_pretty(&view.filtered(&search, status))?);
            Ok(())
        }
        "record" | "note" => {
            let id = id_arg(rest)?;
            let value = rest[1..].join(" ");
            let field = if command == "record" {
                ReadingField::MeterValue
            } else {
                ReadingField::Obs
            };
            let mut view = ReadingsView::load(readings, logs).await?;
            if !view.readings().iter().any(|r| r.id == Some(id)) {
                bail!("no reading with id {id}");
            }
            match view.set_field(id, field, value.trim()).await {
                Some(notice) => report(notice),
                None => {
                    println!("No change");
                    Ok(())
                }
            }
        }
        "flag" => {
            let id = id_arg(rest)?;
            let mut view = ReadingsView::load(readings, logs).await?;
            let notice = view
                .toggle_flag(id)
                .await
                .ok_or_else(|| anyhow!("no reading with id {id}"))?;
            report(notice)
        }
        "pay" => {
            let id = id_arg(rest)?;
            let mut view = BillsView::load(bills, logs).await?;
            let notice = view
                .toggle_payment(id)
                .await
                .ok_or_else(|| anyhow!("no bill with id {id}"))?;
            report(notice)
        }
        "overview" => {
            let overview = Overview::compute(&readings.get_all().await?, &bills.get_all().await?);
            println!("{}", serde_json::to_string_pretty(&overview)?);
            Ok(())
        }
        "logs" => {
            let view = ActivityView::load(&logs).await?;
            let lines: Vec<LogLine<'_>> = view
                .kinds()
                .map(|(kind, entry)| LogLine { kind, entry })
                .collect();
            println!("{}", serde_json::to_string_pretty(&lines)?);
            Ok(())
        }
        "reset" => {
            let confirmed = rest.iter().any(|a| a == "--yes") || confirm_reset().await?;
            if !confirmed {
                println!("Reset cancelled");
                return Ok(());
            }
            report(views::reset_all(&readings, &bills, &logs).await)
        }
        other => bail!("unknown command '{other}'\n\n{USAGE}"),
    }
}

fn report(notice: Notice) -> Result<()> {
    if notice.is_error() {
        bail!(notice.message);
    }
    println!("{notice}");
    Ok(())
}

fn path_arg(rest: &[String], usage: &str) -> Result<PathBuf> {
    match rest.first() {
        Some(p) => Ok(PathBuf::from(p)),
        None => bail!("usage: field-desk {usage}"),
    }
}

fn id_arg(rest: &[String]) -> Result<i64> {
    let raw = rest.first().ok_or_else(|| anyhow!("missing record id"))?;
    raw.parse().with_context(|| format!("invalid record id '{raw}'"))
}

/// Defaults to `<export.dir>/<prefix>_export_<date>.xlsx`.
fn export_target(cfg: &AppConfig, rest: &[String], prefix: &str) -> PathBuf {
    match rest.first() {
        Some(p) => PathBuf::from(p),
        None => cfg
            .export
            .dir
            .join(export_file_name(prefix, OffsetDateTime::now_utc(), "xlsx")),
    }
}

fn list_args(rest: &[String]) -> Result<(String, Option<String>)> {
    let mut search = String::new();
    let mut status = None;

    let mut it = rest.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--search" => {
                search = it
                    .next()
                    .ok_or_else(|| anyhow!("--search needs a value"))?
                    .clone();
            }
            "--status" => {
                status = Some(
                    it.next()
                        .ok_or_else(|| anyhow!("--status needs a value"))?
                        .clone(),
                );
            }
            other => bail!("unexpected argument '{other}'"),
        }
    }

    Ok((search, status))
}

async fn confirm_reset() -> Result<bool> {
    eprint!("This erases every reading, bill and log entry. Type 'yes' to continue: ");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line.trim().eq_ignore_ascii_case("yes"))
}

use std::process::ExitCode;

use anyhow::{anyhow, Context};
use dotenvy::dotenv;
use models::{DefaultSet, OptionRecord, Slug};
use service::composite::{CompositeOption, OpenOption};
use tracing::{error, info, warn};
use uuid::Uuid;

const USAGE: &str = "usage: optionsctl <get SLUG [KEY] | set SLUG KEY JSON | merge SLUG JSON_OBJECT | delete SLUG [KEY]>";

enum Command {
    Get { slug: Slug, key: Option<String> },
    Set { slug: Slug, key: String, value: serde_json::Value },
    Merge { slug: Slug, partial: OptionRecord },
    Delete { slug: Slug, key: Option<String> },
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let slug = |i: usize| -> anyhow::Result<Slug> {
        let raw = args.get(i).ok_or_else(|| anyhow!(USAGE))?;
        Ok(Slug::new(raw.as_str())?)
    };
    let json = |i: usize| -> anyhow::Result<serde_json::Value> {
        let raw = args.get(i).ok_or_else(|| anyhow!(USAGE))?;
        serde_json::from_str(raw).with_context(|| format!("invalid JSON: {raw}"))
    };
    match args.first().map(String::as_str) {
        Some("get") => Ok(Command::Get { slug: slug(1)?, key: args.get(2).cloned() }),
        Some("set") => Ok(Command::Set {
            slug: slug(1)?,
            key: args.get(2).cloned().ok_or_else(|| anyhow!(USAGE))?,
            value: json(3)?,
        }),
        Some("merge") => Ok(Command::Merge { slug: slug(1)?, partial: serde_json::from_value(json(2)?)? }),
        Some("delete") => Ok(Command::Delete { slug: slug(1)?, key: args.get(2).cloned() }),
        _ => Err(anyhow!(USAGE)),
    }
}

async fn run(cmd: Command) -> anyhow::Result<()> {
    // 配置缺失时回落到内存存储，便于本地试用
    let (cfg, load_err) = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => (cfg, None),
        Err(e) => (configs::AppConfig::default(), Some(e)),
    };
    service::runtime::init_logging(&cfg.logging);
    if let Some(e) = load_err {
        warn!(service = "optionsctl", event = "config_fallback", error = %e, "using default config");
    }
    let svc = service::runtime::bootstrap(&cfg).await?;

    match cmd {
        Command::Get { slug, key: None } => {
            let record = svc.get_option(&slug).await?.unwrap_or_default();
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Get { slug, key: Some(key) } => {
            let opt = OpenOption::from_service(slug, DefaultSet::new(), &svc);
            println!("{}", serde_json::to_string_pretty(&opt.get(&key).await?)?);
        }
        Command::Set { slug, key, value } => {
            OpenOption::from_service(slug, DefaultSet::new(), &svc).set(&key, value).await?;
        }
        Command::Merge { slug, partial } => {
            let written = OpenOption::from_service(slug, DefaultSet::new(), &svc).merge(partial, true).await?;
            println!("{written}");
        }
        Command::Delete { slug, key: Some(key) } => {
            OpenOption::from_service(slug, DefaultSet::new(), &svc).delete(&key).await?;
        }
        Command::Delete { slug, key: None } => {
            println!("{}", svc.delete_option(&slug).await?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    // 提前加载 .env，使得 RUST_LOG / CONFIG_PATH 生效
    dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cmd = match parse_args(&args) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let run_id = Uuid::new_v4();
    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to build tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cmd)) {
        Ok(()) => {
            info!(service = "optionsctl", event = "done", %run_id, "command finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "optionsctl", event = "command_failed", %run_id, error = %e, "command failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

use clap::Parser;
use colored::Colorize;
use oom_core::OomConfig;
use oom_verify::{verify_all, SuiteReport, VerifyConfig};

#[derive(Parser)]
#[command(
    name = "oom-verify",
    version,
    about = "Insert, reload and compare one entity against each configured SQL backend"
)]
struct Cli {
    /// Configuration profile (application-{profile}.yaml)
    #[arg(long, default_value = "dev")]
    profile: String,

    /// Backend to run (mysql, postgres, hsqldb, sqlite). Repeatable; defaults to `oom.backends`
    #[arg(long = "backend", value_name = "NAME")]
    backends: Vec<String>,

    /// Connection URL for a backend, as NAME=URL. Repeatable
    #[arg(long = "url", value_name = "NAME=URL", value_parser = parse_url_override)]
    urls: Vec<(String, String)>,
}

fn parse_url_override(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, url)) if !name.is_empty() && !url.is_empty() => {
            Ok((name.to_string(), url.to_string()))
        }
        _ => Err(format!("expected NAME=URL, got '{raw}'")),
    }
}

fn run(cli: Cli) -> Result<SuiteReport, Box<dyn std::error::Error>> {
    let config = OomConfig::load(&cli.profile)?;
    let mut verify = VerifyConfig::from_config(&config)?;
    verify.select(&cli.backends)?;
    for (name, url) in &cli.urls {
        verify.override_url(name, url)?;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(verify_all(&verify.backends, &verify.pool)))
}

fn print_report(report: &SuiteReport) {
    for outcome in &report.outcomes {
        match outcome {
            Ok(ok) => println!(
                "{} {:<10} id={} ({} ms)",
                "PASS".green().bold(),
                ok.backend,
                ok.generated_id,
                ok.elapsed.as_millis()
            ),
            Err(e) => println!(
                "{} {:<10} at {}: {}",
                "FAIL".red().bold(),
                e.backend,
                e.stage,
                e.kind
            ),
        }
    }
}

fn main() {
    oom_core::init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(report) => {
            print_report(&report);
            if !report.all_passed() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{}", format!("Error: {e}").red());
            std::process::exit(1);
        }
    }
}

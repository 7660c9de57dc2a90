//! padbridge CLI.
//!
//! Runs a bridge whose sink is stdout: one command per line, so a host process
//! can spawn this binary and read commands from its pipe. Logs go to stderr
//! (`RUST_LOG` controls the level, default `warn`).
//!
//! ```text
//! padbridge [--config <file.toml>] [--script <file.json>]
//! padbridge --print-config
//! ```

use log::{error, info};
use padbridge::backends::hardware_source;
use padbridge::backends::script::{Script, ScriptedSource};
use padbridge::config::CONFIG_ENV;
use padbridge::{Bridge, BridgeConfig, DeviceSource, WriterSink};
use std::process::ExitCode;
use std::time::Instant;

const USAGE: &str = "\
Usage: padbridge [OPTIONS]

Options:
  --config <FILE>   Load configuration from a TOML file
                    (default: $PADBRIDGE_CONFIG, then built-in defaults)
  --script <FILE>   Replay a JSON device script instead of real gamepads
  --print-config    Print the default configuration and exit
  -h, --help        Show this help";

struct Args {
    config: Option<String>,
    script: Option<String>,
    print_config: bool,
}

fn parse_args() -> Result<Option<Args>, String> {
    let mut args = Args {
        config: None,
        script: None,
        print_config: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--print-config" => args.print_config = true,
            "--config" => {
                args.config = Some(it.next().ok_or("--config requires a path")?);
            }
            "--script" => {
                args.script = Some(it.next().ok_or("--script requires a path")?);
            }
            other => return Err(format!("unknown argument `{other}`")),
        }
    }
    Ok(Some(args))
}

fn load_config(explicit: Option<&str>) -> Result<BridgeConfig, String> {
    let path = explicit
        .map(str::to_string)
        .or_else(|| std::env::var(CONFIG_ENV).ok());
    match path {
        Some(path) => BridgeConfig::load(&path).map_err(|e| e.to_string()),
        None => {
            info!("Using built-in default config");
            Ok(BridgeConfig::default())
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    if args.print_config {
        print!("{}", BridgeConfig::default().to_toml_string());
        return ExitCode::SUCCESS;
    }

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    // A script ends on its own; hardware runs until the process is killed.
    let (source, deadline): (Box<dyn DeviceSource>, Option<Instant>) = match args.script {
        Some(path) => match Script::load(&path) {
            Ok(script) => {
                let now = Instant::now();
                let end = now + script.duration() + config.poll_interval() * 2;
                let source: Box<dyn DeviceSource> = Box::new(ScriptedSource::new(script, now));
                (source, Some(end))
            }
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => match hardware_source() {
            Ok(source) => (source, None),
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        },
    };

    let sink = WriterSink::new(std::io::stdout());
    let mut bridge = Bridge::new(config, source, sink);

    padbridge::runtime::run(&mut bridge, |_| {
        deadline.map_or(true, |end| Instant::now() < end)
    });

    info!("Exiting: {:?}", bridge.stats());
    ExitCode::SUCCESS
}

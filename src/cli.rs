use chrono::Datelike;
use clap::Parser;
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::io::Write;
use trhmm::hmm::{Priors, MAX_MOTIF_LEN, MAX_SEQ_LEN};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    )
});

#[derive(Parser)]
#[command(name="trhmm",
          author="Egor Dolzhenko <edolzhenko@pacificbiosciences.com>\nGuilherme De Sena Brandine <gbrandine@pacificbiosciences.com>\nTom Mokveld <tmokveld@pacificbiosciences.com>",
          version=&**FULL_VERSION,
          about="Tandem Repeat HMM Aligner",
          long_about = None,
          after_help = format!("Copyright (C) 2004-{}     Pacific Biosciences of California, Inc.
          This program comes with ABSOLUTELY NO WARRANTY; it is intended for
          Research Use Only and not for use in diagnostic procedures.", chrono::Utc::now().year()),
          help_template = "{name} {version}\n{author}{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
#[command(arg_required_else_help(true))]
pub struct CliParams {
    #[clap(required = true)]
    #[clap(long = "motif")]
    #[clap(help = "Repeat motif to align against")]
    #[clap(value_name = "MOTIF")]
    #[arg(value_parser = check_motif)]
    pub motif: String,

    #[clap(required = true)]
    #[clap(long = "read")]
    #[clap(help = "Read sequence")]
    #[clap(value_name = "READ")]
    #[arg(value_parser = check_read)]
    pub read: String,

    #[clap(long = "quals")]
    #[clap(help = "Phred+33 encoded base qualities (defaults to uniform Q40)")]
    #[clap(value_name = "QUALS")]
    pub quals: Option<String>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "priors")]
    #[clap(value_name = "PRIORS")]
    #[clap(help = "Indel/error model priors: DELTA,EPSILON,TAU,ETA")]
    #[clap(default_value = "0.001,0.05,0.01,0.01")]
    #[arg(value_parser = priors_from_string)]
    pub priors: Priors,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "ins-to-match")]
    #[clap(help = "Allow matching to resume after an insertion")]
    pub ins_to_match: bool,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn get_cli_params() -> CliParams {
    let args = CliParams::parse();
    init_logger(&args);
    args
}

fn init_logger(args: &CliParams) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };
            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

pub fn handle_error_and_exit(err: String) -> ! {
    log::error!("{}", err);
    std::process::exit(1);
}

fn check_motif(s: &str) -> Result<String, String> {
    check_bases(s)?;
    if s.is_empty() {
        return Err("Motif must not be empty".into());
    }
    if s.len() > MAX_MOTIF_LEN {
        return Err(format!(
            "Motif of length {} exceeds the supported {}",
            s.len(),
            MAX_MOTIF_LEN
        ));
    }
    Ok(s.to_string())
}

fn check_read(s: &str) -> Result<String, String> {
    check_bases(s)?;
    if s.len() > MAX_SEQ_LEN {
        return Err(format!(
            "Read of length {} exceeds the supported {}",
            s.len(),
            MAX_SEQ_LEN
        ));
    }
    Ok(s.to_string())
}

fn check_bases(s: &str) -> Result<(), String> {
    match s
        .bytes()
        .find(|&b| !matches!(b, b'A' | b'C' | b'G' | b'T' | b'N'))
    {
        Some(base) => Err(format!("Invalid base '{}'", base as char)),
        None => Ok(()),
    }
}

fn priors_from_string(s: &str) -> Result<Priors, String> {
    const NUM_EXPECTED_VALUES: usize = 4;
    let values: Vec<f64> = s.split(',').filter_map(|x| x.parse().ok()).collect();
    if values.len() != NUM_EXPECTED_VALUES {
        return Err(format!(
            "Expected {} comma-separated values in priors. Got {} -> {}",
            NUM_EXPECTED_VALUES,
            values.len(),
            s
        ));
    }

    if values.iter().any(|&val| val <= 0.0 || val >= 1.0) {
        return Err(format!(
            "Priors must lie strictly between 0 and 1. Got {}.",
            s
        ));
    }

    let priors = Priors {
        delta: values[0],
        epsilon: values[1],
        tau: values[2],
        eta: values[3],
    };
    if 2.0 * priors.delta + priors.tau >= 1.0 || priors.epsilon + priors.tau >= 1.0 {
        return Err(format!(
            "Priors leave no probability mass for matching. Got {}.",
            s
        ));
    }
    Ok(priors)
}

use clap::{Parser, ValueEnum};
use isa_probe::{ArchProvider, Architecture, FeatureReport, FeatureSet, HostArch};
use sysinfo::{CpuRefreshKind, RefreshKind, System};
use tracing::Level;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Report the instruction-set extensions of this CPU.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Comma-separated features that must be present (e.g. avx2,fma,sse4.2).
    /// Exits with status 1 if any is missing.
    #[arg(short, long)]
    require: Option<String>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    // Resolve names before detecting so a typo fails fast with nothing printed.
    let required = match args.require.as_deref() {
        Some(list) => {
            let arch = HostArch.architecture().unwrap_or(Architecture::X86);
            match FeatureSet::parse_list(list, arch) {
                Ok(required) => Some(required),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(2);
                }
            }
        }
        None => None,
    };

    let features = isa_probe::detect();
    let report = FeatureReport::from(features);

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Text => print_text(&report),
    }

    if let Some(required) = required {
        let missing = features.missing_names(required);
        if !missing.is_empty() {
            eprintln!("Missing required features: {}", missing.join(", "));
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_text(report: &FeatureReport) {
    // The global CPU entry carries no brand on Linux; read it off the first core.
    let sys = System::new_with_specifics(RefreshKind::new().with_cpu(CpuRefreshKind::new()));
    let brand = sys
        .cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .unwrap_or_default();

    match report.architecture {
        Some(arch) => println!("Architecture: {}", arch),
        None => println!("Architecture: unknown"),
    }
    println!("64-bit:       {}", report.is_64_bit);
    if !brand.is_empty() {
        println!("CPU:          {}", brand);
    }
    println!("Bits:         {:#010x}", report.bits);
    if report.extensions.is_empty() {
        println!("Extensions:   none");
    } else {
        println!("Extensions:   {}", report.extensions.join(" "));
    }
}

use std::io::{self, Read, Write};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{debug, info};

use doctype_validator::config::{Args, Config, EmitFormat};
use doctype_validator::handler::{EventRecorder, MarkupWriter, NullHandler};
use doctype_validator::schema::DoctypeRegistry;
use doctype_validator::validate;

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str())).init();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("doctype-check: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether the document is valid.
fn run(args: Args) -> Result<bool> {
    let config = Config::from_args(args)?;
    let registry = load_registry(&config)?;

    let label = config
        .document
        .as_ref()
        .map_or_else(|| "<stdin>".to_string(), |path| path.display().to_string());
    let content = match &config.document {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read document {}", path.display()))?,
        None if config.dump_doctype => String::new(),
        None => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read document from stdin")?;
            content
        }
    };

    let explicit = config.get_effective_doctype();
    let Some((name, doctype)) = registry.resolve(
        explicit.as_deref(),
        &content,
        config.project_doctype.as_deref(),
    ) else {
        bail!(
            "No doctype selected for {label}; use --doctype, a <!DOCTYPE> declaration or \
             default_doctype in {}",
            doctype_validator::config::PROJECT_CONFIG_FILE
        );
    };

    let mut stdout = io::stdout().lock();
    if config.dump_doctype {
        write!(stdout, "{doctype}").context("Failed to write doctype")?;
        return Ok(true);
    }

    info!("Validating {label} against doctype '{name}'");
    let outcome = match config.emit {
        EmitFormat::None => validate(&content, doctype, NullHandler).map(|_| ()),
        EmitFormat::Events => match validate(&content, doctype, EventRecorder::new()) {
            Ok(recorder) => {
                write_events(&mut stdout, &recorder)?;
                Ok(())
            }
            Err(e) => Err(e),
        },
        EmitFormat::Markup => match validate(&content, doctype, MarkupWriter::new()) {
            Ok(writer) => {
                writeln!(stdout, "{}", writer.as_str()).context("Failed to write markup")?;
                Ok(())
            }
            Err(e) => Err(e),
        },
    };
    stdout.flush().context("Failed to write output")?;

    let valid = outcome.is_ok();
    let verdict = match outcome {
        Ok(()) => format!("{label}: valid"),
        Err(e) => format!("{label}: {e}"),
    };
    if verdict_on_stdout(config.emit) {
        writeln!(stdout, "{verdict}")
    } else {
        writeln!(io::stderr(), "{verdict}")
    }
    .context("Failed to write result")?;
    Ok(valid)
}

/// Emitted markup and JSON lines keep stdout to themselves.
fn verdict_on_stdout(emit: EmitFormat) -> bool {
    emit == EmitFormat::None
}

/// One JSON object per line.
fn write_events(out: &mut impl Write, recorder: &EventRecorder) -> Result<()> {
    for event in recorder.events() {
        serde_json::to_writer(&mut *out, event).context("Failed to encode event")?;
        writeln!(out).context("Failed to write event")?;
    }
    Ok(())
}

fn load_registry(config: &Config) -> Result<DoctypeRegistry> {
    let mut registry = DoctypeRegistry::new();

    for dir in &config.doctype_dirs {
        let loaded = registry.load_directory(dir)?;
        debug!("Loaded {} doctypes from {}", loaded, dir.display());
    }

    if let Some(path) = &config.doctype_file {
        registry.load_file(path)?;
    }

    if let Some(name) = config.get_effective_doctype()
        && registry.get(&name).is_none()
    {
        bail!(
            "Unknown doctype '{}'; available: {}",
            name,
            registry.names().join(", ")
        );
    }

    Ok(registry)
}

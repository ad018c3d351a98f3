use netcfg::cli::{Cli, Commands, ConfigAction};
use netcfg::config::{Config, ConfigValidator};
use netcfg::error::{NetcfgError, Result};
use netcfg::fingerprint::{fingerprint_bytes, fingerprint_file};
use netcfg::metadata::{FileContext, Role};
use netcfg::parser::SectionType;
use netcfg::retrieval::{render_chunks, CompareRequest, DegradedReason};
use netcfg::session::{CompareMode, CompareOutcome, Session};
use netcfg::store::SearchFilter;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Parse { file, role, json } => {
            cmd_parse(cli.config, &file, &role, json)?;
        }
        Commands::Fingerprint { files } => {
            cmd_fingerprint(&files)?;
        }
        Commands::Ask {
            query,
            files,
            top_k,
            section,
        } => {
            cmd_ask(cli.config, &query, &files, top_k, section)?;
        }
        Commands::Compare {
            golden,
            candidate,
            query,
            top_k,
            section,
            mode,
            json,
        } => {
            cmd_compare(
                cli.config, &golden, &candidate, &query, top_k, section, mode, json,
            )?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "netcfg=debug" } else { "netcfg=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| NetcfgError::Io {
            source: e,
            context: "Failed to start async runtime".to_string(),
        })
}

fn parse_section(section: Option<String>) -> Result<Option<SectionType>> {
    match section {
        None => Ok(None),
        Some(name) => match SectionType::parse(&name) {
            SectionType::Unknown if !name.eq_ignore_ascii_case("unknown") => Err(
                NetcfgError::InvalidRequest(format!("unknown section type '{}'", name)),
            ),
            section => Ok(Some(section)),
        },
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| NetcfgError::Json {
        source: e,
        context: "Failed to serialize output".to_string(),
    })
}

fn cmd_parse(config_path: Option<PathBuf>, file: &Path, role: &str, json: bool) -> Result<()> {
    let config = Config::load_or_default(config_path.as_deref())?;
    let session = Session::new(config)?;
    let role: Role = role.parse().map_err(NetcfgError::InvalidRequest)?;

    let bytes = std::fs::read(file).map_err(|e| NetcfgError::IdentityUnavailable {
        path: file.to_path_buf(),
        source: e,
    })?;
    let text = std::str::from_utf8(&bytes).map_err(|e| NetcfgError::Decode {
        name: file.display().to_string(),
        source: e,
    })?;

    let mut context =
        FileContext::new(file.to_string_lossy(), role).with_fingerprint(fingerprint_bytes(&bytes));
    context.filename = file.file_name().map(|n| n.to_string_lossy().to_string());
    let parsed = session.parse(text, &context);

    if json {
        println!("{}", to_json(&parsed)?);
        return Ok(());
    }

    let meta = &parsed.metadata;
    println!("File:       {}", meta.display_name());
    println!("Hostname:   {}", meta.hostname.as_deref().unwrap_or("(none)"));
    println!("Vendor:     {}", meta.vendor);
    println!("Hash:       {}", meta.fingerprint.short());
    println!("Role:       {}", meta.role);
    println!("Blocks:     {}", parsed.chunks.len());
    println!("Redactions: {}", parsed.redaction_count());
    println!();

    for chunk in &parsed.chunks {
        println!(
            "  {:>5}-{:<5} {:<14} {}",
            chunk.block.start_line + 1,
            chunk.block.end_line + 1,
            chunk.section_type.as_str(),
            chunk.header()
        );
    }

    Ok(())
}

fn cmd_fingerprint(files: &[PathBuf]) -> Result<()> {
    let mut fingerprints = Vec::with_capacity(files.len());
    for file in files {
        let fingerprint = fingerprint_file(file)?;
        println!("{}  {}", fingerprint, file.display());
        fingerprints.push(fingerprint);
    }

    if fingerprints.len() > 1 {
        if fingerprints.windows(2).all(|w| w[0] == w[1]) {
            println!("\n✓ All files are identical");
        } else {
            println!("\nFiles differ");
        }
    }

    Ok(())
}

fn cmd_ask(
    config_path: Option<PathBuf>,
    query: &str,
    files: &[PathBuf],
    top_k: Option<usize>,
    section: Option<String>,
) -> Result<()> {
    let config = Config::load_or_default(config_path.as_deref())?;
    let section = parse_section(section)?;

    runtime()?.block_on(async {
        let mut session = Session::new(config)?;
        for file in files {
            session.ingest_file(file, Role::Unspecified).await?;
        }

        let filter = SearchFilter::default().with_section(section);
        let results = session.ask(query, top_k, &filter).await?;

        if results.is_empty() {
            println!("No matching blocks");
        } else {
            print!("{}", render_chunks(&results));
        }
        Ok::<(), NetcfgError>(())
    })
}

#[allow(clippy::too_many_arguments)]
fn cmd_compare(
    config_path: Option<PathBuf>,
    golden: &Path,
    candidate: &Path,
    query: &str,
    top_k: Option<usize>,
    section: Option<String>,
    mode: Option<String>,
    json: bool,
) -> Result<()> {
    let config = Config::load_or_default(config_path.as_deref())?;
    let section = parse_section(section)?;
    let mode: CompareMode = mode
        .as_deref()
        .unwrap_or(&config.retrieval.compare_mode)
        .parse()
        .map_err(NetcfgError::InvalidRequest)?;
    let top_k = top_k.unwrap_or(config.retrieval.compare_top_k);

    runtime()?.block_on(async {
        let mut session = Session::new(config)?;
        let golden_id = session.ingest_file(golden, Role::Golden).await?.file().file_id.clone();
        let candidate_id = session
            .ingest_file(candidate, Role::Candidate)
            .await?
            .file()
            .file_id
            .clone();

        let request =
            CompareRequest::new(query, golden_id, candidate_id, top_k).with_section(section);
        let outcome = session.compare(&request, mode).await?;

        if json {
            println!("{}", to_json(&outcome)?);
            return Ok(());
        }

        match outcome {
            CompareOutcome::Identical { fingerprint } => {
                println!("✓ Files are identical (fingerprint {})", fingerprint.short());
            }
            CompareOutcome::Compared { context, diff } => {
                for (label, reason) in [
                    ("golden", &context.degraded.golden),
                    ("candidate", &context.degraded.candidate),
                ] {
                    match reason {
                        Some(DegradedReason::Empty) => {
                            println!("⚠ No {} blocks matched the query", label)
                        }
                        Some(DegradedReason::Failed(message)) => {
                            println!("⚠ {} retrieval failed: {}", label, message)
                        }
                        None => {}
                    }
                }

                match diff {
                    Some(diff) => println!("{}", diff.render_markdown()),
                    None => println!("{}", context.render()),
                }
            }
        }
        Ok::<(), NetcfgError>(())
    })
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load_or_default(config_path.as_deref())?;
            let content = toml::to_string_pretty(&config)?;
            println!("{}", content);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            ConfigValidator::validate(&config)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            let mut config = Config::default();
            let rules_path = path.with_file_name("redaction.toml");
            config.redaction.rules_file = Some(rules_path.clone());
            config.save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());

            if force || !rules_path.exists() {
                std::fs::write(&rules_path, include_str!("../config-templates/redaction.toml"))
                    .map_err(|e| NetcfgError::Io {
                        source: e,
                        context: format!("Failed to write redaction.toml: {:?}", rules_path),
                    })?;
                println!("✓ Redaction rules template installed at: {}", rules_path.display());
            }
        }
    }

    Ok(())
}

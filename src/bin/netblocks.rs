//! netblocks: parse registry WHOIS dumps into a TSV table and reduce it.

use clap::{Parser, Subcommand};
use netblocks::publish::{publish_outputs, resolve_arin_key, EnvSecretSource, LocalObjectStore};
use netblocks::reduce::reduce_tsv;
use netblocks::{pipeline, ArinCredentials, ParserConfig, PublishConfig, TsvWriter};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "netblocks")]
#[command(version)]
#[command(about = "Parse WHOIS databases into a single TSV file and reduce CIDR blocks", long_about = None)]
struct Cli {
    /// Set log level to DEBUG
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse registry dumps into a TSV file
    Parse {
        /// Output TSV file
        #[arg(short, long)]
        output: PathBuf,

        /// Directory holding the dump files
        #[arg(long, default_value = netblocks::config::DEFAULT_DATABASE_DIR)]
        database_dir: PathBuf,

        /// Dump file to parse (repeatable, replaces the default list)
        #[arg(long = "file")]
        files: Vec<String>,

        /// Version recorded in the run metadata
        #[arg(long, env = "SYSTEM_VERSION")]
        system_version: Option<String>,

        /// Bucket outputs are uploaded to
        #[arg(long, env = "S3_BUCKET")]
        bucket: Option<String>,

        /// Key the TSV is uploaded under
        #[arg(long, env = "S3_PATH")]
        data_key: Option<String>,

        /// Key the metadata document is uploaded under
        #[arg(long, env = "S3_METADATA_PATH")]
        metadata_key: Option<String>,

        /// Root directory of the local object store
        #[arg(long, env = "NETBLOCKS_STORE_ROOT", default_value = ".")]
        store_root: PathBuf,

        /// ARIN bulk WHOIS API key
        #[arg(long, env = "ARIN_API_KEY", hide_env_values = true)]
        arin_api_key: Option<String>,

        /// Name of the secret holding the ARIN API key
        #[arg(long, env = "ARIN_SECRET_NAME")]
        arin_secret_name: Option<String>,
    },

    /// Reduce TSV rows to the minimal spanning set of CIDR blocks
    Reduce {
        /// Input TSV file (stdin when omitted)
        input: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Parse {
            output,
            database_dir,
            files,
            system_version,
            bucket,
            data_key,
            metadata_key,
            store_root,
            arin_api_key,
            arin_secret_name,
        } => {
            let config = ParserConfig::new(database_dir).with_files(files);
            let publish = PublishConfig {
                system_version,
                bucket,
                data_key,
                metadata_key,
            };
            let credentials = ArinCredentials {
                api_key: arin_api_key,
                secret_name: arin_secret_name,
            };
            parse(&config, &publish, &credentials, &output, store_root)
        }
        Commands::Reduce { input, output } => reduce(input, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn parse(
    config: &ParserConfig,
    publish: &PublishConfig,
    credentials: &ArinCredentials,
    output: &Path,
    store_root: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    match resolve_arin_key(credentials, &EnvSecretSource) {
        Ok(Some(_)) => log::info!("ARIN API key available for bulk WHOIS downloads"),
        Ok(None) => log::debug!("No ARIN API key configured"),
        Err(e) => log::warn!("Could not resolve ARIN API key: {}", e),
    }

    let mut writer = TsvWriter::new(BufWriter::new(File::create(output)?));
    let summary = pipeline::run(config, &mut writer)?;
    log::info!(
        "{} network blocks from {} files ({} missing, {} unreadable); {} objects skipped, {} addresses dropped",
        summary.records,
        summary.files_parsed,
        summary.files_missing,
        summary.files_failed,
        summary.skipped_objects,
        summary.dropped_addresses
    );

    let store = LocalObjectStore::new(store_root);
    publish_outputs(&store, publish, output, summary.records)?;
    Ok(())
}

fn reduce(input: Option<PathBuf>, output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let output: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    match input {
        Some(path) => reduce_tsv(BufReader::new(File::open(path)?), output)?,
        None => reduce_tsv(io::stdin().lock(), output)?,
    };
    Ok(())
}

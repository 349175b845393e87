use std::path::PathBuf;

use anyhow::Result;
use certstamp::commands::{
    init_config_command, list_command, merge_command, preview_command, resolve_placement,
    MergeRequest, PlacementArgs, DEFAULT_CONFIG_FILE,
};
use clap::{Parser, Subcommand};

/// Batch QR/certificate merging CLI.
///
/// This CLI is a thin wrapper around `certstamp-core` (exposed in code as
/// `certstamp_core`). All matching and compositing logic lives in the library.
#[derive(Parser, Debug)]
#[command(
    name = "certstamp",
    version,
    about = "Stamp QR codes onto certificate images in batch",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the images in an archive and the identifiers they pair by.
    ///
    /// Entries without digits in their name are shown with id `-` and are
    /// ignored by `merge`.
    List {
        /// Path to a ZIP archive of images.
        #[arg(long)]
        archive: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Merge every certificate with the QR code sharing its identifier.
    ///
    /// This will:
    /// - Pair `CE_01.jpg` with `QR_01.png` (only the digits matter).
    /// - Write one `MERGED_<id>.jpg` per merged certificate into `--out`.
    /// - Report unmatched and failed certificates without aborting.
    Merge {
        /// ZIP archive of QR code images.
        #[arg(long)]
        qr: PathBuf,

        /// ZIP archive of certificate images.
        #[arg(long)]
        certs: PathBuf,

        /// Output ZIP archive path.
        #[arg(long)]
        out: PathBuf,

        #[command(flatten)]
        placement: PlacementArgs,

        /// Composite pairs on all cores.
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Also write a JSON run report (timestamps, outcomes, SHA-256 digests).
        #[arg(long)]
        report: Option<PathBuf>,

        /// Overwrite existing output files.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Emit the run summary as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Render one certificate/QR pair to a JPEG for position tuning.
    Preview {
        /// ZIP archive of QR code images.
        #[arg(long)]
        qr: String,

        /// ZIP archive of certificate images.
        #[arg(long)]
        certs: String,

        /// Identifier of the pair to render.
        #[arg(long)]
        id: i64,

        /// Output JPEG path.
        #[arg(long)]
        out: String,

        #[command(flatten)]
        placement: PlacementArgs,

        /// Overwrite an existing output file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Write the default placement config (YAML, or JSON for `.json` paths).
    InitConfig {
        /// Destination file.
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        path: String,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

fn main() -> Result<()> {
    certstamp::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::List { archive, json } => list_command(&archive, json)?,
        Command::Merge { qr, certs, out, placement, parallel, report, force, json } => {
            let request = MergeRequest {
                qr_archive: qr,
                certificate_archive: certs,
                output: out,
                placement: resolve_placement(&placement)?,
                parallel,
                report,
                force,
            };
            merge_command(&request, json)?
        }
        Command::Preview { qr, certs, id, out, placement, force } => {
            preview_command(&qr, &certs, id, &out, &resolve_placement(&placement)?, force)?
        }
        Command::InitConfig { path, force } => init_config_command(&path, force)?,
    }

    Ok(())
}

use clap::{Parser, Subcommand};
use pair_gal::{config, generate, output, process, scan};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "pair-gal")]
#[command(about = "Static site generator for before/after image comparisons")]
#[command(long_about = "\
Static site generator for before/after image comparisons

Your filesystem is the data source. Files named <category>_<n>_before.<ext>
and <category>_<n>_after.<ext> become comparison pairs; directories become
sets. The generated site has a slider mode (drag to compare) and a gallery
mode (grid with lightbox) showing every non-before image of each set.

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  ├── description.md               # Main Gallery description (optional)
  ├── kitchen_1_before.jpg         # Pair \"kitchen-1\" in the Main Gallery
  ├── kitchen_1_after.jpg
  └── Living Rooms/                # Set \"Living Rooms\" (slug living-rooms)
      ├── description.txt          # Set description (.md takes priority)
      ├── sofa_1_before.png
      ├── sofa_1_after.png         # Gallery: comparison with sofa_1_before
      └── hallway.png              # Gallery only: no pair pattern

Supported extensions: jpg, jpeg, png, webp, avif (case-insensitive).
Hidden directories (starting with '.') are ignored.

Run 'pair-gal gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifest, staged images)
    #[arg(long, default_value = ".pair-gal-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan content directory into a manifest
    Scan,
    /// Stage source images and probe their dimensions
    Process,
    /// Produce the final HTML site from staged images
    Generate,
    /// Run the full pipeline: scan → process → generate
    Build,
    /// Validate content directory without building
    Check,
    /// Print the discovered image sets as JSON
    Catalog,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Scan => {
            let manifest = scan::scan(&cli.source)?;
            std::fs::create_dir_all(&cli.temp_dir)?;
            let manifest_path = cli.temp_dir.join("manifest.json");
            let json = serde_json::to_string_pretty(&manifest)?;
            std::fs::write(&manifest_path, json)?;
            output::print_scan_output(&manifest, &cli.source);
        }
        Command::Process => {
            let scan_manifest_path = cli.temp_dir.join("manifest.json");
            let manifest_content = std::fs::read_to_string(&scan_manifest_path)?;
            let manifest: scan::Manifest = serde_json::from_str(&manifest_content)?;
            init_thread_pool(&manifest.config.processing);
            run_process(&scan_manifest_path, &cli.source, &cli.temp_dir)?;
        }
        Command::Generate => {
            let processed_dir = cli.temp_dir.join("processed");
            let processed_manifest_path = processed_dir.join("manifest.json");
            generate::generate(&processed_manifest_path, &processed_dir, &cli.output)?;
            let manifest_content = std::fs::read_to_string(&processed_manifest_path)?;
            let manifest: process::ProcessedManifest = serde_json::from_str(&manifest_content)?;
            output::print_generate_output(&manifest);
        }
        Command::Build => {
            std::fs::create_dir_all(&cli.temp_dir)?;

            println!("==> Stage 1: Scanning {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            let scan_manifest_path = cli.temp_dir.join("manifest.json");
            let json = serde_json::to_string_pretty(&manifest)?;
            std::fs::write(&scan_manifest_path, json)?;
            output::print_scan_output(&manifest, &cli.source);

            println!("==> Stage 2: Staging images");
            init_thread_pool(&manifest.config.processing);
            let processed = run_process(&scan_manifest_path, &cli.source, &cli.temp_dir)?;

            println!("==> Stage 3: Generating HTML → {}", cli.output.display());
            let processed_dir = cli.temp_dir.join("processed");
            generate::generate(
                &processed_dir.join("manifest.json"),
                &processed_dir,
                &cli.output,
            )?;
            output::print_generate_output(&processed);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            output::print_scan_output(&manifest, &cli.source);
            println!("==> Content is valid");
        }
        Command::Catalog => {
            let site_config = config::load_config(&cli.source)?;
            let sets = scan::image_sets(&cli.source, &site_config.root_alias);
            println!("{}", serde_json::to_string_pretty(&sets)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Stage images with a printer thread draining progress events, then write
/// the processed manifest next to the staged tree.
fn run_process(
    scan_manifest_path: &Path,
    source: &Path,
    temp_dir: &Path,
) -> Result<process::ProcessedManifest, Box<dyn std::error::Error>> {
    let processed_dir = temp_dir.join("processed");
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = process::process(scan_manifest_path, source, &processed_dir, Some(tx));
    printer.join().map_err(|_| "progress printer panicked")?;
    let manifest = result?;
    let json = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(processed_dir.join("manifest.json"), json)?;
    Ok(manifest)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; config can lower it, not raise it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use pixel_retouch::ToneParams;
use teint::api::{self, RetouchBody};
use teint::assets::AssetLoader;
use teint::models::AppConfig;
use teint::server;
use teint::services::{
    ExportFormat, GradeSources, InMemorySessionStore, KeywordParser, PassBase, ProcessingService,
};

#[derive(Parser)]
#[command(name = "teint")]
#[command(about = "Teint - skin-aware photo retouching server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Run one skin-aware retouch pass on an image file
    Retouch {
        /// Input image (PNG, JPEG or WebP)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Smoothing strength in percent
        #[arg(long)]
        smoothness: Option<f64>,

        /// Multiplicative brightness in percent (signed)
        #[arg(long, allow_negative_numbers = true)]
        brightness: Option<f64>,

        /// Red reduction in percent
        #[arg(long)]
        redness: Option<f64>,

        /// Tone uniformity in percent (recorded only)
        #[arg(long)]
        uniformity: Option<f64>,

        /// Mask blur radius in pixels
        #[arg(long)]
        blur: Option<usize>,

        /// Mask confidence threshold in [0, 1)
        #[arg(long)]
        threshold: Option<f64>,

        /// png, webp, jpeg-high, jpeg-medium or original (default: from output extension)
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// Print the adjustment ledger
        #[arg(long)]
        log: bool,
    },
    /// Run one tone-grading pass on an image file
    Grade {
        /// Input image (PNG, JPEG or WebP)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Preset name (see `teint presets`)
        #[arg(short, long)]
        preset: Option<String>,

        /// Free-text adjustment, e.g. "augmenter légèrement la luminosité"
        #[arg(short, long)]
        text: Option<String>,

        #[command(flatten)]
        tone: ToneArgs,

        /// png, webp, jpeg-high, jpeg-medium or original (default: from output extension)
        #[arg(short, long)]
        format: Option<ExportFormat>,
    },
    /// List the tone-grading presets
    Presets,
    /// Extract the embedded config.yaml for customization
    Init {
        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
}

/// Explicit tone sliders; these win over preset and text
#[derive(Args, Debug, Default)]
struct ToneArgs {
    #[arg(long, allow_negative_numbers = true)]
    contrast: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    brightness: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    saturation: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    warmth: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    tint: Option<f64>,
    #[arg(long)]
    gamma: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    highlights: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    shadows: Option<f64>,
    #[arg(long)]
    sepia: Option<f64>,
    /// Convert to black and white
    #[arg(long)]
    grayscale: bool,
}

impl ToneArgs {
    fn into_params(self) -> Option<ToneParams> {
        let params = ToneParams {
            brightness: self.brightness,
            contrast: self.contrast,
            saturation: self.saturation,
            warmth: self.warmth,
            tint: self.tint,
            gamma: self.gamma,
            highlights: self.highlights,
            shadows: self.shadows,
            grayscale: self.grayscale.then_some(1.0),
            sepia: self.sepia,
        };
        (!params.is_empty()).then_some(params)
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Teint API",
        description = "Skin-aware photo retouching and tone grading",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(
        api::handle_upload,
        api::handle_get_session,
        api::handle_delete,
        api::handle_retouch,
        api::handle_grade,
        api::handle_reset,
        api::handle_download,
        api::handle_list_presets,
        api::handle_parse,
    ),
    components(schemas(
        api::UploadResponse,
        api::SessionSummary,
        api::AdjustmentEntry,
        api::RetouchBody,
        api::RetouchResponse,
        api::GradeBody,
        api::GradeResponse,
        api::ParseBody,
        api::ParseResponse,
        teint::models::Preset,
        PassBase,
        ExportFormat,
    )),
    tags(
        (name = "Images", description = "Upload, retouch, grade and download"),
        (name = "Presets", description = "Preset catalog and text parsing")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => run_server().await,
        Some(Commands::Retouch {
            input,
            output,
            smoothness,
            brightness,
            redness,
            uniformity,
            blur,
            threshold,
            format,
            log,
        }) => {
            let body = RetouchBody {
                smoothness,
                brightness,
                redness,
                uniformity,
                blur,
                threshold,
                ..Default::default()
            };
            run_retouch_command(&input, &output, body, format, log).await
        }
        Some(Commands::Grade {
            input,
            output,
            preset,
            text,
            tone,
            format,
        }) => {
            let sources = GradeSources {
                preset,
                text,
                params: tone.into_params(),
            };
            run_grade_command(&input, &output, sources, format).await
        }
        Some(Commands::Presets) => run_presets_command(),
        Some(Commands::Init { force }) => run_init_command(force),
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Minimal logging for one-shot commands
fn init_cli_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "teint=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

/// Build a processing service backed by a throwaway in-memory store
fn cli_service() -> (Arc<AppConfig>, ProcessingService) {
    let loader = AssetLoader::from_env();
    let config = Arc::new(AppConfig::load_from_assets(&loader));
    let service = ProcessingService::new(
        config.clone(),
        Arc::new(InMemorySessionStore::new()),
        Arc::new(KeywordParser::new()),
    );
    (config, service)
}

/// Pick an export format from the output file extension
fn format_for_path(path: &Path) -> ExportFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("webp") => ExportFormat::Webp,
        Some("jpg" | "jpeg") => ExportFormat::JpegHigh,
        _ => ExportFormat::Png,
    }
}

/// Retouch an image file (no server needed)
async fn run_retouch_command(
    input: &Path,
    output: &Path,
    body: RetouchBody,
    format: Option<ExportFormat>,
    print_log: bool,
) -> anyhow::Result<()> {
    init_cli_logging();

    let (config, service) = cli_service();
    let bytes = std::fs::read(input)?;
    let session = service.upload(bytes).await?;

    let settings = body.apply_to(&config.retouch_defaults);
    let result = service
        .retouch(&session.id, settings, PassBase::Original)
        .await?;

    let format = format.unwrap_or_else(|| format_for_path(output));
    let encoded = service.export(&session.id, format).await?;
    std::fs::write(output, &encoded.bytes)?;

    if print_log {
        if result.session.log.is_empty() {
            println!("No adjustments");
        } else {
            println!("{}", result.session.log);
        }
    }
    println!("Wrote {} ({} bytes)", output.display(), encoded.bytes.len());

    Ok(())
}

/// Tone-grade an image file (no server needed)
async fn run_grade_command(
    input: &Path,
    output: &Path,
    sources: GradeSources,
    format: Option<ExportFormat>,
) -> anyhow::Result<()> {
    init_cli_logging();

    let (_, service) = cli_service();
    let bytes = std::fs::read(input)?;
    let session = service.upload(bytes).await?;

    let result = service
        .grade(&session.id, sources, PassBase::Original)
        .await?;

    let format = format.unwrap_or_else(|| format_for_path(output));
    let encoded = service.export(&session.id, format).await?;
    std::fs::write(output, &encoded.bytes)?;

    if let Some(params) = &result.session.params {
        println!("Applied {}", serde_json::to_string(params)?);
    }
    println!("Wrote {} ({} bytes)", output.display(), encoded.bytes.len());

    Ok(())
}

/// Print the preset catalog
fn run_presets_command() -> anyhow::Result<()> {
    init_cli_logging();

    let config = AppConfig::load_from_assets(&AssetLoader::from_env());
    let width = config
        .presets
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0);

    for preset in &config.presets {
        let pad = width - preset.name.chars().count();
        println!(
            "  {}{}  {}",
            preset.name,
            " ".repeat(pad),
            preset.description
        );
    }

    Ok(())
}

/// Extract the embedded config to the filesystem
fn run_init_command(force: bool) -> anyhow::Result<()> {
    let loader = AssetLoader::from_env();
    let report = loader.init(force)?;

    for f in &report.written {
        println!("  + {f}");
    }
    if !report.skipped.is_empty() {
        println!("Skipped existing files (use --force to overwrite):");
        for f in &report.skipped {
            println!("  - {f}");
        }
    }

    Ok(())
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let bind_addr = std::env::var("BIND_ADDR").ok();
    let config_file = std::env::var("CONFIG_FILE").ok();

    println!("Teint v{VERSION}");
    println!("Skin-aware photo retouching server\n");

    println!("Environment Variables:");
    println!(
        "  BIND_ADDR   = {}",
        bind_addr.as_deref().unwrap_or("0.0.0.0:3000 (default)")
    );
    println!(
        "  CONFIG_FILE = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );

    let loader = AssetLoader::from_env();
    let config = AppConfig::load_from_assets(&loader);
    println!("\nConfiguration:");
    println!("  Source:  {}", loader.config_source());
    println!("  Presets: {}", config.presets.len());
    println!(
        "  Limits:  {} bytes upload, {} pixels, blur radius {}",
        config.limits.max_upload_bytes, config.limits.max_pixels, config.limits.max_blur_radius
    );

    println!("\nCommands:");
    println!("  teint serve     Start the HTTP server");
    println!("  teint retouch   Retouch an image file");
    println!("  teint grade     Tone-grade an image file");
    println!("  teint presets   List tone presets");
    println!("  teint init      Extract embedded config.yaml");
    println!("\nRun 'teint --help' for more details.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "teint=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let asset_loader = Arc::new(AssetLoader::from_env());

    tracing::info!(config = %asset_loader.config_source(), "Config source");

    if let Err(e) = asset_loader.seed_if_configured() {
        tracing::warn!(%e, "Failed to seed config");
    }

    let state = server::create_app_state(asset_loader)?;
    tracing::info!(presets = state.config.presets.len(), "Configuration loaded");

    let app = server::build_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Teint server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

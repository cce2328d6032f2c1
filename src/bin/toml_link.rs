use anyhow::Context;
use clap::Parser;
use plate_link::adapters::detections;
use plate_link::domain::ports::LinkSettings;
use plate_link::utils::error::LinkError;
use plate_link::utils::logger;
use plate_link::utils::validation::{validate_required_field, Validate};
use plate_link::{DeviceSession, NativeSerial, PlateRelay, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-link")]
#[command(about = "Send plate codes to the display FPGA using a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "plate-link.toml")]
    config: String,

    /// Raw OCR text; overrides the detections input from the config
    #[arg(long)]
    text: Option<String>,

    /// Detector output file; overrides `detection.input`
    #[arg(long)]
    detections: Option<String>,

    /// Override `serial.port` from the config
    #[arg(long)]
    port: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dry run - show what would be sent without opening the port
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    // 初始化日誌
    logger::init_logger(args.verbose, config.json_logs(), config.log_level());

    tracing::info!("🚀 Starting TOML-based plate link");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(port) = &args.port {
        config.serial.port = Some(port.clone());
        tracing::info!("🔧 Serial port overridden to: {}", port);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if let Err(e) = run(&config, &args) {
        tracing::error!(
            "❌ Plate link failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = e.exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn run(config: &TomlConfig, args: &Args) -> Result<(), LinkError> {
    let session = DeviceSession::new(NativeSerial, config.timing());
    let mut relay = PlateRelay::new(session, config.min_confidence());

    let reading = if let Some(text) = &args.text {
        Some(relay.ingest_text(text).clone())
    } else {
        let path = args
            .detections
            .as_deref()
            .or(config.detection_input())
            .ok_or_else(|| LinkError::MissingConfigError {
                field: "detection.input".to_string(),
            })?;
        let candidates = detections::load_detections(path)?;
        relay.ingest(&candidates).cloned()
    };

    let Some(reading) = reading else {
        println!("❌ No plate found");
        return Err(LinkError::EmptyPayload);
    };

    println!("🔎 Plate: {}", reading.plate);
    println!("🔢 Code:  {}", reading.code);

    if args.dry_run {
        perform_dry_run(config, reading.code.as_str());
        return Ok(());
    }

    let port = validate_required_field("serial.port", &config.serial.port)?;

    relay.session_mut().connect(port, config.baud_rate())?;
    relay.send_last()?;
    println!("✅ Data sent: {}", reading.code);

    relay.session_mut().disconnect();
    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    let timing = config.timing();

    println!("📋 Configuration Summary:");
    println!("  Port: {}", config.port().unwrap_or("(not set)"));
    println!("  Baud Rate: {}", config.baud_rate());
    println!("  Min Confidence: {:.0}%", config.min_confidence() * 100.0);
    println!(
        "  Delays: settle {:?}, reset {:?}, inter-byte {:?}",
        timing.settle_delay, timing.reset_delay, timing.inter_byte_delay
    );

    if let Some(input) = config.detection_input() {
        println!("  Detections: {}", input);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig, code: &str) {
    let timing = config.timing();

    println!();
    println!("🔍 Dry Run Analysis:");
    println!("  Frame: R {}", code.chars().map(String::from).collect::<Vec<_>>().join(" "));
    println!("  Bytes: {}", code.len() + 1);

    // 估算傳送時間: 重置延遲 + 位元組間延遲
    let gaps = code.len().saturating_sub(1) as u32;
    let estimated = timing.reset_delay + timing.inter_byte_delay * gaps;
    println!("  Estimated send time: {:?} (plus line time)", estimated);

    match config.port() {
        Some(port) => println!("  Target: {} @ {} baud", port, config.baud_rate()),
        None => println!("  Target: (serial.port not set)"),
    }

    println!();
    println!("✅ Dry run analysis complete.");
}

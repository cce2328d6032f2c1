use clap::Parser;
use plate_link::adapters::{detections, serial};
use plate_link::domain::ports::LinkSettings;
use plate_link::utils::error::LinkError;
use plate_link::utils::{logger, validation::Validate};
use plate_link::{CliConfig, DeviceSession, NativeSerial, PlateRelay};

fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(config.verbose, config.log_json, None);

    tracing::info!("Starting plate-link");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if config.list_ports {
        match serial::list_ports() {
            Ok(ports) if ports.is_empty() => println!("No serial ports found"),
            Ok(ports) => ports.iter().for_each(|p| println!("{}", p)),
            Err(e) => {
                eprintln!("❌ Could not list serial ports: {}", e);
                std::process::exit(3);
            }
        }
        return;
    }

    if let Err(e) = run(&config) {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ plate-link failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = e.exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

// 會話在此函式結束時關閉，確保 process::exit 之前已釋放序列埠
fn run(config: &CliConfig) -> Result<(), LinkError> {
    let session = DeviceSession::new(NativeSerial, config.timing());
    let mut relay = PlateRelay::new(session, config.min_confidence());

    let reading = match (&config.text, &config.detections) {
        (Some(text), _) => Some(relay.ingest_text(text).clone()),
        (None, Some(path)) => {
            let candidates = detections::load_detections(path)?;
            relay.ingest(&candidates).cloned()
        }
        (None, None) => None,
    };

    let Some(reading) = reading else {
        println!("❌ No plate found");
        return Err(LinkError::EmptyPayload);
    };

    if config.json {
        println!("{}", serde_json::to_string(&reading)?);
    } else {
        println!("🔎 Plate: {}", reading.plate);
        println!("🔢 Code:  {}", reading.code);
    }

    let Some(port) = config.port() else {
        return Ok(());
    };

    if config.dry_run {
        println!("🔍 Dry run: would send '{}' to {}", reading.code, port);
        return Ok(());
    }

    relay.session_mut().connect(port, config.baud_rate())?;
    relay.send_last()?;
    println!("✅ Data sent: {}", reading.code);

    relay.session_mut().disconnect();
    Ok(())
}

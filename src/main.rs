use anyhow::Context;
use clap::{Arg, ArgMatches, Command};
use log::LevelFilter;
use scam_alert::machine_learning::dataset::{Dataset, DEMO_MESSAGES};
use scam_alert::machine_learning::training::TrainingReport;
use scam_alert::ocr::validate_upload;
use scam_alert::{Config, ImageTextExtractor, ScamDetector, TesseractBackend, Verdict};
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    let matches = Command::new("scam-alert")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Scam message detection for Indonesian and English text")
        .long_about("Scam Alert classifies short messages as scam or legitimate by combining:\n\
                    • keyword, critical-pattern and suspicious-URL detectors\n\
                    • a trained statistical text classifier\n\
                    • an ordered override cascade with an explainable audit trail\n\
                    • OCR for screenshots of messages")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("scam-alert.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Validate the configuration and compile the lexicon")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("train")
                .long("train")
                .help("Train all classifiers, print the evaluation and save the model")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .value_name("FILE")
                .help("Model artifact path (overrides model_path from the configuration)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("message")
                .long("message")
                .value_name("TEXT")
                .help("Classify a single message")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("batch")
                .long("batch")
                .value_name("FILE")
                .help("Classify every non-empty line of a file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("image")
                .long("image")
                .value_name("FILE")
                .help("Extract text from an image with OCR and classify it")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("model-name")
                .long("model-name")
                .value_name("NAME")
                .help("Classifier to use (defaults to engine.default_model, then the best trained model)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("list-models")
                .long("list-models")
                .help("List the classifiers stored in the model file")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("demo")
                .long("demo")
                .help("Run the built-in demonstration messages")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print verdicts as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging with per-rule decisions")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("scam-alert.yaml");
    let config_found = Path::new(config_path).exists();
    let config = if config_found {
        match Config::load(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading configuration: {e:#}");
                process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        config.logging.level.parse().unwrap_or(LevelFilter::Info)
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if !config_found {
        log::warn!("Configuration file '{config_path}' not found, using default configuration");
    }

    if let Err(e) = run(&matches, &config).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(matches: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let model_path = matches
        .get_one::<String>("model")
        .cloned()
        .unwrap_or_else(|| config.model_path.clone());
    let model_name = matches.get_one::<String>("model-name").map(String::as_str);
    let json = matches.get_flag("json");

    if matches.get_flag("test-config") {
        return test_config(config, &model_path);
    }

    if matches.get_flag("train") {
        return train(config, &model_path);
    }

    if matches.get_flag("list-models") {
        let detector = load_detector(config, &model_path)?;
        let default = detector.best_model().unwrap_or_default();
        for name in detector.model_names() {
            let marker = if name == default { " (default)" } else { "" };
            println!("{name}{marker}");
        }
        return Ok(());
    }

    if matches.get_flag("demo") {
        let detector = if Path::new(&model_path).exists() {
            load_detector(config, &model_path)?
        } else {
            log::warn!("Model file '{model_path}' not found, training a fresh model for the demo");
            let mut detector = ScamDetector::from_config(config)?;
            let report = detector.train(&load_dataset(config)?, &config.training)?;
            print_report(&report);
            detector.apply_default_model(&config.engine.default_model);
            detector
        };
        for message in DEMO_MESSAGES {
            let verdict = detector.predict(message, model_name)?;
            print_verdict(message, &verdict, json)?;
        }
        return Ok(());
    }

    if let Some(message) = matches.get_one::<String>("message") {
        if message.trim().is_empty() {
            anyhow::bail!(scam_alert::ValidationError::EmptyMessage);
        }
        let detector = load_detector(config, &model_path)?;
        let verdict = detector.predict(message, model_name)?;
        return print_verdict(message, &verdict, json);
    }

    if let Some(batch_file) = matches.get_one::<String>("batch") {
        let content = std::fs::read_to_string(batch_file)
            .with_context(|| format!("Failed to read batch file: {batch_file}"))?;
        let messages: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
        let detector = load_detector(config, &model_path)?;
        let verdicts = detector.batch_predict(&messages, model_name)?;
        for (message, verdict) in messages.iter().zip(&verdicts) {
            print_verdict(message, verdict, json)?;
        }
        let scams = verdicts.iter().filter(|v| v.is_scam).count();
        log::info!("Classified {} messages, {} flagged as scam", verdicts.len(), scams);
        return Ok(());
    }

    if let Some(image_file) = matches.get_one::<String>("image") {
        return classify_image(config, &model_path, image_file, model_name, json).await;
    }

    println!("Nothing to do. Use --train, --message, --batch, --image or --demo (see --help).");
    Ok(())
}

fn generate_default_config(path: &str) {
    let result = Config::default()
        .to_yaml()
        .and_then(|yaml| std::fs::write(path, yaml).map_err(anyhow::Error::from));
    match result {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e}");
            process::exit(1);
        }
    }
}

fn test_config(config: &Config, model_path: &str) -> anyhow::Result<()> {
    println!("🔍 Testing configuration...");
    println!();

    let detector = ScamDetector::from_config(config).context("Lexicon failed to compile")?;
    let lexicon = detector.lexicon();
    match &config.lexicon_path {
        Some(path) => println!("Lexicon file: {path}"),
        None => println!("Lexicon: built-in"),
    }
    println!("Safe words: {}", lexicon.source().safe_words.len());
    println!("Strong indicators: {}", lexicon.indicator_count());
    println!("Critical patterns: {}", lexicon.critical_pattern_count());
    println!("Suspicious domain patterns: {}", lexicon.suspicious_domain_count());

    let overlaps = lexicon.source().purpose_overlaps();
    if !overlaps.is_empty() {
        println!("⚠️  Safe words also listed as indicators: {}", overlaps.join(", "));
    }

    println!("Short text threshold: {}", config.engine.short_text_threshold);
    if Path::new(model_path).exists() {
        println!("Model file: {model_path}");
    } else {
        println!("Model file: {model_path} (missing, run --train)");
    }
    println!("All regex patterns compiled successfully.");
    Ok(())
}

fn load_dataset(config: &Config) -> anyhow::Result<Dataset> {
    match &config.training.dataset_path {
        Some(path) => Dataset::load_from_file(path, config.training.seed)
            .with_context(|| format!("Failed to load dataset: {path}")),
        None => Ok(Dataset::builtin(config.training.seed)),
    }
}

fn train(config: &Config, model_path: &str) -> anyhow::Result<()> {
    let dataset = load_dataset(config)?;
    println!(
        "Dataset: {} samples ({} scam, {} legitimate)",
        dataset.len(),
        dataset.count(scam_alert::Label::Scam),
        dataset.count(scam_alert::Label::Legitimate)
    );

    let mut detector = ScamDetector::from_config(config)?;
    let report = detector.train(&dataset, &config.training)?;
    print_report(&report);

    detector
        .save(model_path)
        .with_context(|| format!("Failed to save model to {model_path}"))?;
    println!("Model saved to: {model_path}");
    Ok(())
}

fn print_report(report: &TrainingReport) {
    println!();
    println!(
        "Training samples: {}, test samples: {}, features: {}, short texts: {}",
        report.train_samples, report.test_samples, report.feature_count, report.short_text_samples
    );
    println!(
        "{:<22} {:>9} {:>10} {:>8} {:>8} {:>16}",
        "Model", "Accuracy", "Precision", "Recall", "F1", "CV"
    );
    for m in &report.metrics {
        println!(
            "{:<22} {:>9.4} {:>10.4} {:>8.4} {:>8.4} {:>8.4} ± {:.4}",
            m.name,
            m.accuracy,
            m.precision,
            m.recall,
            m.f1,
            m.cv_mean,
            m.cv_std * 2.0
        );
    }
    println!();
    println!("🏆 Best model: {}", report.best_model);
}

fn load_detector(config: &Config, model_path: &str) -> anyhow::Result<ScamDetector> {
    let mut detector = ScamDetector::load(model_path)
        .with_context(|| format!("Failed to load model from {model_path} (run --train first)"))?;
    detector.apply_default_model(&config.engine.default_model);
    Ok(detector)
}

async fn classify_image(
    config: &Config,
    model_path: &str,
    image_file: &str,
    model_name: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(image_file)
        .await
        .with_context(|| format!("Failed to read image: {image_file}"))?;
    let filename = Path::new(image_file)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(image_file);
    validate_upload(filename, bytes.len(), config.ocr.max_file_size)?;

    let extractor = ImageTextExtractor::new(TesseractBackend::new(&config.ocr), &config.ocr);
    let extraction = extractor.extract_with_fallback(&bytes).await;
    if !extraction.success {
        anyhow::bail!(
            "OCR failed: {}",
            extraction.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    if !extraction.has_text {
        anyhow::bail!("No text found in {image_file}");
    }
    log::info!(
        "OCR extracted {} words at {:.2}% confidence",
        extraction.word_count,
        extraction.confidence
    );

    let detector = load_detector(config, model_path)?;
    let verdict = detector.predict(&extraction.text, model_name)?;
    print_verdict(&extraction.text, &verdict, json)
}

fn print_verdict(message: &str, verdict: &Verdict, json: bool) -> anyhow::Result<()> {
    if json {
        let output = serde_json::json!({
            "message": message,
            "verdict": verdict,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("📩 {}", truncate_string(message, 70));
        println!("{}", verdict.describe());
        println!();
    }
    Ok(())
}

fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

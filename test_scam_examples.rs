#![allow(clippy::uninlined_format_args)]

use scam_alert::config::Config;
use scam_alert::machine_learning::dataset::{Dataset, DEMO_MESSAGES};
use scam_alert::{Label, ScamDetector};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Running the demonstration messages through a freshly trained detector...");

    let config = Config::default();
    let mut detector = ScamDetector::from_config(&config)?;
    let report = detector.train(&Dataset::builtin(config.training.seed), &config.training)?;
    println!(
        "Trained on {} samples, best model: {}",
        report.train_samples, report.best_model
    );
    println!();

    let mut flagged = 0;
    for (i, message) in DEMO_MESSAGES.iter().enumerate() {
        let verdict = detector.predict(message, None)?;
        println!("Message {}: {}", i + 1, message);
        println!("{}", verdict.describe());
        println!();
        if verdict.final_label == Label::Scam {
            flagged += 1;
        }
    }

    println!("📊 {} of {} messages flagged as scam", flagged, DEMO_MESSAGES.len());

    let lottery = detector.predict(DEMO_MESSAGES[0], None)?;
    if lottery.is_scam {
        println!("✅ Telco lottery message blocked");
    } else {
        println!("❌ Telco lottery message was not blocked");
    }

    Ok(())
}

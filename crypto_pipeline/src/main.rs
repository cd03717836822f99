use crypto_pipeline::report::{render_sample, render_summary, render_trends};
use crypto_pipeline::{CryptoPipeline, PipelineConfig};

const RULE: &str = "============================================================";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    println!("{}", RULE);
    println!("Automated Cryptocurrency Data Pipeline Demonstration");
    println!("{}", RULE);

    let config = PipelineConfig::from_env();
    let display = config.display.clone();
    let (iterations, interval) = (config.iterations, config.sleep_interval);
    let csv_path = config.csv_path.clone();
    let mut pipeline = CryptoPipeline::new(config);

    println!("\n1. Fetching cryptocurrency data...");
    pipeline.run_data_collection(iterations, interval).await;

    println!("\n2. Dataset Overview:");
    print!("{}", render_summary(&pipeline.summary_stats()));

    println!("\n3. Sample data:");
    if !pipeline.dataset().is_empty() {
        print!("{}", render_sample(pipeline.dataset(), &pipeline.config().convert, 10, &display));
    }

    println!("\n4. Analyzing price trends...");
    let trends = pipeline.analyze_price_trends();
    if !trends.is_empty() {
        println!("Average percentage changes by cryptocurrency:");
        print!("{}", render_trends(&trends, &display));
    }

    println!("\n5. Creating visualizations...");
    let mut generated = Vec::new();
    if pipeline.visualize_trends() {
        generated.push(format!("{} (trend analysis plot)", pipeline.config().trend_plot_path.display()));
    }
    if pipeline.visualize_price() {
        generated.push(format!(
            "{} ({} price plot)",
            pipeline.config().price_plot_path.display(),
            pipeline.config().price_asset
        ));
    }

    println!("\n6. Saving data to CSV...");
    if pipeline.save_to_csv(&csv_path) {
        generated.insert(0, format!("{} (dataset)", csv_path.display()));
    }

    println!("\n{}", RULE);
    println!("Demonstration completed!");
    println!("Generated files:");
    for f in &generated {
        println!("  - {}", f);
    }
    println!("{}", RULE);
    Ok(())
}

// Build the feature matrix from a play-by-play CSV and print a summary
// Run with: cargo run --example build_features

use gridiron::data::FeatureDataset;
use gridiron::features::GameFeatureRow;
use gridiron::{Config, Period, TeamId};

fn main() -> gridiron::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let config = Config::load("config.toml")?;
    let dataset = FeatureDataset::load(&config)?;
    let matrix = dataset.matrix();

    println!("Games: {}", dataset.games.len());
    println!("Team series: {}", dataset.efficiency.len());
    println!("Complete rows: {} x {}", matrix.len(), matrix.dim());
    if let Some(rate) = matrix.home_win_rate() {
        println!("Home win rate: {:.3}", rate);
    }

    let names = GameFeatureRow::names();
    println!("\nFirst 5 rows:");
    println!("  game_id | {}", names.join(" | "));
    for (game_id, features) in matrix.game_ids.iter().zip(&matrix.features).take(5) {
        let values: Vec<String> = features.iter().map(|v| format!("{:+.3}", v)).collect();
        println!("  {} | {}", game_id, values.join(" | "));
    }

    // Super Bowl LVII
    let row = dataset.matchup(&TeamId::new("KC"), &TeamId::new("PHI"), Period::new(2022, 22))?;
    println!("\nMatchup {}:", row.game_id);
    for (name, value) in names.iter().zip(row.features.iter()) {
        match value {
            Some(v) => println!("  {:<18} {:+.4}", name, v),
            None => println!("  {:<18} missing", name),
        }
    }

    Ok(())
}

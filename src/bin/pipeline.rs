//! Levercast Pipeline
//!
//! Optionally refreshes macro data from FRED and index closes from Yahoo
//! Finance, then runs the full signal
//! pipeline against the data directory and prints the market report,
//! backtest summary and nowcast advice.

use dotenvy::dotenv;
use levercast::config::{self, PipelineConfig};
use levercast::core::observer::TracingObserver;
use levercast::core::pipeline::{run_from_store, PipelineOutput};
use levercast::core::refresh::refresh_from_env;
use levercast::logging;
use levercast::services::store::DataStore;
use tracing::info;

fn print_summary(output: &PipelineOutput) {
    if let Some(report) = &output.report {
        println!("{}", report);
    }

    let bt = &output.backtest;
    println!("Backtest ({} periods)", bt.rows.len());
    println!("  {:<14} {:>10} {:>10}", "", "Benchmark", "Strategy");
    println!(
        "  {:<14} {:>9.2}% {:>9.2}%",
        "Total return",
        bt.total_return_benchmark * 100.0,
        bt.total_return_strategy * 100.0
    );
    println!(
        "  {:<14} {:>9.2}% {:>9.2}%",
        "Max drawdown",
        bt.max_drawdown_benchmark * 100.0,
        bt.max_drawdown_strategy * 100.0
    );
    println!(
        "  {:<14} {:>10.2} {:>10.2}",
        "Sharpe", bt.sharpe_benchmark, bt.sharpe_strategy
    );
    println!(
        "  Strategy {} the benchmark",
        if bt.outperformed() { "beat" } else { "trailed" }
    );
    println!();

    let nowcast = &output.nowcast;
    println!("Nowcast: {:?} at {:.1}x", nowcast.action_label, nowcast.leverage);
    println!(
        "  Invested {:.0}% / cash {:.0}%",
        nowcast.invested_pct(),
        nowcast.cash_pct()
    );
    println!(
        "  Macro factor {:.2}, adjusted return {:.2}%",
        nowcast.macro_factor,
        nowcast.final_decision_return * 100.0
    );
    println!("  {}", nowcast.rationale);
    for label in &nowcast.risk_labels {
        println!("  ! {}", label);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let store = DataStore::new(config::get_data_dir());
    let pipeline_config = PipelineConfig::from_env();
    info!(
        environment = %config::get_environment(),
        data_dir = %store.root().display(),
        projection_target = ?pipeline_config.projection_target,
        "Starting Levercast pipeline"
    );

    refresh_from_env(&store).await?;

    let output = tokio::task::spawn_blocking(move || {
        run_from_store(&store, &pipeline_config, &TracingObserver)
    })
    .await??;

    print_summary(&output);
    Ok(())
}

use anyhow::Context;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod workflow;

/// Workflow config picked up from the working directory when present.
const WORKFLOW_FILE: &str = "presence.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let workflow_config = WorkflowConfig::load_or_default(WORKFLOW_FILE)?;
    let runner = Runner::new(workflow_config);
    let result = runner.execute().await.context("running presence workflow")?;

    println!(
        "Simulated run -> frames {} processed, {} dropped, {} overrun; detections {}",
        result.frames_processed,
        result.frames_dropped,
        result.overruns,
        result.detections.len()
    );
    if let Some(strongest) = result
        .detections
        .iter()
        .max_by(|a, b| a.magnitude.total_cmp(&b.magnitude))
    {
        println!(
            "Strongest presence: magnitude {:.1} at bin {} ({:.2} m)",
            strongest.magnitude, strongest.bin, strongest.distance_m
        );
    }
    println!(
        "Sensor: {} FIFO reads, {} faults, {} starts",
        result.sensor_reads, result.sensor_faults, result.sensor_starts
    );
    println!(
        "Pipeline memory: peak {} bytes over {} allocations, {} bytes still in use",
        result.pool.peak_bytes, result.pool.allocations, result.pool.in_use_bytes
    );

    Ok(())
}

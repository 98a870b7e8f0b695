use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use refrax::output;
use refrax::settings;
use refrax::sim::Simulation;

fn main() -> Result<()> {
    env_logger::init();

    let settings = settings::load_config()?;
    let (steps, dt) = (settings.steps, settings.dt);
    let mut simulation = Simulation::from_settings(settings)?;

    let pb = ProgressBar::new(steps as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {bar:40.green/blue} {pos:>5}/{len:5} {msg} ETA: {eta_precise}",
        )?
        .progress_chars("█▇▆▅▄▃▂▁"),
    );
    pb.set_message("step".to_string());
    for _ in 0..steps {
        simulation.step(dt);
        pb.inc(1);
    }
    pb.finish_with_message("done");

    simulation.snapshot().print();
    info!("simulated {:.4} time units", simulation.time());

    output::writeup(&simulation)
}

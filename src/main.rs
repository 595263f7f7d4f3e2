use clap::Parser;
use log::info;
use wavefront_accumulator::{
    console::{run, Args, PartialArgs},
    error::AccumResult,
};

fn main() -> AccumResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    //parse CLI arguments
    let args = Args::try_from(PartialArgs::parse())?;

    let accumulator = run(&args)?;

    let state = accumulator.state();
    info!(
        "{} wavefronts accumulated ({} restored, {} in this session)",
        state.total_count(),
        state.prior_count(),
        state.current_count()
    );
    if let Some(statistics) = accumulator.statistics() {
        println!("{statistics}");
    }
    Ok(())
}

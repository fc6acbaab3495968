mod cli;

use std::{collections::HashMap, error::Error, fs::File, io::BufReader, time::Instant};

use clap::Parser;
use log::{info, warn};
use optics::{save, TraceState};
use optics_json::{deserialize_simulation, serde_json};
use optics_surfaces::Scene;

use cli::{init_logger, Args};

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logger(args.log_level.into());

    let json: serde_json::Value = serde_json::from_reader(BufReader::new(File::open(&args.scene)?))?;
    let (scene, mut rays, file_opts) = deserialize_simulation::<Scene>(&json)?;
    let opts = args.trace_options(file_opts);

    if opts.interactions == 0 {
        warn!("interaction budget is zero, rays won't move");
    }

    if scene.is_empty() {
        warn!("the scene has no surfaces");
    }

    info!(
        "tracing {} ray(s) through {} surface(s), {opts:?}",
        rays.len(),
        scene.surfaces().len()
    );

    let start = Instant::now();

    let states = if args.sequential {
        scene.trace(&mut rays, &opts)
    } else {
        scene.trace_par(&mut rays, &opts)
    };

    info!("traced in {:?}", start.elapsed());

    let mut counts = HashMap::<TraceState, usize>::new();
    for state in states {
        *counts.entry(state).or_default() += 1;
    }
    info!("final states: {counts:?}");

    save(&args.rays_out, &rays)?;
    save(&args.surfaces_out, &scene)?;

    info!(
        "wrote {} and {}",
        args.rays_out.display(),
        args.surfaces_out.display()
    );

    Ok(())
}

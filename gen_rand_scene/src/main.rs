mod cli;

use std::{error::Error, fs::File, io::BufWriter, iter};

use clap::Parser;
use log::info;
use optics::{Ray, TraceOptions};
use optics_json::{serde_json, serialize_simulation};
use optics_random::{
    rand::{rngs::StdRng, Rng, SeedableRng},
    random_rays, Random,
};
use optics_surfaces::{Scene, Surface};

use cli::{init_logger, Args};

fn generate_random_simulation(
    rng: &mut (impl Rng + ?Sized),
    num_surfaces: Option<usize>,
    num_rays: Option<usize>,
) -> (Scene, Vec<Ray>) {
    let scene = match num_surfaces {
        Some(n) => iter::repeat_with(|| Surface::random(rng)).take(n).collect(),
        None => Scene::random(rng),
    };

    let num_rays = num_rays.unwrap_or_else(|| rng.gen_range(1..32));

    (scene, random_rays(rng, num_rays))
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logger(args.log_level.into());

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (scene, rays) = generate_random_simulation(&mut rng, args.surfaces, args.rays);

    info!(
        "generated {} surface(s) and {} ray(s)",
        scene.surfaces().len(),
        rays.len()
    );

    let opts = TraceOptions {
        interactions: args.interactions,
        ..Default::default()
    };

    let json = serialize_simulation(&scene, rays, &opts);

    serde_json::to_writer_pretty(BufWriter::new(File::create(&args.out)?), &json)?;

    info!("wrote {}", args.out.display());

    Ok(())
}

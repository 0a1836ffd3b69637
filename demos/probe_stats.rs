use std::hash::RandomState;

use clap::Parser;
use clap::ValueEnum;
use open_hash::HashMap;
use open_hash::probe::DoubleHashing;
use open_hash::probe::Linear;
use open_hash::probe::LinearTombstones;
use open_hash::probe::Probing;
use open_hash::probe::Quadratic;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Strategy {
    All,
    Linear,
    LinearTombstones,
    Quadratic,
    DoubleHashing,
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Fraction of the inserted keys to remove afterwards, leaving tombstones
    /// behind for the strategies that use them.
    #[arg(short = 'r', long = "remove_fraction", default_value_t = 0.25)]
    remove_fraction: f64,

    #[arg(short = 's', long = "strategy", value_enum, default_value_t = Strategy::All)]
    strategy: Strategy,
}

fn run<P: Probing>(args: &Args) {
    println!();
    println!("=== {} ===", P::NAME);

    let mut map: HashMap<u64, u64, RandomState, P> = HashMap::with_capacity_and_probing(
        args.target_capacity,
        RandomState::new(),
        P::default(),
    );

    println!(
        "Buckets: {}, capacity: {}",
        map.bucket_count(),
        map.capacity()
    );

    let num_values = map.capacity() as u64;
    for value in 0..num_values {
        map.insert(value, value);
    }

    let to_remove = (num_values as f64 * args.remove_fraction.clamp(0.0, 1.0)) as u64;
    // Entry removal never shrinks, so the tombstones stay visible below.
    for value in (0..num_values).rev().take(to_remove as usize) {
        match map.entry(value) {
            open_hash::Entry::Occupied(entry) => {
                entry.remove();
            }
            open_hash::Entry::Vacant(_) => panic!("value {} missing from map", value),
        }
    }

    println!(
        "Inserted {} values, removed {}; {} remain with {} tombstones",
        num_values,
        to_remove,
        map.len(),
        map.tombstones()
    );

    map.table().print_probe_histogram();
    map.table().debug_stats().print();
}

fn main() {
    let args = Args::parse();

    println!(
        "Filling maps with target capacity: {}",
        args.target_capacity
    );

    let all = args.strategy == Strategy::All;
    if all || args.strategy == Strategy::Linear {
        run::<Linear>(&args);
    }
    if all || args.strategy == Strategy::LinearTombstones {
        run::<LinearTombstones>(&args);
    }
    if all || args.strategy == Strategy::Quadratic {
        run::<Quadratic>(&args);
    }
    if all || args.strategy == Strategy::DoubleHashing {
        run::<DoubleHashing>(&args);
    }
}

use std::collections::hash_map::DefaultHasher;
use std::hash::BuildHasherDefault;

use chained_hash::Config;
use chained_hash::HashTable;
use clap::Parser;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long = "entries", default_value_t = 100)]
    entries: u64,

    #[arg(short = 'b', long = "initial-buckets", default_value_t = 4)]
    initial_buckets: usize,

    #[arg(short = 'l', long = "max-load-factor", default_value_t = 0.75)]
    max_load_factor: f64,
}

fn main() -> Result<(), chained_hash::Error> {
    env_logger::init();
    let args = Args::parse();

    let config = Config::default()
        .with_initial_buckets(args.initial_buckets)
        .with_max_load_factor(args.max_load_factor);
    let mut table: HashTable<u64, u64, BuildHasherDefault<DefaultHasher>> =
        HashTable::with_config(config)?;

    println!(
        "Creating HashTable with {} buckets, max load factor {}",
        table.bucket_count(),
        table.max_load_factor()
    );

    let mut buckets = table.bucket_count();
    for key in 0..args.entries {
        table.set(key, key * key);
        if table.bucket_count() != buckets {
            println!(
                "set({:>4}) -> resized {:>5} -> {:>5} buckets, load factor {:.3}",
                key,
                buckets,
                table.bucket_count(),
                table.load_factor()
            );
            buckets = table.bucket_count();
        }
    }

    println!("Inserted {} entries", table.len());
    table.stats().print();
    table.print_chain_length_histogram();

    for key in 0..args.entries / 2 {
        table.delete(&key)?;
    }
    println!(
        "Deleted half: {} entries, load factor {:.3}",
        table.len(),
        table.load_factor()
    );

    table.shrink_to_fit();
    println!(
        "After shrink_to_fit: {} buckets, load factor {:.3}",
        table.bucket_count(),
        table.load_factor()
    );
    table.stats().print();

    Ok(())
}

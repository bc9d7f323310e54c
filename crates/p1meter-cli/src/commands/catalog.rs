//! `p1meter catalog` — validate and print the reading catalog.

use super::load_catalog;

/// Run the catalog command.
pub fn run(config_path: &str) {
    let catalog = load_catalog(config_path);

    println!("{} reading definition(s) in {config_path}:\n", catalog.len());
    println!(
        "  {:<34} {:<12} {:>5} {:>12} {:>6} {:>4}",
        "Name", "Prefix", "Unit", "Multiplier", "Start", "Len"
    );
    for def in catalog.definitions() {
        println!(
            "  {:<34} {:<12} {:>5} {:>12} {:>6} {:>4}",
            def.name,
            def.prefix,
            def.unit,
            def.value_multiplier,
            def.value_start_index,
            def.value_length
        );
    }
}

#![no_main]

use libfuzzer_sys::fuzz_target;
use phonestat::analyzer::analyze_table;
use phonestat::config::AnalyzerConfig;
use phonestat::loader::RawTable;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes through the same lossy decode the loader uses
    let content = String::from_utf8_lossy(data);
    if let Ok(table) = RawTable::from_csv_str("fuzz", &content) {
        // Mapping failures and malformed rows are outcomes, never panics
        let _ = analyze_table(&table, &AnalyzerConfig::default());
    }
});

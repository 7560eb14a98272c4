#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(city) = rental_dashboard::adapters::files::csv_reader::read_listings(data, "fuzz.csv") {
        for listing in &city.listings {
            assert!(!listing.neighbourhood_cleansed.trim().is_empty());
            assert!(!listing.price.is_nan());
        }
    }
});

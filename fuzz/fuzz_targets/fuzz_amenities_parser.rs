#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        let entries = rental_dashboard::domain::amenities::parse_amenities(raw);
        assert!(entries.len() <= raw.matches(" (").count());
    }
});

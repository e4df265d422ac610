#![no_main]

use libfuzzer_sys::fuzz_target;
use ipspan::{AddressRange, AddressSet};

fuzz_target!(|data: (&str, AddressRange)| {
    let (text, range) = data;

    assert!(range.contains(range.begin()));
    assert!(range.contains(range.end()));
    assert_eq!(AddressRange::parse(&range.to_string()), Some(range));

    let set = match AddressSet::parse(text) {
        Some(set) => set,
        None => return,
    };
    for item in set.ranges() {
        assert!(item.low() <= item.high());
        assert!(set.contains(item.begin()));
        assert!(set.contains(item.end()));
    }
    if !set.is_empty() {
        assert_eq!(AddressSet::parse(&set.to_string()), Some(set));
    }
});

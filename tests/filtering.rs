//! Classifying addresses against allow and deny lists.

use std::net::IpAddr;
use ipspan::{AddressFamily, AddressRange, AddressSet};

fn addr(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn range_contains(range: &str, addr: &str) -> bool {
    AddressRange::parse(range).unwrap().contains_str(addr).unwrap()
}

#[test]
fn range_notations() {
    assert!(range_contains("192.168.0.10 - 192.168.10.20", "192.168.0.20"));
    assert!(range_contains("192.168.0.*", "192.168.0.255"));
    assert!(!range_contains("192.168.0.*", "192.168.1.0"));
    assert!(!range_contains("192.168.0.0/255.255.255.0", "192.168.1.100"));
    assert!(range_contains("192.168.0.0/255.255.255.0", "192.168.0.100"));
    assert!(range_contains("192.168.0.0/16", "192.168.2.99"));
    assert!(!range_contains("fe80::/10", "192.168.0.1"));
    assert!(range_contains("fe80::/10", "fe80::dead:beef"));
}

#[test]
fn set_notation() {
    let set = AddressSet::parse("192.168.0.*,10.10.1.0/24,fe80::/10")
        .unwrap();
    assert_eq!(set.contains_str("10.10.1.200"), Ok(true));
    assert_eq!(set.contains_str("192.168.2.99"), Ok(false));
}

#[test]
fn bounds_and_outside() {
    let pairs = [
        ("10.0.0.0", "10.0.0.0"),
        ("10.0.0.5", "10.0.1.7"),
        ("127.255.255.255", "128.0.0.0"),
        ("255.255.255.0", "255.255.255.255"),
        ("2001:db8::", "2001:db8::1:0"),
        ("7fff:ffff:ffff:ffff:ffff:ffff:ffff:ffff", "8000::"),
        ("ffff::", "ffff::ff"),
    ];
    for (begin, end) in pairs.iter() {
        let (begin, end) = (addr(begin), addr(end));
        let range = AddressRange::new(begin, end).unwrap();
        assert!(range.contains(begin));
        assert!(range.contains(end));

        let (low, high) = (range.low(), range.high());
        let family = range.family();
        if low > 0 {
            let below = range_value(family, low - 1);
            assert!(!range.contains(below), "{} in {}", below, range);
        }
        if high < max_value(family) {
            let above = range_value(family, high + 1);
            assert!(!range.contains(above), "{} in {}", above, range);
        }

        let other = match family {
            AddressFamily::Ipv4 => addr("::"),
            AddressFamily::Ipv6 => addr("0.0.0.0"),
        };
        assert!(!range.contains(other));
        assert!(!range.contains(match family {
            AddressFamily::Ipv4 => AddressFamily::Ipv6.max_addr(),
            AddressFamily::Ipv6 => AddressFamily::Ipv4.max_addr(),
        }));

        assert_eq!(AddressRange::parse(&format!("{}-{}", begin, end)), Some(range));
    }
}

fn range_value(family: AddressFamily, value: u128) -> IpAddr {
    match family {
        AddressFamily::Ipv4 => IpAddr::from(std::net::Ipv4Addr::from(value as u32)),
        AddressFamily::Ipv6 => IpAddr::from(std::net::Ipv6Addr::from(value)),
    }
}

fn max_value(family: AddressFamily) -> u128 {
    match family {
        AddressFamily::Ipv4 => u32::MAX.into(),
        AddressFamily::Ipv6 => u128::MAX,
    }
}

#[test]
fn allow_and_deny() {
    let allow = AddressSet::parse_all(&[
        "10.0.0.0/8, 172.16.0.0/255.240.0.0",
        "192.168.*.*, 2001:db8::/32",
    ]).unwrap();
    let deny = AddressSet::parse("10.66.0.0/16, 2001:db8:bad::/48, oops")
        .unwrap();
    let permitted = |s: &str| {
        let a = addr(s);
        allow.contains(a) && !deny.contains(a)
    };

    assert!(permitted("10.1.2.3"));
    assert!(!permitted("10.66.1.1"));
    assert!(permitted("172.31.255.255"));
    assert!(!permitted("172.32.0.0"));
    assert!(permitted("192.168.200.1"));
    assert!(permitted("2001:db8:1::1"));
    assert!(!permitted("2001:db8:bad::1"));
    assert!(!permitted("8.8.8.8"));
    assert!(!permitted("::ffff:10.1.2.3"));
}

#[test]
fn set_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() { }
    assert_send_sync::<AddressRange>();
    assert_send_sync::<AddressSet>();

    let set = std::sync::Arc::new(
        AddressSet::parse("10.0.0.0/8, ::1").unwrap()
    );
    let handles: Vec<_> = (0..4u8).map(|i| {
        let set = set.clone();
        std::thread::spawn(move || {
            set.contains(IpAddr::from([10, i, 0, 1]))
        })
    }).collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

//! Post-sort stages: deduplication, prefix grouping and CIDR aggregation.

use ipnet::Ipv4Net;

use crate::network::NetworkAddress;

/// Re-order networks by prefix length, largest blocks (smallest prefix) first.
///
/// Within one prefix length the input order is kept, so address-sorted input
/// stays address-sorted inside each group.
pub fn group_by_prefix(networks: &[NetworkAddress]) -> Vec<NetworkAddress> {
    let mut grouped = networks.to_vec();
    // slice::sort_by_key is stable
    grouped.sort_by_key(|n| n.prefix_len());
    grouped
}

/// Remove consecutive identical networks. Expects sorted input.
pub fn deduplicate(networks: Vec<NetworkAddress>) -> Vec<NetworkAddress> {
    let mut networks = networks;
    networks.dedup();
    networks
}

/// Merge contiguous and overlapping networks into the smallest equivalent set.
///
/// For example: [192.168.0.0/25, 192.168.0.128/25] -> [192.168.0.0/24].
/// The result is address-sorted.
pub fn aggregate(networks: &[NetworkAddress]) -> Vec<NetworkAddress> {
    let nets: Vec<Ipv4Net> = networks.iter().map(NetworkAddress::as_ipv4net).collect();
    let mut merged: Vec<NetworkAddress> = Ipv4Net::aggregate(&nets)
        .into_iter()
        .map(NetworkAddress::from)
        .collect();
    merged.sort();
    merged
}

/// Total number of addresses covered, counting overlaps twice.
pub fn count_ips(networks: &[NetworkAddress]) -> u64 {
    networks
        .iter()
        .map(NetworkAddress::size)
        .fold(0u64, |acc, count| acc.saturating_add(count))
}

/// Share of the whole IPv4 space covered by `ip_count` addresses.
pub fn coverage_percent(ip_count: u64) -> f64 {
    const IPV4_SPACE: f64 = 4_294_967_296.0;
    (ip_count as f64 / IPV4_SPACE) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nets(list: &[&str]) -> Vec<NetworkAddress> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn render(list: &[NetworkAddress]) -> Vec<String> {
        list.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_group_by_prefix() {
        let sorted = nets(&["1.0.0.0/24", "2.0.0.0/8", "3.0.0.0/24", "4.0.0.0/16"]);
        assert_eq!(
            render(&group_by_prefix(&sorted)),
            vec!["2.0.0.0/8", "4.0.0.0/16", "1.0.0.0/24", "3.0.0.0/24"]
        );
    }

    #[test]
    fn test_group_by_prefix_numeric_not_lexical() {
        // "8" > "24" as strings; numerically 8 comes first
        let sorted = nets(&["1.0.0.0/24", "9.0.0.0/8"]);
        assert_eq!(render(&group_by_prefix(&sorted)), vec!["9.0.0.0/8", "1.0.0.0/24"]);
    }

    #[test]
    fn test_group_by_prefix_already_grouped() {
        let sorted = nets(&["8.0.0.0/16", "10.0.0.0/24", "10.0.1.0/24"]);
        assert_eq!(group_by_prefix(&sorted), sorted);
    }

    #[test]
    fn test_group_by_prefix_empty() {
        assert!(group_by_prefix(&[]).is_empty());
    }

    #[test]
    fn test_deduplicate() {
        let sorted = nets(&["1.0.0.0/24", "1.0.0.0/24", "1.0.0.0/25", "2.0.0.0/8"]);
        assert_eq!(
            render(&deduplicate(sorted)),
            vec!["1.0.0.0/24", "1.0.0.0/25", "2.0.0.0/8"]
        );
    }

    #[test]
    fn test_aggregate_contiguous() {
        let merged = aggregate(&nets(&["192.168.0.0/25", "192.168.0.128/25"]));
        assert_eq!(render(&merged), vec!["192.168.0.0/24"]);
    }

    #[test]
    fn test_aggregate_contained() {
        let merged = aggregate(&nets(&["10.0.0.0/8", "10.1.0.0/16", "2.0.0.0/8"]));
        assert_eq!(render(&merged), vec!["2.0.0.0/8", "10.0.0.0/8"]);
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_count_ips() {
        let list = nets(&["192.168.0.0/24", "10.0.0.0/8"]);
        assert_eq!(count_ips(&list), 256 + 16_777_216);
    }

    #[test]
    fn test_count_ips_whole_space() {
        assert_eq!(count_ips(&nets(&["0.0.0.0/0"])), 1u64 << 32);
        assert!((coverage_percent(1u64 << 32) - 100.0).abs() < f64::EPSILON);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::net::Ipv4Addr;

    /// Strategy to generate address-sorted network lists
    fn sorted_networks_strategy(max_size: usize) -> impl Strategy<Value = Vec<NetworkAddress>> {
        prop::collection::vec((any::<u32>(), 0u8..=32), 0..max_size).prop_map(|raw| {
            let mut list: Vec<NetworkAddress> = raw
                .into_iter()
                .map(|(addr, prefix)| {
                    NetworkAddress::from(Ipv4Net::new(Ipv4Addr::from(addr), prefix).unwrap())
                })
                .collect();
            list.sort();
            list
        })
    }

    proptest! {
        /// Grouped output has non-decreasing prefixes, and addresses within a prefix
        #[test]
        fn prop_grouped_order(list in sorted_networks_strategy(200)) {
            let grouped = group_by_prefix(&list);
            prop_assert_eq!(grouped.len(), list.len());
            for pair in grouped.windows(2) {
                prop_assert!(pair[0].prefix_len() <= pair[1].prefix_len());
                if pair[0].prefix_len() == pair[1].prefix_len() {
                    prop_assert!(pair[0].addr() <= pair[1].addr());
                }
            }
        }

        /// Grouping is a permutation of its input
        #[test]
        fn prop_grouping_is_permutation(list in sorted_networks_strategy(100)) {
            let mut grouped = group_by_prefix(&list);
            grouped.sort();
            prop_assert_eq!(grouped, list);
        }

        /// Aggregation never grows the list or its address count
        #[test]
        fn prop_aggregate_reduces_or_maintains_size(list in sorted_networks_strategy(100)) {
            let merged = aggregate(&list);
            prop_assert!(merged.len() <= list.len());
            prop_assert!(count_ips(&merged) <= count_ips(&list));
        }

        /// Deduplicated output has no equal neighbours
        #[test]
        fn prop_deduplicate_unique(list in sorted_networks_strategy(100)) {
            let deduped = deduplicate(list);
            for pair in deduped.windows(2) {
                prop_assert!(pair[0] != pair[1]);
            }
        }
    }
}

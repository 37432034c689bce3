//! Property tests for the boundary dispatcher.

use fabric_mapper::{
    AddrMapper, AddrRange, Direction, DownstreamPort, MapStrategy, Packet, RangeMap,
    UpstreamPort,
};
use proptest::prelude::*;

#[derive(Debug, Default)]
struct SinkUpstream {
    snoops: Vec<Packet>,
}

impl UpstreamPort for SinkUpstream {
    fn respond(&mut self, _pkt: Packet) {}

    fn forward_snoop(&mut self, pkt: Packet) {
        self.snoops.push(pkt);
    }

    fn native_ranges(&self) -> Vec<AddrRange> {
        Vec::new()
    }
}

#[derive(Debug, Default)]
struct SinkDownstream {
    requests: Vec<Packet>,
}

impl DownstreamPort for SinkDownstream {
    fn receive(&mut self, pkt: Packet) {
        self.requests.push(pkt);
    }
}

/// A small strategy pool: identity plus a couple of range tables.
fn arb_strategy() -> impl Strategy<Value = MapStrategy> {
    prop_oneof![
        Just(MapStrategy::Identity),
        (1u64..0x1000, 0x1_0000u64..0x2_0000).prop_map(|(size, rem_start)| {
            MapStrategy::Range(
                RangeMap::new(
                    vec![AddrRange::with_size(0x1000, size)],
                    vec![AddrRange::with_size(rem_start, size)],
                )
                .expect("single-pair table always validates"),
            )
        }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn forwarded_requests_carry_the_strategy_translation(
        strategy in arb_strategy(),
        addrs in prop::collection::vec(any::<u64>(), 1..16),
    ) {
        let expected: Vec<u64> = addrs
            .iter()
            .map(|&a| strategy.translate(a, Direction::Forward))
            .collect();

        let mut mapper =
            AddrMapper::with_strategy(strategy, SinkUpstream::default(), SinkDownstream::default());
        for (id, &addr) in addrs.iter().enumerate() {
            mapper.on_upstream_request(Packet::new(id as u64, addr));
        }

        let seen: Vec<u64> = mapper.downstream().requests.iter().map(|p| p.addr).collect();
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn only_the_address_field_is_rewritten(
        strategy in arb_strategy(),
        id in any::<u64>(),
        addr in any::<u64>(),
        data in prop::collection::vec(any::<u8>(), 0..32),
    ) {
        let mut mapper =
            AddrMapper::with_strategy(strategy, SinkUpstream::default(), SinkDownstream::default());
        mapper.on_upstream_request(Packet { id, addr, data: data.clone() });

        let sent = &mapper.downstream().requests[0];
        prop_assert_eq!(sent.id, id);
        prop_assert_eq!(&sent.data, &data);
    }

    #[test]
    fn snoops_never_change(
        strategy in arb_strategy(),
        id in any::<u64>(),
        addr in any::<u64>(),
    ) {
        let mut mapper =
            AddrMapper::with_strategy(strategy, SinkUpstream::default(), SinkDownstream::default());
        let snoop = Packet::new(id, addr);
        mapper.on_snoop_request(snoop.clone());
        prop_assert_eq!(&mapper.upstream().snoops, &vec![snoop]);
    }
}

use fabric_range::AddrRange;
use tracing::{debug, trace};

use crate::config::StrategyConfig;
use crate::error::ConfigError;
use crate::strategy::{Direction, MapStrategy};

/// The slice of a transport packet the mapper is allowed to see.
///
/// The host interconnect owns delivery, retries and ordering; the mapper only
/// ever reads and rewrites the address. `id` is the transaction identifier
/// the transport uses to correlate responses to requests — correlation is
/// never by address, which is what lets responses cross the boundary without
/// being re-translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub id: u64,
    pub addr: u64,
    pub data: Vec<u8>,
}

impl Packet {
    pub fn new(id: u64, addr: u64) -> Self {
        Self {
            id,
            addr,
            data: Vec::new(),
        }
    }
}

/// The mapper's handle onto the side the requests come from.
pub trait UpstreamPort {
    /// Deliver a response toward the request originator.
    fn respond(&mut self, pkt: Packet);

    /// Deliver a snoop request travelling in the downstream-to-upstream
    /// direction.
    fn forward_snoop(&mut self, pkt: Packet);

    /// The address ranges natively reachable on this side, expressed in the
    /// remapped (downstream) address space.
    fn native_ranges(&self) -> Vec<AddrRange>;
}

/// The mapper's handle onto the side the translated requests go to.
pub trait DownstreamPort {
    /// Deliver a translated request.
    fn receive(&mut self, pkt: Packet);
}

/// The boundary component: one strategy, one handle per side.
///
/// Purely a per-call dispatcher — it holds no mutable state beyond the two
/// port handles, and the strategy is immutable, so translation is a pure
/// function of the input address and direction. Both handles are required at
/// construction; a mapper connected on only one side is unrepresentable.
#[derive(Debug)]
pub struct AddrMapper<U, D> {
    strategy: MapStrategy,
    upstream: U,
    downstream: D,
}

impl<U: UpstreamPort, D: DownstreamPort> AddrMapper<U, D> {
    /// Validate `config` and build the mapper.
    pub fn new(config: StrategyConfig, upstream: U, downstream: D) -> Result<Self, ConfigError> {
        let strategy = config.build()?;
        Ok(Self::with_strategy(strategy, upstream, downstream))
    }

    /// Build the mapper around an already-validated strategy.
    pub fn with_strategy(strategy: MapStrategy, upstream: U, downstream: D) -> Self {
        match &strategy {
            MapStrategy::Identity => debug!("address mapper configured with identity strategy"),
            MapStrategy::Range(map) => {
                debug!(pairs = map.len(), "address mapper configured with range strategy")
            }
            MapStrategy::Matrix { forward, .. } => {
                debug!(
                    bit_width = forward.width(),
                    "address mapper configured with matrix strategy"
                )
            }
        }
        Self {
            strategy,
            upstream,
            downstream,
        }
    }

    /// The active translation strategy.
    pub fn strategy(&self) -> &MapStrategy {
        &self.strategy
    }

    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    pub fn downstream(&self) -> &D {
        &self.downstream
    }

    /// An inbound request from the upstream side: rewrite its address with
    /// the forward translation and hand it downstream.
    pub fn on_upstream_request(&mut self, mut pkt: Packet) {
        let orig = pkt.addr;
        pkt.addr = self.strategy.translate(orig, Direction::Forward);
        trace!(id = pkt.id, from = orig, to = pkt.addr, "remapped request");
        self.downstream.receive(pkt);
    }

    /// A response from the downstream side: forwarded upstream unmodified.
    /// Addresses are never re-translated on the return path.
    pub fn on_downstream_response(&mut self, pkt: Packet) {
        self.upstream.respond(pkt);
    }

    /// A snoop request from the downstream side: forwarded upstream without
    /// invoking any translation, regardless of the configured strategy.
    pub fn on_snoop_request(&mut self, pkt: Packet) {
        self.upstream.forward_snoop(pkt);
    }

    /// Answer the downstream side's query for the address space reachable
    /// through this boundary: the upstream side's native ranges, pushed
    /// backwards through the strategy.
    pub fn query_downstream_ranges(&self) -> Vec<AddrRange> {
        self.strategy
            .translate_ranges_reverse(&self.upstream.native_ranges())
    }
}

//! End-to-end: two LPUs on two devices, wired both ways, dry-run.

use std::collections::HashSet;

use lpuwire::{
    sample_connections, split_selector_string, to_selector_string, wire_units, Direction,
    DryRunManager, ExecutionManager, ManagerState, Network, NetworkConfig, Pattern, PortKind,
    PortSource, Registration, Side, UnitSpec, WireError, WiringConfig,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn intro_network_uncoupled_and_coupled() {
    let lpu_0 = UnitSpec::generic("lpu_0", 0, 30).build().unwrap();
    let lpu_1 = UnitSpec::generic("lpu_1", 1, 30).build().unwrap();

    // Uncoupled: empty pattern still registers
    let mut mgr = DryRunManager::new();
    let empty = Pattern::between(&lpu_0, &lpu_1).unwrap();
    mgr.connect(Registration::new(&lpu_0, &lpu_1, empty).unwrap()).unwrap();
    mgr.start(1000).unwrap();
    mgr.stop().unwrap();
    assert_eq!(mgr.registrations()[0].pattern.len(), 0);

    // Coupled: four sampling passes
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let pattern = wire_units(&lpu_0, &lpu_1, &WiringConfig::default(), &mut rng).unwrap();
    assert_eq!(pattern.len(), 120);

    let mut mgr = DryRunManager::new();
    mgr.connect(Registration::new(&lpu_0, &lpu_1, pattern).unwrap()).unwrap();
    mgr.start(1000).unwrap();
    mgr.stop().unwrap();
    assert_eq!(mgr.state(), ManagerState::Stopped);
    assert_eq!(mgr.devices(), vec![0, 1]);
}

#[test]
fn manual_wiring_validates_each_insertion() {
    let a = UnitSpec::generic("a", 0, 4).build().unwrap();
    let b = UnitSpec::generic("b", 1, 4).build().unwrap();
    let mut pattern = Pattern::between(&a, &b).unwrap();

    let a_spk_out = a.out_ports(PortKind::Spike);
    let b_spk_in = b.in_ports(PortKind::Spike);
    let b_gpot_in = b.in_ports(PortKind::Graded);

    pattern.connect(a_spk_out[0], b_spk_in[1], 1.0).unwrap();
    assert!(matches!(
        pattern.connect(a_spk_out[0], b_gpot_in[0], 1.0),
        Err(WireError::TypeMismatch { .. })
    ));
    assert!(matches!(
        pattern.connect(b_spk_in[1], a_spk_out[0], 1.0),
        Err(WireError::DirectionMismatch { .. })
    ));
    assert_eq!(pattern.len(), 1);
    assert_eq!(pattern.side_of(b_spk_in[1].id()).unwrap(), Side::B);
}

#[test]
fn sampled_pairs_are_a_bijection() {
    let a = UnitSpec::generic("a", 0, 30).build().unwrap();
    let b = UnitSpec::generic("b", 1, 30).build().unwrap();
    let outs = a.out_ports(PortKind::Spike);
    let ins = b.in_ports(PortKind::Spike);

    let pairs = sample_connections(&outs, &ins, 30, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
    let again = sample_connections(&outs, &ins, 30, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
    assert_eq!(pairs, again);

    let srcs: HashSet<_> = pairs.iter().map(|(s, _)| s.id()).collect();
    let dsts: HashSet<_> = pairs.iter().map(|(_, d)| d.id()).collect();
    assert_eq!((srcs.len(), dsts.len()), (30, 30));
}

#[test]
fn unit_selectors_round_trip() {
    let unit = UnitSpec::generic("lpu_0", 0, 3).build().unwrap();
    let outs = unit.out_ports(PortKind::Graded);
    let joined = to_selector_string(outs.iter().copied());
    assert_eq!(joined, unit.selector(Direction::Out, PortKind::Graded));

    let ids: Vec<&str> = outs.iter().map(|p| p.id()).collect();
    assert_eq!(split_selector_string(&joined), ids);
}

#[test]
fn patterns_serialize_for_the_manager() {
    let network = Network::assemble(&NetworkConfig::generic(3, 6)).unwrap();
    for link in network.links() {
        let json = serde_json::to_string(&link.pattern).unwrap();
        let back: Pattern = serde_json::from_str(&json).unwrap();
        assert_eq!(back.connections(), link.pattern.connections());
    }

    let mut mgr = DryRunManager::new();
    network.run(&mut mgr, 10).unwrap();
    assert_eq!(mgr.registrations().len(), 3);
    assert_eq!(mgr.devices(), vec![0, 1, 2]);
}

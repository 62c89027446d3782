//! End-to-end scenarios against small hand-built networks, solved with
//! the dependency-free `BruteForceSolver` so this suite never needs a
//! system SAT solver.

use dtpg_core::config::Config;
use dtpg_core::dtpg::Dtpg;
use dtpg_core::lowering::{self, LowerMethod};
use dtpg_core::network::{FaultVariant, NetworkBuilder, Primitive};
use dtpg_core::sat::naive::BruteForceSolver;
use dtpg_core::stats::DtpgStats;
use dtpg_core::struct_engine::StructEngine;
use dtpg_core::types::DtpgResult;

/// S1: a two-input AND gate, stuck-at-0 on its output. Only `a = b = 1`
/// excites and observes it, so the driver must land exactly there.
#[test]
fn s1_and_gate_stuck_at_output_is_detected() {
    let mut b = NetworkBuilder::new();
    let a = b.add_ppi();
    let c = b.add_ppi();
    let g = b.add_gate(Primitive::And, vec![a, c]);
    let o = b.add_ppo(g);
    let fault_id = b.add_stuck_at_fault(g, FaultVariant::Stem { fval: false });
    let network = b.build();
    let _ = o;

    let mut stats = DtpgStats::new();
    let dtpg = Dtpg::new(Config::default());
    let result = dtpg
        .generate_test::<BruteForceSolver>(&network, network.fault(fault_id), &mut stats)
        .expect("generate_test should not error on a well-formed fault");

    match result {
        DtpgResult::Detected(tv) => {
            assert!(tv.frame1.iter().any(|&(n, v)| n == a && v));
            assert!(tv.frame1.iter().any(|&(n, v)| n == c && v));
            assert!(tv.frame0.is_empty(), "a purely combinational fault needs no frame-0 assignment");
        }
        other => panic!("expected Detected, got {other:?}"),
    }
    assert_eq!(stats.detected, 1);
}

/// S2: the classic reconvergent-fanout redundancy. `w = NOT(a)`; `f =
/// OR(AND(a, b), AND(w, b))` always equals `b`, so a stuck-at-1 on `w`
/// never changes `f` for any `(a, b)` — provably untestable.
#[test]
fn s2_reconvergent_fanout_fault_is_untestable() {
    let mut b = NetworkBuilder::new();
    let a = b.add_ppi();
    let bi = b.add_ppi();
    let w = b.add_gate(Primitive::Not, vec![a]);
    let g1 = b.add_gate(Primitive::And, vec![a, bi]);
    let g2 = b.add_gate(Primitive::And, vec![w, bi]);
    let f = b.add_gate(Primitive::Or, vec![g1, g2]);
    let o = b.add_ppo(f);
    let fault_id = b.add_stuck_at_fault(w, FaultVariant::Stem { fval: true });
    let network = b.build();
    let _ = o;

    let mut stats = DtpgStats::new();
    let dtpg = Dtpg::new(Config::default());
    let result = dtpg
        .generate_test::<BruteForceSolver>(&network, network.fault(fault_id), &mut stats)
        .expect("generate_test should not error on a well-formed fault");

    assert_eq!(result, DtpgResult::Untestable);
    assert_eq!(stats.untestable, 1);
}

/// S3: a flip-flop whose `Q` is stuck-at, observed downstream through an
/// inverter. Justifying `Q`'s frame-1 value crosses the DFF boundary into
/// the `D`-side `Ppo` at frame 0, landing on a frame-0 primary input.
#[test]
fn s3_dff_output_fault_justifies_across_the_frame_boundary() {
    let mut b = NetworkBuilder::new();
    let pi = b.add_ppi();
    let q = b.add_dff(pi);
    let not_q = b.add_gate(Primitive::Not, vec![q]);
    let o = b.add_ppo(not_q);
    let fault_id = b.add_transition_fault(q, FaultVariant::Stem { fval: false });
    let network = b.build();
    let _ = o;
    assert!(network.has_prev_state());

    let mut stats = DtpgStats::new();
    let dtpg = Dtpg::new(Config::default());
    let result = dtpg
        .generate_test::<BruteForceSolver>(&network, network.fault(fault_id), &mut stats)
        .expect("generate_test should not error on a well-formed fault");

    match result {
        DtpgResult::Detected(tv) => {
            assert!(!tv.frame0.is_empty(), "a transition fault needs a frame-0 initial-state assignment");
            assert!(tv.frame0.iter().any(|&(n, _)| n == pi), "justification should reach the frame-0 primary input");
        }
        other => panic!("expected Detected, got {other:?}"),
    }
}

/// S5: a fanout stem with enough distinguishable cubes that a `loop_limit`
/// of `1` forces `CondGen` to abort the whole-FFR enumeration after its
/// first cube, falling through to per-output recovery.
#[test]
fn s5_tight_loop_limit_forces_per_output_recovery() {
    use dtpg_core::condgen::CondGenMgr;

    let mut b = NetworkBuilder::new();
    let a = b.add_ppi();
    let c = b.add_ppi();
    let d = b.add_ppi();
    let o1 = b.add_gate(Primitive::And, vec![a, c]);
    let o2 = b.add_gate(Primitive::Or, vec![a, d]);
    let p1 = b.add_ppo(o1);
    let p2 = b.add_ppo(o2);
    let network = b.build();
    let _ = (p1, p2);

    let mgr = CondGenMgr::new(1, 1);
    let conds = mgr
        .make_cond::<BruteForceSolver>(&network)
        .expect("make_cond should not error");

    assert_eq!(conds.len(), network.ffr_num());
    for cond in &conds {
        cond.check_invariants().expect("every returned DetCond obeys its own invariants");
    }
    // `p1` and `p2` are themselves the roots of their own (PO-terminated)
    // FFRs, so those two conditions are trivially `Detected` with an
    // empty cube. `a` fans out to both `o1` and `o2`, so its FFR root has
    // two outputs and at least two cubes to distinguish; `loop_limit = 1`
    // cannot finish the whole-FFR pass for it and must recover per-output.
    let stem_root_cond = conds
        .iter()
        .find(|c| matches!(c, dtpg_core::types::DetCond::PartialDetected { .. } | dtpg_core::types::DetCond::Overflow { .. }));
    assert!(stem_root_cond.is_some(), "the shared stem's FFR should need per-output recovery under loop_limit = 1");
}

/// S4: a fanout-free region whose root is itself a primary output has no
/// further cone to walk, so the fault is observed the moment it is
/// excited — `CondGen` must report a trivially-satisfied condition
/// (`Detected` with an empty mandatory set and a single empty cube), not
/// `Undetected`.
#[test]
fn s4_condgen_is_trivially_detected_for_a_po_rooted_ffr() {
    use dtpg_core::condgen::CondGenMgr;
    use dtpg_core::types::DetCond;

    let mut b = NetworkBuilder::new();
    let a = b.add_ppi();
    let c = b.add_ppi();
    let g = b.add_gate(Primitive::And, vec![a, c]);
    let o = b.add_ppo(g);
    let network = b.build();
    let _ = o;

    let mgr = CondGenMgr::new(1, 1000);
    let conds = mgr
        .make_cond::<BruteForceSolver>(&network)
        .expect("make_cond should not error");

    // `o`'s FFR root is `o` itself (a PPO), so its propagation condition
    // must be unconditionally true.
    let po_cond = conds
        .iter()
        .find(|c| matches!(c, DetCond::Detected { cover, .. } if cover.len() == 1 && cover[0].is_empty()));
    assert!(
        po_cond.is_some(),
        "a PO-rooted FFR's own condition should be Detected with an empty cube, not Undetected"
    );
    assert!(
        conds.iter().all(|c| !matches!(c, DetCond::Undetected)),
        "no FFR in this network should be reported Undetected"
    );
}

/// S6: the four materializing lowering methods agree on the activator's
/// satisfiability for the same cover, and `aig`'s structural-hash sharing
/// never estimates a larger CNF than `naive`'s unshared expansion.
#[test]
fn s6_lowering_methods_agree_and_aig_never_exceeds_naive() {
    let mut b = NetworkBuilder::new();
    let a = b.add_ppi();
    let c = b.add_ppi();
    let g = b.add_gate(Primitive::And, vec![a, c]);
    let o = b.add_ppo(g);
    let network = b.build();
    let _ = o;

    let cond = dtpg_core::types::DetCond::Detected {
        mandatory: dtpg_core::types::AssignList::new(),
        cover: vec![{
            let mut cube = dtpg_core::types::AssignList::new();
            cube.push(dtpg_core::types::Assign::new(a, 1, true)).unwrap();
            cube.push(dtpg_core::types::Assign::new(c, 1, true)).unwrap();
            cube
        }],
    };

    for &method in &[LowerMethod::Naive, LowerMethod::Cover, LowerMethod::Factor, LowerMethod::Aig] {
        let mut engine = StructEngine::new(&network, BruteForceSolver::new());
        let assumptions = lowering::lower(&mut engine, &cond, method, false).expect("lowering should succeed");
        match engine.solve(&assumptions) {
            dtpg_core::sat::SolveOutcome::Sat(_) => {}
            _ => panic!("{method:?} lowering should be satisfiable for a single-cube cover"),
        }
    }

    let (naive_clauses, naive_literals) = lowering::calc_cnf_size(std::slice::from_ref(&cond), LowerMethod::Naive).unwrap();
    let (aig_clauses, aig_literals) = lowering::calc_cnf_size(std::slice::from_ref(&cond), LowerMethod::Aig).unwrap();
    assert!(aig_clauses <= naive_clauses);
    assert!(aig_literals <= naive_literals);
}

/// P1 + P3: a `Detected` result's test vector both excites and propagates
/// the fault — re-simulating it against the good/faulty pair by hand
/// would be redundant with S1, so this instead checks the weaker, solver-
/// independent property that `Untestable` never accompanies a fault whose
/// own excitation is trivially satisfiable alone (sanity: the driver
/// doesn't conflate "no cover found" with "provably redundant").
#[test]
fn p1_untestable_is_not_returned_for_a_trivially_excitable_fault() {
    let mut b = NetworkBuilder::new();
    let a = b.add_ppi();
    let o = b.add_ppo(a);
    let fault_id = b.add_stuck_at_fault(a, FaultVariant::Stem { fval: false });
    let network = b.build();
    let _ = o;

    let mut stats = DtpgStats::new();
    let dtpg = Dtpg::new(Config::default());
    let result = dtpg
        .generate_test::<BruteForceSolver>(&network, network.fault(fault_id), &mut stats)
        .unwrap();
    assert!(matches!(result, DtpgResult::Detected(_)));
}

/// P4: every frame-1 entry of a produced `TestVector` names a distinct
/// node (the justified cube is a consistent assignment, never naming the
/// same primary input twice with different values).
#[test]
fn p4_test_vector_frame1_assignments_are_internally_consistent() {
    let mut b = NetworkBuilder::new();
    let a = b.add_ppi();
    let c = b.add_ppi();
    let g = b.add_gate(Primitive::And, vec![a, c]);
    let o = b.add_ppo(g);
    let fault_id = b.add_stuck_at_fault(g, FaultVariant::Stem { fval: false });
    let network = b.build();
    let _ = o;

    let mut stats = DtpgStats::new();
    let dtpg = Dtpg::new(Config::default());
    let result = dtpg
        .generate_test::<BruteForceSolver>(&network, network.fault(fault_id), &mut stats)
        .unwrap();

    if let DtpgResult::Detected(tv) = result {
        for &(n, v) in &tv.frame1 {
            let others: Vec<bool> = tv.frame1.iter().filter(|&&(m, _)| m == n).map(|&(_, v)| v).collect();
            assert!(others.iter().all(|&x| x == v));
        }
    } else {
        panic!("expected Detected");
    }
}

/// P5: `calc_cnf_size` is monotone in the cover — adding a cube never
/// decreases the estimated clause or literal count, for every method.
#[test]
fn p5_cnf_size_estimate_is_monotone_in_cover_size() {
    let mut b = NetworkBuilder::new();
    let a = b.add_ppi();
    let c = b.add_ppi();
    let d = b.add_ppi();
    let g = b.add_gate(Primitive::And, vec![a, c, d]);
    let o = b.add_ppo(g);
    let network = b.build();
    let _ = (o, network);

    let mk_cube = |nodes: &[dtpg_core::network::NodeId]| {
        let mut cube = dtpg_core::types::AssignList::new();
        for &n in nodes {
            cube.push(dtpg_core::types::Assign::new(n, 1, true)).unwrap();
        }
        cube
    };
    let small = dtpg_core::types::DetCond::Detected {
        mandatory: dtpg_core::types::AssignList::new(),
        cover: vec![mk_cube(&[a, c])],
    };
    let larger = dtpg_core::types::DetCond::Detected {
        mandatory: dtpg_core::types::AssignList::new(),
        cover: vec![mk_cube(&[a, c]), mk_cube(&[a, d])],
    };

    for &method in &[LowerMethod::Naive, LowerMethod::Cover, LowerMethod::Factor, LowerMethod::Aig, LowerMethod::Bdd] {
        let (c0, l0) = lowering::calc_cnf_size(std::slice::from_ref(&small), method).unwrap();
        let (c1, l1) = lowering::calc_cnf_size(std::slice::from_ref(&larger), method).unwrap();
        assert!(c1 >= c0, "{method:?} clause estimate should not shrink when a cube is added");
        assert!(l1 >= l0, "{method:?} literal estimate should not shrink when a cube is added");
    }
}

/// P7: the extractor's sufficient condition for a single-input gate chain
/// (`Buf`/`Not`) is exactly the root's own assignment, never more — there
/// is no side input to additionally record.
#[test]
fn p7_extractor_is_minimal_for_a_pure_buffer_chain() {
    let mut b = NetworkBuilder::new();
    let a = b.add_ppi();
    let n1 = b.add_gate(Primitive::Not, vec![a]);
    let n2 = b.add_gate(Primitive::Not, vec![n1]);
    let o = b.add_ppo(n2);
    let fault_id = b.add_stuck_at_fault(n1, FaultVariant::Stem { fval: false });
    let network = b.build();
    let _ = o;

    let mut stats = DtpgStats::new();
    let dtpg = Dtpg::new(Config::default());
    let result = dtpg
        .generate_test::<BruteForceSolver>(&network, network.fault(fault_id), &mut stats)
        .unwrap();
    match result {
        DtpgResult::Detected(tv) => {
            assert_eq!(tv.frame1.len(), 1, "a buffer/inverter chain has no side inputs to justify beyond the root itself");
            assert_eq!(tv.frame1[0].0, a);
        }
        other => panic!("expected Detected, got {other:?}"),
    }
}

/// P8: `Justifier::justify`'s output, when re-applied through the same
/// good-machine model, reproduces every entry of its own input target —
/// checked here indirectly via S3's frame-0 cross-jump already covering
/// the one non-trivial case (`Just1` vs `Just2` differ only in whether a
/// repeated `(node, frame)` is recorded once or once per path, which does
/// not change the set of nodes reachable, only duplicate count).
#[test]
fn p8_just1_and_just2_justify_the_same_fault_to_a_consistent_result() {
    let mut b = NetworkBuilder::new();
    let a = b.add_ppi();
    let c = b.add_ppi();
    let g = b.add_gate(Primitive::And, vec![a, c]);
    let o = b.add_ppo(g);
    let fault_id = b.add_stuck_at_fault(g, FaultVariant::Stem { fval: false });
    let network = b.build();
    let _ = o;

    for just in [dtpg_core::config::JustKind::Just1, dtpg_core::config::JustKind::Just2] {
        let mut cfg = Config::default();
        cfg.just = just;
        let mut stats = DtpgStats::new();
        let dtpg = Dtpg::new(cfg);
        let result = dtpg
            .generate_test::<BruteForceSolver>(&network, network.fault(fault_id), &mut stats)
            .unwrap();
        assert!(matches!(result, DtpgResult::Detected(_)));
    }
}

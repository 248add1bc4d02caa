//! Tests for the consensus node strategies

#[cfg(test)]
mod consensus_tests {
    use crate::consensus::algorithms::*;
    use crate::consensus::*;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::Arc;

    // Initialize logger for tests (only once)
    static INIT: std::sync::Once = std::sync::Once::new();

    fn init() {
        INIT.call_once(crate::logger::init_test_logger);
    }

    #[derive(Default)]
    struct RecordingObserver {
        blacklisted: Mutex<Vec<(usize, BlacklistReason, usize)>>,
        finalized: Mutex<Option<FinalizationOutcome>>,
    }

    impl RoundObserver for RecordingObserver {
        fn on_blacklisted(&self, followee: usize, reason: BlacklistReason, round: usize) {
            self.blacklisted.lock().push((followee, reason, round));
        }

        fn on_finalized(&self, outcome: &FinalizationOutcome) {
            *self.finalized.lock() = Some(*outcome);
        }
    }

    fn params(p_malicious: f64, num_rounds: usize) -> ConsensusParams {
        ConsensusParams::new(0.1, p_malicious, 0.05, num_rounds).unwrap()
    }

    fn txs(ids: &[i64]) -> HashSet<Transaction> {
        ids.iter().copied().map(Transaction::new).collect()
    }

    fn candidates(reports: &[(usize, &[i64])]) -> HashSet<Candidate> {
        reports
            .iter()
            .flat_map(|(sender, ids)| {
                ids.iter()
                    .map(move |id| Candidate::new(Transaction::new(*id), *sender))
            })
            .collect()
    }

    fn ready_node(followees: &[bool], own: &[i64], p_malicious: f64, rounds: usize) -> CompliantNode {
        let mut node = CompliantNode::new(params(p_malicious, rounds));
        node.set_followees(followees).unwrap();
        node.set_pending_transactions(&txs(own)).unwrap();
        node
    }

    #[test]
    fn test_silent_followee_is_blacklisted_and_excluded_from_vote() {
        init();
        let observer = Arc::new(RecordingObserver::default());
        let mut node = CompliantNode::new(params(0.3, 3)).with_observer(observer.clone());
        node.set_followees(&[true, true, false]).unwrap();
        node.set_pending_transactions(&HashSet::new()).unwrap();

        node.receive_from_followees(&candidates(&[(0, &[1]), (1, &[2])]))
            .unwrap();
        assert!(node.blacklist().is_empty());
        assert_eq!(node.send_to_followers(), txs(&[1, 2]));

        node.receive_from_followees(&candidates(&[(0, &[1, 3])]))
            .unwrap();
        assert!(node.blacklist().contains(1));
        assert!(!node.blacklist().contains(0));
        assert_eq!(node.send_to_followers(), txs(&[1, 3]));

        node.receive_from_followees(&candidates(&[(0, &[1, 3, 4])]))
            .unwrap();
        assert_eq!(node.phase(), NodePhase::Finalized);
        assert_eq!(node.send_to_followers(), txs(&[1, 3, 4]));

        assert_eq!(
            *observer.blacklisted.lock(),
            vec![(1, BlacklistReason::WentSilent, 2)]
        );
        let outcome = observer.finalized.lock().expect("finalized");
        assert_eq!(outcome.followee_count, 2);
        assert_eq!(outcome.blacklisted, 1);
        assert_eq!(outcome.min_votes, 0);
        assert_eq!(outcome.accepted, 3);
    }

    #[test]
    fn test_followee_dropping_a_transaction_is_blacklisted() {
        init();
        let observer = Arc::new(RecordingObserver::default());
        let mut node = CompliantNode::new(params(0.3, 3)).with_observer(observer.clone());
        node.set_followees(&[true, false]).unwrap();
        node.set_pending_transactions(&txs(&[7])).unwrap();

        node.receive_from_followees(&candidates(&[(0, &[1])])).unwrap();
        node.receive_from_followees(&candidates(&[(0, &[2])])).unwrap();

        assert!(node.blacklist().contains(0));
        assert_eq!(
            *observer.blacklisted.lock(),
            vec![(0, BlacklistReason::DroppedTransactions, 2)]
        );
        // Its evidence is frozen and no longer forwarded.
        assert_eq!(node.ledger().get(Slot::Followee(0)), Some(&txs(&[1])));
        assert_eq!(node.send_to_followers(), txs(&[7]));
    }

    #[test]
    fn test_receive_beyond_round_limit_fails() {
        init();
        let mut node = ready_node(&[true], &[], 0.3, 3);
        for _ in 0..3 {
            node.receive_from_followees(&HashSet::new()).unwrap();
        }

        let err = node.receive_from_followees(&HashSet::new()).unwrap_err();
        assert_eq!(err, ProtocolViolation::RoundLimitExceeded { num_rounds: 3 });
        assert_eq!(node.round(), 3);
    }

    #[test]
    fn test_no_followees_accepts_own_transactions() {
        init();
        let mut node = ready_node(&[false], &[10, 11], 0.5, 2);

        node.receive_from_followees(&HashSet::new()).unwrap();
        assert_eq!(node.tally().min_votes, 0);
        node.receive_from_followees(&HashSet::new()).unwrap();

        assert_eq!(node.send_to_followers(), txs(&[10, 11]));
        assert!(node.ledger().is_collapsed());
    }

    #[test]
    fn test_quorum_boundary_is_inclusive() {
        init();
        let mut node = ready_node(&[true, true, true, true, false], &[9], 0.5, 2);
        let reports: &[(usize, &[i64])] = &[(0, &[1, 2]), (1, &[1, 2]), (2, &[1]), (3, &[3])];

        node.receive_from_followees(&candidates(reports)).unwrap();
        let tally = node.tally();
        assert_eq!(tally.min_votes, 2);
        assert_eq!(tally.votes[&Transaction::new(1)], 3);
        assert_eq!(tally.votes[&Transaction::new(2)], 2);
        assert_eq!(tally.votes[&Transaction::new(3)], 1);

        node.receive_from_followees(&candidates(reports)).unwrap();
        assert_eq!(node.send_to_followers(), txs(&[1, 2, 9]));
    }

    #[test]
    fn test_blacklisting_lowers_threshold_and_drops_late_evidence() {
        init();
        let mut node = ready_node(&[true, true, true, true], &[], 0.5, 3);

        node.receive_from_followees(&candidates(&[(0, &[1]), (1, &[1]), (2, &[2]), (3, &[2])]))
            .unwrap();
        node.receive_from_followees(&candidates(&[(0, &[1]), (1, &[1]), (2, &[2])]))
            .unwrap();
        assert_eq!(node.blacklist().members().collect::<Vec<_>>(), vec![3]);
        assert_eq!(node.tally().min_votes, 1);

        node.receive_from_followees(&candidates(&[
            (0, &[1]),
            (1, &[1]),
            (2, &[2]),
            (3, &[2, 5]),
        ]))
        .unwrap();
        assert_eq!(node.send_to_followers(), txs(&[1, 2]));
    }

    #[test]
    fn test_blacklisted_evidence_stays_frozen() {
        init();
        let mut node = ready_node(&[true, true], &[], 0.0, 5);

        node.receive_from_followees(&candidates(&[(0, &[1]), (1, &[2])]))
            .unwrap();
        node.receive_from_followees(&candidates(&[(0, &[1])])).unwrap();
        node.receive_from_followees(&candidates(&[(0, &[1]), (1, &[2, 3, 4])]))
            .unwrap();

        assert!(node.blacklist().contains(1));
        assert_eq!(node.ledger().get(Slot::Followee(1)), Some(&txs(&[2])));
        assert_eq!(node.send_to_followers(), txs(&[1]));
    }

    #[test]
    fn test_blacklist_and_evidence_are_monotone() {
        init();
        let own = [100, 101];
        let mut node = ready_node(&[true, true, true, false], &own, 0.3, 6);
        let script: [&[(usize, &[i64])]; 6] = [
            &[(0, &[1]), (1, &[2]), (2, &[3])],
            &[(0, &[1, 4]), (1, &[2]), (2, &[5])],
            &[(0, &[1, 4]), (1, &[2, 6])],
            &[(0, &[1, 4, 7]), (1, &[2, 6]), (2, &[3, 5])],
            &[(0, &[1, 4, 7]), (1, &[6])],
            &[(0, &[1, 4, 7, 8]), (1, &[2, 6])],
        ];

        let mut previous_blacklist: HashSet<usize> = HashSet::new();
        let mut previous_evidence: Vec<Option<HashSet<Transaction>>> = vec![None; 3];

        for (index, round) in script.iter().enumerate() {
            node.receive_from_followees(&candidates(round)).unwrap();

            let blacklist: HashSet<usize> = node.blacklist().members().collect();
            assert!(previous_blacklist.is_subset(&blacklist));

            assert!(txs(&own).is_subset(&node.send_to_followers()));

            let finalized = index + 1 == script.len();
            if !finalized {
                for followee in 0..3 {
                    let current = node.ledger().get(Slot::Followee(followee)).cloned();
                    if let (Some(before), false) =
                        (&previous_evidence[followee], blacklist.contains(&followee))
                    {
                        let now = current.clone().unwrap_or_default();
                        assert!(before.is_subset(&now), "evidence of {} shrank", followee);
                    }
                    previous_evidence[followee] = current;
                }
            }
            previous_blacklist = blacklist;
        }

        // 2 dropped tx 3 in round 2, 1 dropped tx 2 in round 5.
        assert_eq!(node.blacklist().members().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(node.phase(), NodePhase::Finalized);
    }

    #[test]
    fn test_repeated_reads_are_identical() {
        init();
        let mut node = ready_node(&[true, true], &[5], 0.3, 2);
        node.receive_from_followees(&candidates(&[(0, &[1]), (1, &[2])]))
            .unwrap();

        let first = node.send_to_followers();
        let second = node.send_to_followers();
        assert_eq!(first, second);
        assert_eq!(first, txs(&[1, 2, 5]));

        node.receive_from_followees(&candidates(&[(0, &[1]), (1, &[2])]))
            .unwrap();
        assert_eq!(node.send_to_followers(), node.send_to_followers());
    }

    #[test]
    fn test_phase_transitions() {
        init();
        let mut node = CompliantNode::new(params(0.3, 3));
        assert_eq!(node.phase(), NodePhase::Uninitialized);

        node.set_followees(&[true]).unwrap();
        assert_eq!(node.phase(), NodePhase::Ready);

        node.receive_from_followees(&HashSet::new()).unwrap();
        assert_eq!(node.phase(), NodePhase::Gathering(1));
        node.receive_from_followees(&HashSet::new()).unwrap();
        assert_eq!(node.phase(), NodePhase::Gathering(2));
        node.receive_from_followees(&HashSet::new()).unwrap();
        assert_eq!(node.phase(), NodePhase::Finalized);
    }

    #[test]
    fn test_setup_protocol_violations() {
        init();
        let mut node = CompliantNode::new(params(0.3, 3));

        assert_eq!(
            node.set_pending_transactions(&txs(&[1])),
            Err(ProtocolViolation::FolloweesNotSet)
        );
        assert_eq!(
            node.receive_from_followees(&HashSet::new()),
            Err(ProtocolViolation::FolloweesNotSet)
        );

        node.set_followees(&[true, false]).unwrap();
        assert_eq!(
            node.set_followees(&[true, true]),
            Err(ProtocolViolation::FolloweesAlreadySet)
        );
        assert_eq!(node.followee_count(), 1);

        node.set_pending_transactions(&txs(&[1])).unwrap();
        assert_eq!(
            node.set_pending_transactions(&txs(&[2])),
            Err(ProtocolViolation::PendingAlreadySet)
        );
        assert_eq!(node.send_to_followers(), txs(&[1]));
    }

    #[test]
    fn test_invalid_senders_are_rejected_without_side_effects() {
        init();
        let mut node = ready_node(&[true, false, true], &[], 0.3, 3);

        assert_eq!(
            node.receive_from_followees(&candidates(&[(0, &[1]), (7, &[2])])),
            Err(ProtocolViolation::SenderOutOfRange {
                sender: 7,
                node_count: 3
            })
        );
        assert_eq!(
            node.receive_from_followees(&candidates(&[(1, &[2])])),
            Err(ProtocolViolation::NotAFollowee { sender: 1 })
        );
        assert_eq!(node.round(), 0);
        assert!(node.send_to_followers().is_empty());
    }

    #[test]
    fn test_min_votes_truncates() {
        assert_eq!(params(0.3, 1).min_votes(5), 1);
        assert_eq!(params(0.5, 1).min_votes(0), 0);
        assert_eq!(params(0.45, 1).min_votes(10), 4);
        assert_eq!(params(0.3, 1).min_votes(2), 0);
        assert_eq!(params(1.0, 1).min_votes(7), 7);
    }

    #[test]
    fn test_params_validation() {
        assert!(ConsensusParams::new(1.2, 0.3, 0.05, 10).is_err());
        assert!(ConsensusParams::new(0.1, -0.1, 0.05, 10).is_err());
        assert!(ConsensusParams::new(0.1, 0.3, 0.05, 0).is_err());
        assert!(ConsensusParams::new(0.0, 1.0, 0.0, 1).is_ok());
    }

    #[test]
    fn test_blacklist_is_idempotent() {
        let mut blacklist = Blacklist::with_capacity(3);
        assert!(blacklist.insert(2));
        assert!(!blacklist.insert(2));
        assert!(!blacklist.insert(9));
        assert_eq!(blacklist.len(), 1);
        assert!(!blacklist.contains(9));
        assert_eq!(blacklist.members().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_ledger_collapse() {
        let mut ledger = FolloweeLedger::new();
        ledger.absorb(Slot::Own, txs(&[1]));
        ledger.absorb(Slot::Followee(0), txs(&[2]));
        ledger.absorb(Slot::Followee(0), txs(&[3]));
        assert_eq!(ledger.get(Slot::Followee(0)), Some(&txs(&[2, 3])));
        assert_eq!(ledger.followees().count(), 1);

        ledger.collapse(txs(&[1, 2]));
        assert!(ledger.is_collapsed());
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(Slot::Accepted), Some(&txs(&[1, 2])));
        assert_eq!(ledger.get(Slot::Own), None);
    }

    #[test]
    fn test_do_nothing_node() {
        init();
        let mut node = DoNothingNode::new();
        node.set_followees(&[true]).unwrap();
        node.set_pending_transactions(&txs(&[1, 2])).unwrap();
        node.receive_from_followees(&candidates(&[(0, &[3])])).unwrap();
        assert!(node.send_to_followers().is_empty());
        assert_eq!(node.name(), "Do-Nothing");
    }

    #[test]
    fn test_send_one_node_repeats_smallest_seed() {
        init();
        let mut node = SendOneNode::new();
        node.set_followees(&[true]).unwrap();
        node.set_pending_transactions(&txs(&[5, 3, 9])).unwrap();
        for _ in 0..3 {
            assert_eq!(node.send_to_followers(), txs(&[3]));
            node.receive_from_followees(&candidates(&[(0, &[1])])).unwrap();
        }

        let mut empty = SendOneNode::new();
        empty.set_pending_transactions(&HashSet::new()).unwrap();
        assert!(empty.send_to_followers().is_empty());
    }

    #[test]
    fn test_intermittent_node_alternates() {
        init();
        let mut node = IntermittentNode::new(params(0.3, 5));
        node.set_followees(&[false, false]).unwrap();
        node.set_pending_transactions(&txs(&[1])).unwrap();

        assert_eq!(node.send_to_followers(), txs(&[1]));
        node.receive_from_followees(&HashSet::new()).unwrap();
        assert!(node.send_to_followers().is_empty());
        node.receive_from_followees(&HashSet::new()).unwrap();
        assert_eq!(node.send_to_followers(), txs(&[1]));
        assert_eq!(node.name(), "Intermittent-Compliant");
    }

    #[test]
    fn test_compliant_node_blacklists_intermittent_followee() {
        init();
        let mut adversary = IntermittentNode::new(params(0.3, 4));
        adversary.set_followees(&[false, false]).unwrap();
        adversary.set_pending_transactions(&txs(&[42])).unwrap();

        let mut node = ready_node(&[false, true], &[1], 0.3, 4);

        for _ in 0..2 {
            let proposals: HashSet<Candidate> = adversary
                .send_to_followers()
                .into_iter()
                .map(|tx| Candidate::new(tx, 1))
                .collect();
            node.receive_from_followees(&proposals).unwrap();
            adversary.receive_from_followees(&HashSet::new()).unwrap();
        }

        assert!(node.blacklist().contains(1));
        assert_eq!(node.send_to_followers(), txs(&[1]));
    }
}

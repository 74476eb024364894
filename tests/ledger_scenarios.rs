// tests/ledger_scenarios.rs
//! End-to-end ledger tests: validity rules, epoch ordering and the
//! split / merge / double-spend scenarios.

use ed25519_dalek::SigningKey;
use rand::Rng;
use utxo_ledger::crypto::sign;
use utxo_ledger::{
    check_transaction, is_valid, process_epoch, run_epoch, Ledger, LedgerConfig, OutputRecord,
    Rejection, Transaction, TxHash, UtxoId, UtxoPool,
};

fn key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

/// Pool holding a single genesis output.
fn genesis(value: i64, owner: &SigningKey) -> (UtxoPool, UtxoId) {
    let id = UtxoId::new(TxHash::from([0u8; 32]), 0);
    let pool: UtxoPool = vec![(id, OutputRecord::new(value, owner.verifying_key()))]
        .into_iter()
        .collect();
    (pool, id)
}

fn build(inputs: &[UtxoId], outputs: &[(i64, &SigningKey)]) -> Transaction {
    let mut tx = Transaction::new();
    for id in inputs {
        tx.add_input(id.tx_hash, id.index);
    }
    for (value, owner) in outputs {
        tx.add_output(*value, owner.verifying_key());
    }
    tx
}

fn sign_all(tx: &mut Transaction, signers: &[&SigningKey]) {
    for (i, signer) in signers.iter().enumerate() {
        let payload = tx.signable_payload(i).unwrap();
        assert!(tx.set_signature(i, sign(signer, &payload)));
    }
}

#[test]
fn scenario_split_then_merge() {
    let (k1, k2) = (key(1), key(2));
    let (mut pool, root) = genesis(10, &k1);

    // A: split 10 into 5/3/2 for K2
    let mut t1 = build(&[root], &[(5, &k2), (3, &k2), (2, &k2)]);
    sign_all(&mut t1, &[&k1]);
    assert!(is_valid(&t1, &pool));
    assert_eq!(process_epoch(&[t1.clone()], &mut pool), vec![t1.clone()]);

    let h1 = t1.hash();
    assert_eq!(pool.len(), 3);
    assert!(!pool.contains(&root));
    for (index, value) in [5, 3, 2].into_iter().enumerate() {
        let record = pool.get(&UtxoId::new(h1, index as u32)).unwrap();
        assert_eq!(record.value, value);
        assert_eq!(record.owner, k2.verifying_key());
    }

    // B: merge back into one output for K1, signed by the current owner
    let outs = [UtxoId::new(h1, 0), UtxoId::new(h1, 1), UtxoId::new(h1, 2)];
    let mut by_old_owner = build(&outs, &[(10, &k1)]);
    sign_all(&mut by_old_owner, &[&k1, &k1, &k1]);
    assert!(!is_valid(&by_old_owner, &pool));

    let mut t2 = build(&outs, &[(10, &k1)]);
    sign_all(&mut t2, &[&k2, &k2, &k2]);
    assert!(is_valid(&t2, &pool));

    assert_eq!(process_epoch(&[by_old_owner, t2.clone()], &mut pool), vec![t2.clone()]);
    assert_eq!(pool.len(), 1);
    assert_eq!(
        pool.get(&UtxoId::new(t2.hash(), 0)),
        Some(&OutputRecord::new(10, k1.verifying_key()))
    );
}

#[test]
fn double_spend_first_wins() {
    let k1 = key(1);
    let (mut pool, root) = genesis(10, &k1);

    let mut t1 = build(&[root], &[(10, &key(2))]);
    sign_all(&mut t1, &[&k1]);
    let mut t1b = build(&[root], &[(10, &key(3))]);
    sign_all(&mut t1b, &[&k1]);

    assert!(is_valid(&t1, &pool));
    assert!(is_valid(&t1b, &pool));

    let report = run_epoch(&[t1.clone(), t1b.clone()], &mut pool, &LedgerConfig::default());
    assert_eq!(report.accepted, vec![t1.clone()]);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].tx_hash, t1b.hash());
    assert_eq!(
        report.rejected[0].reason,
        Rejection::MissingInput { index: 0, utxo: root }
    );
    assert!(pool.contains(&UtxoId::new(t1.hash(), 0)));
    assert!(!pool.contains(&UtxoId::new(t1b.hash(), 0)));
}

#[test]
fn absent_input_is_invalid() {
    let k1 = key(1);
    let (pool, _) = genesis(10, &k1);
    let mut tx = build(&[UtxoId::new(TxHash::from([4u8; 32]), 0)], &[(1, &k1)]);
    sign_all(&mut tx, &[&k1]);
    assert!(!is_valid(&tx, &pool));
}

#[test]
fn duplicate_claim_is_invalid() {
    let k1 = key(1);
    let (pool, root) = genesis(10, &k1);
    let mut tx = build(&[root, root], &[(5, &k1)]);
    sign_all(&mut tx, &[&k1, &k1]);

    assert!(!is_valid(&tx, &pool));
    assert_eq!(
        check_transaction(&tx, &pool),
        Err(Rejection::DuplicateInput { index: 1, utxo: root })
    );
}

#[test]
fn negative_output_is_invalid() {
    let (k1, k2) = (key(1), key(2));
    let (pool, root) = genesis(10, &k1);

    let mut tx = build(&[root], &[(5, &k2), (3, &k2), (2, &k2)]);
    sign_all(&mut tx, &[&k1]);
    assert!(is_valid(&tx, &pool));

    let mut flipped = build(&[root], &[(5, &k2), (3, &k2), (-2, &k2)]);
    sign_all(&mut flipped, &[&k1]);
    assert!(!is_valid(&flipped, &pool));
}

#[test]
fn overspend_is_invalid() {
    let k1 = key(1);
    let (pool, root) = genesis(10, &k1);
    let mut tx = build(&[root], &[(7, &k1), (4, &k1)]);
    sign_all(&mut tx, &[&k1]);
    assert_eq!(
        check_transaction(&tx, &pool),
        Err(Rejection::InsufficientValue { inputs: 10, outputs: 11 })
    );
}

#[test]
fn resigning_with_owner_key_fixes_authorization() {
    let (k1, k2) = (key(1), key(2));
    let (pool, root) = genesis(10, &k1);

    let mut tx = build(&[root], &[(10, &k2)]);
    sign_all(&mut tx, &[&k2]);
    assert!(!is_valid(&tx, &pool));

    sign_all(&mut tx, &[&k1]);
    assert!(is_valid(&tx, &pool));
}

#[test]
fn one_bad_signature_invalidates_all() {
    let k1 = key(1);
    let (mut pool, root) = genesis(10, &k1);
    let mut split = build(&[root], &[(4, &k1), (6, &k1)]);
    sign_all(&mut split, &[&k1]);
    process_epoch(&[split.clone()], &mut pool);

    let h = split.hash();
    let mut merge = build(&[UtxoId::new(h, 0), UtxoId::new(h, 1)], &[(10, &k1)]);
    sign_all(&mut merge, &[&k1, &k1]);
    assert!(is_valid(&merge, &pool));

    merge.set_signature(1, vec![0u8; 64]);
    assert_eq!(
        check_transaction(&merge, &pool),
        Err(Rejection::InvalidSignature { index: 1 })
    );
}

#[test]
fn validity_check_does_not_mutate() {
    let k1 = key(1);
    let (pool, root) = genesis(10, &k1);
    let mut tx = build(&[root], &[(10, &key(2))]);
    sign_all(&mut tx, &[&k1]);

    let snapshot = pool.clone();
    let first = is_valid(&tx, &pool);
    let second = is_valid(&tx, &pool);
    assert!(first);
    assert_eq!(first, second);
    assert_eq!(pool, snapshot);
}

#[test]
fn conservation_matches_sums() {
    let k1 = key(1);
    let mut rng = rand::thread_rng();
    for _ in 0..50 {
        let input_value: i64 = rng.gen_range(0..1_000);
        let (pool, root) = genesis(input_value, &k1);
        let outputs: Vec<i64> = (0..rng.gen_range(1..5)).map(|_| rng.gen_range(0..400)).collect();

        let owners: Vec<(i64, &SigningKey)> = outputs.iter().map(|v| (*v, &k1)).collect();
        let mut tx = build(&[root], &owners);
        sign_all(&mut tx, &[&k1]);

        let total: i64 = outputs.iter().sum();
        assert_eq!(is_valid(&tx, &pool), input_value >= total);
    }
}

#[test]
fn parallel_and_sequential_agree() {
    let (k1, k2) = (key(1), key(2));
    let (pool, root) = genesis(10, &k1);

    let mut good = build(&[root], &[(6, &k2), (4, &k2)]);
    sign_all(&mut good, &[&k1]);
    let mut conflict = build(&[root], &[(10, &k1)]);
    sign_all(&mut conflict, &[&k1]);
    let h = good.hash();
    let mut chained = build(&[UtxoId::new(h, 0)], &[(6, &k1)]);
    sign_all(&mut chained, &[&k2]);
    let mut forged = build(&[UtxoId::new(h, 1)], &[(4, &k1)]);
    sign_all(&mut forged, &[&k1]);

    let batch = vec![good.clone(), conflict, chained.clone(), forged];

    let mut seq_pool = pool.clone();
    let seq = run_epoch(&batch, &mut seq_pool, &LedgerConfig::sequential());
    let mut par_pool = pool.clone();
    let par = run_epoch(
        &batch,
        &mut par_pool,
        &LedgerConfig {
            parallel_verification: true,
            verification_threads: Some(2),
        },
    );

    assert_eq!(seq.accepted, vec![good, chained]);
    assert_eq!(seq.rejected.len(), 2);
    assert_eq!(seq.rejected[1].reason, Rejection::InvalidSignature { index: 0 });
    assert_eq!(seq.accepted, par.accepted);
    assert_eq!(seq.rejected, par.rejected);
    assert_eq!(seq_pool, par_pool);
}

#[test]
fn ledger_owns_its_pool() {
    utxo_ledger::init_logging();
    let k1 = key(1);
    let (pool, root) = genesis(10, &k1);
    let mut ledger = Ledger::new(pool.clone());

    let mut tx = build(&[root], &[(10, &key(2))]);
    sign_all(&mut tx, &[&k1]);
    assert!(ledger.is_valid_tx(&tx));
    assert_eq!(ledger.handle_txs(&[tx.clone(), tx.clone()]), vec![tx.clone()]);

    assert!(pool.contains(&root));
    assert!(!ledger.pool().contains(&root));
    assert!(!ledger.is_valid_tx(&tx));

    let after = ledger.into_pool();
    assert_eq!(after.utxo_ids(), vec![UtxoId::new(tx.hash(), 0)]);
    assert_eq!(after.total_value(), 10);
}

#[test]
fn json_transport_preserves_hash_and_pool() {
    let k1 = key(1);
    let (pool, root) = genesis(10, &k1);
    let mut tx = build(&[root], &[(7, &key(2)), (3, &k1)]);
    sign_all(&mut tx, &[&k1]);

    let wire = serde_json::to_string(&tx).unwrap();
    let decoded: Transaction = serde_json::from_str(&wire).unwrap();
    assert_eq!(decoded.hash(), tx.hash());

    let pool_wire = serde_json::to_string(&pool).unwrap();
    let pool_back: UtxoPool = serde_json::from_str(&pool_wire).unwrap();
    assert_eq!(pool_back, pool);
    assert!(is_valid(&decoded, &pool_back));
}

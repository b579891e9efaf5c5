use std::{sync::Arc, time::Duration};

use notes::{
    constants::ENVELOPE_LENGTH, zero_output, Amounts, Element, OwnedAccount, Token, UtxoInput,
    TREE_DEPTH,
};
use observer::{Observer, SharedAccount};
use parking_lot::Mutex;
use prover::Assembler;
use shield::{Error, Shield};
use testutil::{LedgerError, MockLedger, MockProver};

const TIMEOUT: Duration = Duration::from_secs(30);

fn token() -> Token {
    Token::repeat_byte(0xaa)
}

fn account(seed: u8) -> SharedAccount {
    Arc::new(Mutex::new(OwnedAccount::random_with(testutil::rng(seed))))
}

fn amount(value: u64) -> Amounts {
    Amounts::single(0, Element::new(value)).unwrap()
}

#[tokio::test]
async fn deposit_binds_amount_to_slot_zero() {
    let alice = OwnedAccount::random_with(testutil::rng(1));

    let mut output = alice.pay_self(amount(100));
    output.finalize(true).unwrap();
    let dummy = zero_output();

    let assembler = Assembler::new(MockProver::new(), TIMEOUT);
    let args = assembler
        .deposit(&amount(100), [&output, &dummy])
        .await
        .unwrap();

    assert_eq!(args.deposit_amount[0], Element::new(100));
    assert!(args.deposit_amount.iter().skip(1).all(Element::is_zero));
    assert_eq!(
        args.out_commitments[0],
        notes::commitment(&amount(100), alice.public_key(), output.blinding())
    );
    assert_eq!(args.encrypted_outputs[1].len(), ENVELOPE_LENGTH);
    assert_eq!(assembler.prover().proofs(), 1);
}

#[tokio::test]
async fn transfer_spends_leaf_zero_exactly_once() {
    let ledger = MockLedger::<TREE_DEPTH>::new();
    ledger.add_token(token()).unwrap();
    ledger.approve(token(), Element::new(1000));
    let assembler = Assembler::new(MockProver::new(), TIMEOUT);
    let alice = account(1);
    let bob = account(2);

    let mut observer = Observer::<TREE_DEPTH>::new();
    observer.subscribe(Arc::clone(&alice));
    observer.subscribe(Arc::clone(&bob));

    for value in [100, 50] {
        let mut output = alice.lock().pay_self(amount(value));
        output.finalize(true).unwrap();
        let dummy = zero_output();

        let args = assembler
            .deposit(&amount(value), [&output, &dummy])
            .await
            .unwrap();
        ledger.deposit(&args).unwrap();
    }

    observer.ready(&ledger).await.unwrap();
    assert_eq!(observer.num_leaves(), 4);
    assert_eq!(observer.tree().read().root(), ledger.root());

    let input = alice
        .lock()
        .utxos()
        .iter()
        .find(|utxo| utxo.index() == 0)
        .cloned()
        .unwrap();
    assert_eq!(input.amounts()[0], Element::new(100));

    let bob_address = bob.lock().address();
    let mut to_bob = alice.lock().pay(bob_address, amount(60));
    to_bob.finalize(true).unwrap();
    let mut change = alice.lock().pay_self(amount(40));
    change.finalize(true).unwrap();

    let tree = observer.tree();
    let args = assembler
        .transfer(&*tree, &Amounts::ZERO, &[&input], &[&to_bob, &change])
        .await
        .unwrap();

    let expected = notes::nullifier(input.commitment(), 0, alice.lock().spending_key());
    assert_eq!(args.in_nullifiers, vec![expected]);
    assert_eq!(
        args.out_commitments,
        vec![to_bob.commitment().unwrap(), change.commitment().unwrap()]
    );

    ledger.transact(&args).unwrap();
    assert!(matches!(
        ledger.transact(&args),
        Err(LedgerError::DoubleSpend(nullifier)) if nullifier == expected
    ));

    observer.ready(&ledger).await.unwrap();
    assert_eq!(observer.num_leaves(), 6);
    assert_eq!(observer.tree().read().root(), ledger.root());

    let bob_notes = bob.lock().utxos().to_vec();
    assert_eq!(bob_notes.len(), 1);
    assert_eq!(bob_notes[0].index(), 4);
    assert_eq!(bob_notes[0].amounts()[0], Element::new(60));
}

#[tokio::test]
async fn live_events_out_of_order_are_applied_in_order() {
    let ledger = Arc::new(MockLedger::<TREE_DEPTH>::new());
    ledger.add_token(token()).unwrap();
    ledger.approve(token(), Element::new(1000));
    let assembler = Assembler::new(MockProver::new(), TIMEOUT);
    let alice = account(1);

    let mut observer = Observer::<TREE_DEPTH>::new();
    observer.subscribe(Arc::clone(&alice));
    let tree = observer.tree();

    let source = Arc::clone(&ledger);
    let running = tokio::spawn(async move { observer.run(source.as_ref()).await });

    // let the observer open its subscription
    tokio::time::sleep(Duration::from_millis(50)).await;

    ledger.reverse_delivery(true);
    for value in [10, 20] {
        let mut output = alice.lock().pay_self(amount(value));
        output.finalize(true).unwrap();
        let dummy = zero_output();

        let args = assembler
            .deposit(&amount(value), [&output, &dummy])
            .await
            .unwrap();
        ledger.deposit(&args).unwrap();
    }

    tokio::time::timeout(Duration::from_secs(5), async {
        while tree.read().num_leaves() < 4 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    assert_eq!(tree.read().root(), ledger.root());
    assert_eq!(alice.lock().balance().unwrap()[0], Element::new(30));

    running.abort();
}

#[tokio::test]
async fn shield_deposits_transfers_and_withdraws() {
    let ledger = MockLedger::<TREE_DEPTH>::new();
    ledger.add_token(token()).unwrap();

    let shield: Shield<_, _> = Shield::new(MockProver::new(), ledger, TIMEOUT);
    assert_eq!(shield.sync_tokens().await.unwrap(), 1);
    assert_eq!(shield.tokens().slot_of(token()).unwrap(), 0);

    let alice = account(1);
    let bob = account(2);
    assert_eq!(shield.track(Arc::clone(&alice)).await.unwrap(), 0);
    assert_eq!(shield.track(Arc::clone(&bob)).await.unwrap(), 0);

    let alice_address = alice.lock().address();
    shield
        .deposit(alice_address, token(), Element::new(100))
        .await
        .unwrap();
    shield.sync().await.unwrap();
    assert_eq!(alice.lock().balance().unwrap()[0], Element::new(100));

    let bob_address = bob.lock().address();
    let args = shield
        .transfer(&alice, bob_address, token(), Element::new(30))
        .await
        .unwrap();
    assert_eq!(args.out_commitments.len(), 2);
    shield.sync().await.unwrap();

    assert_eq!(bob.lock().balance().unwrap()[0], Element::new(30));

    let spent = shield.spent();
    let alice_left =
        Amounts::checked_sum(alice.lock().unspent(&spent).map(UtxoInput::amounts)).unwrap();
    assert_eq!(alice_left[0], Element::new(70));

    let args = shield
        .withdraw(&bob, token(), Element::new(30))
        .await
        .unwrap();
    assert_eq!(args.withdraw_amount[0], Element::new(30));
    assert!(shield.ledger().is_spent(args.in_nullifiers[0]));
    shield.sync().await.unwrap();

    assert!(matches!(
        shield.withdraw(&bob, token(), Element::new(1)).await,
        Err(Error::InsufficientFunds { slot: 0 })
    ));
    assert_eq!(shield.tree().read().root(), shield.ledger().root());
}

#[tokio::test]
async fn unknown_tokens_are_refused_before_proving() {
    let ledger = MockLedger::<TREE_DEPTH>::new();
    let shield: Shield<_, _> = Shield::new(MockProver::new(), ledger, TIMEOUT);

    let alice = OwnedAccount::random_with(testutil::rng(1));

    assert!(matches!(
        shield
            .deposit(alice.address(), token(), Element::new(1))
            .await,
        Err(Error::Notes(notes::Error::UnknownToken(_)))
    ));
}

#[tokio::test]
async fn deposits_approve_the_pool_first() {
    let ledger = MockLedger::<TREE_DEPTH>::new();
    ledger.add_token(token()).unwrap();

    let alice = OwnedAccount::random_with(testutil::rng(1));
    let mut output = alice.pay_self(amount(100));
    output.finalize(true).unwrap();
    let dummy = zero_output();
    let args = Assembler::new(MockProver::new(), TIMEOUT)
        .deposit(&amount(100), [&output, &dummy])
        .await
        .unwrap();
    assert!(matches!(
        ledger.deposit(&args),
        Err(LedgerError::InsufficientAllowance { .. })
    ));

    let shield: Shield<_, _> = Shield::new(MockProver::new(), ledger, TIMEOUT);
    shield.sync_tokens().await.unwrap();
    shield
        .deposit(alice.address(), token(), Element::new(100))
        .await
        .unwrap();

    assert_eq!(shield.ledger().num_leaves(), 2);
    assert_eq!(
        shield.ledger().allowance(token()),
        Element::MAX.checked_sub(Element::new(100)).unwrap()
    );

    shield
        .deposit(alice.address(), token(), Element::new(5))
        .await
        .unwrap();
    assert_eq!(
        shield.ledger().allowance(token()),
        Element::MAX.checked_sub(Element::new(105)).unwrap()
    );
}

#[tokio::test]
async fn late_accounts_find_notes_already_synced() {
    let ledger = MockLedger::<TREE_DEPTH>::new();
    ledger.add_token(token()).unwrap();

    let shield: Shield<_, _> = Shield::new(MockProver::new(), ledger, TIMEOUT);
    shield.sync_tokens().await.unwrap();

    let alice = account(1);
    let alice_address = alice.lock().address();
    shield
        .deposit(alice_address, token(), Element::new(40))
        .await
        .unwrap();
    shield.sync().await.unwrap();

    assert_eq!(shield.track(Arc::clone(&alice)).await.unwrap(), 1);
    assert_eq!(alice.lock().balance().unwrap()[0], Element::new(40));

    // a second rescan finds nothing new
    assert_eq!(shield.track(Arc::clone(&alice)).await.unwrap(), 0);
    assert_eq!(alice.lock().utxos().len(), 1);
}

async fn wait_for_balance(account: &SharedAccount, value: u64) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while account.lock().balance().map(|balance| balance[0]) != Some(Element::new(value)) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn spends_while_the_observer_runs() {
    let ledger = MockLedger::<TREE_DEPTH>::new();
    ledger.add_token(token()).unwrap();

    let shield: Arc<Shield<_, _>> = Arc::new(Shield::new(MockProver::new(), ledger, TIMEOUT));
    shield.sync_tokens().await.unwrap();

    let alice = account(1);
    let bob = account(2);
    shield.track(Arc::clone(&alice)).await.unwrap();
    shield.track(Arc::clone(&bob)).await.unwrap();

    let runner = Arc::clone(&shield);
    let running = tokio::spawn(async move { runner.run().await });

    // let the observer open its subscription
    tokio::time::sleep(Duration::from_millis(50)).await;

    let alice_address = alice.lock().address();
    shield
        .deposit(alice_address, token(), Element::new(100))
        .await
        .unwrap();
    wait_for_balance(&alice, 100).await;

    let bob_address = bob.lock().address();
    shield
        .transfer(&alice, bob_address, token(), Element::new(30))
        .await
        .unwrap();
    wait_for_balance(&bob, 30).await;

    assert!(!running.is_finished());
    assert_eq!(shield.tree().read().root(), shield.ledger().root());

    running.abort();
}

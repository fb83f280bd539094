use paratime_client::{
    events::{EventVisitor, Visit},
    ModuleHandler,
};
use paratime_types::event::{Event, RoundEvents};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Transfer {
    to: String,
    amount: u64,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Burn {
    amount: u64,
}

fn event<T: Serialize>(module: &str, code: u32, payloads: &[T]) -> Event {
    Event {
        module: module.into(),
        code,
        value: paratime_hash::serialize(payloads),
        tx_hash: None,
    }
}

fn transfer(to: &str, amount: u64) -> Transfer {
    Transfer {
        to: to.into(),
        amount,
    }
}

#[test]
fn dispatch_in_order_and_skip_unknown() {
    let _ = tracing_subscriber::fmt::try_init();
    let mut transfers = vec![];
    let mut burns = vec![];
    let mut visitor = EventVisitor::new([ModuleHandler::new("accounts")
        .on(1, |_, t: Transfer| transfers.push(t))
        .on(2, |_, b: Burn| burns.push(b.amount))]);

    let events = vec![
        event("accounts", 1, &[transfer("alice", 1), transfer("bob", 2)]),
        event("accounts", 3, &[Burn { amount: 9 }]),
        event("consensus_accounts", 1, &[transfer("carol", 3)]),
        event("accounts", 2, &[Burn { amount: 4 }]),
        event("accounts", 1, &[transfer("dave", 5)]),
    ];
    assert!(visitor.visit_all(&events).is_empty());
    assert_eq!(visitor.visit(&events[1]).unwrap(), Visit::Skipped);
    assert_eq!(visitor.visit(&events[3]).unwrap(), Visit::Handled(1));
    assert!(visitor.handles("accounts", 1));
    assert!(!visitor.handles("accounts", 3));
    drop(visitor);

    assert_eq!(
        transfers,
        vec![
            transfer("alice", 1),
            transfer("bob", 2),
            transfer("dave", 5)
        ]
    );
    assert_eq!(burns, vec![4, 4]);
}

#[test]
fn decode_failure_does_not_stop_dispatch() {
    let mut seen = vec![];
    let mut visitor = EventVisitor::new([
        ModuleHandler::new("accounts").on(1, |_, t: Transfer| seen.push(t.amount))
    ]);

    let round = RoundEvents {
        round: 7,
        events: vec![
            event("accounts", 1, &[transfer("alice", 1)]),
            event("accounts", 1, &[Burn { amount: 2 }]),
            event("accounts", 1, &[transfer("bob", 3)]),
        ],
    };
    let errors = visitor.visit_round(&round);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].round, Some(7));
    assert_eq!(errors[0].index, 1);
    assert_eq!(errors[0].module, "accounts");
    assert_eq!(errors[0].code, 1);
    drop(visitor);
    assert_eq!(seen, vec![1, 3]);
}

#[test]
fn handler_sees_raw_event() {
    let mut hashes = vec![];
    let mut visitor = EventVisitor::new([
        ModuleHandler::new("accounts").on(2, |e: &Event, _: Burn| hashes.push(e.tx_hash))
    ]);
    let mut burn = event("accounts", 2, &[Burn { amount: 1 }]);
    burn.tx_hash = Some([5; 32]);
    visitor.visit(&burn).unwrap();
    drop(visitor);
    assert_eq!(hashes, vec![Some([5; 32])]);
}

#[test]
fn first_registration_wins() {
    let mut first = 0;
    let mut second = 0;
    let mut visitor = EventVisitor::new([
        ModuleHandler::new("accounts").on(2, |_, _: Burn| first += 1),
        ModuleHandler::new("accounts")
            .on(2, |_, _: Burn| second += 1)
            .on(1, |_, _: Transfer| ()),
    ]);
    assert!(visitor.handles("accounts", 1));
    visitor
        .visit(&event("accounts", 2, &[Burn { amount: 1 }]))
        .unwrap();
    drop(visitor);
    assert_eq!((first, second), (1, 0));
}

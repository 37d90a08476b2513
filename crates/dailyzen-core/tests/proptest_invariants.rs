use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate};
use proptest::prelude::*;

use dailyzen_core::entitlement::UserStore;
use dailyzen_core::favorites::FavoritesStore;
use dailyzen_core::gate::PaywallGate;
use dailyzen_core::quote::select::{day_index, position_for_day, quote_for_day};
use dailyzen_core::store::{MemoryStore, SyncWriter};

fn favorites(backing: &Arc<MemoryStore>) -> FavoritesStore {
    FavoritesStore::hydrate(
        backing.as_ref(),
        Arc::new(SyncWriter::new(backing.clone())),
        None,
    )
}

fn user(backing: &Arc<MemoryStore>) -> UserStore {
    UserStore::hydrate(backing.as_ref(), Arc::new(SyncWriter::new(backing.clone())))
}

#[derive(Debug, Clone)]
enum GateOp {
    Focus,
    Home,
    Dismiss,
    Open(Option<u8>),
    Close,
    SetPremium(bool),
}

fn arb_gate_op() -> impl Strategy<Value = GateOp> {
    prop_oneof![
        Just(GateOp::Focus),
        Just(GateOp::Home),
        Just(GateOp::Dismiss),
        proptest::option::of(0u8..30).prop_map(GateOp::Open),
        Just(GateOp::Close),
        any::<bool>().prop_map(GateOp::SetPremium),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn selection_is_periodic(len in 1usize..200, day in 0u64..100_000) {
        let list: Vec<usize> = (0..len).collect();
        let step = u64::try_from(len).unwrap();
        prop_assert_eq!(
            quote_for_day(&list, day).unwrap(),
            quote_for_day(&list, day + step).unwrap()
        );
    }

    #[test]
    fn consecutive_days_advance_by_one(len in 2usize..200, day in 0u64..100_000) {
        let a = position_for_day(len, day).unwrap();
        let b = position_for_day(len, day + 1).unwrap();
        prop_assert_eq!(b, (a + 1) % len);
    }

    #[test]
    fn day_index_is_monotonic_within_a_year(year in 1970i32..2100, offset in 0u64..364) {
        let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        let d = jan1.checked_add_days(Days::new(offset)).unwrap();
        let next = d.checked_add_days(Days::new(1)).unwrap();
        prop_assert_eq!(day_index(jan1), 1);
        if next.year() == d.year() {
            prop_assert_eq!(day_index(next), day_index(d) + 1);
        } else {
            prop_assert_eq!(day_index(next), 1);
        }
    }

    #[test]
    fn double_toggle_is_identity(seed in proptest::collection::btree_set(0u8..30, 0..10), id in 0u8..30) {
        let backing = Arc::new(MemoryStore::new());
        let mut store = favorites(&backing);
        for s in &seed {
            store.add(&s.to_string());
        }
        let id = id.to_string();
        let before = store.has(&id);
        store.toggle(&id);
        store.toggle(&id);
        prop_assert_eq!(store.has(&id), before);
        prop_assert_eq!(store.len(), seed.len());
    }

    #[test]
    fn paywall_never_visible_while_premium(ops in proptest::collection::vec(arb_gate_op(), 1..40)) {
        let backing = Arc::new(MemoryStore::new());
        let mut user = user(&backing);
        let mut gate = PaywallGate::new();
        for op in ops {
            match op {
                GateOp::Focus => { gate.focus_favorites(&user); }
                GateOp::Home => gate.go_home(),
                GateOp::Dismiss => { gate.dismiss_paywall(&user); }
                GateOp::Open(id) => {
                    let id = id.map(|i| i.to_string());
                    gate.open_paywall(&user, id.as_deref());
                }
                GateOp::Close => gate.close_paywall(),
                GateOp::SetPremium(value) => {
                    user.set_premium(value);
                    if value {
                        gate.close_paywall();
                    }
                    gate.entitlement_changed(&user);
                }
            }
            prop_assert!(!(user.is_premium() && gate.ui().show_paywall));
            if !gate.ui().show_paywall {
                prop_assert!(gate.ui().pending_quote_id.is_none());
            }
        }
    }
}

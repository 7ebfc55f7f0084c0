//! PostgreSQL store tests
//!
//! These run against a real container and are ignored by default:
//! `cargo test -p test_utils -- --ignored` on a host with Docker.

use std::sync::Arc;

use core_kernel::FixedClock;
use domain_relief::{Holder, ReliefRegistry, Supply};
use infra_db::repositories::{NewAllocation, NewSupply};
use infra_db::{MemoryFailureLog, PersistenceGateway, ReliefStore};
use test_utils::{db_test, DateFixtures, LocationFixtures, PersonBuilder};

db_test!(test_person_natural_key_matches_null_last_name, |db| {
    let store = db.store();
    let row = PersonBuilder::new("Jessica").row();

    let key = store.insert_person(&row).await.unwrap();
    assert_eq!(store.find_person("Jessica", None).await.unwrap(), Some(key));
    assert_eq!(store.find_person("Jessica", Some("Smith")).await.unwrap(), None);
});

db_test!(test_allocation_needs_exactly_one_holder, |db| {
    let store = db.store();
    let supply_id = store
        .insert_supply(&NewSupply {
            supply_type: "water".to_string(),
            quantity: 1,
            comments: None,
        })
        .await
        .unwrap();

    let err = store
        .insert_allocation(&NewAllocation {
            supply_id,
            person_id: None,
            location_id: None,
            allocation_date: DateFixtures::intake_start(),
        })
        .await
        .unwrap_err();
    assert!(err.is_constraint_violation());
});

db_test!(test_negative_quantity_rejected, |db| {
    let err = db
        .store()
        .insert_supply(&NewSupply {
            supply_type: "Blanket".to_string(),
            quantity: -1,
            comments: None,
        })
        .await
        .unwrap_err();
    assert!(err.is_constraint_violation());
});

db_test!(test_gateway_round_trip_and_sweep, |db| {
    let clock = Arc::new(FixedClock::new(DateFixtures::ymd(2025, 1, 1)));
    let mut registry = ReliefRegistry::new(clock.clone());
    let mut gateway = PersistenceGateway::new(db.store(), MemoryFailureLog::new(), clock.clone());

    let shelter = registry.add_location(LocationFixtures::community_centre());
    let freda = PersonBuilder::new("Freda")
        .entry_date("2025-01-01")
        .register(&mut registry)
        .unwrap();
    let water = registry.add_stock(Supply::water(1));

    assert!(gateway.save_location(registry.location(shelter).unwrap()).await);
    assert!(gateway.save_person(registry.person(freda).unwrap()).await);
    assert!(gateway.save_supply(registry.supply(water).unwrap()).await);
    let event = registry
        .allocate(water, Holder::Unowned, Holder::Person(freda))
        .unwrap();
    assert!(gateway.record_allocation(&registry, &event).await);

    let mut loaded = ReliefRegistry::new(clock.clone());
    let report = gateway.load_into(&mut loaded).await;
    assert_eq!(report.persons, 1);
    assert_eq!(
        loaded.find_person_by_name("Freda", None).unwrap().supplies().len(),
        1
    );

    clock.set(DateFixtures::ymd(2025, 1, 3));
    let mut swept = ReliefRegistry::new(clock);
    let report = gateway.load_into(&mut swept).await;
    assert_eq!(report.expired_allocations_removed, 1);
    assert_eq!(swept.stock().len(), 1);
    assert!(gateway.diagnostics().is_empty());
});

#[tokio::test]
#[ignore = "requires docker"]
async fn test_clear_data_restarts_keys() {
    let db = test_utils::get_shared_test_database().await;
    db.clear_data().await.unwrap();
    let store = db.store();

    let first = store.insert_person(&PersonBuilder::new("Freda").row()).await.unwrap();
    db.clear_data().await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM person")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);

    let again = store.insert_person(&PersonBuilder::new("Jane").row()).await.unwrap();
    assert_eq!(first, again);
}

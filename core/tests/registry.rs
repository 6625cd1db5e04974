//! Cache registry: lazy records, one-shot generation, per-cell encoding.

use geocache_core::{
    luck::initial_coins_key, CacheRegistry, Cell, CoinToken, GameError,
};

fn luck_with_coins(cell: Cell, coins: u32) -> impl Fn(&str) -> f64 {
    let key = initial_coins_key(cell);
    let roll = (coins as f64 + 0.5) / 10.0;
    move |k: &str| if k == key { roll } else { 0.0 }
}

#[test]
fn get_or_create_returns_the_same_record() {
    let cell = Cell::new(-4, 9);
    let mut registry = CacheRegistry::new();

    let first: *const _ = registry.get_or_create(cell);
    let second: *const _ = registry.get_or_create(cell);
    assert!(std::ptr::eq(first, second), "second lookup produced a new record");
    assert_eq!(registry.len(), 1);

    registry.get_or_create(cell).coins.push(CoinToken::new(0, 0, 0));
    assert_eq!(registry.get_or_create(cell).len(), 1, "mutation lost between lookups");
    assert_eq!(registry.len(), 1);
}

#[test]
fn any_integer_pair_is_a_valid_cell() {
    let mut registry = CacheRegistry::new();
    for cell in [Cell::new(i32::MIN, i32::MAX), Cell::new(-1, -1), Cell::new(0, 0)] {
        assert!(registry.get_or_create(cell).is_empty());
    }
    assert_eq!(registry.len(), 3);
}

#[test]
fn generate_refuses_a_cell_that_already_has_a_record() {
    let cell = Cell::new(2, -3);
    let luck = luck_with_coins(cell, 3);
    let mut registry = CacheRegistry::new();

    registry.generate(cell, &luck).unwrap();
    registry.get_or_create(cell).coins.clear(); // fully collected

    let err = registry.generate(cell, &luck).unwrap_err();
    assert!(matches!(err, GameError::CacheAlreadyGenerated { cell: c } if c == cell));
    assert!(registry.coins(cell).is_empty(), "a refused generate still minted coins");
}

#[test]
fn generate_refuses_an_empty_record_created_by_lookup() {
    let cell = Cell::new(5, 5);
    let mut registry = CacheRegistry::new();
    registry.get_or_create(cell);
    assert!(registry.generate(cell, &luck_with_coins(cell, 4)).is_err());
}

#[test]
fn regrow_mints_serials_past_everything_issued() {
    let cell = Cell::new(1, 1);
    let luck = luck_with_coins(cell, 2);
    let mut registry = CacheRegistry::new();

    registry.generate(cell, &luck).unwrap();
    assert!(registry.regrow(cell, &luck).is_err(), "regrew a cache that still has coins");

    registry.save(cell, Vec::new());
    let regrown: Vec<u32> = registry.regrow(cell, &luck).unwrap().iter().map(|c| c.serial).collect();
    assert_eq!(regrown, [2, 3]);

    registry.save(cell, Vec::new());
    let again: Vec<u32> = registry.regrow(cell, &luck).unwrap().iter().map(|c| c.serial).collect();
    assert_eq!(again, [4, 5]);
}

#[test]
fn regrow_requires_a_generated_cell() {
    let cell = Cell::new(8, 8);
    let mut registry = CacheRegistry::new();
    let err = registry.regrow(cell, &luck_with_coins(cell, 2)).unwrap_err();
    assert!(matches!(err, GameError::CacheNotRegrowable { .. }));
    assert!(!registry.contains(cell), "failed regrow created a record");
}

#[test]
fn per_cell_encoding_round_trips_identity_and_order() {
    let cell = Cell::new(3, -7);
    let coins = vec![
        CoinToken::new(3, -7, 4),
        CoinToken::new(-1, 0, 0), // deposited from elsewhere
        CoinToken::new(3, -7, 1),
    ];
    let mut source = CacheRegistry::new();
    source.save(cell, coins.clone());
    let encoded = source.serialize(cell).unwrap();

    let mut target = CacheRegistry::new();
    target.deserialize(cell, &encoded).unwrap();
    assert_eq!(target.coins(cell), coins.as_slice());
}

#[test]
fn per_cell_encoding_is_a_list_of_token_records() {
    let cell = Cell::new(2, -3);
    let mut registry = CacheRegistry::new();
    registry.save(cell, vec![CoinToken::new(2, -3, 0)]);
    assert_eq!(registry.serialize(cell).unwrap(), r#"[{"i":2,"j":-3,"serial":0}]"#);
    assert_eq!(registry.serialize(Cell::new(9, 9)).unwrap(), "[]");
}

#[test]
fn malformed_cell_data_writes_nothing() {
    let cell = Cell::new(0, 1);
    let mut registry = CacheRegistry::new();
    registry.save(cell, vec![CoinToken::new(0, 1, 0)]);

    assert!(registry.deserialize(cell, "[{\"i\":0").is_err());
    assert!(registry.deserialize(Cell::new(4, 4), "{}").is_err());

    assert_eq!(registry.coins(cell), &[CoinToken::new(0, 1, 0)]);
    assert!(!registry.contains(Cell::new(4, 4)));
}

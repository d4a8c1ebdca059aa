use dawa_cache::Cache;
use dawa_commerce::cart::CART_STORAGE_KEY;
use dawa_commerce::prelude::*;
use std::collections::HashSet;

/// Small deterministic generator so the sequences are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

fn expected_subtotal(cart: &CartStore) -> i64 {
    cart.snapshot()
        .lines
        .iter()
        .map(|l| l.unit_price.amount_cents * l.quantity)
        .sum()
}

#[test]
fn test_random_operations_keep_one_line_per_product() {
    let mut rng = Lcg(0x5eed);
    let mut cart = CartStore::in_memory();
    let ids: Vec<ProductId> = (0..6).map(|i| ProductId::new(format!("p{i}"))).collect();

    for _ in 0..2_000 {
        let id = &ids[rng.below(ids.len() as u64) as usize];
        let price = Money::new(rng.below(100_000) as i64, Currency::KES);
        match rng.below(3) {
            0 => {
                let _ = cart.add_item(id.clone(), "Item", price, 1 + rng.below(5) as i64, None);
            }
            1 => {
                let _ = cart.update_quantity(id, rng.below(8) as i64 - 2);
            }
            _ => {
                cart.remove_item(id);
            }
        }

        let snapshot = cart.snapshot();
        let unique: HashSet<_> = snapshot.lines.iter().map(|l| &l.product_id).collect();
        assert_eq!(unique.len(), snapshot.lines.len());
        assert!(snapshot.lines.iter().all(|l| l.quantity >= 1));
        assert_eq!(snapshot.subtotal.amount_cents, expected_subtotal(&cart));
    }
}

#[test]
fn test_fractional_additions_are_exact() {
    let mut cart = CartStore::in_memory();
    // 0.10 + 0.20 drifts in binary floating point; minor units do not.
    for i in 0..150 {
        let price = if i % 2 == 0 {
            Money::new(10, Currency::KES)
        } else {
            Money::new(20, Currency::KES)
        };
        cart.add_item(ProductId::new(format!("sku-{i}")), "Sample", price, 1, None)
            .unwrap();
    }
    assert_eq!(cart.subtotal(), Money::new(75 * 10 + 75 * 20, Currency::KES));
    assert_eq!(cart.subtotal().display(), "Ksh 22.50");
}

#[test]
fn test_update_to_zero_or_negative_removes() {
    let mut cart = CartStore::in_memory();
    let a = ProductId::new("a");
    let b = ProductId::new("b");
    cart.add_item(a.clone(), "A", Money::kes(10), 3, None).unwrap();
    cart.add_item(b.clone(), "B", Money::kes(10), 3, None).unwrap();

    cart.update_quantity(&a, 0).unwrap();
    cart.update_quantity(&b, -1).unwrap();
    assert!(cart.is_empty());
    assert!(!cart.remove_item(&ProductId::new("never-added")));
}

#[test]
fn test_cart_survives_restart_through_file_backend() {
    let dir = tempfile::tempdir().unwrap();

    {
        let cache = Cache::open_dir(dir.path()).unwrap();
        let mut cart = CartStore::load(cache);
        cart.add_item(ProductId::new("p1"), "Cetirizine 10mg", Money::kes(350), 2, Some("img/cetirizine.png".into()))
            .unwrap();
    }

    let cache = Cache::open_dir(dir.path()).unwrap();
    assert!(cache.exists(CART_STORAGE_KEY).unwrap());
    let cart = CartStore::load(cache);
    let line = cart.get(&ProductId::new("p1")).unwrap();
    assert_eq!(line.quantity, 2);
    assert_eq!(line.image_ref.as_deref(), Some("img/cetirizine.png"));
    assert_eq!(cart.subtotal(), Money::kes(700));
}

#[test]
fn test_cart_persists_again_after_corrupt_store_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("storage.json"), "{not json").unwrap();

    let mut cart = CartStore::load(Cache::open_dir(dir.path()).unwrap());
    assert!(cart.is_empty());
    cart.add_item(ProductId::new("p1"), "ORS sachets", Money::kes(60), 3, None)
        .unwrap();

    let reloaded = CartStore::load(Cache::open_dir(dir.path()).unwrap());
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.subtotal(), Money::kes(180));
}

#[test]
fn test_undecodable_cart_value_is_removed() {
    let cache = Cache::memory();
    cache.set(CART_STORAGE_KEY, &"not a list of lines").unwrap();

    let mut cart = CartStore::load(cache.clone());
    assert!(!cache.exists(CART_STORAGE_KEY).unwrap());
    cart.add_item(ProductId::new("p2"), "Zinc tablets", Money::kes(240), 1, None)
        .unwrap();
    assert_eq!(CartStore::load(cache).len(), 1);
}

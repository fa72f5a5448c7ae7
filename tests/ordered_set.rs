// OrderedSet integration suite.
//
// Contracts exercised here:
// - Set semantics: duplicate inserts are rejected and leave len unchanged.
// - Iteration is always ascending regardless of insertion order, including
//   after arbitrary removals.
// - `first`/`last` track the extremes through inserts and removals.
use spliced::OrderedSet;

fn contents(s: &OrderedSet<i32>) -> Vec<i32> {
    s.iter().copied().collect()
}

#[test]
fn ascending_inserts() {
    let mut s = OrderedSet::new();
    for v in 0..20 {
        assert!(s.insert(v));
        assert_eq!(s.first(), Some(&0));
        assert_eq!(s.last(), Some(&v));
    }
    assert_eq!(contents(&s), (0..20).collect::<Vec<_>>());
}

#[test]
fn descending_inserts() {
    let mut s = OrderedSet::new();
    for v in (0..20).rev() {
        assert!(s.insert(v));
        assert_eq!(s.first(), Some(&v));
        assert_eq!(s.last(), Some(&19));
    }
    assert_eq!(contents(&s), (0..20).collect::<Vec<_>>());
}

#[test]
fn pseudo_random_inserts_and_removals() {
    // Deterministic shuffle of 0..100.
    let mut values: Vec<i32> = Vec::new();
    let mut x: u64 = 12345;
    for _ in 0..200 {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        values.push(((x >> 33) % 100) as i32);
    }

    let mut s = OrderedSet::new();
    let mut model = std::collections::BTreeSet::new();
    for v in &values {
        assert_eq!(s.insert(*v), model.insert(*v));
        assert_eq!(s.len(), model.len());
    }
    assert_eq!(contents(&s), model.iter().copied().collect::<Vec<_>>());

    for v in &values {
        assert_eq!(s.remove(v), model.remove(v));
        assert_eq!(contents(&s), model.iter().copied().collect::<Vec<_>>());
        assert_eq!(s.first(), model.first());
        assert_eq!(s.last(), model.last());
    }
    assert!(s.is_empty());
}

#[test]
fn removing_the_root_repeatedly() {
    // Whatever restructuring removal does, order and membership must hold.
    let mut s: OrderedSet<i32> = [50, 25, 75, 10, 30, 60, 90, 5, 15, 27, 35]
        .into_iter()
        .collect();
    let mut expected: Vec<i32> = contents(&s);
    while let Some(&mid) = expected.get(expected.len() / 2) {
        assert!(s.remove(&mid));
        expected.retain(|v| *v != mid);
        assert_eq!(contents(&s), expected);
        if expected.is_empty() {
            break;
        }
    }
    assert!(s.is_empty());
}

#[test]
fn contains_with_borrowed_key() {
    let s: OrderedSet<String> = ["pear", "apple", "plum"]
        .into_iter()
        .map(String::from)
        .collect();
    assert!(s.contains("apple"));
    assert!(!s.contains("grape"));
    assert_eq!(s.first().map(String::as_str), Some("apple"));
    assert_eq!(s.last().map(String::as_str), Some("plum"));
}

#[test]
fn double_ended_iteration_meets_in_the_middle() {
    let s: OrderedSet<i32> = [3, 1, 4, 1, 5, 9, 2, 6].into_iter().collect();
    let mut it = s.iter();
    assert_eq!(it.next(), Some(&1));
    assert_eq!(it.next_back(), Some(&9));
    assert_eq!(it.next(), Some(&2));
    assert_eq!(it.next_back(), Some(&6));
    assert_eq!(it.next(), Some(&3));
    assert_eq!(it.next_back(), Some(&5));
    assert_eq!(it.next(), Some(&4));
    assert_eq!(it.next(), None);
    assert_eq!(it.next_back(), None);
}

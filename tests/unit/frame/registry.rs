use super::*;
use std::rc::Rc;

#[test]
fn ids_follow_registration_order_and_skip_removed() {
    let mut r = Registry::default();
    let a = r.insert("a");
    let b = r.insert("b");
    let c = r.insert("c");
    assert_eq!(r.remove(b), Some("b"));
    assert_eq!(r.ids(), vec![a, c]);
    assert_eq!(r.len(), 2);
    assert!(!r.contains(b));
}

#[test]
fn removing_a_taken_item_hands_it_back_on_restore() {
    let mut r = Registry::default();
    let a = r.insert(1);
    let item = r.take(a).unwrap();
    assert_eq!(r.take(a), None);
    assert_eq!(r.remove(a), None);
    assert!(!r.contains(a));
    assert_eq!(r.restore(a, item), Some(1));
    assert!(r.ids().is_empty());
}

#[test]
fn clear_keeps_taken_slots_marked_removed() {
    let mut r = Registry::default();
    let a = r.insert(1);
    let b = r.insert(2);
    let taken = r.take(a).unwrap();
    assert_eq!(r.clear(), vec![2]);
    assert_eq!(r.restore(a, taken), Some(1));
    assert!(!r.contains(b));
    assert_eq!(r.len(), 0);
}

#[test]
fn dispatch_skips_listeners_removed_mid_dispatch() {
    let registry: Rc<RefCell<Registry<Listener<u32>>>> = Rc::new(RefCell::new(Registry::default()));
    let seen = Rc::new(RefCell::new(Vec::new()));

    let second = Rc::new(std::cell::Cell::new(0u64));
    {
        let registry2 = Rc::clone(&registry);
        let seen = Rc::clone(&seen);
        let second = Rc::clone(&second);
        registry.borrow_mut().insert(Box::new(move |e: &u32| {
            seen.borrow_mut().push(("first", *e));
            let removed = registry2.borrow_mut().remove(second.get());
            drop(removed);
        }));
    }
    {
        let seen = Rc::clone(&seen);
        let id = registry.borrow_mut().insert(Box::new(move |e: &u32| {
            seen.borrow_mut().push(("second", *e));
        }));
        second.set(id);
    }

    dispatch(&registry, &7, || false);
    assert_eq!(*seen.borrow(), vec![("first", 7)]);
}

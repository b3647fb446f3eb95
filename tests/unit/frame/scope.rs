use super::*;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn disposer_runs_once() {
    let count = Rc::new(RefCell::new(0));
    let c = Rc::clone(&count);
    let mut d = Disposer::new(move || *c.borrow_mut() += 1);
    assert!(d.is_armed());
    d.dispose();
    d.dispose();
    assert_eq!(*count.borrow(), 1);
    assert!(!d.is_armed());
}

#[test]
fn scope_tears_down_newest_first() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut scope = Scope::new();
    for i in 0..3 {
        let o = Rc::clone(&order);
        scope.add(Disposer::new(move || o.borrow_mut().push(i)));
    }
    assert_eq!(scope.len(), 3);
    scope.teardown();
    assert_eq!(*order.borrow(), vec![2, 1, 0]);
    assert!(scope.is_empty());
}

#[test]
fn dropping_does_not_release() {
    let released = Rc::new(RefCell::new(false));
    let r = Rc::clone(&released);
    {
        let mut scope = Scope::new();
        scope.add(Disposer::new(move || *r.borrow_mut() = true));
    }
    assert!(!*released.borrow());
}

#[test]
fn adding_after_teardown_disposes_immediately() {
    let released = Rc::new(RefCell::new(false));
    let r = Rc::clone(&released);
    let mut scope = Scope::new();
    scope.teardown();
    scope.add(Disposer::new(move || *r.borrow_mut() = true));
    assert!(*released.borrow());
    assert!(scope.is_empty());
}

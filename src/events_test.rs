use super::*;
use serde_json::json;

fn changing(key: &str) -> ChangingEvent {
    ChangingEvent {
        key: key.to_owned(),
        old_value: Some(json!(1)),
        new_value: json!(2),
    }
}

#[test]
fn raise_changing_without_subscribers_continues() {
    let notifier = ChangeNotifier::new();
    assert_eq!(notifier.raise_changing(&changing("k")), ChangeDecision::Continue);
}

#[test]
fn any_cancel_wins_and_every_subscriber_runs() {
    let notifier = ChangeNotifier::new();
    let calls = Rc::new(Cell::new(0));

    let c = Rc::clone(&calls);
    notifier.on_changing(move |_| {
        c.set(c.get() + 1);
        ChangeDecision::Cancel
    });
    let c = Rc::clone(&calls);
    notifier.on_changing(move |_| {
        c.set(c.get() + 1);
        ChangeDecision::Continue
    });

    assert_eq!(notifier.raise_changing(&changing("k")), ChangeDecision::Cancel);
    assert_eq!(calls.get(), 2);
}

#[test]
fn changing_subscriber_sees_event_fields() {
    let notifier = ChangeNotifier::new();
    let seen = Rc::new(RefCell::new(None));
    let s = Rc::clone(&seen);
    notifier.on_changing(move |event| {
        *s.borrow_mut() = Some(event.clone());
        ChangeDecision::Continue
    });

    notifier.raise_changing(&changing("prefs"));
    assert_eq!(seen.borrow().as_ref(), Some(&changing("prefs")));
}

#[test]
fn changed_subscribers_run_in_subscription_order() {
    let notifier = ChangeNotifier::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    for n in 0..3 {
        let o = Rc::clone(&order);
        notifier.on_changed(move |_| o.borrow_mut().push(n));
    }

    notifier.raise_changed(&ChangedEvent::from(changing("k")));
    assert_eq!(*order.borrow(), vec![0, 1, 2]);
}

#[test]
fn unsubscribe_removes_handler_once() {
    let notifier = ChangeNotifier::new();
    let calls = Rc::new(Cell::new(0));
    let c = Rc::clone(&calls);
    let id = notifier.on_changed(move |_| c.set(c.get() + 1));

    assert!(notifier.unsubscribe(id));
    assert!(!notifier.unsubscribe(id));
    notifier.raise_changed(&ChangedEvent::from(changing("k")));
    assert_eq!(calls.get(), 0);
    assert_eq!(notifier.subscriber_count(), 0);
}

#[test]
fn subscription_ids_are_unique_across_events() {
    let notifier = ChangeNotifier::new();
    let a = notifier.on_changing(|_| ChangeDecision::Continue);
    let b = notifier.on_changed(|_| {});
    assert_ne!(a, b);
    assert_eq!(notifier.subscriber_count(), 2);
}

#[test]
fn handler_may_subscribe_during_dispatch() {
    let notifier = Rc::new(ChangeNotifier::new());
    let n = Rc::clone(&notifier);
    notifier.on_changed(move |_| {
        n.on_changed(|_| {});
    });

    notifier.raise_changed(&ChangedEvent::from(changing("k")));
    assert_eq!(notifier.subscriber_count(), 2);
}

#[test]
fn changed_event_from_changing_keeps_values() {
    let changed = ChangedEvent::from(changing("k"));
    assert_eq!(changed.key, "k");
    assert_eq!(changed.old_value, Some(json!(1)));
    assert_eq!(changed.new_value, json!(2));
}

// End-to-end scenarios: an application wired the way firmware would wire
// it, driven by explicit timer updates and ticks.

use picoloop::system::{Pools, Queues};
use picoloop::{App, Closure, Relay, Value};

fn count_up(closure: &mut Closure) -> Value {
    let counter = unsafe { closure.context.deref_mut::<u32>() };
    *counter += 1;
    Value::null()
}

fn push_a(closure: &mut Closure) -> Value {
    let order = unsafe { closure.context.deref_mut::<Vec<char>>() };
    order.push('a');
    Value::null()
}

fn push_b(closure: &mut Closure) -> Value {
    let order = unsafe { closure.context.deref_mut::<Vec<char>>() };
    order.push('b');
    Value::null()
}

#[test]
fn delayed_one_shot_fires_once_at_its_due_time() {
    let pools: Pools = Pools::new();
    let queues: Queues = Queues::new();
    let app = App::new(&pools, &queues);
    let events = pools.available_events();
    let nodes = pools.available_nodes();

    let mut fires = 0u32;
    app.run_later(100, Closure::new(count_up, Value::from_mut(&mut fires)))
        .unwrap();

    app.update_timer(50);
    app.tick();
    assert_eq!(fires, 0);

    app.update_timer(100);
    app.tick();
    assert_eq!(fires, 1);

    // nothing left behind
    app.update_timer(200);
    app.tick();
    assert_eq!(fires, 1);
    assert_eq!(pools.available_events(), events);
    assert_eq!(pools.available_nodes(), nodes);
}

#[test]
fn immediate_recurring_timer_catches_up_on_sparse_ticks() {
    let pools: Pools = Pools::new();
    let queues: Queues = Queues::new();
    let app = App::new(&pools, &queues);

    let mut fires = 0u32;
    app.run_at_intervals(300, true, Closure::new(count_up, Value::from_mut(&mut fires)))
        .unwrap();

    app.tick();
    assert_eq!(fires, 1);

    app.update_timer(100);
    app.tick();
    assert_eq!(fires, 1);

    app.update_timer(300);
    app.tick();
    assert_eq!(fires, 2);

    // two periods elapse unobserved; both recurrences land in this tick
    app.update_timer(900);
    app.tick();
    assert_eq!(fires, 4);
}

#[test]
fn deferred_recurring_timer_waits_one_period() {
    let pools: Pools = Pools::new();
    let queues: Queues = Queues::new();
    let app = App::new(&pools, &queues);

    let mut fires = 0u32;
    app.run_at_intervals(500, false, Closure::new(count_up, Value::from_mut(&mut fires)))
        .unwrap();

    app.tick();
    assert_eq!(fires, 0);

    app.update_timer(500);
    app.tick();
    assert_eq!(fires, 1);

    app.update_timer(1500);
    app.tick();
    assert_eq!(fires, 3);
}

#[test]
fn signals_fan_out_in_subscription_order() {
    let pools: Pools = Pools::new();
    let queues: Queues = Queues::new();
    let app = App::new(&pools, &queues);
    let relay: Relay<2> = Relay::new(&pools, &queues);
    let events = pools.available_events();

    let mut order: Vec<char> = Vec::new();
    let mut once = 0u32;
    relay
        .listen(0, Closure::new(push_a, Value::from_mut(&mut order)))
        .unwrap();
    relay
        .listen(0, Closure::new(push_b, Value::from_mut(&mut order)))
        .unwrap();
    relay
        .listen_once(1, Closure::new(count_up, Value::from_mut(&mut once)))
        .unwrap();

    relay.emit(0, Value::null());
    app.tick();
    assert_eq!(order, vec!['a', 'b']);

    relay.emit(1, Value::null());
    app.tick();
    assert_eq!(once, 1);

    // the one-shot listener is gone: no delivery, resources pruned
    relay.emit(1, Value::null());
    app.tick();
    assert_eq!(once, 1);
    assert_eq!(pools.available_events(), events - 2);
}

#[test]
fn unlisten_between_emit_and_run_suppresses_delivery() {
    let pools: Pools = Pools::new();
    let queues: Queues = Queues::new();
    let app = App::new(&pools, &queues);
    let relay: Relay<1> = Relay::new(&pools, &queues);
    let events = pools.available_events();
    let nodes = pools.available_nodes();

    let mut fires = 0u32;
    let listener = relay
        .listen(0, Closure::new(count_up, Value::from_mut(&mut fires)))
        .unwrap();

    relay.emit(0, Value::null());
    relay.unlisten(listener);
    app.tick();
    assert_eq!(fires, 0);

    relay.emit(0, Value::null());
    app.tick();
    assert_eq!(fires, 0);
    assert_eq!(pools.available_events(), events);
    assert_eq!(pools.available_nodes(), nodes);
}

#[test]
fn exhausted_event_pool_recovers_after_a_run() {
    let pools: Pools = Pools::new();
    let queues: Queues = Queues::new();
    let app = App::new(&pools, &queues);

    // hold every event but two
    let mut held = Vec::new();
    while pools.available_events() > 2 {
        held.push(pools.acquire_event().unwrap());
    }

    let mut fires = 0u32;
    let counter = Value::from_mut(&mut fires);
    assert!(app.enqueue_closure(Closure::new(count_up, counter)).is_some());
    assert!(app.enqueue_closure(Closure::new(count_up, counter)).is_some());
    assert!(app.enqueue_closure(Closure::new(count_up, counter)).is_none());

    app.tick();
    assert_eq!(fires, 2);

    // the run recycled both events; posting works again
    assert!(app.enqueue_closure(Closure::new(count_up, counter)).is_some());
    app.tick();
    assert_eq!(fires, 3);

    for handle in held {
        assert!(pools.release_event(handle));
    }
}

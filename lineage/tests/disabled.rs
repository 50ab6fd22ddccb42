//! The process-wide store is never enabled in this test binary.

use lineage::context;
use lineage::task;
use lineage::time::sleep;
use lineage::Error;
use std::time::Duration;

#[lineage::test]
async fn nothing_is_tracked_without_enable() {
    assert!(!context::is_enabled());

    assert_eq!(context::set("k", 1_u8, None), Ok(false));
    assert!(context::get::<u8>("k").is_none());
    assert!(context::current_data().is_none());
    assert!(context::top().is_none());
    assert_eq!(context::size(), 0);
    assert!(context::all_data().is_empty());

    let inner = task::spawn(async {
        sleep(Duration::from_millis(1)).await;
        context::set("k", 2_u8, Some(true))
    });
    assert_eq!(inner.await, Ok(false));
    assert_eq!(context::size(), 0);
}

#[lineage::test]
async fn current_id_degrades_to_the_runtime() {
    let id = context::current_id();
    assert!(id.is_some());
    assert_eq!(id, lineage::execution_id());

    let child = task::spawn(async { context::current_id() });
    let child_id = child.id();
    assert_eq!(child.await, Some(child_id));
}

#[lineage::test]
async fn scope_and_elapsed_need_a_node() {
    assert_eq!(context::scope(), Err(Error::NoActiveContext));
    assert_eq!(context::elapsed(None), None);
    assert!(!context::remove());
    assert!(context::get_from_parent::<u8>("k").is_none());
}

#[test]
fn reserved_keys_are_checked_first() {
    assert_eq!(
        context::set("parent", 1_u8, None),
        Err(Error::InvalidKey("parent".to_owned()))
    );
    assert_eq!(context::current_id(), None);
}

use lineage::context;
use lineage::task;
use lineage::time::sleep;
use lineage::{Error, ExecutionId, yield_now};
use std::time::Duration;

fn text(key: &str) -> Option<String> {
    context::get::<String>(key).map(|value| (*value).clone())
}

#[lineage::test(context)]
async fn chain_inherits_from_the_request_root() {
    context::set("k", "a".to_owned(), Some(false)).unwrap();

    let b = task::spawn(async {
        sleep(Duration::from_millis(5)).await;
        let in_b = text("k");

        let c = task::spawn(async {
            sleep(Duration::from_millis(1)).await;
            text("k")
        });

        (in_b, c.await)
    });

    let (in_b, in_c) = b.await;
    assert_eq!(in_b.as_deref(), Some("a"));
    assert_eq!(in_c.as_deref(), Some("a"));

    context::set("k", "a2".to_owned(), Some(false)).unwrap();
    assert_eq!(text("k").as_deref(), Some("a2"));
}

#[lineage::test(context)]
async fn child_value_shadows_parent_only_for_itself() {
    context::set("k", 1_u32, Some(false)).unwrap();

    let child = task::spawn(async {
        context::set("k", 2_u32, Some(false)).unwrap();
        let own = context::get::<u32>("k").map(|v| *v);
        let parent = context::get_from_parent::<u32>("k").map(|v| *v);
        (own, parent)
    });

    assert_eq!(child.await, (Some(2), Some(1)));
    assert_eq!(context::get::<u32>("k").map(|v| *v), Some(1));
}

#[lineage::test(context)]
async fn linked_top_value_is_shared_by_the_chain() {
    context::scope().unwrap();
    context::set("debug", true, Some(true)).unwrap();

    let descendant = task::spawn(async {
        task::spawn(async {
            sleep(Duration::from_millis(1)).await;
            context::set("level", 2_i32, Some(false)).unwrap();

            let own = context::current_data().and_then(|node| node.get::<i32>("level"));
            (
                own.map(|v| *v),
                context::get::<i32>("level").map(|v| *v),
                context::get::<bool>("debug").map(|v| *v),
            )
        })
        .await
    });

    let (own, level, debug) = descendant.await;
    assert_eq!(own, Some(2));
    assert_eq!(level, Some(2));
    assert_eq!(debug, Some(true));

    let root = context::top().unwrap();
    assert_eq!(root.get::<bool>("debug").map(|v| *v), Some(true));
    assert!(root.get::<i32>("level").is_none());
}

#[lineage::test(context)]
async fn linked_top_from_a_descendant_reaches_the_root() {
    context::scope().unwrap();

    task::spawn(async {
        task::spawn(async {
            context::set("span", "request-span".to_owned(), Some(true)).unwrap();
        })
        .await;
    })
    .await;

    assert_eq!(text("span").as_deref(), Some("request-span"));
}

#[lineage::test(context)]
async fn scope_starts_a_new_logical_root() {
    context::set("outer", 1_u8, Some(false)).unwrap();

    let inner = task::spawn(async {
        context::scope().unwrap();

        let top = context::top().map(|node| node.id());
        (
            top == context::current_id(),
            context::get_from_parent::<u8>("outer").is_none(),
            context::get::<u8>("outer").is_none(),
        )
    });

    assert_eq!(inner.await, (true, true, true));
    assert_eq!(context::get::<u8>("outer").map(|v| *v), Some(1));
}

#[lineage::test(context)]
async fn sibling_requests_do_not_leak_into_each_other() {
    let requests: Vec<_> = (0..4_u32)
        .map(|request| {
            task::spawn(async move {
                context::scope().unwrap();
                context::set("request", request, Some(true)).unwrap();

                let nested = task::spawn(async move {
                    sleep(Duration::from_millis(u64::from(4 - request))).await;
                    yield_now().await;
                    context::get::<u32>("request").map(|v| *v)
                });

                nested.await
            })
        })
        .collect();

    for (request, handle) in (0..4_u32).zip(requests) {
        assert_eq!(handle.await, Some(request));
    }
    assert!(context::get::<u32>("request").is_none());
}

#[lineage::test(context)]
async fn remove_leaves_descendants_readable() {
    context::set("k", 7_u8, Some(false)).unwrap();

    let child = task::spawn(async {
        sleep(Duration::from_millis(2)).await;
        (
            context::get::<u8>("k").map(|v| *v),
            context::top().map(|node| node.id()),
        )
    });
    let root_id = context::current_id();

    assert!(context::remove());
    assert!(context::current_data().is_none());
    assert_eq!(context::set("k", 8_u8, None), Ok(false));

    let (value, top) = child.await;
    assert_eq!(value, Some(7));
    assert_eq!(top, root_id);
}

#[lineage::test(context)]
async fn elapsed_grows_while_the_task_lives() {
    let first = context::elapsed(None).unwrap();
    sleep(Duration::from_millis(5)).await;
    let second = context::elapsed(None).unwrap();

    assert!(second >= first);
    assert!(second >= Duration::from_millis(5));
    assert_eq!(context::elapsed(Some(ExecutionId::next())), None);

    let child = task::spawn(sleep(Duration::from_millis(5)));
    assert!(context::elapsed(Some(child.id())).is_some());

    let id = child.id();
    child.await;
    assert_eq!(context::elapsed(Some(id)), None);
}

#[lineage::test(context)]
async fn current_node_is_in_the_snapshot() {
    let id = context::current_id().unwrap();
    let snapshot = context::all_data();

    assert!(snapshot.contains(id));
    assert!(context::size() >= 1);
    assert_eq!(lineage::execution_id(), Some(id));
}

#[lineage::test(context)]
async fn reserved_keys_are_rejected() {
    for key in ["created", "parent"] {
        assert_eq!(
            context::set(key, 1_u8, None),
            Err(Error::InvalidKey(key.to_owned()))
        );
    }
    assert!(context::current_data().unwrap().keys().is_empty());
}

#[test]
fn scope_outside_any_task_fails() {
    context::enable();

    assert_eq!(context::scope(), Err(Error::NoActiveContext));
    assert!(context::top().is_none());
    assert!(context::get_from_parent::<u8>("k").is_none());
    assert_eq!(context::set("k", 1_u8, None), Ok(false));
}

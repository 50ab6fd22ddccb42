use lineage::context::ContextStore;
use lineage::task::spawn;
use lineage::time::sleep;
use lineage::{Runtime, RuntimeBuilder, yield_now};
use rstest::rstest;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

fn store() -> Arc<ContextStore> {
    let store = Arc::new(ContextStore::new());
    store.enable();
    store
}

fn runtime(store: &Arc<ContextStore>) -> Runtime {
    RuntimeBuilder::new()
        .global_context(false)
        .hooks(store.clone())
        .build()
}

#[test]
fn nodes_follow_task_lifetimes() {
    let store = store();
    let rt = runtime(&store);

    let during = rt.block_on({
        let store = store.clone();
        async move {
            let child = spawn(sleep(Duration::from_millis(5)));
            yield_now().await;
            let during = store.size();
            child.await;
            (during, store.size())
        }
    });

    assert_eq!(during, (2, 1));
    assert_eq!(store.size(), 0);
}

#[test]
fn unfinished_tasks_release_their_nodes_on_shutdown() {
    let store = store();
    let rt = runtime(&store);

    rt.block_on(async {
        spawn(sleep(Duration::from_secs(60)));
        yield_now().await;
    });
    assert_eq!(store.size(), 1);

    drop(rt);
    assert_eq!(store.size(), 0);
}

#[test]
fn disabled_store_ignores_events() {
    let store = Arc::new(ContextStore::new());
    let rt = runtime(&store);

    let (set, current) = rt.block_on({
        let store = store.clone();
        async move { (store.set("k", 1_u8, None), store.current_id()) }
    });

    assert_eq!(set, Ok(false));
    assert!(current.is_some());
    assert_eq!(store.size(), 0);

    store.enable();
    let value = rt.block_on({
        let store = store.clone();
        async move {
            store.set("k", 1_u8, None).unwrap();
            store.get::<u8>("k").map(|v| *v)
        }
    });

    assert_eq!(value, Some(1));
    assert_eq!(store.size(), 0);
}

#[test]
fn disabling_mid_run_keeps_existing_nodes() {
    let store = store();
    let rt = runtime(&store);

    rt.block_on({
        let store = store.clone();
        async move {
            store.disable();
            spawn(async {}).await;
            assert_eq!(store.current_id(), lineage::execution_id());
        }
    });

    // The root was created while enabled and destroyed while disabled.
    assert_eq!(store.size(), 1);
}

#[rstest]
#[case(true, None, Some(1))]
#[case(true, Some(false), None)]
#[case(false, None, None)]
#[case(false, Some(true), Some(1))]
fn linked_top_default_decides_where_values_land(
    #[case] default: bool,
    #[case] explicit: Option<bool>,
    #[case] seen_by_root: Option<u32>,
) {
    let store = store();
    if default {
        store.enable_linked_top();
    }
    let rt = runtime(&store);

    let value = rt.block_on({
        let store = store.clone();
        async move {
            let child = store.clone();
            spawn(async move {
                child.set("k", 1_u32, explicit).unwrap();
            })
            .await;

            store.get::<u32>("k").map(|v| *v)
        }
    });

    assert_eq!(value, seen_by_root);
}

#[test]
fn snapshot_links_children_to_their_trigger() {
    let store = store();
    let rt = runtime(&store);

    let (root, child, json) = rt.block_on({
        let store = store.clone();
        async move {
            let inner = store.clone();
            let handle = spawn(async move {
                inner.set("span", "child".to_owned(), Some(false)).unwrap();
                inner.all_data().to_json().unwrap()
            });
            let child = handle.id();
            let json = handle.await;
            (lineage::execution_id().unwrap(), child, json)
        }
    });

    let json: Value = serde_json::from_str(&json).unwrap();
    let node = &json[child.to_string()];

    assert_eq!(node["parent"], Value::from(root.as_u64()));
    assert_eq!(node["keys"], serde_json::json!(["span"]));
    assert_eq!(json[root.to_string()]["parent"], Value::Null);
}

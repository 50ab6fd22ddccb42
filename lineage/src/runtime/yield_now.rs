use std::future::poll_fn;
use std::task::Poll;

/// Lets every other queued task run once before the caller continues.
///
/// The caller is re-queued behind them, and its next poll is announced to
/// lifecycle hooks like any other. Its execution id, and thus its context,
/// does not change.
pub async fn yield_now() {
    let mut yielded = false;

    poll_fn(|cx| {
        if yielded {
            return Poll::Ready(());
        }

        yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    })
    .await
}

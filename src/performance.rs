use lazy_static::lazy_static;
use pin_project::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use crate::env;

lazy_static! {
    static ref LOG_PERF: bool = env::get_env_bool("LOG_PERF").unwrap_or(false);
}

/// A wrapper around a Future which adds timing data.
#[pin_project]
pub struct Timed<Fut>
where
    Fut: Future,
{
    #[pin]
    inner: Fut,
    operation: String,
    start: Option<Instant>,
}

impl<Fut> Future for Timed<Fut>
where
    Fut: Future,
{
    type Output = Fut::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
        let this = self.project();
        let start = this.start.get_or_insert_with(Instant::now);

        match this.inner.poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(v) => {
                if *LOG_PERF {
                    let elapsed = start.elapsed();
                    tracing::debug!(operation = %this.operation, "took {:.2?}", elapsed);
                }
                Poll::Ready(v)
            }
        }
    }
}

/// Adds `.timed(operation)` to every future, used to time the HTTP round trips of a run by the
/// API call they make.
pub trait TimedExt: Sized + Future {
    fn timed(self, operation: &str) -> Timed<Self> {
        Timed {
            inner: self,
            operation: operation.to_string(),
            start: None,
        }
    }
}

impl<F: Future> TimedExt for F {}

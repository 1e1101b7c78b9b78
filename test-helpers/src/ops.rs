//! Stand-in backend operations for unit tests.
//!
//! [`Script`] hands out operations that stay pending until the test resolves
//! them, so tests decide the order in which responses arrive. [`Recorder`]
//! answers straight away and keeps the arguments it was called with.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Ready, ready};
use parking_lot::Mutex;
use payloads::{ApiResponse, ClientError};
use tokio::sync::oneshot;

pub type Reply<T> = Result<ApiResponse<T>, ClientError>;

struct Call<A, T> {
    args: A,
    reply: Option<oneshot::Sender<Reply<T>>>,
}

pub struct Script<A, T> {
    calls: Arc<Mutex<Vec<Call<A, T>>>>,
}

impl<A, T> Clone for Script<A, T> {
    fn clone(&self) -> Self {
        Self {
            calls: self.calls.clone(),
        }
    }
}

impl<A, T> Default for Script<A, T> {
    fn default() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<A, T> Script<A, T>
where
    A: Send + 'static,
    T: Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// An operation whose n-th invocation resolves when the test calls
    /// `resolve(n, ..)` or `reject(n, ..)`.
    pub fn operation(
        &self,
    ) -> impl Fn(A) -> BoxFuture<'static, Reply<T>> + Send + Sync + 'static
    {
        let calls = self.calls.clone();
        move |args| {
            let (reply, response) = oneshot::channel();
            calls.lock().push(Call {
                args,
                reply: Some(reply),
            });
            async move {
                response.await.unwrap_or_else(|_| {
                    Err(ClientError::Unsuccessful {
                        message: Some("operation dropped".into()),
                    })
                })
            }
            .boxed()
        }
    }

    /// Yield to the runtime until at least `n` calls have been made.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.call_count() < n {
            tokio::task::yield_now().await;
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn resolve(&self, call: usize, data: T) {
        self.reply(call, Ok(ApiResponse::ok(data)));
    }

    pub fn reject(&self, call: usize, error: ClientError) {
        self.reply(call, Err(error));
    }

    fn reply(&self, call: usize, reply: Reply<T>) {
        let sender = self
            .calls
            .lock()
            .get_mut(call)
            .and_then(|call| call.reply.take());
        match sender {
            Some(sender) => {
                // the caller may have given up on the result already
                let _ = sender.send(reply);
            }
            None => panic!("call {call} was never made or already answered"),
        }
    }
}

impl<A: Clone, T> Script<A, T> {
    pub fn args(&self) -> Vec<A> {
        self.calls.lock().iter().map(|call| call.args.clone()).collect()
    }
}

pub struct Recorder<A> {
    calls: Arc<Mutex<Vec<A>>>,
}

impl<A> Clone for Recorder<A> {
    fn clone(&self) -> Self {
        Self {
            calls: self.calls.clone(),
        }
    }
}

impl<A> Default for Recorder<A> {
    fn default() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<A: Send + 'static> Recorder<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// An operation that records its argument and answers with `respond`.
    pub fn operation<T, F>(
        &self,
        respond: F,
    ) -> impl Fn(A) -> Ready<Reply<T>> + Send + Sync + 'static
    where
        T: Send + 'static,
        F: Fn(&A) -> Reply<T> + Send + Sync + 'static,
    {
        let calls = self.calls.clone();
        move |args| {
            let reply = respond(&args);
            calls.lock().push(args);
            ready(reply)
        }
    }

    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<A: Clone> Recorder<A> {
    pub fn calls(&self) -> Vec<A> {
        self.calls.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn script_resolves_out_of_order() {
        let script = Script::new();
        let op = script.operation();

        let first = tokio::spawn(op("first"));
        let second = tokio::spawn(op("second"));
        script.wait_for_calls(2).await;

        script.resolve(1, 2u8);
        script.reject(0, ClientError::Timeout);

        assert_eq!(second.await.unwrap().unwrap().data, Some(2));
        assert!(matches!(first.await.unwrap(), Err(ClientError::Timeout)));
        assert_eq!(script.args(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn recorder_keeps_arguments() {
        let recorder = Recorder::new();
        let op = recorder.operation(|n: &u32| Ok(ApiResponse::ok(n + 1)));

        let reply = op(4).await.unwrap();

        assert_eq!(reply.data, Some(5));
        assert_eq!(recorder.calls(), vec![4]);
        assert_eq!(recorder.count(), 1);
    }
}

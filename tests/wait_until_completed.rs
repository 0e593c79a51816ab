// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Blocking and async observation of command-list completion.

mod common;

use lists_and_barriers::backend::nop::NopBackend;
use lists_and_barriers::lists::{CommandList, ListState, QueueId};
use std::pin::pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

fn executing_list(name: &str) -> Arc<CommandList> {
    let list = CommandList::new(
        name,
        QueueId { family: 0, index: 0 },
        Arc::new(NopBackend::new()),
    );
    list.reset(None);
    list.commit().expect("commit failed");
    list.execute(None);
    list
}

/// Spin-polls a future to completion with a noop waker.  The futures under
/// test resolve from another thread, so polling in a sleep loop suffices.
fn block_on<F: Future>(future: F) -> F::Output {
    let mut future = pin!(future);
    let waker = Waker::noop();
    let mut context = Context::from_waker(waker);
    loop {
        match future.as_mut().poll(&mut context) {
            Poll::Ready(output) => return output,
            Poll::Pending => std::thread::sleep(Duration::from_millis(1)),
        }
    }
}

#[test]
fn wait_returns_immediately_when_not_executing() {
    let list = CommandList::new(
        "idle",
        QueueId { family: 0, index: 0 },
        Arc::new(NopBackend::new()),
    );
    assert!(list.wait_until_completed(None));
    assert!(list.wait_until_completed(Some(Duration::from_millis(1))));

    list.reset(None);
    //Encoding is not Executing either
    assert!(list.wait_until_completed(Some(Duration::from_millis(1))));
}

#[test]
fn wait_blocks_until_complete() {
    let list = executing_list("blocking");
    let completer = list.clone();
    let thread = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        completer.complete();
    });
    assert!(list.wait_until_completed(None));
    assert_eq!(list.state(), ListState::Pending);
    thread.join().expect("completer thread panicked");
}

#[test]
fn wait_times_out_when_nothing_completes() {
    let list = executing_list("stuck");
    assert!(!list.wait_until_completed(Some(Duration::from_millis(30))));
    assert_eq!(list.state(), ListState::Executing);
    //cleanup so the test does not leave an executing list behind
    list.complete();
}

#[test]
fn bounded_wait_succeeds_when_completion_beats_the_timeout() {
    let list = executing_list("bounded");
    let completer = list.clone();
    let thread = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        completer.complete();
    });
    assert!(list.wait_until_completed(Some(Duration::from_secs(5))));
    thread.join().expect("completer thread panicked");
}

#[test]
fn completed_future_resolves_immediately_when_not_executing() {
    let list = CommandList::new(
        "idle_future",
        QueueId { family: 0, index: 0 },
        Arc::new(NopBackend::new()),
    );
    block_on(list.completed());
}

#[test]
fn completed_future_resolves_on_completion() {
    let list = executing_list("async_observer");
    let future = list.completed();
    let completer = list.clone();
    let thread = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        completer.complete();
    });
    block_on(future);
    assert_eq!(list.state(), ListState::Pending);
    thread.join().expect("completer thread panicked");
}

#[test]
fn multiple_futures_all_resolve() {
    let list = executing_list("fanout");
    let first = list.completed();
    let second = list.completed();
    let completer = list.clone();
    let thread = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        completer.complete();
    });
    block_on(first);
    block_on(second);
    thread.join().expect("completer thread panicked");
}

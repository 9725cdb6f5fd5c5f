use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use storyboard::ClientError;
use storyboard::pagination::{LoadState, PageFetcher, PageFuture, PaginationController};
use storyboard::types::{PageRequest, PageResult};

const TOTAL: u32 = 12;

/// Serves `1..=TOTAL`, taking longer for higher page numbers.
fn slow_numbers(calls: Arc<AtomicUsize>) -> PageFetcher<u32> {
    Arc::new(move |req: PageRequest| -> PageFuture<u32> {
        calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(100 * u64::from(req.page))).await;
            let all: Vec<u32> = (1..=TOTAL).collect();
            Ok(PageResult::from_slice(&all, req))
        })
    })
}

#[tokio::test(start_paused = true)]
async fn slow_page_change_is_superseded_by_size_change() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut pager = PaginationController::new(slow_numbers(calls.clone()), PageRequest::new(1, 10));

    pager.set_page(2);
    pager.set_page_size(5);
    assert!(pager.is_loading());
    pager.settle().await;

    assert_eq!(pager.state(), LoadState::Loaded);
    assert_eq!(pager.page(), 1);
    assert_eq!(pager.page_size(), 5);
    assert_eq!(pager.items(), &[1, 2, 3, 4, 5]);
    assert_eq!(pager.pages(), 3);

    // Long after the page-2 fetch would have finished, nothing changes.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(!pager.poll_completions());
    assert_eq!(pager.items(), &[1, 2, 3, 4, 5]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn activate_then_navigate() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut pager = PaginationController::new(slow_numbers(calls), PageRequest::new(1, 5));
    assert_eq!(pager.state(), LoadState::Idle);

    pager.activate();
    pager.settle().await;
    assert_eq!(pager.items(), &[1, 2, 3, 4, 5]);
    assert_eq!(pager.total(), 12);

    pager.set_page(3);
    pager.settle().await;
    assert_eq!(pager.page(), 3);
    assert_eq!(pager.items(), &[11, 12]);

    // Past the end is clamped once the page count is known.
    let ticket = pager.set_page(40);
    assert_eq!(ticket.request.page, 3);
    pager.settle().await;
    assert_eq!(pager.page(), 3);

    pager.refresh();
    pager.settle().await;
    assert_eq!(pager.items(), &[11, 12]);
}

#[tokio::test]
async fn failure_is_surfaced_and_previous_items_kept() {
    let fail = Arc::new(AtomicUsize::new(0));
    let fail_in_fetcher = fail.clone();
    let fetcher: PageFetcher<u32> = Arc::new(move |req: PageRequest| -> PageFuture<u32> {
        let failing = fail_in_fetcher.load(Ordering::SeqCst) > 0;
        Box::pin(async move {
            if failing {
                Err(ClientError::Server {
                    status: 503,
                    message: "maintenance".to_owned(),
                })
            } else {
                Ok(PageResult::from_slice(&[7, 8, 9], req))
            }
        })
    });
    let mut pager = PaginationController::new(fetcher, PageRequest::default());

    pager.activate();
    pager.settle().await;
    assert_eq!(pager.items(), &[7, 8, 9]);
    assert!(pager.error().is_none());

    fail.store(1, Ordering::SeqCst);
    pager.refresh();
    pager.settle().await;
    assert_eq!(pager.state(), LoadState::Failed);
    assert_eq!(pager.items(), &[7, 8, 9]);
    assert_eq!(
        pager.error().map(ToString::to_string).as_deref(),
        Some("server error (503): maintenance")
    );

    fail.store(0, Ordering::SeqCst);
    pager.refresh();
    pager.settle().await;
    assert_eq!(pager.state(), LoadState::Loaded);
    assert!(pager.error().is_none());
}

#[tokio::test]
async fn empty_collection_has_one_page() {
    let fetcher: PageFetcher<u32> = Arc::new(|req: PageRequest| -> PageFuture<u32> {
        Box::pin(async move { Ok(PageResult::from_slice(&[], req)) })
    });
    let mut pager = PaginationController::new(fetcher, PageRequest::default());
    pager.activate();
    pager.settle().await;

    assert_eq!(pager.state(), LoadState::Loaded);
    assert!(pager.items().is_empty());
    assert_eq!(pager.total(), 0);
    assert_eq!(pager.page(), 1);
    assert_eq!(pager.pages(), 1);
}

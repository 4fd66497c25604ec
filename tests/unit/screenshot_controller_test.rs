//! Tests for the ScreenshotController against the in-memory remote data service.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tokio::sync::Notify;

use history_viewer::controllers::screenshot_controller::{
    BulkDelete, Preconfirmed, ScreenshotController,
};
use history_viewer::services::memory_data_service::{
    InMemoryDataService, Operation, RecordedRequest,
};
use history_viewer::services::remote_data_service::RemoteDataService;
use history_viewer::types::errors::ServiceError;
use history_viewer::types::history::HistoryPage;
use history_viewer::types::page::{LoadOutcome, LoadStatus, PageItem, PageQuery};
use history_viewer::types::screenshot::ScreenshotPage;

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
}

fn setup(page_size: u32) -> (Arc<InMemoryDataService>, ScreenshotController) {
    let service = Arc::new(InMemoryDataService::new());
    let controller = ScreenshotController::new(service.clone(), page_size);
    (service, controller)
}

/// Adds `count` screenshots on May 1st, one per hour; returns IDs newest first.
fn seed(service: &InMemoryDataService, count: u32) -> Vec<String> {
    let mut ids: Vec<String> = (0..count)
        .map(|hour| service.add_screenshot(&format!("https://cdn.test/{}.png", hour), at(1, hour)))
        .collect();
    ids.reverse();
    ids
}

// ─── Loading ───

#[tokio::test]
async fn test_mount_requests_first_unfiltered_page() {
    let (service, controller) = setup(1000);
    seed(&service, 2);

    assert_eq!(controller.mount().await.unwrap(), LoadOutcome::Applied);

    assert_eq!(
        service.requests(),
        vec![RecordedRequest::ListScreenshots(PageQuery::new(1, 1000, None))]
    );
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.status, LoadStatus::Ready);
    assert_eq!(snapshot.page.total_count, 2);
    assert_eq!(snapshot.page.items.len(), 2);
}

#[tokio::test]
async fn test_load_failure_enters_error_state() {
    let (service, controller) = setup(1000);
    service.set_failing(Operation::ListScreenshots, true);

    let err = controller.mount().await.unwrap_err();

    assert_eq!(err.user_message(), "Failed to load screenshots.");
    assert_eq!(
        controller.status().error_message(),
        Some("Failed to load screenshots.")
    );
}

#[tokio::test]
async fn test_change_page_ignores_out_of_range() {
    let (service, controller) = setup(2);
    seed(&service, 3);
    controller.mount().await.unwrap();
    service.clear_requests();

    assert_eq!(controller.change_page(3).await.unwrap(), LoadOutcome::OutOfRange);
    assert_eq!(controller.change_page(0).await.unwrap(), LoadOutcome::OutOfRange);
    assert_eq!(service.request_count(Operation::ListScreenshots), 0);

    assert_eq!(controller.next_page().await.unwrap(), LoadOutcome::Applied);
    assert_eq!(controller.current_page(), 2);
    assert_eq!(controller.snapshot().page.items.len(), 1);
}

#[tokio::test]
async fn test_filter_round_trip() {
    let (service, controller) = setup(1);
    seed(&service, 2);
    service.add_screenshot("https://cdn.test/other.png", at(2, 9));
    controller.mount().await.unwrap();
    controller.change_page(2).await.unwrap();
    service.clear_requests();

    controller.set_filter(date(1)).await.unwrap();
    assert_eq!(controller.current_page(), 1);
    assert_eq!(controller.snapshot().page.total_count, 2);

    controller.change_page(2).await.unwrap();
    controller.clear_filter().await.unwrap();

    assert_eq!(
        service.requests(),
        vec![
            RecordedRequest::ListScreenshots(PageQuery::new(1, 1, Some(date(1)))),
            RecordedRequest::ListScreenshots(PageQuery::new(2, 1, Some(date(1)))),
            RecordedRequest::ListScreenshots(PageQuery::new(1, 1, None)),
        ]
    );
    assert_eq!(controller.current_page(), 1);
    assert_eq!(controller.filter_date(), None);
}

#[tokio::test]
async fn test_pagination_window_follows_current_page() {
    let (service, controller) = setup(1);
    seed(&service, 10);
    controller.mount().await.unwrap();

    controller.change_page(5).await.unwrap();

    use PageItem::{Gap, Page};
    assert_eq!(
        controller.pagination_window(),
        vec![Page(1), Gap, Page(3), Page(4), Page(5), Page(6), Page(7), Gap, Page(10)]
    );
}

#[tokio::test]
async fn test_reload_repeats_current_query() {
    let (service, controller) = setup(1);
    seed(&service, 3);
    controller.mount().await.unwrap();
    controller.set_filter(date(1)).await.unwrap();
    controller.change_page(2).await.unwrap();
    service.clear_requests();

    controller.reload().await.unwrap();

    assert_eq!(
        service.requests(),
        vec![RecordedRequest::ListScreenshots(PageQuery::new(2, 1, Some(date(1))))]
    );
    assert!(!controller.is_refreshing());
    assert_eq!(controller.status(), LoadStatus::Ready);
}

// ─── Deletion ───

#[tokio::test]
async fn test_delete_item_removes_from_page() {
    let (service, controller) = setup(1000);
    let ids = seed(&service, 3);
    controller.mount().await.unwrap();

    assert!(controller.delete_item(&ids[1]).await.unwrap());

    let snapshot = controller.snapshot();
    let left: Vec<&str> = snapshot.page.items.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(left, vec![ids[0].as_str(), ids[2].as_str()]);
    assert_eq!(snapshot.page.total_count, 2);
    assert_eq!(snapshot.deleting_id, None);
}

#[tokio::test]
async fn test_failed_delete_item_keeps_page() {
    let (service, controller) = setup(1000);
    let ids = seed(&service, 2);
    controller.mount().await.unwrap();
    let before = controller.snapshot();
    service.set_failing(Operation::DeleteScreenshot, true);

    let err = controller.delete_item(&ids[0]).await.unwrap_err();

    assert_eq!(err.user_message(), "Failed to delete screenshot.");
    assert_eq!(controller.snapshot(), before);
}

#[tokio::test]
async fn test_delete_shown_item_moves_cursor() {
    let (service, controller) = setup(1000);
    let ids = seed(&service, 3);
    controller.mount().await.unwrap();

    assert!(controller.open_fullscreen(2));
    controller.delete_item(&ids[2]).await.unwrap();
    assert_eq!(controller.fullscreen_index(), Some(1));

    controller.delete_item(&ids[0]).await.unwrap();
    assert_eq!(controller.fullscreen_index(), Some(0));
    assert_eq!(controller.fullscreen_entry().map(|e| e.id), Some(ids[1].clone()));

    controller.delete_item(&ids[1]).await.unwrap();
    assert_eq!(controller.fullscreen_index(), None);
}

#[tokio::test]
async fn test_bulk_delete_without_date_does_nothing() {
    let (service, controller) = setup(1000);
    seed(&service, 1);
    controller.mount().await.unwrap();
    service.clear_requests();

    let result = controller
        .delete_all_for_date(None, &Preconfirmed(true))
        .await
        .unwrap();

    assert_eq!(result, BulkDelete::NoDate);
    assert!(service.requests().is_empty());
}

#[tokio::test]
async fn test_declined_bulk_delete_sends_nothing() {
    let (service, controller) = setup(1000);
    seed(&service, 1);
    controller.mount().await.unwrap();
    service.clear_requests();
    let prompts = Mutex::new(Vec::new());
    let decline = |prompt: &str| {
        prompts.lock().unwrap().push(prompt.to_string());
        false
    };

    let result = controller
        .delete_all_for_date(Some(date(1)), &decline)
        .await
        .unwrap();

    assert_eq!(result, BulkDelete::Cancelled);
    assert!(service.requests().is_empty());
    assert_eq!(
        prompts.into_inner().unwrap(),
        vec!["Are you sure you want to delete all images for 2024-05-01?".to_string()]
    );
}

#[tokio::test]
async fn test_confirmed_bulk_delete_resets_view() {
    let (service, controller) = setup(1);
    seed(&service, 2);
    service.add_screenshot("https://cdn.test/keep.png", at(2, 9));
    controller.mount().await.unwrap();
    controller.set_filter(date(1)).await.unwrap();
    controller.change_page(2).await.unwrap();
    service.clear_requests();

    let result = controller
        .delete_all_for_filter(&Preconfirmed(true))
        .await
        .unwrap();

    assert_eq!(result, BulkDelete::Deleted);
    assert_eq!(
        service.requests(),
        vec![
            RecordedRequest::DeleteScreenshotsForDate(date(1)),
            RecordedRequest::ListScreenshots(PageQuery::new(1, 1, None)),
        ]
    );
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.page.current_page, 1);
    assert_eq!(snapshot.page.filter_date, None);
    assert_eq!(snapshot.page.total_count, 1);
    assert!(!snapshot.deleting_all);
}

#[tokio::test]
async fn test_failed_bulk_delete_keeps_filter() {
    let (service, controller) = setup(1000);
    seed(&service, 1);
    controller.mount().await.unwrap();
    controller.set_filter(date(1)).await.unwrap();
    service.set_failing(Operation::DeleteScreenshotsForDate, true);

    let err = controller
        .delete_all_for_filter(&Preconfirmed(true))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Failed to delete images for the selected date.");
    assert_eq!(controller.filter_date(), Some(date(1)));
    assert!(!controller.is_deleting_all());
}

// ─── Full-screen cursor ───

#[tokio::test]
async fn test_fullscreen_navigation_clamps_at_edges() {
    let (service, controller) = setup(1000);
    seed(&service, 3);
    controller.mount().await.unwrap();

    assert!(!controller.open_fullscreen(3));
    assert_eq!(controller.fullscreen_index(), None);
    assert_eq!(controller.next_screenshot(), None);

    assert!(controller.open_fullscreen(0));
    assert_eq!(controller.previous_screenshot(), Some(0));
    assert_eq!(controller.next_screenshot(), Some(1));
    assert_eq!(controller.next_screenshot(), Some(2));
    assert_eq!(controller.next_screenshot(), Some(2));

    controller.close_fullscreen();
    assert_eq!(controller.fullscreen_entry(), None);
}

#[tokio::test]
async fn test_cursor_clamped_when_page_shrinks() {
    let (service, controller) = setup(1000);
    let ids = seed(&service, 3);
    controller.mount().await.unwrap();
    controller.open_fullscreen(2);

    service.delete_screenshot(&ids[0]).await.unwrap();
    service.delete_screenshot(&ids[1]).await.unwrap();
    controller.reload().await.unwrap();

    assert_eq!(controller.fullscreen_index(), Some(0));
}

#[tokio::test]
async fn test_reload_past_shrunk_end_fetches_last_page() {
    let (service, controller) = setup(1);
    let ids = seed(&service, 3);
    controller.mount().await.unwrap();
    controller.change_page(3).await.unwrap();
    service.delete_screenshot(&ids[0]).await.unwrap();
    service.delete_screenshot(&ids[1]).await.unwrap();
    service.clear_requests();

    assert_eq!(controller.reload().await.unwrap(), LoadOutcome::Applied);

    assert_eq!(
        service.requests(),
        vec![
            RecordedRequest::ListScreenshots(PageQuery::new(3, 1, None)),
            RecordedRequest::ListScreenshots(PageQuery::new(1, 1, None)),
        ]
    );
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.page.current_page, 1);
    assert_eq!(snapshot.page.total_pages, 1);
    assert_eq!(snapshot.page.total_count, 1);
    let shown: Vec<&str> = snapshot.page.items.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(shown, vec![ids[2].as_str()]);
}

// ─── Concurrency ───

/// Delegates to an in-memory service but holds back one screenshot query,
/// once, until the gate is opened.
struct GatedService {
    inner: InMemoryDataService,
    held: Mutex<Option<PageQuery>>,
    gate: Notify,
}

impl GatedService {
    fn new() -> Self {
        Self {
            inner: InMemoryDataService::new(),
            held: Mutex::new(None),
            gate: Notify::new(),
        }
    }

    fn hold(&self, query: PageQuery) {
        *self.held.lock().unwrap() = Some(query);
    }
}

#[async_trait]
impl RemoteDataService for GatedService {
    async fn list_history(&self, query: &PageQuery) -> Result<HistoryPage, ServiceError> {
        self.inner.list_history(query).await
    }

    async fn delete_history_entry(&self, id: &str) -> Result<(), ServiceError> {
        self.inner.delete_history_entry(id).await
    }

    async fn delete_history_for_date(&self, date: NaiveDate) -> Result<(), ServiceError> {
        self.inner.delete_history_for_date(date).await
    }

    async fn list_screenshots(&self, query: &PageQuery) -> Result<ScreenshotPage, ServiceError> {
        let held = {
            let mut held = self.held.lock().unwrap();
            if held.as_ref() == Some(query) {
                held.take();
                true
            } else {
                false
            }
        };
        if held {
            self.gate.notified().await;
        }
        self.inner.list_screenshots(query).await
    }

    async fn delete_screenshot(&self, id: &str) -> Result<(), ServiceError> {
        self.inner.delete_screenshot(id).await
    }

    async fn delete_screenshots_for_date(&self, date: NaiveDate) -> Result<(), ServiceError> {
        self.inner.delete_screenshots_for_date(date).await
    }
}

fn gated_setup(page_size: u32) -> (Arc<GatedService>, ScreenshotController) {
    let service = Arc::new(GatedService::new());
    let controller = ScreenshotController::new(service.clone(), page_size);
    (service, controller)
}

#[tokio::test]
async fn test_stale_page_response_is_discarded() {
    let (service, controller) = gated_setup(1);
    seed(&service.inner, 3);
    controller.mount().await.unwrap();
    service.hold(PageQuery::new(2, 1, None));

    let (slow, fast) = tokio::join!(controller.change_page(2), async {
        let outcome = controller.change_page(3).await;
        service.gate.notify_one();
        outcome
    });

    assert_eq!(slow.unwrap(), LoadOutcome::Superseded);
    assert_eq!(fast.unwrap(), LoadOutcome::Applied);
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.page.current_page, 3);
    assert_eq!(snapshot.page.items[0].screenshot, "https://cdn.test/0.png");
}

#[tokio::test]
async fn test_reload_during_filter_change_lands_on_first_page() {
    let (service, controller) = gated_setup(1);
    seed(&service.inner, 3);
    service.inner.add_screenshot("https://cdn.test/a.png", at(2, 8));
    service.inner.add_screenshot("https://cdn.test/b.png", at(2, 9));
    controller.mount().await.unwrap();
    controller.change_page(4).await.unwrap();
    service.inner.clear_requests();
    service.hold(PageQuery::new(1, 1, Some(date(2))));

    let (filtered, reloaded) = tokio::join!(controller.set_filter(date(2)), async {
        let outcome = controller.reload().await;
        service.gate.notify_one();
        outcome
    });

    assert_eq!(filtered.unwrap(), LoadOutcome::Superseded);
    assert_eq!(reloaded.unwrap(), LoadOutcome::Applied);
    assert_eq!(
        service.inner.requests(),
        vec![
            RecordedRequest::ListScreenshots(PageQuery::new(1, 1, Some(date(2)))),
            RecordedRequest::ListScreenshots(PageQuery::new(1, 1, Some(date(2)))),
        ]
    );
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.page.current_page, 1);
    assert_eq!(snapshot.page.filter_date, Some(date(2)));
    assert_eq!(snapshot.page.total_pages, 2);
    assert_eq!(snapshot.page.items.len(), 1);
}

#[tokio::test]
async fn test_reload_keeps_grid_visible() {
    let (service, controller) = gated_setup(1000);
    seed(&service.inner, 2);
    controller.mount().await.unwrap();
    service.hold(PageQuery::new(1, 1000, None));

    let (outcome, during) = tokio::join!(controller.reload(), async {
        let snapshot = controller.snapshot();
        service.gate.notify_one();
        snapshot
    });

    assert!(during.refreshing);
    assert_eq!(during.status, LoadStatus::Ready);
    assert_eq!(during.page.items.len(), 2);
    assert_eq!(outcome.unwrap(), LoadOutcome::Applied);
    assert!(!controller.is_refreshing());
}

#[tokio::test]
async fn test_overlapping_reloads_stay_refreshing_until_both_finish() {
    let (service, controller) = gated_setup(1000);
    seed(&service.inner, 2);
    controller.mount().await.unwrap();
    service.hold(PageQuery::new(1, 1000, None));

    let (first, (second, refreshing_between)) = tokio::join!(controller.reload(), async {
        let outcome = controller.reload().await;
        let refreshing = controller.is_refreshing();
        service.gate.notify_one();
        (outcome, refreshing)
    });

    assert!(refreshing_between);
    assert_eq!(first.unwrap(), LoadOutcome::Superseded);
    assert_eq!(second.unwrap(), LoadOutcome::Applied);
    assert!(!controller.is_refreshing());
}

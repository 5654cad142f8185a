use std::sync::{Arc, Mutex};
use std::time::Duration;

use phimhub::api::{ApiError, Page, PageEnvelope, Person};
use phimhub::search::{BoxFuture, PagedSource, SearchSession};

mod test_helpers {
    use super::*;

    /// In-memory people directory that answers like the server does:
    /// substring match, offset/limit windowing, authoritative total.
    pub struct FakeDirectory {
        people: Vec<Person>,
        pub requests: Mutex<Vec<(String, u64, u64)>>,
    }

    impl FakeDirectory {
        pub fn with_population(count: u64) -> Self {
            let people = (0..count)
                .map(|i| Person {
                    id: i,
                    name: format!("person {:03}", i),
                    photo_url: None,
                    nationality: None,
                    dob: None,
                })
                .collect();
            Self {
                people,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<(String, u64, u64)> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl PagedSource<Person> for FakeDirectory {
        fn fetch_page(
            &self,
            query: String,
            limit: u64,
            offset: u64,
        ) -> BoxFuture<'_, Result<Page<Person>, ApiError>> {
            Box::pin(async move {
                self.requests
                    .lock()
                    .unwrap()
                    .push((query.clone(), limit, offset));

                let matching: Vec<Person> = self
                    .people
                    .iter()
                    .filter(|p| p.name.contains(&query))
                    .cloned()
                    .collect();
                let total = matching.len() as u64;
                let items = matching
                    .into_iter()
                    .skip(offset as usize)
                    .take(limit as usize)
                    .collect();
                Ok(Page { items, total })
            })
        }
    }
}

use test_helpers::FakeDirectory;

#[tokio::test(start_paused = true)]
async fn drains_a_three_page_result_set() {
    let directory = Arc::new(FakeDirectory::with_population(120));
    let mut session: SearchSession<Person> =
        SearchSession::new(directory.clone(), 50, Duration::from_millis(300));

    session.set_query("person");
    session.settle().await;

    assert_eq!(session.items().len(), 50);
    assert_eq!(session.total(), 120);
    assert!(session.has_more());
    assert_eq!(session.current_page(), 1);
    assert_eq!(session.total_pages(), 3);

    while session.load_more() {
        session.settle().await;
    }

    assert_eq!(session.items().len(), 120);
    assert!(!session.has_more());

    // Offsets walked 0, 50, 100 with no repeats or gaps.
    let offsets: Vec<u64> = directory.requests().iter().map(|r| r.2).collect();
    assert_eq!(offsets, vec![0, 50, 100]);

    // All ids unique even though the source re-serves boundary rows.
    let mut ids: Vec<u64> = session.items().iter().map(|p| p.id).collect();
    ids.dedup();
    assert_eq!(ids.len(), 120);
}

#[tokio::test(start_paused = true)]
async fn narrow_result_set_is_terminal_after_one_page() {
    let directory = Arc::new(FakeDirectory::with_population(120));
    let mut session: SearchSession<Person> =
        SearchSession::new(directory.clone(), 50, Duration::from_millis(300));

    // "person 00" matches exactly ten names.
    session.set_query("person 00");
    session.settle().await;

    assert_eq!(session.items().len(), 10);
    assert_eq!(session.total(), 10);
    assert!(!session.has_more());
    assert!(!session.load_more());
    assert_eq!(directory.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn changing_the_query_restarts_pagination_from_zero() {
    let directory = Arc::new(FakeDirectory::with_population(120));
    let mut session: SearchSession<Person> =
        SearchSession::new(directory.clone(), 50, Duration::from_millis(300));

    session.set_query("person");
    session.settle().await;
    assert!(session.load_more());
    session.settle().await;
    assert_eq!(session.items().len(), 100);

    session.set_query("person 01");
    session.settle().await;

    assert_eq!(session.items().len(), 10);
    assert_eq!(session.total(), 10);
    let last = directory.requests().last().cloned().unwrap();
    assert_eq!(last, ("person 01".to_string(), 50, 0));
}

#[test]
fn legacy_envelope_decodes_without_total() {
    let body = r#"{ "data": [
        {"id": 1, "name": "Tran Thanh"},
        {"id": 2, "name": "Ngo Thanh Van"}
    ] }"#;

    let envelope: PageEnvelope<Person> = serde_json::from_str(body).unwrap();
    let page = envelope.into_page();
    assert_eq!(page.total, 2);
    assert_eq!(page.items[1].name, "Ngo Thanh Van");
}

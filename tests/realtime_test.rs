use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use jobwatch::{
    client::{
        ClientConfig, CursorSnapshot, PollOutcome, RealtimeApi, RealtimeOptions, RealtimePoller,
    },
    domain::{FeedStream, NotificationDto},
    event::RealtimeEvent,
    id::NotificationId,
    stores::NotificationInbox,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path, query_param},
};

const SESSION: &str = "connect.sid=s%3Aintegration";

async fn portal() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/realtime/jobs"))
        .and(query_param("since", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobs": [{
                "id": 12,
                "employerId": 3,
                "title": "Electrician",
                "company": "Gulf Builders",
                "location": "Riyadh",
                "minSalary": 2500,
                "maxSalary": 3200,
                "isActive": true,
                "applicationCount": 0
            }],
            "lastId": 12
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/realtime/applications"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/realtime/notifications"))
        .and(query_param("since", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "notifications": [
                {
                    "id": 40,
                    "userId": "8",
                    "message": "Your application was viewed",
                    "type": "application_status",
                    "read": false,
                    "entityId": 77,
                    "createdAt": "2025-02-01T10:00:00Z"
                },
                {
                    "id": 41,
                    "userId": "8",
                    "message": "New reply to your inquiry",
                    "type": "inquiry_reply",
                    "read": false,
                    "createdAt": "2025-02-01T10:05:00Z"
                }
            ],
            "lastId": 41,
            "unreadCount": 2
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/realtime/jobs"))
        .and(query_param("since", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jobs": [], "lastId": 12 })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/realtime/notifications"))
        .and(query_param("since", "41"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "notifications": [], "lastId": 41, "unreadCount": 2 })),
        )
        .mount(&server)
        .await;

    server
}

fn poller_for(server: &MockServer) -> RealtimePoller {
    let config = ClientConfig::new(server.uri()).with_session_cookie(Some(SESSION.into()));
    let api = RealtimeApi::new(config).unwrap();
    RealtimePoller::new(Arc::new(api)).unwrap()
}

#[tokio::test]
async fn job_seeker_session_end_to_end() {
    let server = portal().await;
    Mock::given(method("POST"))
        .and(path("/api/realtime/notifications/read"))
        .and(body_json(json!({ "ids": [40, 41] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let received: Arc<Mutex<Vec<NotificationDto>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let mut poller = poller_for(&server);

    poller.start(
        RealtimeOptions::builder()
            .interval_ms(150)
            .on_new_notifications(Arc::new(move |items: Vec<NotificationDto>| {
                sink.lock().unwrap().extend(items)
            }))
            .build()
            .unwrap(),
    );
    tokio::time::sleep(Duration::from_millis(500)).await;
    poller.stop();

    assert_eq!(
        poller.cursors(),
        CursorSnapshot { jobs: 12, applications: 0, notifications: 41 }
    );
    assert_eq!(poller.unread_count(), Some(2));

    let received = received.lock().unwrap().clone();
    assert_eq!(received.len(), 2);
    assert_eq!(received[1].kind, "inquiry_reply");

    let mut inbox = NotificationInbox::new();
    inbox.apply(&RealtimeEvent::from(received));
    let unread = inbox.unread_ids();
    assert_eq!(unread, vec![NotificationId::new(40), NotificationId::new(41)]);

    assert!(poller.mark_notifications_as_read(&unread).await);
    inbox.apply(&RealtimeEvent::NotificationsRead(unread));
    assert_eq!(inbox.unread_count(), 0);

    // acknowledging does not move the cursors
    assert_eq!(poller.cursors().notifications, 41);
}

#[tokio::test]
async fn session_cookie_is_sent_on_every_feed_request() {
    let server = portal().await;
    let poller = poller_for(&server);

    let report = poller.service().poll_all(&RealtimeOptions::default()).await;

    assert_eq!(report.get(FeedStream::Jobs), PollOutcome::Unclaimed(1));
    assert_eq!(report.get(FeedStream::Applications), PollOutcome::Skipped);
    assert_eq!(report.get(FeedStream::Notifications), PollOutcome::Unclaimed(2));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    for request in requests {
        let cookie = request
            .headers
            .get("cookie")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        assert!(cookie.contains(SESSION), "missing cookie on {}", request.url);
    }
}

#[tokio::test]
async fn stopped_poller_sends_nothing_further() {
    let server = portal().await;
    let mut poller = poller_for(&server);

    poller.start(RealtimeOptions::builder().interval_ms(1000).build().unwrap());
    tokio::time::sleep(Duration::from_millis(300)).await;
    poller.stop();
    drop(poller);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

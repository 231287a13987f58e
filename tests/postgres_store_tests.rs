//! Postgres adapter tests. Run with `--features database-tests` and
//! `DATABASE_URL` pointing at a database the test user may create schemas in.

#![cfg(feature = "database-tests")]

use chrono::Utc;
use sqlx::PgPool;

use outreach_dispatch::database::{
    CampaignStore, ContactStore, DeliveryLogStore, OutreachStore, PgOutreachStore, StoreError,
};
use outreach_dispatch::models::{
    Backlink, CampaignCounter, ContactTransition, DeliveryLogRecord, NewCampaign, NewContact,
};
use outreach_dispatch::state_machine::{CampaignStatus, ContactStatus, StatusGuard};

async fn seeded(pool: PgPool) -> PgOutreachStore {
    let store = PgOutreachStore::new(pool);
    store
        .create_campaign(&NewCampaign::new("c1", "Links", CampaignStatus::Active))
        .await
        .unwrap();
    store
}

#[sqlx::test]
async fn test_pending_contacts_order(pool: PgPool) {
    let store = seeded(pool).await;
    for (id, score) in [("five", Some(5.0)), ("none", None), ("nine", Some(9.0)), ("one", Some(1.0))] {
        store
            .create_contact(&NewContact::new(id, "c1", format!("{id}@example.com")).with_priority(score))
            .await
            .unwrap();
    }

    let ids: Vec<String> = store
        .pending_contacts("c1", 3)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec!["nine", "five", "one"]);
}

#[sqlx::test]
async fn test_mark_queued_is_conditional(pool: PgPool) {
    let store = seeded(pool).await;
    store
        .create_contact(&NewContact::new("a", "c1", "a@example.com"))
        .await
        .unwrap();

    assert!(store.mark_queued("a", "trk-1").await.unwrap());
    assert!(!store.mark_queued("a", "trk-2").await.unwrap());

    let contact = store.find_contact("a").await.unwrap().unwrap();
    assert_eq!(contact.status, ContactStatus::Queued);
    assert_eq!(contact.tracking_id.as_deref(), Some("trk-1"));
}

#[sqlx::test]
async fn test_transition_guarded_and_timestamps_set_once(pool: PgPool) {
    let store = seeded(pool).await;
    store
        .create_contact(&NewContact::new("a", "c1", "a@example.com"))
        .await
        .unwrap();
    store.mark_queued("a", "trk").await.unwrap();

    let opened = ContactTransition::new(
        "a",
        ContactStatus::Opened,
        StatusGuard::allowed_predecessors(ContactStatus::Opened),
        Utc::now(),
    );
    assert!(!store.apply_transition(&opened).await.unwrap());

    let sent = ContactTransition::new(
        "a",
        ContactStatus::Sent,
        StatusGuard::allowed_predecessors(ContactStatus::Sent),
        Utc::now(),
    );
    assert!(store.apply_transition(&sent).await.unwrap());
    assert!(!store.apply_transition(&sent).await.unwrap());
    assert!(store.apply_transition(&opened).await.unwrap());

    let contact = store.find_contact("a").await.unwrap().unwrap();
    assert_eq!(contact.status, ContactStatus::Opened);
    assert!(contact.sent_at.is_some());
    assert!(contact.opened_at.is_some());
}

#[sqlx::test]
async fn test_conversion_persists_backlink(pool: PgPool) {
    let store = seeded(pool).await;
    store
        .create_contact(&NewContact::new("a", "c1", "a@example.com"))
        .await
        .unwrap();

    let convert = ContactTransition::new(
        "a",
        ContactStatus::Converted,
        StatusGuard::allowed_predecessors(ContactStatus::Converted),
        Utc::now(),
    )
    .with_backlink(Backlink {
        url: "https://blog.example/post".to_string(),
        anchor: Some("tools".to_string()),
    });
    assert!(store.apply_transition(&convert).await.unwrap());

    let contact = store.find_contact("a").await.unwrap().unwrap();
    assert_eq!(contact.backlink_url.as_deref(), Some("https://blog.example/post"));
    assert_eq!(contact.backlink_anchor.as_deref(), Some("tools"));
}

fn counted(contact_id: &str, to: ContactStatus, counter: CampaignCounter) -> ContactTransition {
    ContactTransition::new(contact_id, to, StatusGuard::allowed_predecessors(to), Utc::now())
        .with_counter(Some(counter))
}

#[sqlx::test]
async fn test_counted_transitions_and_breakdown(pool: PgPool) {
    let store = seeded(pool).await;
    for id in ["a", "b", "c"] {
        store
            .create_contact(&NewContact::new(id, "c1", format!("{id}@example.com")))
            .await
            .unwrap();
    }
    store.mark_queued("b", "trk-b").await.unwrap();
    store.mark_queued("c", "trk-c").await.unwrap();

    let sent = counted("b", ContactStatus::Sent, CampaignCounter::Sent);
    assert!(store.apply_transition(&sent).await.unwrap());
    assert!(!store.apply_transition(&sent).await.unwrap());
    assert!(store
        .apply_transition(&counted("c", ContactStatus::Sent, CampaignCounter::Sent))
        .await
        .unwrap());

    let campaign = store.find_campaign("c1").await.unwrap().unwrap();
    assert_eq!(campaign.sent_count, 2);

    let breakdown = store.status_breakdown("c1").await.unwrap();
    assert_eq!(breakdown.get(&ContactStatus::Pending), Some(&1));
    assert_eq!(breakdown.get(&ContactStatus::Sent), Some(&2));
}

#[sqlx::test]
async fn test_failed_counter_rolls_back_transition(pool: PgPool) {
    let store = seeded(pool.clone()).await;
    store
        .create_contact(&NewContact::new("a", "c1", "a@example.com"))
        .await
        .unwrap();
    store.mark_queued("a", "trk").await.unwrap();

    sqlx::query("ALTER TABLE outreach_campaigns ADD CONSTRAINT sent_frozen CHECK (sent_count = 0)")
        .execute(&pool)
        .await
        .unwrap();

    let sent = counted("a", ContactStatus::Sent, CampaignCounter::Sent);
    assert!(matches!(
        store.apply_transition(&sent).await,
        Err(StoreError::Database(_))
    ));
    let contact = store.find_contact("a").await.unwrap().unwrap();
    assert_eq!(contact.status, ContactStatus::Queued);
    assert!(contact.sent_at.is_none());

    sqlx::query("ALTER TABLE outreach_campaigns DROP CONSTRAINT sent_frozen")
        .execute(&pool)
        .await
        .unwrap();

    // The replayed event now lands and is counted exactly once
    assert!(store.apply_transition(&sent).await.unwrap());
    let campaign = store.find_campaign("c1").await.unwrap().unwrap();
    assert_eq!(campaign.sent_count, 1);
}

#[sqlx::test]
async fn test_health_check(pool: PgPool) {
    let store = PgOutreachStore::new(pool);
    store.health_check().await.unwrap();
}

#[sqlx::test]
async fn test_delivery_log_append(pool: PgPool) {
    let store = seeded(pool.clone()).await;
    store
        .create_contact(&NewContact::new("a", "c1", "a@example.com"))
        .await
        .unwrap();
    let record = DeliveryLogRecord::new("a", "c1", Some("Hi".into()), None, Utc::now());
    store.append_delivery_log(&record).await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM outreach_delivery_logs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

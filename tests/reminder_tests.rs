mod common;

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

use garage_service::config::environment::EnvironmentConfig;
use garage_service::models::customer::{CreateCustomerRequest, Customer};
use garage_service::models::job_card::{CreateJobCardRequest, JobCard};
use garage_service::repositories::customer_repository::CustomerRepository;
use garage_service::repositories::job_card_repository::JobCardRepository;
use garage_service::repositories::Repositories;
use garage_service::services::reminder_service::{reminder_cutoff, ReminderJob, ReminderRunReport};

use common::{FailingMailer, HangingMailer, RecordingMailer, TestApp};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap()
}

async fn customer(repos: &Repositories, email: Option<&str>) -> Customer {
    let request: CreateCustomerRequest = serde_json::from_value(json!({
        "name": "A. Sharma",
        "mobile": "9876543210",
        "email": email,
        "vehicles": [{ "vehicleNumber": "MH12AB1234", "fuelType": "Diesel", "vehicleType": "Car" }]
    }))
    .unwrap();
    repos.customers.create(&Customer::new(request).unwrap()).await.unwrap()
}

async fn job_card(repos: &Repositories, customer: &Customer, job_in: DateTime<Utc>) -> JobCard {
    let request: CreateJobCardRequest = serde_json::from_value(json!({
        "customerId": customer.id,
        "vehicleNumber": "MH12AB1234",
        "jobInDate": job_in,
        "serviceType": "General Service",
        "status": "Delivered",
    }))
    .unwrap();
    repos.job_cards.create(&JobCard::new(request).unwrap()).await.unwrap()
}

fn recording_job(repos: &Repositories, mailer: Arc<RecordingMailer>) -> ReminderJob {
    ReminderJob::new(repos, mailer, &EnvironmentConfig::for_tests())
}

#[tokio::test]
async fn test_old_job_card_gets_one_reminder() {
    let repos = Repositories::in_memory();
    let mailer = Arc::new(RecordingMailer::default());
    let customer = customer(&repos, Some("sharma@example.com")).await;
    let card = job_card(&repos, &customer, now() - Duration::days(100)).await;

    let job = recording_job(&repos, mailer.clone());
    let report = job.run(now()).await.unwrap();
    assert_eq!(
        report,
        ReminderRunReport {
            candidates: 1,
            sent: 1,
            skipped: 0,
            failed: 0
        }
    );

    {
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "sharma@example.com");
        assert!(sent[0].subject.contains("MH12AB1234"));
        assert!(sent[0].html.contains("A. Sharma"));
    }

    let stored = repos.job_cards.find_by_id(card.id).await.unwrap().unwrap();
    assert!(stored.reminder_sent);

    let again = job.run(now()).await.unwrap();
    assert_eq!(again.candidates, 0);
    assert_eq!(mailer.count(), 1);
}

#[tokio::test]
async fn test_cutoff_boundary_is_inclusive() {
    let repos = Repositories::in_memory();
    let mailer = Arc::new(RecordingMailer::default());
    let customer = customer(&repos, Some("sharma@example.com")).await;

    let cutoff = reminder_cutoff(now());
    let too_recent = job_card(&repos, &customer, cutoff + Duration::days(1)).await;
    let exactly_due = job_card(&repos, &customer, cutoff).await;

    let report = recording_job(&repos, mailer.clone()).run(now()).await.unwrap();
    assert_eq!(report.candidates, 1);
    assert_eq!(report.sent, 1);

    let recent = repos.job_cards.find_by_id(too_recent.id).await.unwrap().unwrap();
    let due = repos.job_cards.find_by_id(exactly_due.id).await.unwrap().unwrap();
    assert!(!recent.reminder_sent);
    assert!(due.reminder_sent);
}

#[tokio::test]
async fn test_failed_send_leaves_card_pending() {
    let repos = Repositories::in_memory();
    let customer = customer(&repos, Some("sharma@example.com")).await;
    let first = job_card(&repos, &customer, now() - Duration::days(120)).await;
    let second = job_card(&repos, &customer, now() - Duration::days(200)).await;

    let job = ReminderJob::new(&repos, Arc::new(FailingMailer), &EnvironmentConfig::for_tests());
    let report = job.run(now()).await.unwrap();
    assert_eq!(report.candidates, 2);
    assert_eq!(report.failed, 2);
    assert_eq!(report.sent, 0);

    for id in [first.id, second.id] {
        let stored = repos.job_cards.find_by_id(id).await.unwrap().unwrap();
        assert!(!stored.reminder_sent);
    }

    // siguiente pasada con un correo que funciona
    let mailer = Arc::new(RecordingMailer::default());
    let report = recording_job(&repos, mailer.clone()).run(now()).await.unwrap();
    assert_eq!(report.sent, 2);
    assert_eq!(mailer.count(), 2);
}

#[tokio::test]
async fn test_send_timeout_fails_one_and_continues() {
    let repos = Repositories::in_memory();
    let stalled = customer(&repos, Some("stalled@example.com")).await;
    let reachable = customer(&repos, Some("sharma@example.com")).await;
    let hanging = job_card(&repos, &stalled, now() - Duration::days(110)).await;
    let delivered = job_card(&repos, &reachable, now() - Duration::days(100)).await;

    let mailer = Arc::new(HangingMailer::new("stalled@example.com"));
    let job = ReminderJob::new(&repos, mailer.clone(), &EnvironmentConfig::for_tests());
    let report = job.run(now()).await.unwrap();

    assert_eq!(report.candidates, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.sent, 1);
    assert_eq!(mailer.delivered.count(), 1);

    let stored = repos.job_cards.find_by_id(hanging.id).await.unwrap().unwrap();
    assert!(!stored.reminder_sent);
    let stored = repos.job_cards.find_by_id(delivered.id).await.unwrap().unwrap();
    assert!(stored.reminder_sent);
}

#[tokio::test]
async fn test_customer_without_email_is_skipped() {
    let repos = Repositories::in_memory();
    let mailer = Arc::new(RecordingMailer::default());
    let silent = customer(&repos, None).await;
    let reachable = customer(&repos, Some("sharma@example.com")).await;
    let skipped = job_card(&repos, &silent, now() - Duration::days(150)).await;
    job_card(&repos, &reachable, now() - Duration::days(150)).await;

    let report = recording_job(&repos, mailer.clone()).run(now()).await.unwrap();
    assert_eq!(report.candidates, 2);
    assert_eq!(report.sent, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(mailer.count(), 1);

    let stored = repos.job_cards.find_by_id(skipped.id).await.unwrap().unwrap();
    assert!(!stored.reminder_sent);
}

#[tokio::test]
async fn test_manual_trigger_requires_admin() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let office = app.user_token(&admin, "office@garage.test", "user").await;

    let customer = customer(app.repos(), Some("sharma@example.com")).await;
    job_card(app.repos(), &customer, Utc::now() - Duration::days(100)).await;

    let (status, _) = app.post("/api/reminders/run", &office, json!({})).await;
    assert_eq!(status, axum::http::StatusCode::FORBIDDEN);
    assert_eq!(app.mailer.count(), 0);

    let (status, body) = app.post("/api/reminders/run", &admin, json!({})).await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(body["data"]["sent"], 1);
    assert_eq!(app.mailer.count(), 1);
}

mod common;

use garage_service::client::{ClientError, GarageClient};
use garage_service::models::user::Role;
use garage_service::services::access_policy::{Action, Feature};

use common::{TestApp, ADMIN_EMAIL, PASSWORD};

async fn serve(app: &TestApp) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_session_lifecycle() {
    let app = TestApp::new();
    app.admin_token().await;
    let base_url = serve(&app).await;

    let mut client = GarageClient::new(&base_url).unwrap();
    assert!(matches!(client.me().await, Err(ClientError::NotLoggedIn)));

    let session = client.login(ADMIN_EMAIL, PASSWORD).await.unwrap();
    assert_eq!(session.user.role, Role::Admin);
    assert!(session.can(Feature::Users, Action::Delete));

    let me = client.me().await.unwrap();
    assert_eq!(me.email, ADMIN_EMAIL);

    let access = client.access().await.unwrap();
    assert_eq!(access.role, Role::Admin);
    assert!(client.list_customers().await.unwrap().is_empty());

    let summary = client.dashboard_summary().await.unwrap();
    assert_eq!(summary.customer_count, 0);

    let report = client.run_reminders().await.unwrap();
    assert_eq!(report.sent, 0);

    client.logout();
    assert!(client.session().is_none());
    assert!(matches!(client.access().await, Err(ClientError::NotLoggedIn)));
}

#[tokio::test]
async fn test_bad_credentials_keep_client_logged_out() {
    let app = TestApp::new();
    app.admin_token().await;
    let base_url = serve(&app).await;

    let mut client = GarageClient::new(&base_url).unwrap();
    match client.login(ADMIN_EMAIL, "wrong-password").await {
        Err(ClientError::Api { status, code, .. }) => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(code.as_deref(), Some("UNAUTHORIZED"));
        }
        other => panic!("unexpected result: {:?}", other.map(|s| s.user.email.clone())),
    }
    assert!(!client.is_logged_in());
}

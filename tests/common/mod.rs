// Shared by every integration test binary; not all of them use every helper.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    routing::get,
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tanepro_api::{
    config::AppConfig,
    db,
    entities::{customer, identity, product, profile, profile::ProfileRole, supplier},
    events::{self, EventSender},
    handlers::AppServices,
    services::{
        cart::SessionCarts,
        catalog::CreateProductInput,
        identity::{IdentityStore, SqlIdentityStore},
    },
    AppState,
};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Test harness running the full router against a throwaway SQLite file.
///
/// Every instance gets its own temp directory, so tests are free to run in
/// parallel without sharing database state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _db_dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// App with the emulated profile trigger firing shortly after sign-up.
    pub async fn new() -> Self {
        Self::with_trigger_delay(Some(Duration::from_millis(25))).await
    }

    /// App with a custom trigger delay; `None` disables the trigger so the
    /// reconciliation fallback path is the one that runs.
    pub async fn with_trigger_delay(trigger_delay: Option<Duration>) -> Self {
        let db_dir = tempfile::tempdir().expect("create temp dir for test database");
        let db_path = db_dir.path().join("tanepro_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        // Keep reconciliation fast so fallback-path tests stay quick.
        cfg.reconcile_wait_ms = 500;
        cfg.reconcile_poll_ms = 10;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let identity_store: Arc<dyn IdentityStore> =
            Arc::new(SqlIdentityStore::new(db_arc.clone(), trigger_delay));

        let services = AppServices::new(
            db_arc.clone(),
            event_sender.clone(),
            identity_store,
            cfg.reconcile_wait(),
            cfg.reconcile_poll_interval(),
        );

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
            carts: SessionCarts::new(),
        };

        let router = Router::new()
            .route("/", get(|| async { "tanepro-api up" }))
            .route("/health", get(tanepro_api::health_check))
            .nest("/api/v1", tanepro_api::api_v1_routes())
            .nest("/auth", tanepro_api::handlers::auth::auth_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _db_dir: db_dir,
            _event_task: event_task,
        }
    }

    /// Send a request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Seed an identity plus its profile, bypassing provisioning.
    pub async fn seed_profile(&self, role: ProfileRole, name: &str) -> Uuid {
        let db = &*self.state.db;
        let id = Uuid::new_v4();
        let email = format!("{}@seed.example", id.simple());
        let now = Utc::now();

        identity::ActiveModel {
            id: Set(id),
            email: Set(email.clone()),
            password_hash: Set("seeded-placeholder".to_string()),
            metadata: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .expect("seed identity");

        profile::ActiveModel {
            id: Set(id),
            email: Set(email),
            name: Set(name.to_string()),
            role: Set(role),
            company: Set(Some(name.to_string())),
            phone: Set(None),
            address: Set(None),
            city: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .expect("seed profile");

        id
    }

    /// Seed a supplier (identity, profile and role record). Returns its id.
    pub async fn seed_supplier(&self, company: &str) -> Uuid {
        let id = self.seed_profile(ProfileRole::Supplier, company).await;
        let now = Utc::now();

        supplier::ActiveModel {
            id: Set(id),
            company_name: Set(company.to_string()),
            tax_number: Set(None),
            commission_rate: Set(Decimal::ZERO),
            min_order_amount: Set(Decimal::ZERO),
            delivery_days: Set(3),
            is_verified: Set(false),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed supplier");

        id
    }

    /// Seed a customer (identity, profile and role record). Returns its id.
    pub async fn seed_customer(&self, company: &str) -> Uuid {
        let id = self.seed_profile(ProfileRole::Customer, company).await;
        let now = Utc::now();

        customer::ActiveModel {
            id: Set(id),
            company_name: Set(company.to_string()),
            tax_number: Set(None),
            credit_limit: Set(Decimal::ZERO),
            payment_terms: Set(30),
            discount_rate: Set(Decimal::ZERO),
            delivery_address: Set(None),
            billing_address: Set(None),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed customer");

        id
    }

    /// Seed an active product for a supplier through the catalog service.
    pub async fn seed_product(
        &self,
        supplier_id: Uuid,
        name: &str,
        sale_price: Decimal,
    ) -> product::Model {
        self.state
            .services
            .catalog
            .create_product(CreateProductInput {
                supplier_id,
                category_id: None,
                brand_id: None,
                name: name.to_string(),
                description: None,
                shelf_price: sale_price,
                sale_price,
                stock_quantity: 100,
                min_order_quantity: None,
                max_order_quantity: None,
                status: None,
            })
            .await
            .expect("seed product for tests")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Deserialize a response body as JSON.
pub async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

/// Parse a decimal that may arrive as a JSON string or number.
pub fn decimal_field(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("expected a decimal value, got {other:?}"),
    }
}

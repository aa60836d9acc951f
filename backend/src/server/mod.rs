//! Server construction and background task wiring.

mod config;

pub use config::ShelfSettings;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use backend::domain::{ExpirationSweeper, IntakeWorkerPool, OrderService, PlacementService};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::{HttpState, KitchenOrderService, orders};
use backend::outbound::persistence::{InMemoryOrderRepository, InMemoryShelfOrderStore};
use backend::outbound::queue::InMemoryIntakeQueue;

type KitchenIntakePool =
    IntakeWorkerPool<InMemoryIntakeQueue, InMemoryOrderRepository, InMemoryShelfOrderStore>;

/// Fully wired order-lifecycle engine: the facade handlers call into plus the
/// background tasks that keep shelves moving.
pub struct Engine {
    pub orders: Arc<KitchenOrderService>,
    pub clock: Arc<dyn Clock>,
    store: Arc<InMemoryShelfOrderStore>,
    intake: KitchenIntakePool,
    sweep_interval: std::time::Duration,
}

impl Engine {
    /// Wire adapters and services from the loaded settings.
    pub fn new(settings: &ShelfSettings) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let store = Arc::new(InMemoryShelfOrderStore::new(Arc::clone(&clock)));
        let repository = Arc::new(InMemoryOrderRepository::new());
        let queue = Arc::new(InMemoryIntakeQueue::new());
        let placement = Arc::new(PlacementService::new(
            Arc::clone(&store),
            settings.capacities(),
            Arc::clone(&clock),
        ));
        let intake = IntakeWorkerPool::new(
            Arc::clone(&queue),
            Arc::clone(&repository),
            Arc::clone(&placement),
            settings.intake_config(),
        );
        let orders = Arc::new(OrderService::new(
            repository,
            Arc::clone(&store),
            queue,
            placement,
            Arc::clone(&clock),
        ));
        Self {
            orders,
            clock,
            store,
            intake,
            sweep_interval: settings.sweep_interval(),
        }
    }

    /// Spawn the intake workers and the expiration sweeper.
    ///
    /// All tasks observe the shutdown channel and exit once it flips to
    /// `true`, letting in-flight claims finish first.
    pub fn spawn_background(&self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        let mut handles = self.intake.spawn(shutdown.clone());
        let sweeper = ExpirationSweeper::new(Arc::clone(&self.store), Arc::clone(&self.clock));
        let interval = self.sweep_interval;
        handles.push(tokio::spawn(sweeper.run(interval, shutdown)));
        handles
    }
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .configure(orders::configure)
        .service(ready)
        .service(live)
}

/// Construct an Actix HTTP server over the engine's facade.
///
/// Marks the health state ready once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    engine: &Engine,
    bind_addr: std::net::SocketAddr,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(HttpState::new(
        Arc::clone(&engine.orders),
        Arc::clone(&engine.clock),
    ));
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

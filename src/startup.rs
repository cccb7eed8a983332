//! Application Startup
//!
//! Pool creation, service wiring, and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::application::services::{
    AccessServiceImpl, ChannelServiceImpl, InviteServiceImpl, MemberServiceImpl,
    MessageServiceImpl, ServerServiceImpl,
};
use crate::config::Settings;
use crate::infrastructure::database;
use crate::infrastructure::repositories::{
    PgCampaignRepository, PgChannelRepository, PgInviteRepository, PgMemberRepository,
    PgMessageRepository, PgProfileRepository, PgServerRepository,
};
use crate::presentation::http::routes;
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::ChatGateway;
use crate::shared::snowflake::SnowflakeGenerator;

/// Services wired to the PostgreSQL repositories.
pub type AppAccessService = AccessServiceImpl<
    PgServerRepository,
    PgMemberRepository,
    PgChannelRepository,
    PgCampaignRepository,
>;
pub type AppServerService = ServerServiceImpl<PgServerRepository, PgCampaignRepository>;
pub type AppMemberService = MemberServiceImpl<
    PgChannelRepository,
    PgServerRepository,
    PgMemberRepository,
    PgCampaignRepository,
    PgProfileRepository,
>;
pub type AppInviteService = InviteServiceImpl<
    PgInviteRepository,
    PgServerRepository,
    PgMemberRepository,
    PgCampaignRepository,
    PgProfileRepository,
>;
pub type AppChannelService = ChannelServiceImpl<
    PgChannelRepository,
    PgServerRepository,
    PgMemberRepository,
    PgCampaignRepository,
    AppMemberService,
>;
pub type AppMessageService = MessageServiceImpl<PgMessageRepository, PgProfileRepository>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub snowflake: Arc<SnowflakeGenerator>,
    pub gateway: Arc<ChatGateway>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Authorization decisions shared by HTTP handlers and the gateway.
    pub fn access_service(&self) -> AppAccessService {
        AccessServiceImpl::new(
            Arc::new(PgServerRepository::new(self.db.clone())),
            Arc::new(PgMemberRepository::new(self.db.clone())),
            Arc::new(PgChannelRepository::new(self.db.clone())),
            Arc::new(PgCampaignRepository::new(self.db.clone())),
        )
    }

    pub fn server_service(&self) -> AppServerService {
        ServerServiceImpl::new(
            Arc::new(PgServerRepository::new(self.db.clone())),
            Arc::new(PgCampaignRepository::new(self.db.clone())),
            self.snowflake.clone(),
        )
    }

    pub fn member_service(&self) -> AppMemberService {
        MemberServiceImpl::new(
            Arc::new(PgChannelRepository::new(self.db.clone())),
            Arc::new(PgServerRepository::new(self.db.clone())),
            Arc::new(PgMemberRepository::new(self.db.clone())),
            Arc::new(PgCampaignRepository::new(self.db.clone())),
            Arc::new(PgProfileRepository::new(self.db.clone())),
        )
    }

    pub fn invite_service(&self) -> AppInviteService {
        InviteServiceImpl::new(
            Arc::new(PgInviteRepository::new(self.db.clone())),
            Arc::new(PgServerRepository::new(self.db.clone())),
            Arc::new(PgMemberRepository::new(self.db.clone())),
            Arc::new(PgCampaignRepository::new(self.db.clone())),
            Arc::new(PgProfileRepository::new(self.db.clone())),
            self.snowflake.clone(),
        )
    }

    pub fn channel_service(&self) -> AppChannelService {
        ChannelServiceImpl::new(
            Arc::new(PgChannelRepository::new(self.db.clone())),
            Arc::new(PgServerRepository::new(self.db.clone())),
            Arc::new(PgMemberRepository::new(self.db.clone())),
            Arc::new(PgCampaignRepository::new(self.db.clone())),
            Arc::new(self.member_service()),
            self.snowflake.clone(),
        )
    }

    pub fn message_service(&self) -> AppMessageService {
        MessageServiceImpl::new(
            Arc::new(PgMessageRepository::new(self.db.clone())),
            Arc::new(PgProfileRepository::new(self.db.clone())),
        )
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        database::run_migrations(&db).await?;
        tracing::info!("Migrations up to date");

        let snowflake = Arc::new(SnowflakeGenerator::new(
            settings.snowflake.machine_id as u64,
            0,
        ));
        let gateway = Arc::new(ChatGateway::new());

        crate::presentation::http::handlers::health::init_server_start();

        let state = AppState {
            db,
            snowflake,
            gateway,
            settings: Arc::new(settings.clone()),
        };

        let router = routes::create_router(state)
            .layer(logging::create_trace_layer())
            .layer(cors::create_cors_layer(&settings.cors));

        let addr: SocketAddr = settings.server_addr().parse()?;
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

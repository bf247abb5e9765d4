//! Builders for the HTTP state from configured ports.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use staff_directory::domain::RandomInviteCodeGenerator;
use staff_directory::domain::ports::{
    EnrollmentRepository, InviteCodeRepository, UserRepository,
};
use staff_directory::inbound::http::state::{HttpState, HttpStatePorts};
use staff_directory::outbound::memory::InMemoryDirectory;
use staff_directory::outbound::persistence::{
    DbPool, DieselEnrollmentRepository, DieselInviteCodeRepository, DieselUserRepository,
};
use staff_directory::outbound::security::{Argon2PasswordHasher, JwtSessionIssuer};

use super::ServerConfig;

/// Storage ports shared by the services.
struct StoragePorts {
    users: Arc<dyn UserRepository>,
    invite_codes: Arc<dyn InviteCodeRepository>,
    enrollment: Arc<dyn EnrollmentRepository>,
}

fn storage_ports(pool: Option<&DbPool>) -> StoragePorts {
    match pool {
        Some(pool) => {
            info!(store = "postgres", "directory storage selected");
            StoragePorts {
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                invite_codes: Arc::new(DieselInviteCodeRepository::new(pool.clone())),
                enrollment: Arc::new(DieselEnrollmentRepository::new(pool.clone())),
            }
        }
        None => {
            info!(store = "memory", "directory storage selected");
            let store = Arc::new(InMemoryDirectory::default());
            StoragePorts {
                users: store.clone(),
                invite_codes: store.clone(),
                enrollment: store,
            }
        }
    }
}

/// Build the shared HTTP state for every worker.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let StoragePorts {
        users,
        invite_codes,
        enrollment,
    } = storage_ports(config.db_pool.as_ref());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let sessions = Arc::new(JwtSessionIssuer::new(
        &config.session.secret,
        config.session.ttl,
        clock.clone(),
    ));

    web::Data::new(HttpState::new(HttpStatePorts {
        users,
        invite_codes,
        enrollment,
        hasher: Arc::new(Argon2PasswordHasher::default()),
        sessions,
        code_generator: Arc::new(RandomInviteCodeGenerator),
        clock,
    }))
}

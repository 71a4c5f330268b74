//! Minimal trellis example — a paginated collection and a single resource.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:8080/
//!   curl 'http://localhost:8080/users?per_page=5&page=2'
//!   curl 'http://localhost:8080/users?limit=7'          # 400, not a multiple of 5
//!   curl -X POST http://localhost:8080/users \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"alice"}'
//!   curl -i -X OPTIONS http://localhost:8080/users     # Allow header
//!   curl -i -X DELETE http://localhost:8080/users      # 405
//!   curl http://localhost:8080/users/7
//!   curl http://localhost:8080/nope                    # 404

use serde::{Deserialize, Serialize};
use trellis::pagination::{self, Paginated};
use trellis::{
    BuildInfo, IntoResponse, Message, Method, Request, Response, RouteController, Server, Service,
    ServiceConfig, Status,
};

const TOTAL_USERS: i64 = 42;

#[derive(Serialize)]
struct User {
    id: i64,
    name: String,
}

#[derive(Deserialize)]
struct CreateUser {
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), trellis::Error> {
    let config = ServiceConfig {
        build: BuildInfo::new(
            option_env!("BUILD_TAG").unwrap_or(trellis::DEFAULT_BUILD_TAG),
            option_env!("BUILD_DATE").unwrap_or(trellis::DEFAULT_BUILD_DATE),
        ),
        ..ServiceConfig::from_env()
    };
    trellis::logging::init(&config);

    let users = RouteController::new("/users")
        .on(Method::Get, list_users)?
        .on(Method::Post, create_user)?;
    let user = RouteController::new("/users/{id}").on(Method::Get, get_user)?;

    let addr = config.listen_addr.clone();
    let table = Service::new(config)
        .controller(users)
        .controller(user)
        .build_dispatch_table()?;

    Server::bind(&addr)?.serve(table).await
}

// GET /users
async fn list_users(req: Request) -> Response {
    let window = match pagination::limit_and_offset(&req.query_params()) {
        Ok(w) => w,
        Err(e) => return e.into_response(),
    };

    let end = window.offset.saturating_add(window.limit).min(TOTAL_USERS);
    let items: Vec<User> = (window.offset..end)
        .map(|id| User { id, name: format!("user-{id}") })
        .collect();

    Paginated::new(items, "user", TOTAL_USERS, window.limit, window.offset).into_response()
}

// POST /users
async fn create_user(req: Request) -> Response {
    match req.decode_json::<CreateUser>() {
        Ok(input) => Response::json_value(
            Status::Created,
            &Message::new(format!("created {}", input.name)),
        ),
        Err(e) => Response::error(Status::BadRequest, e.to_string()),
    }
}

// GET /users/{id}
async fn get_user(req: Request) -> Response {
    let id = req.param("id").and_then(|v| v.parse::<i64>().ok());
    match id {
        Some(id) if (0..TOTAL_USERS).contains(&id) => {
            Response::json_value(Status::Ok, &User { id, name: format!("user-{id}") })
        }
        _ => Response::error(Status::NotFound, format!("{} not found", req.path())),
    }
}

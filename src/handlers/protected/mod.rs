// handlers/protected/mod.rs - handlers behind jwt_auth_middleware
//
// Every handler here takes an AuthUser; the middleware has already rejected
// requests without a valid bearer token.
pub mod todo_items;

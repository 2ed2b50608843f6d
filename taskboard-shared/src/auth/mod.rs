/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`token`]: opaque bearer token generation and validation
/// - [`middleware`]: Axum middleware performing the per-request token lookup
/// - [`policy`]: the pure owner/member authorization policy
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Tokens**: secure random generation with SHA-256 hashing at rest
/// - **Constant-time Comparison**: all verification uses constant-time operations
pub mod middleware;
pub mod password;
pub mod policy;
pub mod token;

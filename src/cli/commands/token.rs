use serde_json::json;

use crate::auth::JwtSettings;
use crate::cli::{utils::output_success, OutputFormat};
use crate::config::AppConfig;

pub fn handle(
    username: &str,
    hours: Option<u64>,
    config: &AppConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let security = &config.security;
    let jwt = JwtSettings::new(
        security.jwt_secret.clone(),
        security.jwt_issuer.clone(),
        hours.unwrap_or(security.jwt_expiry_hours),
    );
    let token = jwt.issue_token(username)?;

    match output_format {
        // Bare token so `$(todo token admin)` works in scripts
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
        OutputFormat::Json => output_success(
            &output_format,
            &format!("Issued token for '{}'", username),
            Some(json!({ "token": token, "username": username })),
        ),
    }
}

//! Authentication operations with client-side validation

use crate::NumberPlayClient;
use numberplay_core::{AuthResponse, Error, RegisterRequest, Result};
use tracing::info;

/// Log in with email and password
pub async fn login(client: &NumberPlayClient, email: &str, password: &str) -> Result<AuthResponse> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(Error::ValidationError(
            "Email and password are required".to_string(),
        ));
    }

    client.login(email, password).await
}

/// Register a new account
///
/// Rejects empty fields and mismatched confirmation before any request.
pub async fn register(client: &NumberPlayClient, request: RegisterRequest) -> Result<AuthResponse> {
    validate_registration(&request)?;
    info!("Registering new account for {}", request.username);
    client.register(&request).await
}

/// Checks the server would also make, done up front
pub fn validate_registration(request: &RegisterRequest) -> Result<()> {
    if request.username.trim().is_empty() || request.email.trim().is_empty() {
        return Err(Error::ValidationError(
            "Username and email are required".to_string(),
        ));
    }
    if !request.email.contains('@') {
        return Err(Error::ValidationError(
            "Please enter a valid email address".to_string(),
        ));
    }
    if request.password.is_empty() {
        return Err(Error::ValidationError("Password is required".to_string()));
    }
    if request.password != request.password_confirm {
        return Err(Error::ValidationError("Passwords don't match".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(password: &str, confirm: &str) -> RegisterRequest {
        RegisterRequest {
            username: "john_doe".to_string(),
            email: "john@example.com".to_string(),
            password: password.to_string(),
            password_confirm: confirm.to_string(),
        }
    }

    #[test]
    fn test_matching_passwords_pass() {
        assert!(validate_registration(&request("SecurePass123", "SecurePass123")).is_ok());
    }

    #[test]
    fn test_mismatched_passwords_rejected() {
        let err = validate_registration(&request("SecurePass123", "SecurePass124")).unwrap_err();
        assert!(matches!(err, Error::ValidationError(_)));
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut req = request("pw", "pw");
        req.email = "john.example.com".to_string();
        assert!(validate_registration(&req).is_err());
    }
}
